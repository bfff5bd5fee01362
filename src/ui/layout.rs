//! Layout components (help line, status bar)

use crate::app::App;
use crate::state::ControlStatus;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Split the screen into form, help line and status bar
pub fn create_layout(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Form
            Constraint::Length(1), // Help text
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    (chunks[0], chunks[1], chunks[2])
}

/// Draw key hints
pub fn draw_help(frame: &mut Frame, area: Rect) {
    let key = Style::default().fg(Color::Cyan);
    let help = Paragraph::new(Line::from(vec![
        Span::styled("Tab", key),
        Span::raw(": next  "),
        Span::styled("←/→", key),
        Span::raw(": choose  "),
        Span::styled("Space", key),
        Span::raw(": toggle  "),
        Span::styled("Enter", key),
        Span::raw(": submit  "),
        Span::styled("^R", key),
        Span::raw(": reset  "),
        Span::styled("F2", key),
        Span::raw(": switch form  "),
        Span::styled("Esc", key),
        Span::raw(": quit"),
    ]))
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, area);
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];

    // Form validity
    let (marker, color, label) = match app.form.status() {
        ControlStatus::Valid => (" ● ", Color::Green, "valid"),
        ControlStatus::Invalid => (" ● ", Color::Red, "invalid"),
        ControlStatus::Pending => (" ◌ ", Color::Yellow, "checking"),
    };
    spans.push(Span::styled(marker, Style::default().fg(color)));
    spans.push(Span::styled(
        format!("{} {label}", app.kind().title()),
        Style::default().fg(Color::White),
    ));

    // Draft persistence
    if !app.is_persisting() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            "drafts off",
            Style::default().fg(Color::Red),
        ));
    }

    if let Some(msg) = &app.status_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg.as_str(), Style::default().fg(Color::Green)));
    }

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, area);
}
