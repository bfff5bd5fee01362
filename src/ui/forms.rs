//! Form rendering
//!
//! Owns the display policy: a field's errors are shown only once it has
//! been touched and changed by the user and is invalid. Group errors follow
//! the same rule using the group's children.

use crate::app::App;
use crate::state::{Control, ControlStatus, FieldKind, FormField, FormGroup};
use crate::validation::ValidationResult;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const LABEL_WIDTH: usize = 22;
const INDENT: &str = "  ";

/// Whether a field's validation errors should be visible
pub fn shows_error(field: &FormField) -> bool {
    let state = field.state();
    state.touched && state.dirty && field.is_invalid()
}

/// Whether a group's own rule errors should be visible
pub fn group_shows_error(group: &FormGroup) -> bool {
    group.result().is_invalid()
        && group
            .field_paths()
            .iter()
            .filter_map(|path| group.get_field(path))
            .any(|f| f.state().touched && f.state().dirty)
}

fn error_lines(result: &ValidationResult, depth: usize, lines: &mut Vec<Line<'static>>) {
    for error in result.errors() {
        lines.push(Line::from(Span::styled(
            format!("{}  ✗ {error}", INDENT.repeat(depth)),
            Style::default().fg(Color::Red),
        )));
    }
}

fn field_line(field: &FormField, depth: usize, is_active: bool) -> Line<'static> {
    let style = if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let value = field.display_value();
    let display_value = if value.is_empty() && !is_active {
        "(empty)".to_string()
    } else {
        value
    };

    let label = format!("{}{}", INDENT.repeat(depth), field.label);
    let mut spans = vec![
        Span::styled(format!("{label:<LABEL_WIDTH$} "), style),
        Span::styled(display_value, Style::default().fg(Color::White)),
    ];
    if is_active && matches!(field.kind, FieldKind::Text | FieldKind::Secret) {
        spans.push(Span::styled("▌", Style::default().fg(Color::Cyan)));
    }
    if field.status() == ControlStatus::Pending && field.state().dirty {
        spans.push(Span::styled(" …", Style::default().fg(Color::Yellow)));
    }
    Line::from(spans)
}

struct FormLines {
    lines: Vec<Line<'static>>,
    /// Line index of the focused field
    active_line: usize,
}

fn collect_lines(
    group: &FormGroup,
    prefix: &str,
    depth: usize,
    active_path: Option<&str>,
    out: &mut FormLines,
) {
    for (name, control) in group.controls() {
        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        };
        match control {
            Control::Field(field) => push_field(field, &path, depth, active_path, out),
            Control::Group(child) => {
                out.lines.push(header(name, depth));
                collect_lines(child, &path, depth + 1, active_path, out);
                if group_shows_error(child) {
                    error_lines(child.result(), depth + 1, &mut out.lines);
                }
            }
            Control::Array(array) => {
                out.lines.push(header(name, depth));
                for (i, field) in array.items.iter().enumerate() {
                    push_field(field, &format!("{path}.{i}"), depth + 1, active_path, out);
                }
            }
        }
    }
}

fn push_field(
    field: &FormField,
    path: &str,
    depth: usize,
    active_path: Option<&str>,
    out: &mut FormLines,
) {
    let is_active = active_path == Some(path);
    if is_active {
        out.active_line = out.lines.len();
    }
    out.lines.push(field_line(field, depth, is_active));
    if shows_error(field) {
        error_lines(&field.state().result, depth, &mut out.lines);
    }
}

fn header(name: &str, depth: usize) -> Line<'static> {
    Line::from(Span::styled(
        format!("{}{name}", INDENT.repeat(depth)),
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::BOLD),
    ))
}

fn form_lines(group: &FormGroup, active_path: Option<&str>) -> FormLines {
    let mut out = FormLines {
        lines: Vec::new(),
        active_line: 0,
    };
    collect_lines(group, "", 0, active_path, &mut out);
    out
}

/// Draw the current form, scrolled so the focused field stays visible
pub fn draw_form(frame: &mut Frame, area: Rect, app: &App) {
    let active_path = app.form.active_path();
    let FormLines { lines, active_line } = form_lines(app.form.controls(), active_path.as_deref());

    let visible = area.height.saturating_sub(2) as usize;
    let scroll = if active_line >= visible {
        active_line + 1 - visible
    } else {
        0
    };

    let block = Block::default()
        .title(format!(" {} ", app.kind().title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
    frame.render_widget(paragraph, area);
}
