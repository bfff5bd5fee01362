//! UI module for rendering the TUI

mod forms;
mod layout;

pub use forms::{group_shows_error, shows_error};

use crate::app::App;
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let (form_area, help_area, status_area) = layout::create_layout(frame.area());

    forms::draw_form(frame, form_area, app);
    layout::draw_help(frame, help_area);
    layout::draw_status_bar(frame, status_area, app);
}
