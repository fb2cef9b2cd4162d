use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::Stylize,
    text::ToLine,
};

use crate::utils::center;

/// Page: Loading
///
/// Shown while the text for the next test is fetched.
#[derive(Debug, Default)]
pub struct Loading;

impl Loading {
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let area = center(area, Constraint::Percentage(100), Constraint::Length(1));
        frame.render_widget("Loading text...".to_line().italic().centered(), area);
    }
}
