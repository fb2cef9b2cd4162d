use metronome::FetchError;
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Color, Style, Stylize},
    text::{Line, ToLine},
    widgets::{Padding, Paragraph, Wrap},
};

use crate::utils::{ROUNDED_BLOCK, center};

/// Page: Error
///
/// Shown when the text for a test could not be fetched.
#[derive(Debug)]
pub struct Error {
    error: FetchError,
}

impl From<FetchError> for Error {
    fn from(error: FetchError) -> Self {
        Self { error }
    }
}

impl Error {
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let area = center(area, Constraint::Percentage(60), Constraint::Percentage(40));

        let paragraph = Paragraph::new(self.error.to_string())
            .wrap(Wrap { trim: false })
            .centered()
            .block(
                ROUNDED_BLOCK
                    .border_style(Style::new().fg(Color::Red))
                    .padding(Padding::uniform(1))
                    .title_top("Failed to load text".to_line().bold().centered()),
            );

        frame.render_widget(paragraph, area);
    }

    pub fn render_top(&self) -> Option<Line<'_>> {
        Some(Line::raw("<Enter> to retry"))
    }
}
