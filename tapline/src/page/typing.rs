use std::ops::Range;

use metronome::{CharClass, Counter, TestConfig, TestController, TestMode};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{app::count_presets, utils::center};

/// Lines of text visible at once
const SHOWN_LINES: usize = 3;

/// Page: Typing
///
/// Renders the running test straight from the controller.
#[derive(Debug, Default)]
pub struct Typing;

impl Typing {
    pub fn render(&self, frame: &mut Frame, area: Rect, controller: &TestController) {
        let [config_bar, _, text] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(area);

        frame.render_widget(config_line(controller.config()).centered(), config_bar);

        let area = center(
            text,
            Constraint::Percentage(80),
            Constraint::Length(SHOWN_LINES as u16),
        );
        frame.render_widget(Paragraph::new(text_lines(controller, area.width)), area);
    }

    pub fn render_top(&self, controller: &TestController) -> Option<Line<'_>> {
        Some(Line::raw(counter_label(controller)).bold())
    }
}

fn counter_label(controller: &TestController) -> String {
    let counter = controller.counter();
    match counter {
        Counter::Remaining(_) => format!("{counter}s left"),
        Counter::Elapsed(_) => format!(
            "{}/{} words | {counter}s",
            controller.words_typed(),
            controller.config().count
        ),
    }
}

/// The current settings, highlighting the active ones
fn config_line(config: &TestConfig) -> Line<'static> {
    let item = |label: String, active: bool| {
        let span = Span::raw(label);
        if active {
            span.fg(Color::Yellow).bold()
        } else {
            span.fg(Color::DarkGray)
        }
    };

    let mut spans = vec![
        item("<F1> punctuation".to_string(), config.punctuation),
        Span::raw("  "),
        item("<F2> numbers".to_string(), config.numbers),
        Span::raw("  |  <F3> ").fg(Color::DarkGray),
        item(TestMode::Time.to_string(), config.mode == TestMode::Time),
        Span::raw(" "),
        item(TestMode::Words.to_string(), config.mode == TestMode::Words),
        Span::raw("  |  <F4>").fg(Color::DarkGray),
    ];

    for count in count_presets(config.mode) {
        spans.push(Span::raw(" "));
        spans.push(item(count.to_string(), config.count == *count));
    }

    Line::from(spans)
}

fn text_lines(controller: &TestController, width: u16) -> Vec<Line<'static>> {
    let source = controller.source_text();
    let classification = controller.classification();
    let cursor = classification.cursor_marker();

    let lines = wrap_lines(source, usize::from(width));
    let cursor_line = cursor
        .and_then(|cursor| lines.iter().position(|line| line.contains(&cursor)))
        .unwrap_or(lines.len().saturating_sub(1));
    let first = cursor_line.saturating_sub(1);
    let last_line = lines.len().saturating_sub(1);

    lines
        .into_iter()
        .enumerate()
        .skip(first)
        .take(SHOWN_LINES)
        .map(|(line_index, range)| {
            let mut spans: Vec<Span> = range
                .map(|index| {
                    let character = source[index];
                    let class = classification.get(index).unwrap_or(CharClass::Untyped);
                    let mut style = char_style(class, character == ' ');
                    if cursor == Some(index) {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    Span::styled(character.to_string(), style)
                })
                .collect();

            // Characters typed past the end of the text
            if line_index == last_line && classification.overflow() > 0 {
                let overflow: String = controller.input()[source.len()..].iter().collect();
                spans.push(Span::styled(
                    overflow,
                    Style::new().fg(Color::Red).add_modifier(Modifier::CROSSED_OUT),
                ));
            }

            Line::from(spans)
        })
        .collect()
}

fn char_style(class: CharClass, is_space: bool) -> Style {
    match class {
        CharClass::Correct => Style::new().fg(Color::Green),
        CharClass::Incorrect if is_space => Style::new().bg(Color::Red),
        CharClass::Incorrect => Style::new().fg(Color::Red).bold(),
        CharClass::Untyped => Style::new().fg(Color::DarkGray),
    }
}

/// Breaks `text` into lines of at most `width` characters at spaces
///
/// Spaces stay at the end of the line they break, so the ranges cover every index.
/// Words longer than `width` are split.
fn wrap_lines(text: &[char], width: usize) -> Vec<Range<usize>> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut start = 0;

    while start < text.len() {
        if text.len() - start <= width {
            lines.push(start..text.len());
            break;
        }

        let end = text[start..=start + width]
            .iter()
            .rposition(|character| *character == ' ')
            .map_or(start + width, |space| start + space + 1);

        lines.push(start..end);
        start = end;
    }

    lines
}
