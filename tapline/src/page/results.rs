use metronome::{FinalResult, TestConfig, TestMode};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    symbols::Marker,
    text::{Line, Span, ToSpan},
    widgets::{Axis, Borders, Chart, Dataset, GraphType, LegendPosition, Padding, Paragraph},
};

use crate::{chart::ChartSeries, utils::ROUNDED_BLOCK};

/// Page: Results
///
/// Summary of a finished test, next to the per-second chart.
#[derive(Debug, Clone)]
pub struct Results {
    result: FinalResult,
    config: TestConfig,
    series: Option<ChartSeries>,
}

impl Results {
    pub const fn new(result: FinalResult, config: TestConfig, series: Option<ChartSeries>) -> Self {
        Self {
            result,
            config,
            series,
        }
    }

    fn summary(&self) -> Vec<Line<'static>> {
        let result = &self.result;
        let unit = match self.config.mode {
            TestMode::Time => "s",
            TestMode::Words => " words",
        };

        vec![
            Line::from(vec![
                "Wpm         : ".into(),
                result.wpm_rounded().to_string().bold().fg(Color::Yellow),
            ]),
            Line::from(vec![
                "Accuracy    : ".into(),
                format!("{}%", result.accuracy_rounded()).bold().fg(Color::Yellow),
            ]),
            Line::from(format!("Raw         : {}", result.raw_wpm_rounded())),
            Line::from(format!("Consistency : {}%", result.consistency_rounded())),
            Line::from(format!(
                "Characters  : {}/{}/{}",
                result.correct_chars, result.incorrect_chars, result.missed_chars
            )),
            Line::from(format!("Time        : {:.0}s", result.elapsed_seconds)),
            Line::from(format!(
                "Test        : {} {}{unit}",
                self.config.mode, self.config.count
            )),
            Line::from(format!(
                "Extras      : {}",
                extras(&self.config).unwrap_or_else(|| "none".to_string())
            )),
        ]
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let [text, chart] =
            Layout::horizontal([Constraint::Percentage(30), Constraint::Percentage(70)])
                .areas(area);

        let summary = Paragraph::new(self.summary()).block(
            ROUNDED_BLOCK
                .borders(Borders::TOP)
                .padding(Padding::right(1))
                .title("Summary".to_span().bold()),
        );
        frame.render_widget(summary, text);

        let Some(series) = self.series.as_ref().filter(|series| !series.is_empty()) else {
            let block = ROUNDED_BLOCK.title("Words/min".to_span().bold());
            frame.render_widget(
                Paragraph::new("Not enough samples to chart").block(block),
                chart,
            );
            return;
        };

        let wpm = Dataset::default()
            .name("Wpm")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Yellow))
            .data(&series.wpm);

        let raw_wpm = Dataset::default()
            .name("Raw Wpm")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Gray))
            .data(&series.raw_wpm);

        let errors = Dataset::default()
            .name("Errors")
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Red))
            .data(&series.errors);

        let duration = series.duration();
        let peak = series.peak().max(1.0);

        let wpm_chart = Chart::new(vec![raw_wpm, wpm, errors])
            .block(ROUNDED_BLOCK.title("Words/min".to_span().bold()))
            .x_axis(
                Axis::default()
                    .title("Seconds")
                    .style(Style::default().fg(Color::Gray))
                    .labels([Span::raw("1"), Span::raw(duration.to_string())])
                    .bounds([1.0, duration.max(2.0)]),
            )
            .y_axis(
                Axis::default()
                    .style(Style::default().fg(Color::Gray))
                    .labels([
                        Span::raw("0"),
                        Span::raw((peak / 2.0).trunc().to_string()),
                        Span::raw(peak.trunc().to_string()),
                    ])
                    .bounds([0.0, peak]),
            )
            .legend_position(Some(LegendPosition::BottomRight));

        frame.render_widget(wpm_chart, chart);
    }

    pub fn render_top(&self) -> Option<Line<'_>> {
        Some(Line::raw("<Enter> for the next test"))
    }
}

fn extras(config: &TestConfig) -> Option<String> {
    let extras: Vec<&str> = [
        (config.punctuation, "punctuation"),
        (config.numbers, "numbers"),
    ]
    .into_iter()
    .filter_map(|(enabled, name)| enabled.then_some(name))
    .collect();

    (!extras.is_empty()).then(|| extras.join(", "))
}
