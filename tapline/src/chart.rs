use std::{cell::RefCell, rc::Rc};

use metronome::ChartRenderer;

type PlotData = Vec<(f64, f64)>;

/// Series plotted on the results page, one point per second
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    pub wpm: PlotData,
    pub raw_wpm: PlotData,
    pub errors: PlotData,
}

impl ChartSeries {
    pub fn new(wpm: &[u32], raw_wpm: &[u32], errors: &[usize]) -> Self {
        Self {
            wpm: plot(wpm.iter().map(|&value| f64::from(value))),
            raw_wpm: plot(raw_wpm.iter().map(|&value| f64::from(value))),
            // Seconds without errors are left out of the scatter
            errors: plot(errors.iter().map(|&value| value as f64))
                .into_iter()
                .filter(|(_, value)| *value > 0.0)
                .collect(),
        }
    }

    /// Last second on the x-axis
    pub fn duration(&self) -> f64 {
        self.wpm.len().max(self.raw_wpm.len()) as f64
    }

    /// Highest value on the y-axis
    pub fn peak(&self) -> f64 {
        self.wpm
            .iter()
            .chain(&self.raw_wpm)
            .chain(&self.errors)
            .map(|(_, value)| *value)
            .fold(0.0, f64::max)
    }

    pub fn is_empty(&self) -> bool {
        self.wpm.is_empty() && self.raw_wpm.is_empty()
    }
}

fn plot(values: impl Iterator<Item = f64>) -> PlotData {
    values
        .enumerate()
        .map(|(index, value)| ((index + 1) as f64, value))
        .collect()
}

/// A [`ChartRenderer`] that hands the series over to the results page
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct ChartSlot(Rc<RefCell<Option<ChartSeries>>>);

impl ChartSlot {
    pub fn series(&self) -> Option<ChartSeries> {
        self.0.borrow().clone()
    }
}

impl ChartRenderer for ChartSlot {
    fn render(&mut self, wpm: &[u32], raw_wpm: &[u32], errors: &[usize]) {
        *self.0.borrow_mut() = Some(ChartSeries::new(wpm, raw_wpm, errors));
    }

    fn dispose(&mut self) {
        self.0.borrow_mut().take();
    }
}
