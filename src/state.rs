use eframe::egui::Color32;

use crate::color::generate_palette;
use crate::data::model::Measurement;
use crate::pipeline::AnalysisOutcome;
use crate::render::ErrorPoint;

// ---------------------------------------------------------------------------
// Viewer tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Curve,
    Deviation,
    Maps,
    Table,
}

impl Tab {
    pub fn label(self) -> &'static str {
        match self {
            Tab::Curve => "Curve",
            Tab::Deviation => "Deviation",
            Tab::Maps => "Maps",
            Tab::Table => "Table",
        }
    }
}

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// The full viewer state, independent of rendering.
pub struct ViewerState {
    /// The finished run being shown.
    pub outcome: AnalysisOutcome,

    /// Per-entry visibility, aligned with `outcome.analysis.entries`.
    pub visible: Vec<bool>,

    /// Indices of visible entries (cached).
    pub visible_indices: Vec<usize>,

    /// One colour per entry for the side panel and table.
    pub entry_colors: Vec<Color32>,

    pub tab: Tab,
}

impl ViewerState {
    pub fn new(outcome: AnalysisOutcome) -> Self {
        let n = outcome.analysis.len();
        Self {
            entry_colors: generate_palette(n),
            visible: vec![true; n],
            visible_indices: (0..n).collect(),
            tab: Tab::Curve,
            outcome,
        }
    }

    /// Tabs that have something to show for this run.
    pub fn available_tabs(&self) -> Vec<Tab> {
        let mut tabs = vec![Tab::Curve];
        if self.outcome.figures.deviation.is_some() {
            tabs.push(Tab::Deviation);
        }
        if self.outcome.figures.maps.is_some() {
            tabs.push(Tab::Maps);
        }
        tabs.push(Tab::Table);
        tabs
    }

    /// Recompute `visible_indices` after a visibility change.
    pub fn refilter(&mut self) {
        self.visible_indices = self
            .visible
            .iter()
            .enumerate()
            .filter(|(_, &v)| v)
            .map(|(i, _)| i)
            .collect();
    }

    pub fn toggle(&mut self, index: usize) {
        if let Some(v) = self.visible.get_mut(index) {
            *v = !*v;
        }
        self.refilter();
    }

    pub fn select_all(&mut self) {
        self.visible.iter_mut().for_each(|v| *v = true);
        self.refilter();
    }

    pub fn select_none(&mut self) {
        self.visible.iter_mut().for_each(|v| *v = false);
        self.refilter();
    }

    /// Curve points of the visible entries.
    pub fn visible_curve_points(&self) -> Vec<ErrorPoint> {
        self.pick(&self.outcome.figures.curve.points)
    }

    /// Deviation points of the visible entries, if comparing.
    pub fn visible_deviation_points(&self) -> Option<Vec<ErrorPoint>> {
        self.outcome
            .figures
            .deviation
            .as_ref()
            .map(|d| self.pick(&d.points))
    }

    /// Intensity of entry `index`, for the table.
    pub fn intensity(&self, index: usize) -> Measurement {
        self.outcome.analysis.samples[index].stats.as_measurement()
    }

    fn pick(&self, points: &[ErrorPoint]) -> Vec<ErrorPoint> {
        self.visible_indices
            .iter()
            .filter_map(|&i| points.get(i).copied())
            .collect()
    }
}
