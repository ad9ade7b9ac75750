use crate::core::{AnalysisResult, DisplayMode, ResultsSection};
use crate::services::result_store::{ResolvedResult, ResultSource, ResultStore};
use crate::viz::{BarChartData, bar_chart};
use crate::viz::five_num::{self, FiveNumRow};
use crate::viz::heatmap::HeatmapGrid;
use serde::Serialize;
use tracing::debug;

/// Complete state of the results view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsPage {
    resolved: Option<ResolvedResult>,
    mode: DisplayMode,
    section: ResultsSection,
    /// Feature of the focused or hovered bar
    active_bar: Option<String>,
}

impl ResultsPage {
    /// Resolve the result to show: the hand-off first, then the session store
    pub fn mount(
        store: &ResultStore,
        handoff: Option<AnalysisResult>,
        default_mode: DisplayMode,
    ) -> Self {
        let resolved = store.get(handoff);
        match &resolved {
            Some(r) => debug!("Results view showing '{}' from {:?}", r.result.target, r.source),
            None => debug!("Results view has nothing to show"),
        }
        Self {
            resolved,
            mode: default_mode,
            section: ResultsSection::default(),
            active_bar: None,
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.resolved.as_ref().map(|r| &r.result)
    }

    pub fn source(&self) -> Option<ResultSource> {
        self.resolved.as_ref().map(|r| r.source)
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn section(&self) -> ResultsSection {
        self.section
    }

    pub fn active_bar(&self) -> Option<&str> {
        self.active_bar.as_deref()
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.mode = mode;
    }

    pub fn toggle_display_mode(&mut self) {
        self.mode = self.mode.toggle();
    }

    pub fn set_section(&mut self, section: ResultsSection) {
        self.section = section;
    }

    pub fn next_section(&mut self) {
        self.section = self.section.next();
    }

    /// `Target: T · Total MI: x.xxx · Entropy: x.xxx bits`
    pub fn header(&self) -> Option<String> {
        self.result().map(|r| {
            format!(
                "Target: {} · Total MI: {:.3} · Entropy: {:.3} bits",
                r.target, r.total_mi, r.entropy
            )
        })
    }

    /// Gauge ratio in [0, 1] and its integer percent label
    pub fn entropy_gauge(&self) -> Option<(f64, String)> {
        self.result().map(|r| {
            let pct = r.entropy_gauge_pct();
            (pct / 100.0, bar_chart::format_value(pct, DisplayMode::Percent))
        })
    }

    pub fn bar_chart(&self) -> Option<BarChartData> {
        self.result().map(|r| {
            BarChartData::new(
                &r.contributions,
                r.entropy,
                self.mode,
                self.active_bar.as_deref(),
            )
        })
    }

    pub fn five_num_rows(&self) -> Vec<FiveNumRow> {
        self.result()
            .map(|r| five_num::rows(&r.five_num, Some(r.target.as_str())))
            .unwrap_or_default()
    }

    /// `None` when there is no matrix or it is malformed
    pub fn heatmap(&self) -> Option<HeatmapGrid> {
        self.result()
            .and_then(|r| r.spearman.as_ref())
            .and_then(HeatmapGrid::new)
    }

    /// Emphasize the bar for `feature`, or clear the emphasis
    pub fn hover_bar(&mut self, feature: Option<&str>) {
        self.active_bar = feature.map(str::to_string);
    }

    /// Move bar focus down the display order
    pub fn focus_next_bar(&mut self) {
        self.step_bar(1);
    }

    pub fn focus_prev_bar(&mut self) {
        self.step_bar(-1);
    }

    fn step_bar(&mut self, delta: isize) {
        let Some(chart) = self.bar_chart() else {
            return;
        };
        if chart.is_empty() {
            return;
        }
        let last = chart.bars.len() - 1;
        let next = match self.active_bar.as_deref().and_then(|f| chart.position(f)) {
            Some(idx) => idx.saturating_add_signed(delta).min(last),
            None if delta < 0 => last,
            None => 0,
        };
        self.active_bar = Some(chart.bars[next].feature.clone());
    }

    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
