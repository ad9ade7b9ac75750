use crate::core::{Contribution, DisplayMode};
use crate::viz::Rgb;
use serde::Serialize;

/// Bar fill
pub const BAR_COLOR: Rgb = Rgb(0x5C, 0x66, 0x70);

/// Opacity of the focused or hovered bar
pub const ACTIVE_OPACITY: f64 = 1.0;

/// Opacity of every other bar
pub const INACTIVE_OPACITY: f64 = 0.8;

/// One drawn bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub feature: String,
    /// Contribution as received
    pub raw: f64,
    /// Value in the chart's scale (percent of entropy or raw)
    pub value: f64,
    pub label: String,
    pub opacity: f64,
}

/// Bars sorted for display plus the scale they were computed in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartData {
    pub bars: Vec<Bar>,
    /// Mode actually used; percent falls back to absolute without a positive entropy
    pub mode: DisplayMode,
    /// Largest positive displayed value, 0 when there is none
    pub max: f64,
}

impl BarChartData {
    /// Build the chart for `contributions`
    ///
    /// Works on a sorted copy; the caller's slice is not reordered.
    /// `active` names the emphasized feature, if any.
    pub fn new(
        contributions: &[Contribution],
        entropy: f64,
        mode: DisplayMode,
        active: Option<&str>,
    ) -> Self {
        let mode = effective_mode(mode, entropy);
        let bars: Vec<Bar> = sorted(contributions)
            .into_iter()
            .map(|c| {
                let value = scale(c.value, mode, entropy);
                Bar {
                    label: format_value(value, mode),
                    opacity: opacity(&c.feature, active),
                    feature: c.feature,
                    raw: c.value,
                    value,
                }
            })
            .collect();
        let max = bars
            .iter()
            .map(|b| b.value)
            .filter(|v| v.is_finite())
            .fold(0.0_f64, f64::max);
        Self { bars, mode, max }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Fraction of the full bar width for `bar`, in [0, 1]
    pub fn fill_ratio(&self, bar: &Bar) -> f64 {
        if self.max <= 0.0 || !bar.value.is_finite() || bar.value <= 0.0 {
            return 0.0;
        }
        (bar.value / self.max).clamp(0.0, 1.0)
    }

    /// Position of `feature` in display order
    pub fn position(&self, feature: &str) -> Option<usize> {
        self.bars.iter().position(|b| b.feature == feature)
    }
}

/// Copy sorted by value, largest first; ties keep input order
pub fn sorted(contributions: &[Contribution]) -> Vec<Contribution> {
    let mut out = contributions.to_vec();
    out.sort_by(|a, b| b.value.total_cmp(&a.value));
    out
}

/// Percent mode needs a positive entropy to divide by
pub fn effective_mode(mode: DisplayMode, entropy: f64) -> DisplayMode {
    match mode {
        DisplayMode::Percent if entropy > 0.0 && entropy.is_finite() => DisplayMode::Percent,
        _ => DisplayMode::Absolute,
    }
}

pub fn scale(value: f64, mode: DisplayMode, entropy: f64) -> f64 {
    match effective_mode(mode, entropy) {
        DisplayMode::Percent => value * 100.0 / entropy,
        DisplayMode::Absolute => value,
    }
}

/// Axis and tooltip label: integer percent or two decimals
///
/// Halves round away from zero; values that round to zero never show a sign.
pub fn format_value(value: f64, mode: DisplayMode) -> String {
    match mode {
        DisplayMode::Percent => format!("{}%", value.round() + 0.0),
        DisplayMode::Absolute => format!("{:.2}", (value * 100.0).round() / 100.0 + 0.0),
    }
}

pub fn opacity(feature: &str, active: Option<&str>) -> f64 {
    if active == Some(feature) {
        ACTIVE_OPACITY
    } else {
        INACTIVE_OPACITY
    }
}
