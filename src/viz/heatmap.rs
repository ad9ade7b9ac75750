use crate::core::SpearmanMatrix;
use crate::viz::Rgb;
use crate::viz::five_num::PLACEHOLDER;
use serde::Serialize;

/// Hue for positive coefficients
pub const WARM: Rgb = Rgb(230, 97, 40);

/// Hue for negative coefficients
pub const COLD: Rgb = Rgb(33, 102, 172);

/// Background a zero coefficient fades into
pub const NEUTRAL: Rgb = Rgb(245, 245, 245);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Hue {
    Warm,
    Cold,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub hue: Hue,
    /// |coefficient| after clamping to [-1, 1]
    pub opacity: f64,
    /// Coefficient to two decimals
    pub label: String,
}

impl HeatmapCell {
    /// Encode one coefficient
    pub fn new(coefficient: f64) -> Self {
        let x = if coefficient.is_finite() {
            coefficient.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        let hue = if x > 0.0 {
            Hue::Warm
        } else if x < 0.0 {
            Hue::Cold
        } else {
            Hue::Neutral
        };
        Self {
            hue,
            opacity: x.abs(),
            label: if coefficient.is_finite() {
                format!("{coefficient:.2}")
            } else {
                PLACEHOLDER.to_string()
            },
        }
    }

    /// Cell background: the hue at `opacity` over the neutral background
    pub fn color(&self) -> Rgb {
        match self.hue {
            Hue::Warm => WARM.over(NEUTRAL, self.opacity),
            Hue::Cold => COLD.over(NEUTRAL, self.opacity),
            Hue::Neutral => NEUTRAL,
        }
    }
}

/// Square grid of encoded cells with row/column labels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapGrid {
    pub labels: Vec<String>,
    pub cells: Vec<Vec<HeatmapCell>>,
}

impl HeatmapGrid {
    /// Encode `matrix`; `None` when it is empty or not square over its order
    pub fn new(matrix: &SpearmanMatrix) -> Option<Self> {
        if !matrix.is_well_formed() {
            return None;
        }
        let cells = matrix
            .matrix
            .iter()
            .map(|row| row.iter().copied().map(HeatmapCell::new).collect())
            .collect();
        Some(Self {
            labels: matrix.order.clone(),
            cells,
        })
    }

    pub fn side(&self) -> usize {
        self.labels.len()
    }
}
