//! ADX regime filter
//!
//! Classifies the market of a pair into bull, bear or crab (sideways) from
//! the Average Directional Index and its directional components.
//!
//! - ADX at or below the threshold is treated as noise: crab
//! - otherwise +DI above -DI is bull, anything else is bear

use serde::{Deserialize, Serialize};

use crate::indicators::DirectionalMovement;

/// Market regime label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Bull,
    Bear,
    Crab,
}

impl Regime {
    /// Numeric encoding used when the regime is stored as an indicator column
    pub fn to_value(self) -> f64 {
        match self {
            Regime::Bull => 1.0,
            Regime::Bear => -1.0,
            Regime::Crab => 0.0,
        }
    }

    /// Decode an indicator column value. Anything that is not exactly one of
    /// the three encodings is rejected.
    pub fn from_value(value: f64) -> Option<Self> {
        if value == 1.0 {
            Some(Regime::Bull)
        } else if value == -1.0 {
            Some(Regime::Bear)
        } else if value == 0.0 {
            Some(Regime::Crab)
        } else {
            None
        }
    }

    /// Regime for a possibly missing indicator value.
    ///
    /// Not enough history at the start of the data defaults to crab, which
    /// never opens a position.
    pub fn from_indicator(value: Option<f64>) -> Self {
        value.and_then(Regime::from_value).unwrap_or(Regime::Crab)
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Regime::Bull => "bull",
            Regime::Bear => "bear",
            Regime::Crab => "crab",
        };
        f.write_str(label)
    }
}

/// Classify one bar
pub fn classify(adx: f64, plus_di: f64, minus_di: f64, regime_threshold: f64) -> Regime {
    if adx > regime_threshold {
        if plus_di > minus_di {
            Regime::Bull
        } else {
            Regime::Bear
        }
    } else {
        Regime::Crab
    }
}

/// Classify one row of the ADX table
pub fn classify_row(row: &DirectionalMovement, regime_threshold: f64) -> Regime {
    classify(row.adx, row.plus_di, row.minus_di, regime_threshold)
}

/// Regime column for a full ADX table.
///
/// `shift` moves every label `shift` bars later so the decision at bar `i`
/// only sees the ADX computed at bar `i - shift`. Bars without a source row
/// stay `None`.
pub fn regime_series(
    table: &[Option<DirectionalMovement>],
    regime_threshold: f64,
    shift: usize,
) -> Vec<Option<Regime>> {
    let labels = table
        .iter()
        .map(|row| row.as_ref().map(|r| classify_row(r, regime_threshold)));

    std::iter::repeat(None)
        .take(shift.min(table.len()))
        .chain(labels)
        .take(table.len())
        .collect()
}
