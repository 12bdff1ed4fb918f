//! Indicator declarations
//!
//! A strategy declares the indicators it reads as an [`IndicatorSet`]. Each
//! entry names the indicator, says which calculator produces it, what data it
//! is computed from and in which order it has to run. The regime filter reads
//! the ADX table, so it is declared with a higher `order` than ADX.
//!
//! [`IndicatorSet::compute`] evaluates a set over one pair's candles with the
//! reference calculators in [`crate::indicators`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::IndicatorError;
use crate::indicators::{self, DirectionalMovement};
use crate::regime;
use crate::Candle;

/// Which input data an indicator is computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorSource {
    /// Full OHLCV candles of one pair
    Ohlcv,
}

/// VWAP accumulation window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VwapAnchor {
    /// Accumulate over the whole history
    None,
    /// Restart at every UTC day boundary
    Daily,
}

/// Calculator and its parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndicatorKind {
    Vwap { anchor: VwapAnchor },
    Adx { length: usize },
    Atr { length: usize },
    /// Regime label from the ADX table with the same `length`
    Regime {
        length: usize,
        threshold: f64,
        shift: usize,
    },
}

/// One declared indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: IndicatorKind,
    pub source: IndicatorSource,
    /// Indicators with a lower order are computed first
    pub order: u32,
}

impl IndicatorSpec {
    pub fn new(name: impl Into<String>, kind: IndicatorKind, source: IndicatorSource) -> Self {
        Self {
            name: name.into(),
            kind,
            source,
            order: 0,
        }
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }
}

/// Column holding +DI for the ADX indicator `name`
pub fn plus_di_column(name: &str) -> String {
    format!("{name}.plus_di")
}

/// Column holding -DI for the ADX indicator `name`
pub fn minus_di_column(name: &str) -> String {
    format!("{name}.minus_di")
}

/// Declared indicators of a strategy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    specs: Vec<IndicatorSpec>,
}

impl IndicatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an indicator. Names must be unique within the set.
    pub fn add(&mut self, spec: IndicatorSpec) -> Result<(), IndicatorError> {
        if self.specs.iter().any(|s| s.name == spec.name) {
            return Err(IndicatorError::Duplicate(spec.name));
        }
        self.specs.push(spec);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&IndicatorSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Declarations sorted by `order`, ties kept in declaration order
    pub fn resolution_order(&self) -> Vec<&IndicatorSpec> {
        let mut ordered: Vec<&IndicatorSpec> = self.specs.iter().collect();
        ordered.sort_by_key(|s| s.order);
        ordered
    }

    /// Evaluate every declared indicator over `candles`
    pub fn compute(&self, candles: &[Candle]) -> Result<IndicatorFrame, IndicatorError> {
        let mut frame = IndicatorFrame::new(candles.iter().map(|c| c.datetime).collect());

        let high: Vec<f64> = candles.iter().map(|c| c.high).collect();
        let low: Vec<f64> = candles.iter().map(|c| c.low).collect();
        let close: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let volume: Vec<f64> = candles.iter().map(|c| c.volume).collect();

        let mut computed: Vec<&IndicatorSpec> = Vec::new();

        for spec in self.resolution_order() {
            match spec.kind {
                IndicatorKind::Vwap { anchor } => {
                    let values = match anchor {
                        VwapAnchor::None => indicators::vwap(&high, &low, &close, &volume),
                        VwapAnchor::Daily => indicators::anchored_daily_vwap(
                            frame.datetime(),
                            &high,
                            &low,
                            &close,
                            &volume,
                        ),
                    };
                    frame.insert(&spec.name, values.into_iter().map(Some).collect())?;
                }
                IndicatorKind::Adx { length } => {
                    let table = indicators::directional_movement(&high, &low, &close, length);
                    frame.insert(&spec.name, table.iter().map(|r| r.map(|r| r.adx)).collect())?;
                    frame.insert(
                        &plus_di_column(&spec.name),
                        table.iter().map(|r| r.map(|r| r.plus_di)).collect(),
                    )?;
                    frame.insert(
                        &minus_di_column(&spec.name),
                        table.iter().map(|r| r.map(|r| r.minus_di)).collect(),
                    )?;
                }
                IndicatorKind::Atr { length } => {
                    let values = indicators::atr(&high, &low, &close, length);
                    // Empty output means there was no usable input
                    let values = if values.is_empty() {
                        vec![None; candles.len()]
                    } else {
                        values
                    };
                    frame.insert(&spec.name, values)?;
                }
                IndicatorKind::Regime {
                    length,
                    threshold,
                    shift,
                } => {
                    let resolver = DependencyResolver {
                        frame: &frame,
                        computed: &computed,
                    };
                    let table = resolver.adx_table(length).ok_or_else(|| {
                        IndicatorError::UnresolvedDependency {
                            indicator: spec.name.clone(),
                            dependency: format!("adx(length={length})"),
                        }
                    })?;
                    let labels = regime::regime_series(&table, threshold, shift);
                    frame.insert(
                        &spec.name,
                        labels.iter().map(|r| r.map(|r| r.to_value())).collect(),
                    )?;
                }
            }

            debug!(indicator = %spec.name, order = spec.order, bars = candles.len(), "Indicator computed");
            computed.push(spec);
        }

        Ok(frame)
    }
}

/// Lookup of already computed indicators by calculator parameters
struct DependencyResolver<'a> {
    frame: &'a IndicatorFrame,
    computed: &'a [&'a IndicatorSpec],
}

impl DependencyResolver<'_> {
    fn adx_table(&self, length: usize) -> Option<Vec<Option<DirectionalMovement>>> {
        let spec = self
            .computed
            .iter()
            .find(|s| matches!(s.kind, IndicatorKind::Adx { length: l } if l == length))?;

        let adx = self.frame.column(&spec.name)?;
        let plus_di = self.frame.column(&plus_di_column(&spec.name))?;
        let minus_di = self.frame.column(&minus_di_column(&spec.name))?;

        Some(
            itertools::izip!(adx, plus_di, minus_di)
                .map(|(adx, plus_di, minus_di)| match (adx, plus_di, minus_di) {
                    (Some(adx), Some(plus_di), Some(minus_di)) => Some(DirectionalMovement {
                        adx: *adx,
                        plus_di: *plus_di,
                        minus_di: *minus_di,
                    }),
                    _ => None,
                })
                .collect(),
        )
    }
}

/// Computed indicator columns aligned with one pair's candles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorFrame {
    datetime: Vec<DateTime<Utc>>,
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl IndicatorFrame {
    pub fn new(datetime: Vec<DateTime<Utc>>) -> Self {
        Self {
            datetime,
            columns: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.datetime.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datetime.is_empty()
    }

    pub fn datetime(&self) -> &[DateTime<Utc>] {
        &self.datetime
    }

    pub fn insert(&mut self, name: &str, values: Vec<Option<f64>>) -> Result<(), IndicatorError> {
        if values.len() != self.datetime.len() {
            return Err(IndicatorError::LengthMismatch {
                column: name.to_string(),
                expected: self.datetime.len(),
                actual: values.len(),
            });
        }
        self.columns.insert(name.to_string(), values);
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Value of `name` at bar `index`; NaN counts as missing
    pub fn value(&self, name: &str, index: usize) -> Option<f64> {
        self.columns
            .get(name)?
            .get(index)
            .copied()
            .flatten()
            .filter(|v| !v.is_nan())
    }
}
