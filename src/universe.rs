//! Universe and indicator access
//!
//! Strategies read prices and indicator values through [`IndicatorProvider`].
//! Every lookup may come back empty: early in the history there are not
//! enough bars, and live data can be late. Callers treat `None` as "do not
//! trade", never as an error.

use chrono::{DateTime, TimeDelta, Utc};
use std::collections::{BTreeMap, HashMap};

use crate::error::IndicatorError;
use crate::indicator_set::{IndicatorFrame, IndicatorSet};
use crate::{Candle, CycleDuration, Symbol};

/// Read access to prices and precomputed indicators at the decision timestamp
pub trait IndicatorProvider {
    /// Decision timestamp of the current cycle
    fn timestamp(&self) -> DateTime<Utc>;

    /// Pairs of the universe in configured order
    fn pairs(&self) -> &[Symbol];

    /// Close price of `pair` at `at` (default: the decision timestamp).
    /// `pair = None` means the single pair of a one-pair universe.
    fn price(&self, pair: Option<&Symbol>, at: Option<DateTime<Utc>>) -> Option<f64>;

    /// Latest value of indicator (or indicator column) `name` for `pair`
    fn indicator_value(&self, name: &str, pair: Option<&Symbol>) -> Option<f64>;

    /// The only pair of a one-pair universe
    fn single_pair(&self) -> Option<&Symbol> {
        match self.pairs() {
            [pair] => Some(pair),
            _ => None,
        }
    }
}

fn resolve_pair<'a>(pairs: &'a [Symbol], pair: Option<&'a Symbol>) -> Option<&'a Symbol> {
    match pair {
        Some(pair) => Some(pair),
        None => match pairs {
            [only] => Some(only),
            _ => None,
        },
    }
}

// =============================================================================
// Static snapshot
// =============================================================================

/// Indicator values for one cycle, set by hand
#[derive(Debug, Clone)]
pub struct StaticIndicators {
    timestamp: DateTime<Utc>,
    pairs: Vec<Symbol>,
    prices: HashMap<Symbol, f64>,
    price_history: HashMap<Symbol, BTreeMap<DateTime<Utc>, f64>>,
    values: HashMap<Symbol, HashMap<String, f64>>,
}

impl StaticIndicators {
    pub fn new(timestamp: DateTime<Utc>, pairs: Vec<Symbol>) -> Self {
        Self {
            timestamp,
            pairs,
            prices: HashMap::new(),
            price_history: HashMap::new(),
            values: HashMap::new(),
        }
    }

    /// Current close price
    pub fn with_price(mut self, pair: &Symbol, price: f64) -> Self {
        self.prices.insert(pair.clone(), price);
        self
    }

    /// Close price of the bar that had closed at `at`
    pub fn with_price_at(mut self, pair: &Symbol, at: DateTime<Utc>, price: f64) -> Self {
        self.price_history
            .entry(pair.clone())
            .or_default()
            .insert(at, price);
        self
    }

    pub fn with_indicator(mut self, pair: &Symbol, name: &str, value: f64) -> Self {
        self.values
            .entry(pair.clone())
            .or_default()
            .insert(name.to_string(), value);
        self
    }
}

impl IndicatorProvider for StaticIndicators {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn pairs(&self) -> &[Symbol] {
        &self.pairs
    }

    fn price(&self, pair: Option<&Symbol>, at: Option<DateTime<Utc>>) -> Option<f64> {
        let pair = resolve_pair(&self.pairs, pair)?;
        match at {
            None => self.prices.get(pair).copied(),
            Some(at) if at == self.timestamp => self.prices.get(pair).copied(),
            Some(at) => self
                .price_history
                .get(pair)?
                .range(..=at)
                .next_back()
                .map(|(_, price)| *price),
        }
    }

    fn indicator_value(&self, name: &str, pair: Option<&Symbol>) -> Option<f64> {
        let pair = resolve_pair(&self.pairs, pair)?;
        self.values
            .get(pair)?
            .get(name)
            .copied()
            .filter(|v| !v.is_nan())
    }
}

// =============================================================================
// Candle backed universe
// =============================================================================

struct PairData {
    candles: Vec<Candle>,
    frame: IndicatorFrame,
}

/// Candles and computed indicators for a set of pairs.
///
/// A candle is stamped with its open time and becomes visible once it has
/// closed, i.e. at `datetime + candle_duration`. Lookups never return data
/// from a candle that closes after the requested time, and return nothing if
/// the latest closed candle is older than `data_delay_tolerance`.
pub struct CandleUniverse {
    pairs: Vec<Symbol>,
    data: HashMap<Symbol, PairData>,
    candle_duration: TimeDelta,
    data_delay_tolerance: TimeDelta,
}

impl CandleUniverse {
    /// Compute `indicators` for every pair. Pair order is kept as given.
    pub fn new(
        indicators: &IndicatorSet,
        candles: Vec<(Symbol, Vec<Candle>)>,
        candle_duration: CycleDuration,
    ) -> Result<Self, IndicatorError> {
        let mut pairs = Vec::with_capacity(candles.len());
        let mut data = HashMap::with_capacity(candles.len());

        for (pair, mut pair_candles) in candles {
            if data.contains_key(&pair) {
                return Err(IndicatorError::DuplicatePair(pair));
            }
            pair_candles.sort_by_key(|c| c.datetime);
            let frame = indicators.compute(&pair_candles)?;
            pairs.push(pair.clone());
            data.insert(
                pair,
                PairData {
                    candles: pair_candles,
                    frame,
                },
            );
        }

        let candle_duration = candle_duration.to_timedelta();
        Ok(Self {
            pairs,
            data,
            candle_duration,
            data_delay_tolerance: candle_duration,
        })
    }

    pub fn with_data_delay_tolerance(mut self, tolerance: TimeDelta) -> Self {
        self.data_delay_tolerance = tolerance;
        self
    }

    pub fn pairs(&self) -> &[Symbol] {
        &self.pairs
    }

    /// Provider for a decision taken at `timestamp`
    pub fn view_at(&self, timestamp: DateTime<Utc>) -> UniverseView<'_> {
        UniverseView {
            universe: self,
            timestamp,
        }
    }

    /// Index of the latest candle closed at or before `at`, within tolerance
    fn bar_index(&self, pair: &Symbol, at: DateTime<Utc>) -> Option<usize> {
        let data = self.data.get(pair)?;
        let closed = data
            .candles
            .partition_point(|c| c.datetime + self.candle_duration <= at);
        let index = closed.checked_sub(1)?;

        let close_time = data.candles[index].datetime + self.candle_duration;
        if at - close_time > self.data_delay_tolerance {
            return None;
        }
        Some(index)
    }
}

/// [`CandleUniverse`] seen from one decision timestamp
pub struct UniverseView<'a> {
    universe: &'a CandleUniverse,
    timestamp: DateTime<Utc>,
}

impl IndicatorProvider for UniverseView<'_> {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn pairs(&self) -> &[Symbol] {
        &self.universe.pairs
    }

    fn price(&self, pair: Option<&Symbol>, at: Option<DateTime<Utc>>) -> Option<f64> {
        let pair = resolve_pair(&self.universe.pairs, pair)?;
        let at = at.unwrap_or(self.timestamp).min(self.timestamp);
        let index = self.universe.bar_index(pair, at)?;
        self.universe
            .data
            .get(pair)
            .map(|d| d.candles[index].close)
    }

    fn indicator_value(&self, name: &str, pair: Option<&Symbol>) -> Option<f64> {
        let pair = resolve_pair(&self.universe.pairs, pair)?;
        let index = self.universe.bar_index(pair, self.timestamp)?;
        self.universe.data.get(pair)?.frame.value(name, index)
    }
}
