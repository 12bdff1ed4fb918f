//! Reference indicator calculators
//!
//! Series calculators backing the indicator declarations of the strategies.
//! Each function returns one value per input bar; `None` marks bars where the
//! warmup period has not completed yet.
//!
//! Available indicators:
//! - Volatility: True Range, ATR (Wilder)
//! - Trend: DMI (+DI/-DI), ADX (Wilder)
//! - Volume: VWAP, optionally anchored to calendar days

use chrono::{DateTime, Utc};
use itertools::izip;

/// +DI / -DI series pair
pub type DualLineOutput = (Vec<Option<f64>>, Vec<Option<f64>>);

/// One row of the ADX table: ADX, +DI, -DI
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalMovement {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}

fn same_length(high: &[f64], low: &[f64], close: &[f64]) -> bool {
    high.len() == low.len() && high.len() == close.len()
}

// =============================================================================
// Volatility
// =============================================================================

/// True range per bar. The first bar has no previous close and uses its own
/// high-low range.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let previous_close = std::iter::once(None).chain(close.iter().copied().map(Some));

    izip!(high, low, previous_close)
        .map(|(&h, &l, previous)| match previous {
            Some(pc) => (h - l).max((h - pc).abs()).max((l - pc).abs()),
            None => h - l,
        })
        .collect()
}

/// Wilder smoothing, seeded with the mean of the first `period` values
fn wilders_smooth(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let weight = period as f64;
    let mut state = values[..period].iter().sum::<f64>() / weight;
    out[period - 1] = Some(state);

    for (slot, value) in out[period..].iter_mut().zip(&values[period..]) {
        state = (state * (weight - 1.0) + value) / weight;
        *slot = Some(state);
    }

    out
}

/// Average True Range with Wilder smoothing. Empty on mismatched input.
pub fn atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || !same_length(high, low, close) {
        return vec![];
    }

    wilders_smooth(&true_range(high, low, close), period)
}

// =============================================================================
// Trend
// =============================================================================

/// Directional movement index lines (+DI, -DI)
pub fn dmi(high: &[f64], low: &[f64], close: &[f64], period: usize) -> DualLineOutput {
    if high.is_empty() || period == 0 || !same_length(high, low, close) {
        return (vec![], vec![]);
    }

    // Only the larger of the two moves counts, and only if positive
    let (plus_dm, minus_dm): (Vec<f64>, Vec<f64>) = std::iter::once((0.0, 0.0))
        .chain(high.windows(2).zip(low.windows(2)).map(|(h, l)| {
            let up = h[1] - h[0];
            let down = l[0] - l[1];
            (
                if up > down && up > 0.0 { up } else { 0.0 },
                if down > up && down > 0.0 { down } else { 0.0 },
            )
        }))
        .unzip();

    let smoothed_plus = wilders_smooth(&plus_dm, period);
    let smoothed_minus = wilders_smooth(&minus_dm, period);
    let range = atr(high, low, close, period);

    izip!(&smoothed_plus, &smoothed_minus, &range)
        .map(|row| match row {
            (Some(pdm), Some(mdm), Some(tr)) if *tr > 0.0 => {
                (Some(pdm / tr * 100.0), Some(mdm / tr * 100.0))
            }
            _ => (None, None),
        })
        .unzip()
}

/// Average Directional Index
///
/// ADX needs 2*period - 1 bars: one period until the DI lines exist and a
/// second one to smooth DX.
pub fn adx(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<Option<f64>> {
    let (plus_di, minus_di) = dmi(high, low, close, period);
    adx_from_di(&plus_di, &minus_di, period)
}

fn adx_from_di(plus_di: &[Option<f64>], minus_di: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; plus_di.len()];
    let Some(first_di) = period.checked_sub(1) else {
        return out;
    };
    if plus_di.len() <= first_di {
        return out;
    }

    let dx: Vec<f64> = plus_di[first_di..]
        .iter()
        .zip(&minus_di[first_di..])
        .map(|lines| match lines {
            (Some(p), Some(m)) if p + m > 0.0 => (p - m).abs() / (p + m) * 100.0,
            _ => 0.0,
        })
        .collect();

    for (slot, value) in out[first_di..].iter_mut().zip(wilders_smooth(&dx, period)) {
        *slot = value;
    }

    out
}

/// Full ADX table per bar; `None` until ADX, +DI and -DI are all valid
pub fn directional_movement(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    period: usize,
) -> Vec<Option<DirectionalMovement>> {
    let (plus_di, minus_di) = dmi(high, low, close, period);
    let adx = adx_from_di(&plus_di, &minus_di, period);

    izip!(adx, plus_di, minus_di)
        .map(|(adx, plus_di, minus_di)| {
            Some(DirectionalMovement {
                adx: adx?,
                plus_di: plus_di?,
                minus_di: minus_di?,
            })
        })
        .collect()
}

// =============================================================================
// Volume
// =============================================================================

/// Running typical-price VWAP that restarts whenever the session key changes.
/// A bar with no accumulated volume reports its close.
fn session_vwap<K: PartialEq>(
    sessions: impl Iterator<Item = K>,
    high: &[f64],
    low: &[f64],
    close: &[f64],
    volume: &[f64],
) -> Vec<f64> {
    let mut current: Option<K> = None;
    let mut price_volume = 0.0;
    let mut total_volume = 0.0;

    izip!(sessions, high, low, close, volume)
        .map(|(session, &h, &l, &c, &v)| {
            if current.as_ref() != Some(&session) {
                price_volume = 0.0;
                total_volume = 0.0;
                current = Some(session);
            }

            price_volume += (h + l + c) / 3.0 * v;
            total_volume += v;

            if total_volume > 0.0 {
                price_volume / total_volume
            } else {
                c
            }
        })
        .collect()
}

/// VWAP accumulated over the whole input
pub fn vwap(high: &[f64], low: &[f64], close: &[f64], volume: &[f64]) -> Vec<f64> {
    session_vwap(std::iter::repeat(()), high, low, close, volume)
}

/// VWAP that restarts on every new UTC calendar day
pub fn anchored_daily_vwap(
    datetime: &[DateTime<Utc>],
    high: &[f64],
    low: &[f64],
    close: &[f64],
    volume: &[f64],
) -> Vec<f64> {
    session_vwap(
        datetime.iter().map(|dt| dt.date_naive()),
        high,
        low,
        close,
        volume,
    )
}
