//! Core data types used across the strategies

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ConfigError;

/// OHLCV candlestick data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub datetime: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Trading pair symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(pub String);

impl Symbol {
    pub fn new(s: impl Into<String>) -> Self {
        Symbol(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Length of a decision cycle or candle time bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CycleDuration {
    M5,
    M15,
    H1,
    H4,
    D1,
}

impl CycleDuration {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleDuration::M5 => "5m",
            CycleDuration::M15 => "15m",
            CycleDuration::H1 => "1h",
            CycleDuration::H4 => "4h",
            CycleDuration::D1 => "1d",
        }
    }

    pub fn to_timedelta(self) -> TimeDelta {
        match self {
            CycleDuration::M5 => TimeDelta::minutes(5),
            CycleDuration::M15 => TimeDelta::minutes(15),
            CycleDuration::H1 => TimeDelta::hours(1),
            CycleDuration::H4 => TimeDelta::hours(4),
            CycleDuration::D1 => TimeDelta::days(1),
        }
    }
}

impl FromStr for CycleDuration {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "5m" => Ok(CycleDuration::M5),
            "15m" => Ok(CycleDuration::M15),
            "1h" => Ok(CycleDuration::H1),
            "4h" => Ok(CycleDuration::H4),
            "1d" => Ok(CycleDuration::D1),
            other => Err(ConfigError::UnknownTimeframe(other.to_string())),
        }
    }
}

impl TryFrom<String> for CycleDuration {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CycleDuration> for String {
    fn from(value: CycleDuration) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for CycleDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
