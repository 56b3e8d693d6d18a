//! Symbol and look-back filters applied before analytics.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};

use super::error::TradelogError;
use super::trade::Trade;

/// How far back from "now" trades are kept, by entry time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    Days(u32),
    All,
}

impl DateRange {
    /// The ranges offered as presets.
    pub const PRESETS: [DateRange; 5] = [
        DateRange::Days(7),
        DateRange::Days(14),
        DateRange::Days(30),
        DateRange::Days(90),
        DateRange::All,
    ];

    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            DateRange::Days(days) => Some(now - Duration::days(i64::from(*days))),
            DateRange::All => None,
        }
    }
}

impl Default for DateRange {
    fn default() -> Self {
        DateRange::Days(30)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRange::Days(days) => write!(f, "{days}d"),
            DateRange::All => f.write_str("All"),
        }
    }
}

impl FromStr for DateRange {
    type Err = TradelogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        if value == "all" {
            return Ok(DateRange::All);
        }
        value
            .strip_suffix('d')
            .and_then(|n| n.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .map(DateRange::Days)
            .ok_or_else(|| TradelogError::ConfigInvalid {
                section: "filters".into(),
                key: "range".into(),
                reason: format!("'{s}' is not a range like 7d, 30d or all"),
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeFilter {
    /// `None` or `"all"` keeps every symbol.
    pub symbol: Option<String>,
    pub range: DateRange,
}

impl TradeFilter {
    pub fn new(symbol: Option<String>, range: DateRange) -> Self {
        let symbol = symbol.filter(|s| {
            let s = s.trim();
            !s.is_empty() && !s.eq_ignore_ascii_case("all")
        });
        Self { symbol, range }
    }

    pub fn matches(&self, trade: &Trade, now: DateTime<Utc>) -> bool {
        let symbol_ok = self
            .symbol
            .as_deref()
            .is_none_or(|s| trade.symbol.eq_ignore_ascii_case(s.trim()));
        let range_ok = self
            .range
            .cutoff(now)
            .is_none_or(|cutoff| trade.entry_time >= cutoff);
        symbol_ok && range_ok
    }

    pub fn apply(&self, trades: &[Trade], now: DateTime<Utc>) -> Vec<Trade> {
        trades
            .iter()
            .filter(|t| self.matches(t, now))
            .cloned()
            .collect()
    }
}

/// Sorted, de-duplicated symbols present in `trades`.
pub fn distinct_symbols(trades: &[Trade]) -> Vec<String> {
    let mut symbols: Vec<String> = trades.iter().map(|t| t.symbol.clone()).collect();
    symbols.sort();
    symbols.dedup();
    symbols
}
