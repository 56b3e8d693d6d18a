//! Trade records and manual trade entry.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::TradelogError;
use super::rounding::round2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Long => "long",
            Side::Short => "short",
        }
    }

    /// +1 for longs, -1 for shorts.
    pub fn direction(&self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = TradelogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" => Ok(Side::Long),
            "short" => Ok(Side::Short),
            other => Err(TradelogError::InvalidTrade {
                reason: format!("unknown side '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    Market,
    Limit,
    StopMarket,
    StopLimit,
}

impl OrderType {
    /// Every order type, in the fixed order breakdowns report them.
    pub const ALL: [OrderType; 4] = [
        OrderType::Market,
        OrderType::Limit,
        OrderType::StopMarket,
        OrderType::StopLimit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "market",
            OrderType::Limit => "limit",
            OrderType::StopMarket => "stop-market",
            OrderType::StopLimit => "stop-limit",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = TradelogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "market" => Ok(OrderType::Market),
            "limit" => Ok(OrderType::Limit),
            "stop-market" => Ok(OrderType::StopMarket),
            "stop-limit" => Ok(OrderType::StopLimit),
            other => Err(TradelogError::InvalidTrade {
                reason: format!("unknown order type '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Win,
    Loss,
}

impl TradeStatus {
    /// Status implied by a trade's exit price and realized PnL.
    pub fn derive(exit_price: f64, pnl: f64) -> Self {
        if exit_price <= 0.0 {
            TradeStatus::Open
        } else if pnl >= 0.0 {
            TradeStatus::Win
        } else {
            TradeStatus::Loss
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Open => "open",
            TradeStatus::Win => "win",
            TradeStatus::Loss => "loss",
        }
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeStatus {
    type Err = TradelogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(TradeStatus::Open),
            "win" => Ok(TradeStatus::Win),
            "loss" => Ok(TradeStatus::Loss),
            other => Err(TradelogError::InvalidTrade {
                reason: format!("unknown status '{other}'"),
            }),
        }
    }
}

/// One journaled position, open or closed.
///
/// Sizes, prices, PnL and fees are quote-currency amounts. `duration` is in
/// whole minutes and is 0 while the position is open, in which case
/// `exit_time == entry_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub entry_price: f64,
    pub exit_price: f64,
    pub size: f64,
    pub leverage: f64,
    pub pnl: f64,
    pub pnl_percent: f64,
    pub fees: f64,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub duration: i64,
    pub status: TradeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.status == TradeStatus::Win
    }

    pub fn is_loss(&self) -> bool {
        self.status == TradeStatus::Loss
    }

    pub fn is_closed(&self) -> bool {
        self.status != TradeStatus::Open
    }

    pub fn is_long(&self) -> bool {
        self.side == Side::Long
    }

    /// Check a stored record: positive sizing, ordered timestamps, and a
    /// status that agrees with the exit price and PnL.
    pub fn validate(&self) -> Result<(), TradelogError> {
        if self.symbol.trim().is_empty() {
            return invalid("symbol must not be empty".into());
        }
        check_sizing(self.size, self.entry_price, self.leverage, self.fees)?;
        if !(self.exit_price >= 0.0) {
            return invalid("exit price must be non-negative".into());
        }
        if self.exit_time < self.entry_time {
            return invalid("exit time must not precede entry time".into());
        }
        if self.duration < 0 {
            return invalid("duration must be non-negative".into());
        }
        let expected = TradeStatus::derive(self.exit_price, self.pnl);
        if self.status != expected {
            return invalid(format!(
                "status {} contradicts exit price {} and pnl {}",
                self.status, self.exit_price, self.pnl
            ));
        }
        Ok(())
    }
}

fn invalid(reason: String) -> Result<(), TradelogError> {
    Err(TradelogError::InvalidTrade { reason })
}

fn check_sizing(size: f64, entry_price: f64, leverage: f64, fees: f64) -> Result<(), TradelogError> {
    if !(size > 0.0) {
        return invalid("size must be positive".into());
    }
    if !(entry_price > 0.0) {
        return invalid("entry price must be positive".into());
    }
    if !(leverage >= 1.0) {
        return invalid("leverage must be at least 1".into());
    }
    if !(fees >= 0.0) {
        return invalid("fees must be non-negative".into());
    }
    Ok(())
}

/// A trade as typed in by hand, before PnL and status are worked out.
#[derive(Debug, Clone)]
pub struct TradeEntry {
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub size: f64,
    pub leverage: f64,
    pub fees: f64,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

impl TradeEntry {
    pub fn validate(&self) -> Result<(), TradelogError> {
        if self.symbol.trim().is_empty() {
            return invalid("symbol must not be empty".into());
        }
        check_sizing(self.size, self.entry_price, self.leverage, self.fees)?;
        if self.exit_price.is_some_and(|p| p < 0.0) {
            return invalid("exit price must be non-negative".into());
        }
        if self.exit_time.is_some_and(|t| t < self.entry_time) {
            return invalid("exit time must not precede entry time".into());
        }
        Ok(())
    }

    fn closing_price(&self) -> Option<f64> {
        self.exit_price.filter(|p| *p > 0.0)
    }

    /// Validate the entry and turn it into a journal record with id `id`.
    pub fn into_trade(self, id: String) -> Result<Trade, TradelogError> {
        self.validate()?;

        let (pnl, status, duration, exit_time) = match self.closing_price() {
            Some(exit) => {
                let gross = (exit - self.entry_price) / self.entry_price
                    * self.size
                    * self.leverage
                    * self.side.direction();
                let pnl = gross - self.fees;
                // Status follows the stored (rounded) PnL
                let status = if round2(pnl) >= 0.0 {
                    TradeStatus::Win
                } else {
                    TradeStatus::Loss
                };
                let duration = self
                    .exit_time
                    .map(|t| minutes_between(self.entry_time, t))
                    .unwrap_or(0);
                (pnl, status, duration, self.exit_time.unwrap_or(self.entry_time))
            }
            None => (0.0, TradeStatus::Open, 0, self.entry_time),
        };

        Ok(Trade {
            id,
            symbol: self.symbol.trim().to_string(),
            side: self.side,
            order_type: self.order_type,
            entry_price: self.entry_price,
            exit_price: self.closing_price().unwrap_or(0.0),
            size: self.size,
            leverage: self.leverage,
            pnl: round2(pnl),
            pnl_percent: round2(pnl / self.size * 100.0),
            fees: self.fees,
            entry_time: self.entry_time,
            exit_time,
            duration,
            status,
            note: self.note.filter(|n| !n.trim().is_empty()),
        })
    }
}

fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let millis = (end - start).num_milliseconds() as f64;
    (millis / 60_000.0).round() as i64
}

/// Parse a timestamp as RFC 3339, or as a naive `YYYY-MM-DDTHH:MM[:SS]`
/// (`T` or space separated) taken to be UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, TradelogError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TradelogError::InvalidTrade {
            reason: format!("invalid timestamp '{value}'"),
        })
}
