//! Time-series and categorical breakdowns of a trade set.
//!
//! Each breakdown is recomputed from scratch; fixed-bucket breakdowns
//! (sessions, order types, hours, weekdays) always return every bucket, with
//! zeroed figures for buckets no trade falls into.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate, Timelike};
use serde::Serialize;

use super::metrics::{chronological, percentage, ratio};
use super::rounding::{round0, round2};
use super::trade::{OrderType, Trade};

/// One calendar day (UTC, by entry time) of trading.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPnl {
    pub date: NaiveDate,
    pub pnl: f64,
    pub cum_pnl: f64,
    pub drawdown: f64,
    pub trades: usize,
    pub volume: f64,
}

impl DailyPnl {
    /// Days that had at least one trade, ascending. Days without trades are
    /// omitted rather than zero-filled.
    pub fn compute_series(trades: &[Trade]) -> Vec<DailyPnl> {
        let mut by_date: BTreeMap<NaiveDate, (f64, usize, f64)> = BTreeMap::new();
        for trade in chronological(trades) {
            let entry = by_date
                .entry(trade.entry_time.date_naive())
                .or_insert((0.0, 0, 0.0));
            entry.0 += trade.pnl;
            entry.1 += 1;
            entry.2 += trade.size;
        }

        let mut cum_pnl = 0.0_f64;
        let mut peak = 0.0_f64;
        by_date
            .into_iter()
            .map(|(date, (pnl, count, volume))| {
                cum_pnl += pnl;
                if cum_pnl > peak {
                    peak = cum_pnl;
                }
                DailyPnl {
                    date,
                    pnl: round2(pnl),
                    cum_pnl: round2(cum_pnl),
                    drawdown: round2(peak - cum_pnl),
                    trades: count,
                    volume: round0(volume),
                }
            })
            .collect()
    }
}

/// Fixed apportionment of total fees.
///
/// Trade records carry a single fee figure, so the split between taker,
/// maker and funding is a display convention, not an accounting of what was
/// actually charged.
pub const FEE_SPLIT: [(&str, f64); 3] = [
    ("Taker Fees", 55.0),
    ("Maker Fees", 35.0),
    ("Funding Fees", 10.0),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeBreakdown {
    #[serde(rename = "type")]
    pub fee_type: String,
    pub amount: f64,
    pub percentage: f64,
}

impl FeeBreakdown {
    pub fn compute(trades: &[Trade]) -> Vec<FeeBreakdown> {
        let total_fees: f64 = trades.iter().map(|t| t.fees).sum();
        FEE_SPLIT
            .iter()
            .map(|&(fee_type, pct)| FeeBreakdown {
                fee_type: fee_type.to_string(),
                amount: round2(total_fees * pct / 100.0),
                percentage: pct,
            })
            .collect()
    }
}

/// Counters shared by every grouped breakdown.
#[derive(Debug, Default, Clone, Copy)]
struct Bucket {
    trades: usize,
    wins: usize,
    pnl: f64,
    volume: f64,
}

impl Bucket {
    fn add(&mut self, trade: &Trade) {
        self.trades += 1;
        if trade.is_win() {
            self.wins += 1;
        }
        self.pnl += trade.pnl;
        self.volume += trade.size;
    }

    fn win_rate(&self) -> f64 {
        percentage(self.wins, self.trades)
    }

    fn avg_pnl(&self) -> f64 {
        round2(ratio(self.pnl, self.trades as f64))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolPerformance {
    pub symbol: String,
    pub trades: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub avg_pnl: f64,
    pub volume: f64,
}

impl SymbolPerformance {
    /// One record per distinct symbol, best total PnL first. Equal totals
    /// are ordered by symbol name.
    pub fn compute_per_symbol(trades: &[Trade]) -> Vec<SymbolPerformance> {
        let mut by_symbol: HashMap<&str, Bucket> = HashMap::new();
        for trade in trades {
            by_symbol.entry(trade.symbol.as_str()).or_default().add(trade);
        }

        let mut results: Vec<SymbolPerformance> = by_symbol
            .into_iter()
            .map(|(symbol, bucket)| SymbolPerformance {
                symbol: symbol.to_string(),
                trades: bucket.trades,
                win_rate: bucket.win_rate(),
                total_pnl: round2(bucket.pnl),
                avg_pnl: bucket.avg_pnl(),
                volume: round0(bucket.volume),
            })
            .collect();

        results.sort_by(|a, b| {
            b.total_pnl
                .total_cmp(&a.total_pnl)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });
        results
    }
}

/// The three 8-hour UTC trading sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Asia,
    Europe,
    Us,
}

impl Session {
    pub const ALL: [Session; 3] = [Session::Asia, Session::Europe, Session::Us];

    /// Session containing the given UTC hour (0..=23).
    pub fn for_hour(hour: u32) -> Session {
        match hour {
            0..=7 => Session::Asia,
            8..=15 => Session::Europe,
            _ => Session::Us,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Session::Asia => "Asia (00-08 UTC)",
            Session::Europe => "Europe (08-16 UTC)",
            Session::Us => "US (16-24 UTC)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPerformance {
    pub session: String,
    pub trades: usize,
    pub win_rate: f64,
    pub pnl: f64,
}

impl SessionPerformance {
    /// Exactly three records: Asia, Europe, US.
    pub fn compute_per_session(trades: &[Trade]) -> Vec<SessionPerformance> {
        let mut buckets = [Bucket::default(); 3];
        for trade in trades {
            buckets[Session::for_hour(trade.entry_time.hour()) as usize].add(trade);
        }

        Session::ALL
            .iter()
            .zip(buckets.iter())
            .map(|(session, bucket)| SessionPerformance {
                session: session.label().to_string(),
                trades: bucket.trades,
                win_rate: bucket.win_rate(),
                pnl: round2(bucket.pnl),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTypePerformance {
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub trades: usize,
    pub win_rate: f64,
    pub pnl: f64,
    pub avg_pnl: f64,
}

impl OrderTypePerformance {
    /// Exactly four records, in [`OrderType::ALL`] order.
    pub fn compute_per_order_type(trades: &[Trade]) -> Vec<OrderTypePerformance> {
        OrderType::ALL
            .iter()
            .map(|&order_type| {
                let mut bucket = Bucket::default();
                trades
                    .iter()
                    .filter(|t| t.order_type == order_type)
                    .for_each(|t| bucket.add(t));
                OrderTypePerformance {
                    order_type,
                    trades: bucket.trades,
                    win_rate: bucket.win_rate(),
                    pnl: round2(bucket.pnl),
                    avg_pnl: bucket.avg_pnl(),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPerformance {
    pub hour: u32,
    pub label: String,
    pub trades: usize,
    pub pnl: f64,
}

impl HourlyPerformance {
    /// Exactly 24 records, UTC hour 0 through 23 of entry time.
    pub fn compute_per_hour(trades: &[Trade]) -> Vec<HourlyPerformance> {
        let mut buckets = [Bucket::default(); 24];
        for trade in trades {
            buckets[trade.entry_time.hour() as usize].add(trade);
        }

        buckets
            .iter()
            .enumerate()
            .map(|(hour, bucket)| HourlyPerformance {
                hour: hour as u32,
                label: format!("{hour}:00"),
                trades: bucket.trades,
                pnl: round2(bucket.pnl),
            })
            .collect()
    }
}

pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayPerformance {
    pub day: String,
    pub trades: usize,
    pub pnl: f64,
}

impl WeekdayPerformance {
    /// Exactly seven records, Sunday first.
    pub fn compute_per_weekday(trades: &[Trade]) -> Vec<WeekdayPerformance> {
        let mut buckets = [Bucket::default(); 7];
        for trade in trades {
            let idx = trade.entry_time.weekday().num_days_from_sunday() as usize;
            buckets[idx].add(trade);
        }

        WEEKDAY_LABELS
            .iter()
            .zip(buckets.iter())
            .map(|(day, bucket)| WeekdayPerformance {
                day: day.to_string(),
                trades: bucket.trades,
                pnl: round2(bucket.pnl),
            })
            .collect()
    }
}
