//! Full analytics snapshot handed to presentation adapters.

use serde::Serialize;

use super::breakdown::{
    DailyPnl, FeeBreakdown, HourlyPerformance, OrderTypePerformance, SessionPerformance,
    SymbolPerformance, WeekdayPerformance,
};
use super::metrics::PortfolioStats;
use super::trade::Trade;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalReport {
    pub stats: PortfolioStats,
    pub daily_pnl: Vec<DailyPnl>,
    pub fees: Vec<FeeBreakdown>,
    pub symbols: Vec<SymbolPerformance>,
    pub sessions: Vec<SessionPerformance>,
    pub order_types: Vec<OrderTypePerformance>,
    pub hourly: Vec<HourlyPerformance>,
    pub weekdays: Vec<WeekdayPerformance>,
}

impl JournalReport {
    pub fn compute(trades: &[Trade]) -> Self {
        tracing::debug!(trades = trades.len(), "computing journal report");
        JournalReport {
            stats: PortfolioStats::compute(trades),
            daily_pnl: DailyPnl::compute_series(trades),
            fees: FeeBreakdown::compute(trades),
            symbols: SymbolPerformance::compute_per_symbol(trades),
            sessions: SessionPerformance::compute_per_session(trades),
            order_types: OrderTypePerformance::compute_per_order_type(trades),
            hourly: HourlyPerformance::compute_per_hour(trades),
            weekdays: WeekdayPerformance::compute_per_weekday(trades),
        }
    }
}
