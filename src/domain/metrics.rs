//! Portfolio-wide performance statistics.

use serde::Serialize;

use super::rounding::{round0, round2};
use super::trade::Trade;

/// Aggregate snapshot over a set of trades.
///
/// Every ratio or average whose denominator would be zero is reported as 0,
/// so an empty journal yields an all-zero snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioStats {
    pub total_pnl: f64,
    /// PnL as a percentage of total notional volume, not of margin.
    pub total_pnl_percent: f64,
    pub win_rate: f64,
    pub total_trades: usize,
    pub total_volume: f64,
    pub total_fees: f64,
    /// Minutes.
    pub avg_duration: f64,
    pub long_ratio: f64,
    pub short_ratio: f64,
    pub largest_gain: f64,
    /// Most negative losing PnL, so <= 0.
    pub largest_loss: f64,
    pub avg_win: f64,
    /// Positive magnitude.
    pub avg_loss: f64,
    pub profit_factor: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub consecutive_wins: usize,
    pub consecutive_losses: usize,
}

impl PortfolioStats {
    pub fn compute(trades: &[Trade]) -> Self {
        let total_trades = trades.len();

        let mut total_pnl = 0.0_f64;
        let mut total_volume = 0.0_f64;
        let mut total_fees = 0.0_f64;
        let mut total_duration = 0i64;
        let mut longs = 0usize;
        let mut wins = 0usize;
        let mut losses = 0usize;
        let mut gross_profit = 0.0_f64;
        let mut gross_loss = 0.0_f64;
        let mut largest_gain: Option<f64> = None;
        let mut largest_loss: Option<f64> = None;

        for trade in trades {
            total_pnl += trade.pnl;
            total_volume += trade.size;
            total_fees += trade.fees;
            total_duration += trade.duration;
            if trade.is_long() {
                longs += 1;
            }
            if trade.is_win() {
                wins += 1;
                gross_profit += trade.pnl;
                largest_gain = Some(largest_gain.map_or(trade.pnl, |g| g.max(trade.pnl)));
            } else if trade.is_loss() {
                losses += 1;
                gross_loss += trade.pnl;
                largest_loss = Some(largest_loss.map_or(trade.pnl, |l| l.min(trade.pnl)));
            }
        }
        let gross_loss = gross_loss.abs();

        let (max_drawdown, consecutive_wins, consecutive_losses) = path_statistics(trades);

        PortfolioStats {
            total_pnl: round2(total_pnl),
            total_pnl_percent: round2(ratio(total_pnl, total_volume) * 100.0),
            win_rate: percentage(wins, total_trades),
            total_trades,
            total_volume: round0(total_volume),
            total_fees: round2(total_fees),
            avg_duration: round0(ratio(total_duration as f64, total_trades as f64)),
            long_ratio: percentage(longs, total_trades),
            short_ratio: percentage(total_trades - longs, total_trades),
            largest_gain: round2(largest_gain.unwrap_or(0.0)),
            largest_loss: round2(largest_loss.unwrap_or(0.0)),
            avg_win: round2(ratio(gross_profit, wins as f64)),
            avg_loss: round2(ratio(gross_loss, losses as f64)),
            profit_factor: round2(ratio(gross_profit, gross_loss)),
            max_drawdown: round2(max_drawdown),
            sharpe_ratio: round2(per_trade_sharpe(trades)),
            consecutive_wins,
            consecutive_losses,
        }
    }
}

/// `numerator / denominator`, or 0 when the denominator is 0.
pub(crate) fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// `count / total` as a percentage rounded to 2 dp, 0 for an empty total.
pub(crate) fn percentage(count: usize, total: usize) -> f64 {
    round2(ratio(count as f64, total as f64) * 100.0)
}

/// Trades in non-decreasing `entry_time` order. Trades opened at the same
/// instant are ordered by id, so the result never depends on input order.
pub(crate) fn chronological(trades: &[Trade]) -> Vec<&Trade> {
    let mut ordered: Vec<&Trade> = trades.iter().collect();
    ordered.sort_by(|a, b| {
        a.entry_time
            .cmp(&b.entry_time)
            .then_with(|| a.id.cmp(&b.id))
    });
    ordered
}

/// Forward pass over chronologically ordered trades returning
/// `(max_drawdown, longest_win_streak, longest_loss_streak)`.
///
/// Cumulative PnL and its peak both start at 0. Open trades end both streaks.
fn path_statistics(trades: &[Trade]) -> (f64, usize, usize) {
    let mut cum_pnl = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;

    let mut best_wins = 0usize;
    let mut best_losses = 0usize;
    let mut cur_wins = 0usize;
    let mut cur_losses = 0usize;

    for trade in chronological(trades) {
        cum_pnl += trade.pnl;
        if cum_pnl > peak {
            peak = cum_pnl;
        }
        let dd = peak - cum_pnl;
        if dd > max_dd {
            max_dd = dd;
        }

        if trade.is_win() {
            cur_wins += 1;
            cur_losses = 0;
            best_wins = best_wins.max(cur_wins);
        } else if trade.is_loss() {
            cur_losses += 1;
            cur_wins = 0;
            best_losses = best_losses.max(cur_losses);
        } else {
            cur_wins = 0;
            cur_losses = 0;
        }
    }

    (max_dd, best_wins, best_losses)
}

/// Mean of per-trade returns (`pnl_percent / 100`) over their sample
/// standard deviation. Not annualized, no risk-free rate.
fn per_trade_sharpe(trades: &[Trade]) -> f64 {
    if trades.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = chronological(trades)
        .into_iter()
        .map(|t| t.pnl_percent / 100.0)
        .collect();
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();

    if stddev > 0.0 { mean / stddev } else { 0.0 }
}
