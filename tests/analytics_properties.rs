//! Property tests for the analytics engine.

mod common;

use chrono::{Duration, TimeZone, Utc};
use common::*;
use proptest::prelude::*;
use tradelog::domain::breakdown::{
    DailyPnl, FeeBreakdown, OrderTypePerformance, SessionPerformance, SymbolPerformance,
};
use tradelog::domain::metrics::PortfolioStats;
use tradelog::domain::report::JournalReport;

const SYMBOLS: [&str; 4] = ["SOL-PERP", "BTC-PERP", "ETH-PERP", "JUP-PERP"];

#[derive(Debug, Clone)]
struct Parts {
    pnl_quarters: i64,
    size: u32,
    long: bool,
    order_type: usize,
    open: bool,
    fees_quarters: i64,
    symbol: usize,
    hour: i64,
}

prop_compose! {
    fn arb_parts()(
        pnl_quarters in -2_000i64..2_000,
        size in 1u32..20_000,
        long in any::<bool>(),
        order_type in 0usize..4,
        open in prop::bool::weighted(0.15),
        fees_quarters in 0i64..40,
        symbol in 0usize..4,
        hour in 0i64..(24 * 5),
    ) -> Parts {
        Parts { pnl_quarters, size, long, order_type, open, fees_quarters, symbol, hour }
    }
}

/// Entry times fall on whole hours over five days, so larger inputs often
/// hold several trades opened at the same instant. Money amounts are whole
/// quarters so float sums are exact in any order.
fn build(i: usize, p: Parts) -> Trade {
    let entry_time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(p.hour);
    let pnl = p.pnl_quarters as f64 / 4.0;
    let mut trade = make_trade(&format!("p{i}"), SYMBOLS[p.symbol], entry_time, pnl);
    trade.size = f64::from(p.size);
    trade.fees = p.fees_quarters as f64 / 4.0;
    trade.side = if p.long { Side::Long } else { Side::Short };
    trade.order_type = OrderType::ALL[p.order_type];
    if p.open {
        trade.exit_price = 0.0;
        trade.pnl = 0.0;
        trade.pnl_percent = 0.0;
        trade.status = TradeStatus::Open;
    }
    trade
}

fn arb_trades() -> impl Strategy<Value = Vec<Trade>> {
    prop::collection::vec(arb_parts(), 0..40)
        .prop_map(|parts| parts.into_iter().enumerate().map(|(i, p)| build(i, p)).collect())
}

fn arb_trades_and_shuffle() -> impl Strategy<Value = (Vec<Trade>, Vec<Trade>)> {
    arb_trades().prop_flat_map(|trades| (Just(trades.clone()), Just(trades).prop_shuffle()))
}

proptest! {
    #[test]
    fn total_trades_matches_input(trades in arb_trades()) {
        prop_assert_eq!(PortfolioStats::compute(&trades).total_trades, trades.len());
    }

    #[test]
    fn long_and_short_ratios_sum_to_hundred(trades in arb_trades()) {
        prop_assume!(!trades.is_empty());
        let stats = PortfolioStats::compute(&trades);
        prop_assert!((stats.long_ratio + stats.short_ratio - 100.0).abs() <= 0.02);
    }

    #[test]
    fn compute_is_idempotent(trades in arb_trades()) {
        let snapshot = trades.clone();
        let first = JournalReport::compute(&trades);
        let second = JournalReport::compute(&trades);
        prop_assert_eq!(first, second);
        prop_assert_eq!(trades, snapshot);
    }

    #[test]
    fn aggregates_ignore_input_order((trades, shuffled) in arb_trades_and_shuffle()) {
        let a = PortfolioStats::compute(&trades);
        let b = PortfolioStats::compute(&shuffled);
        prop_assert_eq!(a.total_pnl, b.total_pnl);
        prop_assert_eq!(a.win_rate, b.win_rate);
        prop_assert_eq!(a.total_volume, b.total_volume);
        prop_assert_eq!(a.max_drawdown, b.max_drawdown);
        prop_assert_eq!(a.consecutive_wins, b.consecutive_wins);
        prop_assert_eq!(a.consecutive_losses, b.consecutive_losses);
        prop_assert_eq!(a.sharpe_ratio, b.sharpe_ratio);
        prop_assert_eq!(
            SymbolPerformance::compute_per_symbol(&trades),
            SymbolPerformance::compute_per_symbol(&shuffled)
        );
        prop_assert_eq!(
            DailyPnl::compute_series(&trades),
            DailyPnl::compute_series(&shuffled)
        );
    }

    #[test]
    fn same_instant_trades_ignore_input_order(
        (trades, shuffled) in prop::collection::vec((-40i64..40, any::<bool>()), 1..12)
            .prop_map(|specs| {
                let opened = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
                specs
                    .into_iter()
                    .enumerate()
                    .map(|(i, (quarters, open))| {
                        let p = Parts {
                            pnl_quarters: quarters,
                            size: 1000,
                            long: true,
                            order_type: 0,
                            open,
                            fees_quarters: 0,
                            symbol: 0,
                            hour: 0,
                        };
                        let mut trade = build(i, p);
                        trade.entry_time = opened;
                        trade
                    })
                    .collect::<Vec<_>>()
            })
            .prop_flat_map(|trades| (Just(trades.clone()), Just(trades).prop_shuffle()))
    ) {
        prop_assert_eq!(PortfolioStats::compute(&trades), PortfolioStats::compute(&shuffled));
        prop_assert_eq!(DailyPnl::compute_series(&trades), DailyPnl::compute_series(&shuffled));
    }

    #[test]
    fn fixed_bucket_lengths(trades in arb_trades()) {
        prop_assert_eq!(SessionPerformance::compute_per_session(&trades).len(), 3);
        prop_assert_eq!(OrderTypePerformance::compute_per_order_type(&trades).len(), 4);
        prop_assert_eq!(FeeBreakdown::compute(&trades).len(), 3);
    }

    #[test]
    fn fee_breakdown_sums_to_total_fees(trades in arb_trades()) {
        let total: f64 = FeeBreakdown::compute(&trades).iter().map(|f| f.amount).sum();
        let stats = PortfolioStats::compute(&trades);
        prop_assert!((total - stats.total_fees).abs() <= 0.02, "{} vs {}", total, stats.total_fees);
    }

    #[test]
    fn daily_series_ascending_and_ends_at_total(trades in arb_trades()) {
        let daily = DailyPnl::compute_series(&trades);
        prop_assert!(daily.windows(2).all(|w| w[0].date < w[1].date));
        prop_assert_eq!(daily.iter().map(|d| d.trades).sum::<usize>(), trades.len());

        let stats = PortfolioStats::compute(&trades);
        match daily.last() {
            Some(last) => prop_assert!((last.cum_pnl - stats.total_pnl).abs() <= 0.011),
            None => prop_assert!(trades.is_empty()),
        }
    }

    #[test]
    fn bounded_outputs(trades in arb_trades()) {
        let stats = PortfolioStats::compute(&trades);
        prop_assert!((0.0..=100.0).contains(&stats.win_rate));
        prop_assert!(stats.max_drawdown >= 0.0);
        prop_assert!(stats.profit_factor >= 0.0);
        prop_assert!(stats.consecutive_wins + stats.consecutive_losses <= trades.len());
        prop_assert!(daily_drawdowns_non_negative(&trades));
    }
}

fn daily_drawdowns_non_negative(trades: &[Trade]) -> bool {
    DailyPnl::compute_series(trades)
        .iter()
        .all(|d| d.drawdown >= 0.0)
}

#[test]
fn empty_input_is_all_zero() {
    let stats = PortfolioStats::compute(&[]);
    assert_eq!(stats, PortfolioStats::default());
    assert_eq!(stats.total_trades, 0);
    assert_eq!(stats.total_pnl, 0.0);
    assert_eq!(stats.profit_factor, 0.0);
    assert_eq!(stats.sharpe_ratio, 0.0);
}
