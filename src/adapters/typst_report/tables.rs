//! Typst table markup for each section of the journal report.

use chrono::{DateTime, Utc};

use crate::domain::breakdown::{
    DailyPnl, FeeBreakdown, HourlyPerformance, OrderTypePerformance, SessionPerformance,
    SymbolPerformance, WeekdayPerformance,
};
use crate::domain::filter::TradeFilter;
use crate::domain::metrics::PortfolioStats;
use crate::domain::trade::{Trade, TradeStatus};

/// Escape characters that carry meaning in Typst content blocks.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '[' | ']' | '#' | '$' | '*' | '_' | '@' | '<' | '>' | '`' | '~'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn fmt_currency(value: f64) -> String {
    if value >= 0.0 {
        format!("\\${:.2}", value)
    } else {
        format!("-\\${:.2}", value.abs())
    }
}

fn pnl_cell(value: f64) -> String {
    let color = if value >= 0.0 { "green" } else { "red" };
    format!("text(fill: {}, [{}])", color, fmt_currency(value))
}

fn fmt_duration(minutes: f64) -> String {
    if minutes >= 60.0 {
        format!("{:.1} h", minutes / 60.0)
    } else {
        format!("{:.0} min", minutes)
    }
}

pub fn render_report_header(
    filter: &TradeFilter,
    generated_at: DateTime<Utc>,
    trade_count: usize,
) -> String {
    let symbol = filter.symbol.as_deref().unwrap_or("All symbols");
    format!(
        "*Symbol:* {} #h(1em) *Range:* {} #h(1em) *Trades:* {} #h(1em) *Generated:* {}\n\n",
        escape(symbol),
        filter.range,
        trade_count,
        generated_at.format("%Y-%m-%d %H:%M UTC")
    )
}

pub fn render_stats_table(stats: &PortfolioStats) -> String {
    let rows: Vec<(&str, String)> = vec![
        ("Total PnL", pnl_cell(stats.total_pnl)),
        ("Return on Volume", format!("[{:.2}%]", stats.total_pnl_percent)),
        ("Win Rate", format!("[{:.2}%]", stats.win_rate)),
        ("Total Trades", format!("[{}]", stats.total_trades)),
        ("Total Volume", format!("[{}]", fmt_currency(stats.total_volume))),
        ("Total Fees", format!("[{}]", fmt_currency(stats.total_fees))),
        ("Avg Duration", format!("[{}]", fmt_duration(stats.avg_duration))),
        (
            "Long / Short",
            format!("[{:.0}% / {:.0}%]", stats.long_ratio, stats.short_ratio),
        ),
        ("Largest Gain", pnl_cell(stats.largest_gain)),
        ("Largest Loss", pnl_cell(stats.largest_loss)),
        ("Avg Win", pnl_cell(stats.avg_win)),
        ("Avg Loss", pnl_cell(stats.avg_loss)),
        ("Profit Factor", format!("[{:.2}]", stats.profit_factor)),
        ("Max Drawdown", format!("[{}]", fmt_currency(stats.max_drawdown))),
        ("Sharpe Ratio", format!("[{:.2}]", stats.sharpe_ratio)),
        ("Max Win Streak", format!("[{}]", stats.consecutive_wins)),
        ("Max Loss Streak", format!("[{}]", stats.consecutive_losses)),
    ];

    let mut output = String::from("#table(\n  columns: 2,\n  align: (left, right),\n");
    output.push_str("  [*Metric*], [*Value*],\n");
    for (label, value) in rows {
        output.push_str(&format!("  [{}], {},\n", label, value));
    }
    output.push_str(")\n");
    output
}

pub fn render_daily_table(daily: &[DailyPnl]) -> String {
    if daily.is_empty() {
        return "_No trading days in range._\n".to_string();
    }

    let mut output = String::from(
        "#table(\n  columns: 6,\n  align: (left, right, right, right, right, right),\n",
    );
    output.push_str(
        "  [*Date*], [*Trades*], [*Volume*], [*PnL*], [*Cumulative*], [*Drawdown*],\n",
    );
    for day in daily {
        output.push_str(&format!(
            "  [{}], [{}], [{}], {}, {}, [{}],\n",
            day.date.format("%Y-%m-%d"),
            day.trades,
            fmt_currency(day.volume),
            pnl_cell(day.pnl),
            pnl_cell(day.cum_pnl),
            fmt_currency(day.drawdown)
        ));
    }
    output.push_str(")\n");
    output
}

pub fn render_fee_table(fees: &[FeeBreakdown]) -> String {
    let mut output = String::from("#table(\n  columns: 3,\n  align: (left, right, right),\n");
    output.push_str("  [*Fee Type*], [*Amount*], [*Share*],\n");
    for fee in fees {
        output.push_str(&format!(
            "  [{}], [{}], [{:.0}%],\n",
            fee.fee_type,
            fmt_currency(fee.amount),
            fee.percentage
        ));
    }
    output.push_str(")\n");
    output
}

pub fn render_symbol_table(symbols: &[SymbolPerformance]) -> String {
    if symbols.is_empty() {
        return "_No symbols traded._\n".to_string();
    }

    let mut output = String::from(
        "#table(\n  columns: 6,\n  align: (left, right, right, right, right, right),\n",
    );
    output.push_str(
        "  [*Symbol*], [*Trades*], [*Win Rate*], [*Total PnL*], [*Avg PnL*], [*Volume*],\n",
    );
    for s in symbols {
        output.push_str(&format!(
            "  [{}], [{}], [{:.2}%], {}, {}, [{}],\n",
            escape(&s.symbol),
            s.trades,
            s.win_rate,
            pnl_cell(s.total_pnl),
            pnl_cell(s.avg_pnl),
            fmt_currency(s.volume)
        ));
    }
    output.push_str(")\n");
    output
}

pub fn render_session_table(sessions: &[SessionPerformance]) -> String {
    let mut output = String::from("#table(\n  columns: 4,\n  align: (left, right, right, right),\n");
    output.push_str("  [*Session*], [*Trades*], [*Win Rate*], [*PnL*],\n");
    for s in sessions {
        output.push_str(&format!(
            "  [{}], [{}], [{:.2}%], {},\n",
            s.session,
            s.trades,
            s.win_rate,
            pnl_cell(s.pnl)
        ));
    }
    output.push_str(")\n");
    output
}

pub fn render_order_type_table(order_types: &[OrderTypePerformance]) -> String {
    let mut output = String::from(
        "#table(\n  columns: 5,\n  align: (left, right, right, right, right),\n",
    );
    output.push_str("  [*Order Type*], [*Trades*], [*Win Rate*], [*PnL*], [*Avg PnL*],\n");
    for o in order_types {
        output.push_str(&format!(
            "  [{}], [{}], [{:.2}%], {}, {},\n",
            o.order_type,
            o.trades,
            o.win_rate,
            pnl_cell(o.pnl),
            pnl_cell(o.avg_pnl)
        ));
    }
    output.push_str(")\n");
    output
}

/// Only hours that saw a trade get a row.
pub fn render_hourly_table(hourly: &[HourlyPerformance]) -> String {
    let active: Vec<&HourlyPerformance> = hourly.iter().filter(|h| h.trades > 0).collect();
    if active.is_empty() {
        return "_No trades in range._\n".to_string();
    }

    let mut output = String::from("#table(\n  columns: 3,\n  align: (left, right, right),\n");
    output.push_str("  [*Hour (UTC)*], [*Trades*], [*PnL*],\n");
    for h in active {
        output.push_str(&format!(
            "  [{}], [{}], {},\n",
            h.label,
            h.trades,
            pnl_cell(h.pnl)
        ));
    }
    output.push_str(")\n");
    output
}

pub fn render_weekday_table(weekdays: &[WeekdayPerformance]) -> String {
    let mut output = String::from("#table(\n  columns: 3,\n  align: (left, right, right),\n");
    output.push_str("  [*Day*], [*Trades*], [*PnL*],\n");
    for d in weekdays {
        output.push_str(&format!("  [{}], [{}], {},\n", d.day, d.trades, pnl_cell(d.pnl)));
    }
    output.push_str(")\n");
    output
}

/// Every trade in entry order, open positions included.
pub fn render_trade_log(trades: &[Trade]) -> String {
    if trades.is_empty() {
        return "_No trades recorded._\n".to_string();
    }

    let mut sorted: Vec<&Trade> = trades.iter().collect();
    sorted.sort_by_key(|t| t.entry_time);

    let mut output = String::from("#table(\n  columns: 10,\n");
    output.push_str("  [*\\#*], [*Entry*], [*Symbol*], [*Side*], [*Type*], [*Size*], ");
    output.push_str("[*Entry Px*], [*Exit Px*], [*PnL*], [*Note*],\n");

    for (i, trade) in sorted.iter().enumerate() {
        let exit = if trade.status == TradeStatus::Open {
            "open".to_string()
        } else {
            format!("{}", trade.exit_price)
        };
        let pnl = if trade.status == TradeStatus::Open {
            "[-]".to_string()
        } else {
            pnl_cell(trade.pnl)
        };
        output.push_str(&format!(
            "  [{}], [{}], [{}], [{}], [{}], [{}], [{}], [{}], {}, [{}],\n",
            i + 1,
            trade.entry_time.format("%Y-%m-%d %H:%M"),
            escape(&trade.symbol),
            trade.side,
            trade.order_type,
            fmt_currency(trade.size),
            trade.entry_price,
            exit,
            pnl,
            escape(trade.note.as_deref().unwrap_or(""))
        ));
    }

    output.push_str(")\n");
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::breakdown::Session;
    use crate::domain::filter::DateRange;
    use crate::domain::trade::{OrderType, Side};
    use chrono::TimeZone;

    fn sample_trade(id: &str, hour: u32, pnl: f64, status: TradeStatus) -> Trade {
        let entry_time = Utc.with_ymd_and_hms(2024, 5, 6, hour, 0, 0).unwrap();
        Trade {
            id: id.into(),
            symbol: "SOL-PERP".into(),
            side: Side::Long,
            order_type: OrderType::Market,
            entry_price: 150.0,
            exit_price: if status == TradeStatus::Open { 0.0 } else { 155.0 },
            size: 1000.0,
            leverage: 1.0,
            pnl,
            pnl_percent: pnl / 10.0,
            fees: 0.5,
            entry_time,
            exit_time: entry_time,
            duration: 0,
            status,
            note: Some("FOMC [risk] #1".into()),
        }
    }

    #[test]
    fn escape_special_characters() {
        assert_eq!(escape("a_b*c"), "a\\_b\\*c");
        assert_eq!(escape("[x] #y $z"), "\\[x\\] \\#y \\$z");
        assert_eq!(escape("SOL-PERP"), "SOL-PERP");
    }

    #[test]
    fn header_shows_filter() {
        let filter = TradeFilter::new(Some("BTC-PERP".into()), DateRange::Days(7));
        let at = Utc.with_ymd_and_hms(2024, 5, 6, 9, 30, 0).unwrap();
        let header = render_report_header(&filter, at, 12);
        assert!(header.contains("BTC-PERP"));
        assert!(header.contains("7d"));
        assert!(header.contains("*Trades:* 12"));
        assert!(header.contains("2024-05-06 09:30 UTC"));

        let header = render_report_header(&TradeFilter::new(None, DateRange::All), at, 0);
        assert!(header.contains("All symbols"));
        assert!(header.contains("All"));
    }

    #[test]
    fn stats_table_lists_all_metrics() {
        let stats = PortfolioStats {
            total_pnl: -12.5,
            win_rate: 66.67,
            total_trades: 3,
            consecutive_wins: 2,
            ..PortfolioStats::default()
        };
        let table = render_stats_table(&stats);
        assert!(table.starts_with("#table("));
        assert!(table.contains("text(fill: red, [-\\$12.50])"));
        assert!(table.contains("[66.67%]"));
        assert!(table.contains("[Max Win Streak], [2]"));
        assert_eq!(table.matches("\n  [").count(), 18);
    }

    #[test]
    fn empty_sections_render_placeholder_text() {
        assert!(render_daily_table(&[]).starts_with("_No"));
        assert!(render_symbol_table(&[]).starts_with("_No"));
        assert!(render_trade_log(&[]).starts_with("_No"));
        let idle: Vec<HourlyPerformance> = HourlyPerformance::compute_per_hour(&[]);
        assert!(render_hourly_table(&idle).starts_with("_No"));
    }

    #[test]
    fn hourly_table_skips_idle_hours() {
        let trades = vec![
            sample_trade("a", 3, 10.0, TradeStatus::Win),
            sample_trade("b", 14, -4.0, TradeStatus::Loss),
        ];
        let table = render_hourly_table(&HourlyPerformance::compute_per_hour(&trades));
        assert!(table.contains("[3:00]"));
        assert!(table.contains("[14:00]"));
        assert!(!table.contains("[0:00]"));
    }

    #[test]
    fn session_and_order_type_tables_have_fixed_rows() {
        let sessions = SessionPerformance::compute_per_session(&[]);
        let table = render_session_table(&sessions);
        for session in Session::ALL {
            assert!(table.contains(session.label()));
        }

        let table = render_order_type_table(&OrderTypePerformance::compute_per_order_type(&[]));
        for ty in OrderType::ALL {
            assert!(table.contains(&format!("[{}]", ty)));
        }
    }

    #[test]
    fn trade_log_sorted_and_escaped() {
        let trades = vec![
            sample_trade("late", 20, -3.0, TradeStatus::Loss),
            sample_trade("early", 1, 0.0, TradeStatus::Open),
        ];
        let log = render_trade_log(&trades);
        let early = log.find("2024-05-06 01:00").unwrap();
        let late = log.find("2024-05-06 20:00").unwrap();
        assert!(early < late);
        assert!(log.contains("[open], [-]"));
        assert!(log.contains("FOMC \\[risk\\] \\#1"));
        assert!(log.contains("text(fill: red, [-\\$3.00])"));
    }
}
