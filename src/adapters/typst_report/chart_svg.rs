//! SVG line charts over the daily PnL series.

use crate::domain::breakdown::DailyPnl;

const CHART_WIDTH: f64 = 800.0;
const CHART_HEIGHT: f64 = 300.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 40.0;

fn fmt_currency(value: f64) -> String {
    if value >= 0.0 {
        format!("${:.2}", value)
    } else {
        format!("-${:.2}", value.abs())
    }
}

fn plot_width() -> f64 {
    CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT
}

fn plot_height() -> f64 {
    CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
}

fn x_at(i: usize, len: usize) -> f64 {
    MARGIN_LEFT + (i as f64 / (len.saturating_sub(1)).max(1) as f64) * plot_width()
}

fn open_svg(svg: &mut String, title: &str) {
    svg.push_str(&format!(
        r##"<svg width="{}" height="{}" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"##,
        CHART_WIDTH, CHART_HEIGHT, CHART_WIDTH, CHART_HEIGHT
    ));
    svg.push_str("\n  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"15\" text-anchor=\"end\" font-size=\"12\" fill=\"#666\">{}</text>\n",
        CHART_WIDTH, title
    ));
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT,
        MARGIN_TOP,
        MARGIN_LEFT,
        CHART_HEIGHT - MARGIN_BOTTOM
    ));
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT,
        CHART_HEIGHT - MARGIN_BOTTOM,
        CHART_WIDTH - MARGIN_RIGHT,
        CHART_HEIGHT - MARGIN_BOTTOM
    ));
}

fn y_label(svg: &mut String, y: f64, text: &str) {
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"10\" fill=\"#666\">{}</text>\n",
        MARGIN_LEFT - 5.0,
        y,
        text
    ));
}

fn date_labels(svg: &mut String, series: &[DailyPnl]) {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return;
    };
    let mid = &series[series.len() / 2];
    for (x, date) in [
        (MARGIN_LEFT, first.date),
        (MARGIN_LEFT + plot_width() / 2.0, mid.date),
        (CHART_WIDTH - MARGIN_RIGHT, last.date),
    ] {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"10\" fill=\"#666\">{}</text>\n",
            x, CHART_HEIGHT, date
        ));
    }
}

/// Cumulative PnL line, with a dashed zero line when the series crosses it.
/// Empty string for an empty series.
pub fn generate_cum_pnl_svg(series: &[DailyPnl]) -> String {
    if series.is_empty() {
        return String::new();
    }

    // The curve starts from a flat account, so zero is always in range.
    let min = series.iter().map(|d| d.cum_pnl).fold(0.0, f64::min);
    let max = series.iter().map(|d| d.cum_pnl).fold(0.0, f64::max);
    let range = (max - min).max(1.0);
    let y_at = |v: f64| MARGIN_TOP + plot_height() - ((v - min) / range) * plot_height();

    let mut path_data = String::new();
    for (i, day) in series.iter().enumerate() {
        let cmd = if i == 0 { "M" } else { " L" };
        path_data.push_str(&format!(
            "{} {:.1} {:.1}",
            cmd,
            x_at(i, series.len()),
            y_at(day.cum_pnl)
        ));
    }

    let mut svg = String::new();
    open_svg(&mut svg, "Cumulative PnL ($)");
    y_label(&mut svg, MARGIN_TOP + 5.0, &fmt_currency(max));
    y_label(&mut svg, CHART_HEIGHT - MARGIN_BOTTOM - 5.0, &fmt_currency(min));
    if min < 0.0 && max > 0.0 {
        let zero = y_at(0.0);
        svg.push_str(&format!(
            "  <line x1=\"{}\" y1=\"{:.1}\" x2=\"{}\" y2=\"{:.1}\" stroke=\"#999\" stroke-dasharray=\"4 4\"/>\n",
            MARGIN_LEFT,
            zero,
            CHART_WIDTH - MARGIN_RIGHT,
            zero
        ));
    }
    date_labels(&mut svg, series);
    svg.push_str(&format!(
        "  <path d=\"{}\" fill=\"none\" stroke=\"#2563eb\" stroke-width=\"2\"/>\n",
        path_data
    ));
    svg.push_str("</svg>");
    svg
}

/// Drawdown below the running peak, filled down from the top axis.
/// Needs at least two days.
pub fn generate_drawdown_svg(series: &[DailyPnl]) -> String {
    if series.len() < 2 {
        return String::new();
    }

    let max_dd = series.iter().map(|d| d.drawdown).fold(0.0, f64::max).max(0.01);
    let y_at = |dd: f64| MARGIN_TOP + (dd / max_dd) * plot_height();
    let len = series.len();

    let mut path_data = format!("M {:.1} {:.1}", x_at(0, len), y_at(0.0));
    for (i, day) in series.iter().enumerate() {
        path_data.push_str(&format!(" L {:.1} {:.1}", x_at(i, len), y_at(day.drawdown)));
    }
    path_data.push_str(&format!(
        " L {:.1} {:.1} Z",
        x_at(len - 1, len),
        y_at(0.0)
    ));

    let mut svg = String::new();
    open_svg(&mut svg, "Drawdown ($)");
    y_label(&mut svg, MARGIN_TOP + 5.0, "$0.00");
    y_label(
        &mut svg,
        CHART_HEIGHT - MARGIN_BOTTOM - 5.0,
        &fmt_currency(-max_dd),
    );
    date_labels(&mut svg, series);
    svg.push_str(&format!(
        "  <path d=\"{}\" fill=\"rgba(239,68,68,0.3)\" stroke=\"#dc2626\" stroke-width=\"1\"/>\n",
        path_data
    ));
    svg.push_str("</svg>");
    svg
}
