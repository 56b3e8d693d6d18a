//! Built-in Typst report template.
//!
//! Each `{{PLACEHOLDER}}` is replaced by [`super::resolve`]. A custom
//! template may use any subset of them.

pub const PLACEHOLDERS: [&str; 12] = [
    "REPORT_HEADER",
    "STATS_TABLE",
    "CUM_PNL_SVG",
    "DRAWDOWN_SVG",
    "DAILY_TABLE",
    "FEE_TABLE",
    "SYMBOL_TABLE",
    "SESSION_TABLE",
    "ORDER_TYPE_TABLE",
    "HOURLY_TABLE",
    "WEEKDAY_TABLE",
    "TRADE_LOG",
];

const TEMPLATE: &str = r#"#set page(paper: "a4", margin: (x: 1.5cm, y: 2cm), numbering: "1")
#set text(font: "Liberation Sans", size: 9pt)
#set table(stroke: 0.5pt + luma(200), inset: 5pt)
#show heading.where(level: 2): set block(above: 1.6em, below: 0.8em)

= Trading Journal Report

{{REPORT_HEADER}}

== Performance Summary

{{STATS_TABLE}}

== Cumulative PnL

{{CUM_PNL_SVG}}

== Drawdown

{{DRAWDOWN_SVG}}

== Daily PnL

{{DAILY_TABLE}}

== Fees

{{FEE_TABLE}}

== By Symbol

{{SYMBOL_TABLE}}

== By Session

{{SESSION_TABLE}}

== By Order Type

{{ORDER_TYPE_TABLE}}

== By Hour

{{HOURLY_TABLE}}

== By Weekday

{{WEEKDAY_TABLE}}

#pagebreak()

== Trade Log

{{TRADE_LOG}}
"#;

pub fn template() -> &'static str {
    TEMPLATE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_uses_every_placeholder_once() {
        for name in PLACEHOLDERS {
            let marker = format!("{{{{{}}}}}", name);
            assert_eq!(template().matches(&marker).count(), 1, "{marker}");
        }
    }

    #[test]
    fn template_sets_up_page() {
        assert!(template().starts_with("#set page("));
        assert!(template().contains("= Trading Journal Report"));
    }
}
