//! Typst report generation.
//!
//! Reads a Typst template (either the built-in default or a custom file via
//! `[report] template_path`), resolves all `{{PLACEHOLDER}}` markers by
//! calling helpers from `chart_svg` and `tables`, and writes the final `.typ`
//! file. Compiling it to PDF is left to the `typst` CLI.

pub mod chart_svg;
pub mod default_template;
pub mod tables;

use std::fs;
use std::path::Path;

use crate::domain::error::TradelogError;
use crate::domain::report::JournalReport;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::{ReportMeta, ReportPort};

fn embed_svg(svg: &str, empty_text: &str) -> String {
    if svg.is_empty() {
        return empty_text.to_string();
    }
    format!(
        "#image.decode(\n\"{}\",\n  width: 100%,\n)",
        svg.replace('\\', "\\\\").replace('"', "\\\"")
    )
}

/// Resolve all `{{PLACEHOLDER}}`s in the given template string and return
/// the final Typst markup.
pub fn resolve(template: &str, report: &JournalReport, meta: &ReportMeta) -> String {
    let mut output = template.to_string();

    let header = tables::render_report_header(meta.filter, meta.generated_at, meta.trades.len());
    output = output.replace("{{REPORT_HEADER}}", &header);

    output = output.replace("{{STATS_TABLE}}", &tables::render_stats_table(&report.stats));

    let cum_pnl = embed_svg(
        &chart_svg::generate_cum_pnl_svg(&report.daily_pnl),
        "_No PnL data._",
    );
    output = output.replace("{{CUM_PNL_SVG}}", &cum_pnl);

    let drawdown = embed_svg(
        &chart_svg::generate_drawdown_svg(&report.daily_pnl),
        "_Not enough trading days for a drawdown chart._",
    );
    output = output.replace("{{DRAWDOWN_SVG}}", &drawdown);

    output = output.replace("{{DAILY_TABLE}}", &tables::render_daily_table(&report.daily_pnl));
    output = output.replace("{{FEE_TABLE}}", &tables::render_fee_table(&report.fees));
    output = output.replace("{{SYMBOL_TABLE}}", &tables::render_symbol_table(&report.symbols));
    output = output.replace(
        "{{SESSION_TABLE}}",
        &tables::render_session_table(&report.sessions),
    );
    output = output.replace(
        "{{ORDER_TYPE_TABLE}}",
        &tables::render_order_type_table(&report.order_types),
    );
    output = output.replace("{{HOURLY_TABLE}}", &tables::render_hourly_table(&report.hourly));
    output = output.replace(
        "{{WEEKDAY_TABLE}}",
        &tables::render_weekday_table(&report.weekdays),
    );
    output = output.replace("{{TRADE_LOG}}", &tables::render_trade_log(meta.trades));

    output
}

#[derive(Debug, Default)]
pub struct TypstReportAdapter {
    template_path: Option<String>,
}

impl TypstReportAdapter {
    pub fn new(template_path: Option<String>) -> Self {
        Self {
            template_path: template_path.filter(|p| !p.trim().is_empty()),
        }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Self {
        Self::new(config.get_string("report", "template_path"))
    }

    fn load_template(&self) -> Result<String, TradelogError> {
        match &self.template_path {
            Some(path) => fs::read_to_string(path.trim()).map_err(|e| TradelogError::Report {
                reason: format!("cannot read template {}: {}", path, e),
            }),
            None => Ok(default_template::template().to_string()),
        }
    }
}

impl ReportPort for TypstReportAdapter {
    fn write(
        &self,
        report: &JournalReport,
        meta: &ReportMeta,
        output_path: &str,
    ) -> Result<(), TradelogError> {
        let template = self.load_template()?;
        let content = resolve(&template, report, meta);

        if let Some(parent) = Path::new(output_path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(output_path, content).map_err(|e| TradelogError::Report {
            reason: format!("cannot write {}: {}", output_path, e),
        })?;

        tracing::info!(path = output_path, "wrote typst report");
        Ok(())
    }
}
