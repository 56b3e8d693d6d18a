//! JSON report adapter.
//!
//! Writes the full analytics snapshot with the same camelCase field names the
//! dashboard consumed, wrapped with the filter it was computed under.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::error::TradelogError;
use crate::domain::report::JournalReport;
use crate::ports::report_port::{ReportMeta, ReportPort};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonMeta {
    generated_at: DateTime<Utc>,
    symbol: String,
    range: String,
    trade_count: usize,
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    meta: JsonMeta,
    #[serde(flatten)]
    report: &'a JournalReport,
}

#[derive(Debug, Default)]
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn to_json(report: &JournalReport, meta: &ReportMeta) -> Result<String, TradelogError> {
        let document = JsonDocument {
            meta: JsonMeta {
                generated_at: meta.generated_at,
                symbol: meta.filter.symbol.clone().unwrap_or_else(|| "all".into()),
                range: meta.filter.range.to_string(),
                trade_count: meta.trades.len(),
            },
            report,
        };
        serde_json::to_string_pretty(&document).map_err(|e| TradelogError::Report {
            reason: e.to_string(),
        })
    }
}

impl ReportPort for JsonReportAdapter {
    /// An output path of `-` writes to stdout.
    fn write(
        &self,
        report: &JournalReport,
        meta: &ReportMeta,
        output_path: &str,
    ) -> Result<(), TradelogError> {
        let json = Self::to_json(report, meta)?;

        if output_path == "-" {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
            return Ok(());
        }

        if let Some(parent) = Path::new(output_path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(output_path, json + "\n").map_err(|e| TradelogError::Report {
            reason: format!("cannot write {}: {}", output_path, e),
        })?;
        tracing::info!(path = output_path, "wrote json report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::{DateRange, TradeFilter};
    use chrono::TimeZone;

    fn meta_for<'a>(filter: &'a TradeFilter) -> ReportMeta<'a> {
        ReportMeta {
            generated_at: Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap(),
            filter,
            trades: &[],
        }
    }

    #[test]
    fn document_has_meta_and_flattened_report() {
        let filter = TradeFilter::new(Some("SOL-PERP".into()), DateRange::Days(14));
        let json = JsonReportAdapter::to_json(&JournalReport::compute(&[]), &meta_for(&filter))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["meta"]["symbol"], "SOL-PERP");
        assert_eq!(value["meta"]["range"], "14d");
        assert_eq!(value["meta"]["tradeCount"], 0);
        assert_eq!(value["meta"]["generatedAt"], "2024-07-01T08:00:00Z");
        assert_eq!(value["stats"]["totalTrades"], 0);
        assert_eq!(value["sessions"].as_array().unwrap().len(), 3);
        assert_eq!(value["weekdays"][0]["day"], "Sun");
    }

    #[test]
    fn writes_file_creating_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/latest.json");
        let filter = TradeFilter::default();

        JsonReportAdapter
            .write(
                &JournalReport::compute(&[]),
                &meta_for(&filter),
                path.to_str().unwrap(),
            )
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["meta"]["symbol"], "all");
        assert_eq!(value["meta"]["range"], "30d");
    }
}
