//! Configuration validation.
//!
//! Checks every config field a command depends on before any trade data is
//! touched.

use std::str::FromStr;

use crate::domain::error::TradelogError;
use crate::domain::filter::DateRange;
use crate::ports::config_port::ConfigPort;

pub const SOURCES: [&str; 2] = ["csv", "sqlite"];
pub const REPORT_FORMATS: [&str; 3] = ["text", "json", "typst"];

pub fn validate_journal_config(config: &dyn ConfigPort) -> Result<(), TradelogError> {
    validate_source(config)?;
    validate_pool_size(config)?;
    validate_filters(config)?;
    validate_report(config)?;
    Ok(())
}

/// The configured trade source, defaulting to `csv`.
pub fn journal_source(config: &dyn ConfigPort) -> String {
    config
        .get_string("journal", "source")
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "csv".to_string())
}

fn validate_source(config: &dyn ConfigPort) -> Result<(), TradelogError> {
    let source = journal_source(config);
    match source.as_str() {
        "csv" => require_non_empty(config, "journal", "csv_path"),
        "sqlite" => require_non_empty(config, "sqlite", "path"),
        other => Err(TradelogError::ConfigInvalid {
            section: "journal".to_string(),
            key: "source".to_string(),
            reason: format!("unknown source '{}', expected one of {:?}", other, SOURCES),
        }),
    }
}

fn validate_pool_size(config: &dyn ConfigPort) -> Result<(), TradelogError> {
    let value = config.get_int("sqlite", "pool_size", 4);
    if value < 1 {
        return Err(TradelogError::ConfigInvalid {
            section: "sqlite".to_string(),
            key: "pool_size".to_string(),
            reason: "pool_size must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_filters(config: &dyn ConfigPort) -> Result<(), TradelogError> {
    if let Some(range) = config.get_string("filters", "range") {
        DateRange::from_str(&range)?;
    }
    Ok(())
}

fn validate_report(config: &dyn ConfigPort) -> Result<(), TradelogError> {
    if let Some(format) = config.get_string("report", "format") {
        let format = format.trim().to_lowercase();
        if !REPORT_FORMATS.contains(&format.as_str()) {
            return Err(TradelogError::ConfigInvalid {
                section: "report".to_string(),
                key: "format".to_string(),
                reason: format!(
                    "unknown format '{}', expected one of {:?}",
                    format, REPORT_FORMATS
                ),
            });
        }
    }
    Ok(())
}

fn require_non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), TradelogError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(TradelogError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}
