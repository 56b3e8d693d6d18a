//! Report generation port trait.

use chrono::{DateTime, Utc};

use crate::domain::error::TradelogError;
use crate::domain::filter::TradeFilter;
use crate::domain::report::JournalReport;
use crate::domain::trade::Trade;

/// What a report was computed over, for headers and trade logs.
pub struct ReportMeta<'a> {
    pub generated_at: DateTime<Utc>,
    pub filter: &'a TradeFilter,
    pub trades: &'a [Trade],
}

/// Port for writing journal reports.
pub trait ReportPort {
    fn write(
        &self,
        report: &JournalReport,
        meta: &ReportMeta,
        output_path: &str,
    ) -> Result<(), TradelogError>;
}
