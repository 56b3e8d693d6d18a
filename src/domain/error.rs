//! Domain error types.

/// Top-level error type for tradelog.
///
/// The analytics engine itself is total and never produces these; they come
/// from trade sources, configuration and report writers.
#[derive(Debug, thiserror::Error)]
pub enum TradelogError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("trade parse error on line {line}: {reason}")]
    TradeParse { line: u64, reason: String },

    #[error("invalid trade: {reason}")]
    InvalidTrade { reason: String },

    #[error("no trade with id {id}")]
    TradeNotFound { id: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TradelogError> for std::process::ExitCode {
    fn from(err: &TradelogError) -> Self {
        let code: u8 = match err {
            TradelogError::Io(_) => 1,
            TradelogError::ConfigParse { .. }
            | TradelogError::ConfigMissing { .. }
            | TradelogError::ConfigInvalid { .. } => 2,
            TradelogError::Database { .. } | TradelogError::DatabaseQuery { .. } => 3,
            TradelogError::TradeParse { .. } | TradelogError::InvalidTrade { .. } => 4,
            TradelogError::TradeNotFound { .. } => 5,
            TradelogError::Report { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
