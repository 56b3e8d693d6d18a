//! CSV file trade journal adapter.
//!
//! One trade per row, headed by the snake_case trade field names. Optional
//! columns may be blank or absent and are filled in the way the dashboard
//! loader always has: zero amounts, `exit_time = entry_time`, and a status
//! derived from exit price and PnL. A stored status that disagrees with the
//! derived one is replaced. Rows that break the trade invariants are rejected.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::domain::error::TradelogError;
use crate::domain::trade::{parse_timestamp, Trade, TradeStatus};
use crate::ports::config_port::ConfigPort;
use crate::ports::trade_port::{TradeJournal, TradeSource};

#[derive(Debug, Default, Serialize, Deserialize)]
struct CsvTradeRow {
    #[serde(default)]
    id: String,
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    side: String,
    #[serde(default)]
    order_type: String,
    #[serde(default)]
    entry_price: String,
    #[serde(default)]
    exit_price: String,
    #[serde(default)]
    size: String,
    #[serde(default)]
    leverage: String,
    #[serde(default)]
    pnl: String,
    #[serde(default)]
    pnl_percent: String,
    #[serde(default)]
    fees: String,
    #[serde(default)]
    entry_time: String,
    #[serde(default)]
    exit_time: String,
    #[serde(default)]
    duration: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    note: String,
}

impl CsvTradeRow {
    fn from_trade(trade: &Trade) -> Self {
        CsvTradeRow {
            id: trade.id.clone(),
            symbol: trade.symbol.clone(),
            side: trade.side.to_string(),
            order_type: trade.order_type.to_string(),
            entry_price: trade.entry_price.to_string(),
            exit_price: trade.exit_price.to_string(),
            size: trade.size.to_string(),
            leverage: trade.leverage.to_string(),
            pnl: trade.pnl.to_string(),
            pnl_percent: trade.pnl_percent.to_string(),
            fees: trade.fees.to_string(),
            entry_time: trade.entry_time.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            exit_time: trade.exit_time.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            duration: trade.duration.to_string(),
            status: trade.status.to_string(),
            note: trade.note.clone().unwrap_or_default(),
        }
    }

    fn into_trade(self, line: u64) -> Result<Trade, TradelogError> {
        let parse_err = |reason: String| TradelogError::TradeParse { line, reason };

        let required = |value: &str, field: &str| -> Result<String, TradelogError> {
            let value = value.trim();
            if value.is_empty() {
                Err(parse_err(format!("missing {field}")))
            } else {
                Ok(value.to_string())
            }
        };

        let number = |value: &str, field: &str, default: f64| -> Result<f64, TradelogError> {
            let value = value.trim();
            if value.is_empty() {
                return Ok(default);
            }
            value
                .parse::<f64>()
                .map_err(|e| parse_err(format!("invalid {field} '{value}': {e}")))
        };

        let id = required(&self.id, "id")?;
        let symbol = required(&self.symbol, "symbol")?;
        let side = required(&self.side, "side")?
            .parse()
            .map_err(|e: TradelogError| parse_err(e.to_string()))?;
        let order_type = required(&self.order_type, "order_type")?
            .parse()
            .map_err(|e: TradelogError| parse_err(e.to_string()))?;
        let entry_price = number(&required(&self.entry_price, "entry_price")?, "entry_price", 0.0)?;
        let exit_price = number(&self.exit_price, "exit_price", 0.0)?;
        let size = number(&required(&self.size, "size")?, "size", 0.0)?;
        let leverage = number(&self.leverage, "leverage", 1.0)?;
        let pnl = number(&self.pnl, "pnl", 0.0)?;
        let pnl_percent = number(&self.pnl_percent, "pnl_percent", 0.0)?;
        let fees = number(&self.fees, "fees", 0.0)?;

        let entry_time = parse_timestamp(&required(&self.entry_time, "entry_time")?)
            .map_err(|e| parse_err(e.to_string()))?;
        let exit_time = if self.exit_time.trim().is_empty() {
            entry_time
        } else {
            parse_timestamp(&self.exit_time).map_err(|e| parse_err(e.to_string()))?
        };

        let duration = number(&self.duration, "duration", 0.0)?.round() as i64;
        let status = TradeStatus::derive(exit_price, pnl);
        if let Ok(stored) = self.status.parse::<TradeStatus>() {
            if stored != status {
                tracing::warn!(line, %stored, derived = %status, "stored status contradicts trade, using derived");
            }
        }
        let note = Some(self.note.trim().to_string()).filter(|n| !n.is_empty());

        let trade = Trade {
            id,
            symbol,
            side,
            order_type,
            entry_price,
            exit_price,
            size,
            leverage,
            pnl,
            pnl_percent,
            fees,
            entry_time,
            exit_time,
            duration,
            status,
            note,
        };
        trade.validate().map_err(|e| match e {
            TradelogError::InvalidTrade { reason } => parse_err(reason),
            other => other,
        })?;
        Ok(trade)
    }
}

pub struct CsvTradeAdapter {
    path: PathBuf,
}

impl CsvTradeAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TradelogError> {
        let path = config
            .get_string("journal", "csv_path")
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| TradelogError::ConfigMissing {
                section: "journal".into(),
                key: "csv_path".into(),
            })?;
        Ok(Self::new(PathBuf::from(path.trim())))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse trades from CSV text.
    pub fn parse(content: &str) -> Result<Vec<Trade>, TradelogError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| TradelogError::TradeParse {
                line: 1,
                reason: format!("CSV header error: {e}"),
            })?
            .clone();

        let mut trades = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| TradelogError::TradeParse {
                line: e.position().map(|p| p.line()).unwrap_or(0),
                reason: format!("CSV parse error: {e}"),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let row: CsvTradeRow =
                record
                    .deserialize(Some(&headers))
                    .map_err(|e| TradelogError::TradeParse {
                        line,
                        reason: e.to_string(),
                    })?;
            trades.push(row.into_trade(line)?);
        }
        Ok(trades)
    }

    /// Replace the file's contents with `trades`.
    pub fn write_all(&self, trades: &[Trade]) -> Result<(), TradelogError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut wtr = csv::Writer::from_path(&self.path).map_err(csv_io_error)?;
        for trade in trades {
            wtr.serialize(CsvTradeRow::from_trade(trade))
                .map_err(csv_io_error)?;
        }
        wtr.flush()?;
        tracing::debug!(path = %self.path.display(), trades = trades.len(), "wrote trade csv");
        Ok(())
    }
}

fn csv_io_error(e: csv::Error) -> TradelogError {
    TradelogError::Io(std::io::Error::other(e.to_string()))
}

impl TradeSource for CsvTradeAdapter {
    fn fetch_trades(&self) -> Result<Vec<Trade>, TradelogError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "trade csv not found, journal is empty");
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        let trades = Self::parse(&content)?;
        tracing::debug!(path = %self.path.display(), trades = trades.len(), "loaded trade csv");
        Ok(trades)
    }
}

impl TradeJournal for CsvTradeAdapter {
    fn add_trade(&self, trade: &Trade) -> Result<(), TradelogError> {
        let mut trades = self.fetch_trades()?;
        if trades.iter().any(|t| t.id == trade.id) {
            return Err(TradelogError::InvalidTrade {
                reason: format!("a trade with id {} already exists", trade.id),
            });
        }
        trades.push(trade.clone());
        self.write_all(&trades)
    }

    fn delete_trade(&self, id: &str) -> Result<bool, TradelogError> {
        let mut trades = self.fetch_trades()?;
        let before = trades.len();
        trades.retain(|t| t.id != id);
        if trades.len() == before {
            return Ok(false);
        }
        self.write_all(&trades)?;
        Ok(true)
    }

    fn update_note(&self, id: &str, note: &str) -> Result<bool, TradelogError> {
        let mut trades = self.fetch_trades()?;
        let Some(trade) = trades.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        trade.note = Some(note.trim().to_string()).filter(|n| !n.is_empty());
        self.write_all(&trades)?;
        Ok(true)
    }

    /// Appends the new trades and rewrites the file once, so a failed import
    /// leaves the journal untouched.
    fn import_trades(&self, incoming: &[Trade]) -> Result<usize, TradelogError> {
        let mut trades = self.fetch_trades()?;
        let mut seen: HashSet<String> = trades.iter().map(|t| t.id.clone()).collect();
        let before = trades.len();
        trades.extend(
            incoming
                .iter()
                .filter(|t| seen.insert(t.id.clone()))
                .cloned(),
        );
        let added = trades.len() - before;
        if added > 0 {
            self.write_all(&trades)?;
        }
        Ok(added)
    }
}
