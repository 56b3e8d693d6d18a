//! SQLite trade journal adapter.

use chrono::{DateTime, SecondsFormat, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

use crate::domain::error::TradelogError;
use crate::domain::trade::{Trade, TradeStatus};
use crate::ports::config_port::ConfigPort;
use crate::ports::trade_port::{TradeJournal, TradeSource};

pub struct SqliteJournal {
    pool: Pool<SqliteConnectionManager>,
}

fn db_error(e: r2d2::Error) -> TradelogError {
    TradelogError::Database {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> TradelogError {
    TradelogError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn conversion_error<E>(column: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
}

/// Fixed-width nanosecond timestamps, so text order matches time order.
fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_time(column: usize, value: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(column, e))
}

const TRADE_COLUMNS: &str = "INTO trades (id, symbol, side, order_type, entry_price, exit_price,
        size, leverage, pnl, pnl_percent, fees, entry_time, exit_time, duration, status, note)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)";

/// Runs `verb` (`INSERT` or `INSERT OR IGNORE`) for one trade, returning the
/// number of rows written.
fn insert_trade(
    conn: &rusqlite::Connection,
    verb: &str,
    trade: &Trade,
) -> Result<usize, TradelogError> {
    // Open trades are stored with NULL exit columns
    let (exit_price, exit_time) = if trade.is_closed() {
        (Some(trade.exit_price), Some(format_time(&trade.exit_time)))
    } else {
        (None, None)
    };

    conn.execute(
        &format!("{verb} {TRADE_COLUMNS}"),
        params![
            trade.id,
            trade.symbol,
            trade.side.as_str(),
            trade.order_type.as_str(),
            trade.entry_price,
            exit_price,
            trade.size,
            trade.leverage,
            trade.pnl,
            trade.pnl_percent,
            trade.fees,
            format_time(&trade.entry_time),
            exit_time,
            trade.duration,
            trade.status.as_str(),
            trade.note,
        ],
    )
    .map_err(query_error)
}

const SELECT_TRADES: &str = "SELECT id, symbol, side, order_type, entry_price, exit_price, size,
        leverage, pnl, pnl_percent, fees, entry_time, exit_time, duration, status, note
     FROM trades
     ORDER BY entry_time DESC";

impl SqliteJournal {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TradelogError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| TradelogError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4).max(1) as u32;

        let manager = SqliteConnectionManager::file(db_path.trim());
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(db_error)?;

        tracing::debug!(path = %db_path.trim(), pool_size, "opened sqlite journal");
        let journal = Self { pool };
        journal.initialize_schema()?;
        Ok(journal)
    }

    pub fn in_memory() -> Result<Self, TradelogError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(db_error)?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, TradelogError> {
        self.pool.get().map_err(db_error)
    }

    pub fn initialize_schema(&self) -> Result<(), TradelogError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS trades (
                    id TEXT PRIMARY KEY,
                    symbol TEXT NOT NULL,
                    side TEXT NOT NULL,
                    order_type TEXT NOT NULL,
                    entry_price REAL NOT NULL,
                    exit_price REAL,
                    size REAL NOT NULL,
                    leverage REAL NOT NULL DEFAULT 1,
                    pnl REAL,
                    pnl_percent REAL,
                    fees REAL,
                    entry_time TEXT NOT NULL,
                    exit_time TEXT,
                    duration INTEGER,
                    status TEXT,
                    note TEXT
                );
                CREATE INDEX IF NOT EXISTS idx_trades_entry_time ON trades(entry_time);
                CREATE INDEX IF NOT EXISTS idx_trades_symbol ON trades(symbol);",
            )
            .map_err(query_error)
    }
}

fn row_to_trade(row: &rusqlite::Row<'_>) -> Result<Trade, rusqlite::Error> {
    let side: String = row.get(2)?;
    let order_type: String = row.get(3)?;
    let exit_price: Option<f64> = row.get(5)?;
    let pnl: Option<f64> = row.get(8)?;
    let entry_time_str: String = row.get(11)?;
    let exit_time_str: Option<String> = row.get(12)?;
    let status: Option<String> = row.get(14)?;

    let exit_price = exit_price.unwrap_or(0.0);
    let pnl = pnl.unwrap_or(0.0);
    let entry_time = parse_time(11, &entry_time_str)?;
    let exit_time = match exit_time_str {
        Some(s) if !s.is_empty() => parse_time(12, &s)?,
        _ => entry_time,
    };
    let status = status
        .and_then(|s| s.parse::<TradeStatus>().ok())
        .unwrap_or_else(|| TradeStatus::derive(exit_price, pnl));

    Ok(Trade {
        id: row.get(0)?,
        symbol: row.get(1)?,
        side: side.parse().map_err(|e| conversion_error(2, e))?,
        order_type: order_type.parse().map_err(|e| conversion_error(3, e))?,
        entry_price: row.get(4)?,
        exit_price,
        size: row.get(6)?,
        leverage: row.get(7)?,
        pnl,
        pnl_percent: row.get::<_, Option<f64>>(9)?.unwrap_or(0.0),
        fees: row.get::<_, Option<f64>>(10)?.unwrap_or(0.0),
        entry_time,
        exit_time,
        duration: row.get::<_, Option<i64>>(13)?.unwrap_or(0),
        status,
        note: row.get::<_, Option<String>>(15)?.filter(|n| !n.is_empty()),
    })
}

impl TradeSource for SqliteJournal {
    fn fetch_trades(&self) -> Result<Vec<Trade>, TradelogError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(SELECT_TRADES).map_err(query_error)?;
        let rows = stmt.query_map([], row_to_trade).map_err(query_error)?;

        let mut trades = Vec::new();
        for row in rows {
            trades.push(row.map_err(query_error)?);
        }
        tracing::debug!(trades = trades.len(), "loaded trades from sqlite");
        Ok(trades)
    }
}

impl TradeJournal for SqliteJournal {
    fn add_trade(&self, trade: &Trade) -> Result<(), TradelogError> {
        insert_trade(&*self.conn()?, "INSERT", trade)?;
        Ok(())
    }

    fn delete_trade(&self, id: &str) -> Result<bool, TradelogError> {
        let affected = self
            .conn()?
            .execute("DELETE FROM trades WHERE id = ?1", params![id])
            .map_err(query_error)?;
        Ok(affected > 0)
    }

    fn update_note(&self, id: &str, note: &str) -> Result<bool, TradelogError> {
        let note = Some(note.trim()).filter(|n| !n.is_empty());
        let affected = self
            .conn()?
            .execute(
                "UPDATE trades SET note = ?1 WHERE id = ?2",
                params![note, id],
            )
            .map_err(query_error)?;
        Ok(affected > 0)
    }

    fn import_trades(&self, trades: &[Trade]) -> Result<usize, TradelogError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;
        let mut added = 0;
        for trade in trades {
            added += insert_trade(&tx, "INSERT OR IGNORE", trade)?;
        }
        tx.commit().map_err(query_error)?;
        Ok(added)
    }
}
