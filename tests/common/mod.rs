#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::cell::RefCell;
use tradelog::domain::error::TradelogError;
pub use tradelog::domain::trade::{OrderType, Side, Trade, TradeStatus};
use tradelog::ports::trade_port::{TradeJournal, TradeSource};

/// In-memory journal. `fail_with` makes every fetch fail.
pub struct MockJournal {
    pub trades: RefCell<Vec<Trade>>,
    pub fail_with: Option<String>,
}

impl MockJournal {
    pub fn new() -> Self {
        Self {
            trades: RefCell::new(Vec::new()),
            fail_with: None,
        }
    }

    pub fn with_trades(trades: Vec<Trade>) -> Self {
        Self {
            trades: RefCell::new(trades),
            fail_with: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            trades: RefCell::new(Vec::new()),
            fail_with: Some(reason.to_string()),
        }
    }
}

impl TradeSource for MockJournal {
    fn fetch_trades(&self) -> Result<Vec<Trade>, TradelogError> {
        if let Some(reason) = &self.fail_with {
            return Err(TradelogError::Database {
                reason: reason.clone(),
            });
        }
        Ok(self.trades.borrow().clone())
    }
}

impl TradeJournal for MockJournal {
    fn add_trade(&self, trade: &Trade) -> Result<(), TradelogError> {
        self.trades.borrow_mut().push(trade.clone());
        Ok(())
    }

    fn delete_trade(&self, id: &str) -> Result<bool, TradelogError> {
        let mut trades = self.trades.borrow_mut();
        let before = trades.len();
        trades.retain(|t| t.id != id);
        Ok(trades.len() != before)
    }

    fn update_note(&self, id: &str, note: &str) -> Result<bool, TradelogError> {
        let mut trades = self.trades.borrow_mut();
        match trades.iter_mut().find(|t| t.id == id) {
            Some(trade) => {
                trade.note = Some(note.to_string()).filter(|n| !n.is_empty());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
}

/// A closed trade on `symbol` with the given PnL; status follows the sign.
pub fn make_trade(id: &str, symbol: &str, entry_time: DateTime<Utc>, pnl: f64) -> Trade {
    Trade {
        id: id.to_string(),
        symbol: symbol.to_string(),
        side: Side::Long,
        order_type: OrderType::Market,
        entry_price: 100.0,
        exit_price: 110.0,
        size: 1000.0,
        leverage: 1.0,
        pnl,
        pnl_percent: pnl / 10.0,
        fees: 1.0,
        entry_time,
        exit_time: entry_time + Duration::minutes(30),
        duration: 30,
        status: if pnl >= 0.0 {
            TradeStatus::Win
        } else {
            TradeStatus::Loss
        },
        note: None,
    }
}

pub fn make_open_trade(id: &str, symbol: &str, entry_time: DateTime<Utc>) -> Trade {
    Trade {
        exit_price: 0.0,
        pnl: 0.0,
        pnl_percent: 0.0,
        exit_time: entry_time,
        duration: 0,
        status: TradeStatus::Open,
        ..make_trade(id, symbol, entry_time, 0.0)
    }
}

pub fn with_side(mut trade: Trade, side: Side) -> Trade {
    trade.side = side;
    trade
}

pub fn with_order_type(mut trade: Trade, order_type: OrderType) -> Trade {
    trade.order_type = order_type;
    trade
}

pub fn with_size(mut trade: Trade, size: f64) -> Trade {
    trade.size = size;
    trade
}

pub fn with_fees(mut trade: Trade, fees: f64) -> Trade {
    trade.fees = fees;
    trade
}

/// Three closed SOL-PERP trades on consecutive days: +100, -40, +60.
pub fn three_trade_journal() -> Vec<Trade> {
    vec![
        make_trade("t1", "SOL-PERP", at(1, 10), 100.0),
        make_trade("t2", "SOL-PERP", at(2, 10), -40.0),
        make_trade("t3", "SOL-PERP", at(3, 10), 60.0),
    ]
}

pub const VALID_CSV: &str = "id,symbol,side,order_type,entry_price,exit_price,size,leverage,pnl,pnl_percent,fees,entry_time,exit_time,duration,status,note
t1,SOL-PERP,long,market,100,110,1000,1,100,10,1,2024-01-01T10:00:00Z,2024-01-01T10:30:00Z,30,win,
t2,BTC-PERP,short,limit,40000,40400,2000,2,-40,-2,2,2024-01-02T15:00:00Z,2024-01-02T16:00:00Z,60,loss,chased
t3,SOL-PERP,long,stop-market,120,,500,3,,,0.5,2024-01-03T02:00:00Z,,,,
";
