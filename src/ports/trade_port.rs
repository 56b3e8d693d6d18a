//! Trade storage ports.

use std::collections::HashSet;

use crate::domain::error::TradelogError;
use crate::domain::trade::Trade;

/// Anything that can hand over the journal's trades. Order is unspecified;
/// the analytics engine sorts where it needs to.
pub trait TradeSource {
    fn fetch_trades(&self) -> Result<Vec<Trade>, TradelogError>;
}

/// A trade source that can also be edited.
pub trait TradeJournal: TradeSource {
    fn add_trade(&self, trade: &Trade) -> Result<(), TradelogError>;

    /// Returns `false` when no trade has this id.
    fn delete_trade(&self, id: &str) -> Result<bool, TradelogError>;

    /// Replace a trade's note; an empty note clears it. Returns `false` when
    /// no trade has this id.
    fn update_note(&self, id: &str, note: &str) -> Result<bool, TradelogError>;

    /// Add every trade whose id is not already present, returning how many
    /// were added. Within `trades` the first occurrence of an id wins.
    fn import_trades(&self, trades: &[Trade]) -> Result<usize, TradelogError> {
        let mut seen: HashSet<String> = self.fetch_trades()?.into_iter().map(|t| t.id).collect();
        let mut added = 0;
        for trade in trades {
            if seen.insert(trade.id.clone()) {
                self.add_trade(trade)?;
                added += 1;
            }
        }
        Ok(added)
    }
}
