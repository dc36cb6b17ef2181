pub mod ledger;
pub mod memory;

pub use ledger::LedgerFile;
pub use memory::MemoryStore;

use anyhow::Result;

use crate::core::transaction::Transaction;

/// Read-only view over the recorded transactions. The valuation engine never
/// writes through this interface and assumes nothing about ordering.
pub trait PositionStore {
    fn list_transactions(&self) -> Result<Vec<Transaction>>;
}
