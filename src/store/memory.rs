use anyhow::Result;

use crate::core::transaction::Transaction;
use crate::store::PositionStore;

/// In-memory store, mainly for tests and library embedding.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    transactions: Vec<Transaction>,
}

impl MemoryStore {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }
}

impl PositionStore for MemoryStore {
    fn list_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.transactions.clone())
    }
}
