use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::transaction::Transaction;
use crate::store::PositionStore;

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerDocument {
    #[serde(default)]
    transactions: Vec<Transaction>,
}

/// Append-only transaction ledger backed by a YAML file. A missing file reads
/// as an empty ledger; `append` validates the entry before persisting it.
pub struct LedgerFile {
    path: PathBuf,
}

impl LedgerFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<LedgerDocument> {
        if !self.path.exists() {
            debug!("Ledger file {} not found, treating as empty", self.path.display());
            return Ok(LedgerDocument::default());
        }
        let ledger_str = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read ledger file: {}", self.path.display()))?;
        let document: LedgerDocument = serde_yaml::from_str(&ledger_str)
            .with_context(|| format!("Failed to parse ledger file: {}", self.path.display()))?;
        Ok(document)
    }

    /// Validates and records a new entry. Rejected entries never touch the file.
    pub fn append(&self, transaction: Transaction) -> Result<()> {
        transaction.validate()?;

        let mut document = self.read_document()?;
        document.transactions.push(transaction);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let ledger_str =
            serde_yaml::to_string(&document).context("Failed to serialize ledger")?;
        fs::write(&self.path, ledger_str)
            .with_context(|| format!("Failed to write ledger file: {}", self.path.display()))?;
        debug!(
            "Recorded entry; ledger now holds {} transactions",
            document.transactions.len()
        );
        Ok(())
    }
}

impl PositionStore for LedgerFile {
    fn list_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.read_document()?.transactions)
    }
}
