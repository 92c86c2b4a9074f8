// ============================================================
// Layer 4 — Transaction Loader
// ============================================================
// Reads a client transaction table from a CSV file using the
// `csv` crate with serde deserialisation.
//
// Expected header (column order does not matter):
//   client_id,revenue,quantity,loss,product_id,product_category,transaction_date
//
// A missing column or a non-numeric revenue/quantity/loss makes
// the whole load fail with the offending record's position, so a
// malformed table never reaches feature extraction.
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::{fs::File, path::{Path, PathBuf}};

use crate::domain::traits::TransactionSource;
use crate::domain::transaction::Transaction;

/// Loads every row of one CSV file.
pub struct CsvTransactionLoader {
    path: PathBuf,
}

impl CsvTransactionLoader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl TransactionSource for CsvTransactionLoader {
    fn load_all(&self) -> Result<Vec<Transaction>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Cannot open transaction table '{}'", self.path.display()))?;

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut transactions = Vec::new();
        for (i, record) in reader.deserialize().enumerate() {
            let tx: Transaction = record.with_context(|| {
                format!("Malformed row {} in '{}'", i + 1, self.path.display())
            })?;
            transactions.push(tx);
        }

        tracing::info!(
            "Loaded {} transactions from '{}'",
            transactions.len(),
            self.path.display()
        );
        Ok(transactions)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_loads_rows() {
        let dir  = tempdir().unwrap();
        let path = dir.path().join("p1.csv");
        fs::write(
            &path,
            "client_id,revenue,quantity,loss,product_id,product_category,transaction_date\n\
             c1,10.5,2,0.0,p1,toys,2024-01-01\n\
             c2, 3.0,1,1.5,p2,food,2024-01-02\n",
        )
        .unwrap();

        let txs = CsvTransactionLoader::new(&path).load_all().unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0], Transaction::new("c1", 10.5, 2.0, 0.0, "p1", "toys", "2024-01-01"));
        assert_eq!(txs[1].revenue, 3.0);
    }

    #[test]
    fn test_missing_column_fails() {
        let dir  = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "client_id,revenue\nc1,10\n").unwrap();

        assert!(CsvTransactionLoader::new(&path).load_all().is_err());
    }

    #[test]
    fn test_missing_file_fails() {
        let dir = tempdir().unwrap();
        assert!(CsvTransactionLoader::new(dir.path().join("nope.csv")).load_all().is_err());
    }
}
