// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer programs against these traits so the
// concrete CSV loader and the Burn-backed scorer can be swapped
// (e.g. an in-memory source in tests).
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use ndarray::Array2;

use crate::domain::transaction::Transaction;

// ─── TransactionSource ────────────────────────────────────────────────────────
/// Any component that can produce a transaction table.
///
/// Implementations:
///   - CsvTransactionLoader → reads a CSV file
///   - Vec<Transaction>     → an in-memory table
pub trait TransactionSource {
    fn load_all(&self) -> Result<Vec<Transaction>>;
}

impl TransactionSource for Vec<Transaction> {
    fn load_all(&self) -> Result<Vec<Transaction>> {
        Ok(self.clone())
    }
}

// ─── ChurnScorer ──────────────────────────────────────────────────────────────
/// Any component that maps a prepared feature matrix to churn
/// probabilities (one value in [0, 1] per row).
///
/// Implementations:
///   - Inferencer → scaler + trained transformer
pub trait ChurnScorer {
    fn score(&self, rows: &Array2<f64>) -> Result<Vec<f32>>;
}
