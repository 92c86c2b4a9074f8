// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records per-epoch training metrics to a CSV file.
//
// Metrics recorded per epoch:
//   - epoch:      the epoch number (1, 2, 3, ...)
//   - train_loss: average cross-entropy over training batches
//   - val_loss:   average cross-entropy over validation batches
//   - val_acc:    fraction of validation clients classified correctly
//
// Output file: <checkpoint_dir>/metrics.csv
//
// Example CSV output:
//   epoch,train_loss,val_loss,val_acc
//   1,0.702113,0.689004,0.550000
//   2,0.671950,0.664381,0.600000
//
// How to read the metrics:
//   - If val_loss rises while train_loss keeps falling → overfitting;
//     the saved model is the epoch with the lowest val_loss anyway
//   - val_acc near the majority-class share means the model has
//     not learned anything beyond the label imbalance
//
// Reference: csv crate documentation

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use serde::{Deserialize, Serialize};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average cross-entropy loss over all training batches.
    /// Random initialisation on two classes gives ~ln(2) ≈ 0.693
    pub train_loss: f64,

    /// Average cross-entropy loss on the validation set
    pub val_loss: f64,

    /// Fraction of validation samples whose argmax matches the label
    /// Range: [0.0, 1.0]
    pub val_acc: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: f64, val_acc: f64) -> Self {
        Self { epoch, train_loss, val_loss, val_acc }
    }

    /// Returns true if this epoch strictly improved over the best val_loss.
    /// A NaN val_loss never counts as an improvement.
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }
}

/// Writes epoch metrics to `metrics.csv`, one file per training run.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;
        Ok(Self { csv_path: dir.join("metrics.csv") })
    }

    /// Replace the CSV with the full history of one run.
    pub fn write_all(&self, history: &[EpochMetrics]) -> Result<()> {
        let mut writer = csv::Writer::from_path(&self.csv_path)
            .with_context(|| format!("Cannot write '{}'", self.csv_path.display()))?;
        for m in history {
            writer.serialize(m)?;
        }
        writer.flush()?;

        tracing::debug!(
            "Wrote {} epoch rows to '{}'",
            history.len(),
            self.csv_path.display()
        );
        Ok(())
    }

    /// Return the path to the metrics CSV file
    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
