// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw transaction tables to tensor batches.
//
//   CSV tables (period 1, period 2)
//       │
//       ▼
//   CsvTransactionLoader  → Vec<Transaction> per period
//       │
//       ▼
//   features              → FeatureSchema + feature matrix + labels
//       │
//       ▼
//   StandardScaler        → standardised matrix (fitted once)
//       │
//       ▼
//   split_train_val       → seeded 80/20 split
//       │
//       ▼
//   ChurnDataset          → implements Burn's Dataset trait
//       │
//       ▼
//   ChurnBatcher          → stacks samples into tensor batches
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads transaction tables from CSV files
pub mod loader;

/// Derives client feature vectors and churn labels
pub mod features;

/// Per-column standardisation fitted on training data
pub mod scaler;

/// Implements Burn's Dataset trait for churn samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded shuffle and train/validation split
pub mod splitter;
