// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Persistence around the in-memory pipeline:
//
//   checkpoint.rs — Saving and loading a trained model
//                   Full-precision weights via Burn's
//                   NamedMpkGzFileRecorder,
//                   plus the train config, fitted scaler and
//                   feature schema as JSON. All four are needed
//                   to score new clients consistently.
//
//   metrics.rs    — Training metrics logging
//                   Writes epoch-level metrics (loss, accuracy)
//                   to a CSV file for later analysis.
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model, scaler and schema saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
