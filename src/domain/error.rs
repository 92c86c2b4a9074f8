// ============================================================
// Layer 3 — Pipeline Errors
// ============================================================
// The core (feature extraction, scaling, training, inference)
// reports its own failures with this enum. Outer layers wrap it
// in anyhow::Error with extra context.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChurnError {
    #[error("empty input: {0}")]
    EmptyInput(String),

    #[error("feature width mismatch: expected {expected} columns, found {found}")]
    SchemaMismatch { expected: usize, found: usize },

    #[error("train/validation split left an empty side ({train} train, {val} validation)")]
    EmptySplit { train: usize, val: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
