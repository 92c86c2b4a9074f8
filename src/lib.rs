#![recursion_limit = "256"]
//! Churn prediction from two periods of client transactions.
//!
//! Layers, outermost first:
//!
//! - [`cli`]         — `train` / `predict` commands
//! - [`application`] — use cases wiring the layers together
//! - [`domain`]      — transactions, feature schema, errors, traits
//! - [`data`]        — CSV loading, feature extraction, scaling, batching
//! - [`ml`]          — Burn model, training loop, inference
//! - [`infra`]       — checkpoint and metrics persistence

pub mod cli;
pub mod application;
pub mod domain;
pub mod data;
pub mod ml;
pub mod infra;

pub use data::features::{client_rows, extract_training_set};
pub use data::scaler::StandardScaler;
pub use domain::{error::ChurnError, schema::FeatureSchema, transaction::Transaction};
pub use ml::inferencer::predict_churn;
pub use ml::trainer::{train_churn_model, TrainedChurnModel};
