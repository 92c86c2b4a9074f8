// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load period-1 and period-2 tables   (Layer 4 - data)
//   Step 2: Train (features → scaler → split
//           → epochs → best snapshot)          (Layer 5 - ml)
//   Step 3: Save config, schema, scaler, model  (Layer 6 - infra)
//   Step 4: Write per-epoch metrics CSV         (Layer 6 - infra)
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;
use burn::tensor::backend::AutodiffBackend;
use serde::{Deserialize, Serialize};

use crate::data::loader::CsvTransactionLoader;
use crate::domain::{error::ChurnError, traits::TransactionSource};
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::model::ChurnTransformerConfig;
use crate::ml::trainer::{train_churn_model, TrainingReport};

pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Serialisable so it can be saved next to the model and reloaded
// to rebuild the same architecture for inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub period1:        String,
    pub period2:        String,
    pub checkpoint_dir: String,
    pub epochs:         usize,
    pub batch_size:     usize,
    pub lr:             f64,
    pub d_model:        usize,
    pub num_heads:      usize,
    pub num_layers:     usize,
    pub dropout:        f64,
    pub val_fraction:   f64,
    pub seed:           u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            period1:        "data/period1.csv".to_string(),
            period2:        "data/period2.csv".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            epochs:         50,
            batch_size:     32,
            lr:             1e-3,
            d_model:        128,
            num_heads:      4,
            num_layers:     2,
            dropout:        0.1,
            val_fraction:   0.2,
            seed:           42,
        }
    }
}

impl TrainConfig {
    /// Model hyperparameters for an input of `input_dim` features.
    pub fn model_config(&self, input_dim: usize) -> ChurnTransformerConfig {
        ChurnTransformerConfig::new(input_dim)
            .with_d_model(self.d_model)
            .with_num_heads(self.num_heads)
            .with_num_layers(self.num_layers)
            .with_dropout(self.dropout)
    }

    /// Checks the loop settings; model settings are checked by
    /// ChurnTransformerConfig::validate once the width is known.
    pub fn validate(&self) -> Result<(), ChurnError> {
        if self.epochs == 0 {
            return Err(ChurnError::InvalidConfig("epochs must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(ChurnError::InvalidConfig("batch_size must be at least 1".into()));
        }
        if !(self.lr > 0.0) {
            return Err(ChurnError::InvalidConfig(format!("lr must be positive, got {}", self.lr)));
        }
        if !(self.val_fraction > 0.0 && self.val_fraction < 1.0) {
            return Err(ChurnError::InvalidConfig(format!(
                "val_fraction must be in (0, 1), got {}",
                self.val_fraction
            )));
        }
        Ok(())
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Load both CSV tables and train on the Wgpu backend.
    pub fn execute(&self) -> Result<TrainingReport> {
        let period1 = CsvTransactionLoader::new(&self.config.period1);
        let period2 = CsvTransactionLoader::new(&self.config.period2);
        let device  = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);
        self.execute_with::<TrainBackend>(&period1, &period2, &device)
    }

    /// Run the pipeline on any transaction sources and backend.
    pub fn execute_with<B: AutodiffBackend>(
        &self,
        period1: &dyn TransactionSource,
        period2: &dyn TransactionSource,
        device:  &B::Device,
    ) -> Result<TrainingReport> {
        let cfg = &self.config;

        // ── Step 1: Load tables ───────────────────────────────────────────────
        let p1 = period1.load_all()?;
        let p2 = period2.load_all()?;
        tracing::info!("Period 1: {} rows, period 2: {} rows", p1.len(), p2.len());

        // ── Step 2: Train ─────────────────────────────────────────────────────
        let trained = train_churn_model::<B>(&p1, &p2, cfg, device)?;

        // ── Step 3: Persist everything inference needs ────────────────────────
        let ckpt = CheckpointManager::new(&cfg.checkpoint_dir)?;
        ckpt.save_config(cfg)?;
        ckpt.save_schema(&trained.schema)?;
        ckpt.save_scaler(&trained.scaler)?;
        ckpt.save_model(&trained.model)?;
        tracing::info!("Checkpoint saved to '{}'", ckpt.dir().display());

        // ── Step 4: Metrics ───────────────────────────────────────────────────
        MetricsLogger::new(&cfg.checkpoint_dir)?.write_all(&trained.report.history)?;

        Ok(trained.report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_hyperparameters() {
        let cfg = TrainConfig::default();
        assert_eq!((cfg.epochs, cfg.batch_size), (50, 32));
        assert_eq!(cfg.lr, 1e-3);
        assert_eq!((cfg.d_model, cfg.num_heads, cfg.num_layers), (128, 4, 2));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_model_config_carries_hyperparameters() {
        let cfg = TrainConfig { d_model: 64, num_heads: 8, num_layers: 3, dropout: 0.2, ..TrainConfig::default() };
        let m   = cfg.model_config(11);
        assert_eq!(m.input_dim, 11);
        assert_eq!((m.d_model, m.num_heads, m.num_layers), (64, 8, 3));
        assert_eq!(m.d_ff(), 128);
    }

    #[test]
    fn test_validate_rejects_bad_loop_settings() {
        let bad = [
            TrainConfig { epochs: 0, ..TrainConfig::default() },
            TrainConfig { batch_size: 0, ..TrainConfig::default() },
            TrainConfig { lr: 0.0, ..TrainConfig::default() },
            TrainConfig { val_fraction: 1.0, ..TrainConfig::default() },
        ];
        for cfg in bad {
            assert!(matches!(cfg.validate(), Err(ChurnError::InvalidConfig(_))), "{cfg:?}");
        }
    }
}
