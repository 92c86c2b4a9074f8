// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Scores new clients with a saved checkpoint:
//
//   Step 1: Load model + scaler + schema       (Layer 6 - infra)
//   Step 2: Load the new transaction table      (Layer 4 - data)
//   Step 3: Build rows with the saved schema,
//           scale, forward, softmax             (Layer 5 - ml)
//
// The category list comes from the checkpoint, never from the
// new table, so the feature width always matches training.

use anyhow::{Context, Result};
use burn::prelude::Backend;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::traits::TransactionSource;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::inferencer::Inferencer;

pub type InferBackend = burn::backend::Wgpu;

/// One scored client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnPrediction {
    pub client_id:         String,
    pub churn_probability: f32,
}

pub struct PredictUseCase<B: Backend = InferBackend> {
    inferencer: Inferencer<B>,
}

impl PredictUseCase {
    /// Load the checkpoint onto the default Wgpu device.
    pub fn new(checkpoint_dir: &str) -> Result<Self> {
        Self::with_device(checkpoint_dir, burn::backend::wgpu::WgpuDevice::default())
    }
}

impl<B: Backend> PredictUseCase<B> {
    pub fn with_device(checkpoint_dir: &str, device: B::Device) -> Result<Self> {
        let ckpt       = CheckpointManager::open(checkpoint_dir)?;
        let inferencer = Inferencer::from_checkpoint(&ckpt, device)?;
        Ok(Self { inferencer })
    }

    pub fn predict(&self, source: &dyn TransactionSource) -> Result<Vec<ChurnPrediction>> {
        let transactions = source.load_all()?;
        let scored       = self.inferencer.score_transactions(&transactions)?;
        tracing::info!("Scored {} clients", scored.len());

        Ok(scored
            .into_iter()
            .map(|(client_id, churn_probability)| ChurnPrediction { client_id, churn_probability })
            .collect())
    }
}

/// Write predictions as `client_id,churn_probability` rows.
pub fn write_predictions(path: impl AsRef<Path>, predictions: &[ChurnPrediction]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot write predictions to '{}'", path.display()))?;
    for p in predictions {
        writer.serialize(p)?;
    }
    writer.flush()?;
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use std::fs;
    use tempfile::tempdir;

    use crate::application::train_use_case::{TrainConfig, TrainUseCase};
    use crate::domain::transaction::Transaction;

    fn tx(client: &str, revenue: f64, category: &str, date: &str) -> Transaction {
        Transaction::new(client, revenue, 1.0, 0.0, "p1", category, date)
    }

    fn periods() -> (Vec<Transaction>, Vec<Transaction>) {
        let mut p1 = Vec::new();
        let mut p2 = Vec::new();
        for i in 0..10 {
            let id = format!("c{i}");
            p1.push(tx(&id, 10.0 * i as f64, if i % 2 == 0 { "toys" } else { "food" }, "d1"));
            if i < 6 {
                p2.push(tx(&id, 1.0, "toys", "d2"));
            }
        }
        (p1, p2)
    }

    #[test]
    fn test_train_then_predict_from_checkpoint() {
        let dir = tempdir().unwrap();
        let ckpt_dir = dir.path().join("ckpt").to_string_lossy().to_string();

        let cfg = TrainConfig {
            checkpoint_dir: ckpt_dir.clone(),
            epochs:         2,
            batch_size:     4,
            d_model:        8,
            num_heads:      2,
            ..TrainConfig::default()
        };
        let (p1, p2) = periods();
        let report = TrainUseCase::new(cfg)
            .execute_with::<Autodiff<NdArray>>(&p1, &p2, &Default::default())
            .unwrap();
        assert_eq!(report.history.len(), 2);
        assert!(Path::new(&ckpt_dir).join("metrics.csv").exists());

        let predictor = PredictUseCase::<NdArray>::with_device(&ckpt_dir, Default::default()).unwrap();
        let new_clients = vec![
            tx("n1", 5.0, "toys", "d9"),
            tx("n2", 7.0, "garden", "d9"),
            tx("n1", 3.0, "food", "d9"),
        ];
        let predictions = predictor.predict(&new_clients).unwrap();

        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].client_id, "n1");
        assert!(predictions.iter().all(|p| (0.0..=1.0).contains(&p.churn_probability)));

        let out = dir.path().join("scores.csv");
        write_predictions(&out, &predictions).unwrap();
        let text = fs::read_to_string(out).unwrap();
        assert!(text.starts_with("client_id,churn_probability\n"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_predict_leaves_unknown_checkpoint_dir_alone() {
        let dir  = tempdir().unwrap();
        let typo = dir.path().join("typo");
        let res  = PredictUseCase::<NdArray>::with_device(&typo.to_string_lossy(), Default::default());
        assert!(res.is_err());
        assert!(!typo.exists());
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let dir = tempdir().unwrap();
        let res = PredictUseCase::<NdArray>::with_device(
            &dir.path().to_string_lossy(),
            Default::default(),
        );
        assert!(res.is_err());
    }
}
