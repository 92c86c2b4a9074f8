// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Scores already-prepared client feature rows:
//
//   rows ─► scaler.transform ─► model.forward ─► softmax ─► P(churned)
//
// Rows must be built with the training FeatureSchema (see
// data::features::client_rows). The model must be on a backend
// without autodiff (e.g. `trained.model.valid()`) so dropout is
// disabled and no graph is recorded.

use anyhow::Result;
use burn::{prelude::*, tensor::activation::softmax};
use ndarray::Array2;

use crate::data::{features::client_rows, scaler::StandardScaler};
use crate::domain::{
    error::ChurnError, schema::FeatureSchema, traits::ChurnScorer, transaction::Transaction,
};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{ChurnTransformer, ChurnTransformerConfig};

/// Probability of the churned class for every row, in input order.
pub fn predict_churn<B: Backend>(
    model:  &ChurnTransformer<B>,
    scaler: &StandardScaler,
    rows:   &Array2<f64>,
    device: &B::Device,
) -> Result<Vec<f32>> {
    let scaled = scaler.transform(rows)?;
    let (n, width) = scaled.dim();
    if n == 0 {
        return Ok(Vec::new());
    }

    let flat: Vec<f32> = scaled.iter().map(|&v| v as f32).collect();
    let input = Tensor::<B, 1>::from_floats(flat.as_slice(), device).reshape([n, width]);

    let logits = model.forward(input);
    let churn  = softmax(logits, 1).slice([0..n, 1..2]).reshape([n]);

    churn
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| anyhow::anyhow!("Cannot read churn probabilities: {e:?}"))
}

/// A trained model together with the scaler and schema it was
/// trained with.
pub struct Inferencer<B: Backend> {
    model:  ChurnTransformer<B>,
    scaler: StandardScaler,
    schema: FeatureSchema,
    device: B::Device,
}

impl<B: Backend> Inferencer<B> {
    pub fn new(
        model:  ChurnTransformer<B>,
        scaler: StandardScaler,
        schema: FeatureSchema,
        device: B::Device,
    ) -> Self {
        Self { model, scaler, schema, device }
    }

    /// Rebuild the model from the saved config and schema, then
    /// load its weights. Dropout is set to 0 for inference.
    pub fn from_checkpoint(ckpt: &CheckpointManager, device: B::Device) -> Result<Self> {
        let cfg    = ckpt.load_config()?;
        let schema = ckpt.load_schema()?;
        let scaler = ckpt.load_scaler()?;

        if scaler.width() != schema.width() {
            return Err(ChurnError::SchemaMismatch {
                expected: schema.width(),
                found:    scaler.width(),
            }
            .into());
        }

        let model_cfg: ChurnTransformerConfig = cfg.model_config(schema.width()).with_dropout(0.0);
        let model = ckpt.load_model(model_cfg.init::<B>(&device), &device)?;
        tracing::info!("Model loaded from '{}' ({} features)", ckpt.dir().display(), schema.width());

        Ok(Self::new(model, scaler, schema, device))
    }

    /// Build rows for every client in `transactions` with the saved
    /// schema and score them.
    pub fn score_transactions(&self, transactions: &[Transaction]) -> Result<Vec<(String, f32)>> {
        let table = client_rows(&self.schema, transactions);
        let probs = self.score(&table.features)?;
        Ok(table.client_ids.into_iter().zip(probs).collect())
    }
}

impl<B: Backend> ChurnScorer for Inferencer<B> {
    fn score(&self, rows: &Array2<f64>) -> Result<Vec<f32>> {
        self.schema.check_width(rows)?;
        predict_churn(&self.model, &self.scaler, rows, &self.device)
    }
}
