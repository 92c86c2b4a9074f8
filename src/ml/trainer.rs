// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and Adam.
//
//   extract features → fit scaler → seeded split → datasets
//       → evaluate initial params (first best snapshot)
//       → for each epoch:
//             TRAIN  shuffled batches, CE loss, backward, Adam
//             EVAL   model.valid(), CE loss + accuracy
//             keep a record of the params if val loss improved
//       → load best record back into the model
//
// Key Burn insight:
//   - Training runs on B (an AutodiffBackend) so gradients exist
//   - model.valid() returns the model on B::InnerBackend, where
//     dropout is a no-op and no graph is recorded
//   - The validation batcher must therefore use B::InnerBackend
//   - argmax(1) returns [batch, 1] so we flatten before .equal()
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use std::sync::Arc;
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use ndarray::Array2;

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{ChurnBatch, ChurnBatcher},
    dataset::{zip_samples, ChurnDataset},
    features::extract_training_set,
    scaler::StandardScaler,
    splitter::split_train_val,
};
use crate::domain::{error::ChurnError, schema::FeatureSchema, transaction::Transaction};
use crate::infra::metrics::EpochMetrics;
use crate::ml::inferencer::predict_churn;
use crate::ml::model::{ChurnTransformer, ChurnTransformerConfig};

/// A progress line is printed on every epoch where epoch % 10 == 0.
pub const PROGRESS_INTERVAL: usize = 10;

/// Whether the 0-based `epoch` gets a progress line.
pub fn should_report(epoch: usize) -> bool {
    epoch % PROGRESS_INTERVAL == 0
}

/// Summary of one training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// One entry per epoch, in order
    pub history: Vec<EpochMetrics>,
    /// Validation loss of the randomly initialised parameters
    pub initial_val_loss: f64,
    /// Validation loss of the parameters that were returned
    pub best_val_loss: f64,
    /// 1-based epoch of the returned parameters; None means no
    /// epoch beat the initial parameters
    pub best_epoch: Option<usize>,
}

/// Everything produced by `train_churn_model`. The scaler and
/// schema must travel with the model: inference rows have to be
/// built with the same schema and scaled with the same statistics.
pub struct TrainedChurnModel<B: AutodiffBackend> {
    pub model:  ChurnTransformer<B>,
    pub scaler: StandardScaler,
    pub schema: FeatureSchema,
    pub report: TrainingReport,
}

impl<B: AutodiffBackend> TrainedChurnModel<B> {
    /// Churn probability per prepared feature row, computed in
    /// evaluation mode.
    pub fn predict(&self, rows: &Array2<f64>, device: &B::Device) -> Result<Vec<f32>> {
        self.schema.check_width(rows)?;
        predict_churn(&self.model.valid(), &self.scaler, rows, device)
    }
}

/// Validation loss and accuracy of one pass over a loader.
#[derive(Debug, Clone, Copy)]
pub struct EvalStats {
    pub loss:     f64,
    pub accuracy: f64,
}

/// Full pipeline: period tables in, trained model + scaler + schema out.
pub fn train_churn_model<B: AutodiffBackend>(
    period1: &[Transaction],
    period2: &[Transaction],
    cfg:     &TrainConfig,
    device:  &B::Device,
) -> Result<TrainedChurnModel<B>> {
    cfg.validate()?;

    let extracted = extract_training_set(period1, period2)?;
    let (scaler, scaled) = StandardScaler::fit_transform(&extracted.features)?;

    let samples = zip_samples(&scaled, &extracted.labels);
    let (train_samples, val_samples) = split_train_val(samples, cfg.val_fraction, cfg.seed);
    if train_samples.is_empty() || val_samples.is_empty() {
        return Err(ChurnError::EmptySplit {
            train: train_samples.len(),
            val:   val_samples.len(),
        }
        .into());
    }
    tracing::debug!("Feature columns: {:?}", extracted.schema.column_names());

    let train_dataset = ChurnDataset::new(train_samples);
    let val_dataset   = ChurnDataset::new(val_samples);
    tracing::info!(
        "Split: {} train ({} churned), {} validation ({} churned)",
        train_dataset.sample_count(),
        train_dataset.churn_count(),
        val_dataset.sample_count(),
        val_dataset.churn_count(),
    );

    let model_cfg = cfg.model_config(extracted.schema.width());
    let (model, report) = run_training::<B>(&model_cfg, train_dataset, val_dataset, cfg, device)?;

    Ok(TrainedChurnModel { model, scaler, schema: extracted.schema, report })
}

/// Train a fresh model for `cfg.epochs` epochs and return it with
/// the best-validation-loss parameters loaded.
pub fn run_training<B: AutodiffBackend>(
    model_cfg:     &ChurnTransformerConfig,
    train_dataset: ChurnDataset,
    val_dataset:   ChurnDataset,
    cfg:           &TrainConfig,
    device:        &B::Device,
) -> Result<(ChurnTransformer<B>, TrainingReport)> {
    model_cfg.validate()?;
    if train_dataset.sample_count() == 0 || val_dataset.sample_count() == 0 {
        return Err(ChurnError::EmptySplit {
            train: train_dataset.sample_count(),
            val:   val_dataset.sample_count(),
        }
        .into());
    }

    // ── Build model ───────────────────────────────────────────────────────────
    B::seed(cfg.seed);
    let mut model: ChurnTransformer<B> = model_cfg.init(device);
    tracing::info!(
        "Model ready: {} layers, d_model={}, heads={}, input_dim={}",
        model_cfg.num_layers, model_cfg.d_model, model_cfg.num_heads, model_cfg.input_dim
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let mut optim = AdamConfig::new()
        .with_epsilon(1e-8)
        .init::<B, ChurnTransformer<B>>();

    // ── Data loaders ──────────────────────────────────────────────────────────
    let train_loader = DataLoaderBuilder::new(ChurnBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .build(train_dataset);

    let val_loader = DataLoaderBuilder::new(ChurnBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .build(val_dataset);

    // ── Initial snapshot ──────────────────────────────────────────────────────
    // The untrained parameters are the first candidate, so the returned
    // model is never worse on validation than the starting point.
    let initial = evaluate(&model.valid(), &val_loader);
    let mut best_val_loss = initial.loss;
    let mut best_record   = model.clone().into_record();
    let mut best_epoch    = None;
    let mut history       = Vec::with_capacity(cfg.epochs);
    tracing::info!("Initial val_loss={:.4} val_acc={:.1}%", initial.loss, initial.accuracy * 100.0);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 0..cfg.epochs {
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.features, batch.labels);

            train_loss_sum += loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        let val     = evaluate(&model.valid(), &val_loader);
        let metrics = EpochMetrics::new(epoch + 1, avg_train_loss, val.loss, val.accuracy);

        if metrics.is_improvement(best_val_loss) {
            best_val_loss = val.loss;
            best_record   = model.clone().into_record();
            best_epoch    = Some(epoch + 1);
            tracing::debug!("New best snapshot at epoch {} (val_loss={:.4})", epoch + 1, val.loss);
        }

        if should_report(epoch) {
            println!(
                "Epoch [{}/{}], Train Loss: {:.4}, Val Loss: {:.4}, Val Accuracy: {:.2}%",
                epoch + 1, cfg.epochs, avg_train_loss, val.loss, val.accuracy * 100.0,
            );
        }

        history.push(metrics);
    }

    let model = model.load_record(best_record);
    tracing::info!(
        "Training complete! best val_loss={:.4} (epoch {})",
        best_val_loss,
        best_epoch.map_or_else(|| "initial".to_string(), |e| e.to_string())
    );

    Ok((model, TrainingReport {
        history,
        initial_val_loss: initial.loss,
        best_val_loss,
        best_epoch,
    }))
}

/// Average cross-entropy and accuracy over every batch of `loader`.
pub fn evaluate<B: Backend>(
    model:  &ChurnTransformer<B>,
    loader: &Arc<dyn DataLoader<ChurnBatch<B>>>,
) -> EvalStats {
    let mut loss_sum = 0.0f64;
    let mut batches  = 0usize;
    let mut correct  = 0usize;
    let mut total    = 0usize;

    for batch in loader.iter() {
        let (loss, logits) = model.forward_loss(batch.features, batch.labels.clone());
        loss_sum += loss.into_scalar().elem::<f64>();
        batches  += 1;

        let predicted = logits.argmax(1).flatten::<1>(0, 1);
        total   += batch.labels.dims()[0];
        correct += predicted
            .equal(batch.labels)
            .int().sum().into_scalar().elem::<i64>() as usize;
    }

    EvalStats {
        loss:     if batches > 0 { loss_sum / batches as f64 } else { f64::NAN },
        accuracy: if total   > 0 { correct as f64 / total as f64 } else { 0.0 },
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray>;

    fn tx(client: &str, revenue: f64, category: &str, date: &str) -> Transaction {
        Transaction::new(client, revenue, 1.0, 0.0, "p1", category, date)
    }

    fn small_config(epochs: usize, batch_size: usize) -> TrainConfig {
        TrainConfig {
            epochs,
            batch_size,
            d_model: 16,
            num_heads: 4,
            ..TrainConfig::default()
        }
    }

    /// 20 clients; the odd ones disappear in period 2 and spend little.
    fn tables() -> (Vec<Transaction>, Vec<Transaction>) {
        let mut p1 = Vec::new();
        let mut p2 = Vec::new();
        for i in 0..20 {
            let id       = format!("c{i}");
            let churner  = i % 2 == 1;
            let spend    = if churner { 5.0 } else { 50.0 };
            let category = if i % 3 == 0 { "toys" } else { "food" };
            p1.push(tx(&id, spend, category, "2024-01-01"));
            p1.push(tx(&id, spend + i as f64, "books", "2024-01-02"));
            if !churner {
                p2.push(tx(&id, spend, category, "2024-02-01"));
            }
        }
        (p1, p2)
    }

    #[test]
    fn test_three_client_scenario_runs_one_epoch() {
        let p1 = vec![
            tx("a", 10.0, "x", "d1"),
            tx("b", 20.0, "x", "d1"),
            tx("c", 30.0, "y", "d2"),
        ];
        let p2 = vec![tx("a", 1.0, "x", "d3"), tx("b", 1.0, "x", "d3"), tx("z", 1.0, "x", "d3")];

        let device  = Default::default();
        let trained = train_churn_model::<TestBackend>(&p1, &p2, &small_config(1, 4), &device).unwrap();

        assert_eq!(trained.report.history.len(), 1);
        assert_eq!(trained.schema.width(), 10);

        let rows   = Array2::from_shape_fn((3, 10), |(i, _)| (i + 1) as f64);
        let scaled = trained.scaler.transform(&rows).unwrap();
        assert_eq!(scaled.dim(), (3, 10));
    }

    #[test]
    fn test_best_snapshot_never_worse_than_initial() {
        let (p1, p2) = tables();
        let device   = Default::default();
        let trained  = train_churn_model::<TestBackend>(&p1, &p2, &small_config(5, 4), &device).unwrap();
        let report   = &trained.report;

        assert_eq!(report.history.len(), 5);
        assert!(report.best_val_loss <= report.initial_val_loss);
        for m in &report.history {
            assert!(report.best_val_loss <= m.val_loss || m.val_loss.is_nan());
        }
    }

    #[test]
    fn test_returned_model_has_best_validation_loss() {
        let device = Default::default();
        let cfg    = small_config(4, 2);
        let model_cfg = cfg.model_config(3);

        let samples = |n: usize| -> Vec<crate::data::dataset::ChurnSample> {
            (0..n)
                .map(|i| crate::data::dataset::ChurnSample {
                    features: vec![i as f32, -(i as f32), 0.5],
                    label:    (i % 2) as u8,
                })
                .collect()
        };

        let (model, report) = run_training::<TestBackend>(
            &model_cfg,
            ChurnDataset::new(samples(8)),
            ChurnDataset::new(samples(4)),
            &cfg,
            &device,
        )
        .unwrap();

        let val_loader = DataLoaderBuilder::new(
            ChurnBatcher::<<TestBackend as AutodiffBackend>::InnerBackend>::new(device),
        )
        .batch_size(cfg.batch_size)
        .build(ChurnDataset::new(samples(4)));

        let stats = evaluate(&model.valid(), &val_loader);
        assert!((stats.loss - report.best_val_loss).abs() < 1e-4);
    }

    #[test]
    fn test_predict_returns_probabilities() {
        let (p1, p2) = tables();
        let device   = Default::default();
        let trained  = train_churn_model::<TestBackend>(&p1, &p2, &small_config(2, 8), &device).unwrap();

        let extracted = extract_training_set(&p1, &p2).unwrap();
        let probs     = trained.predict(&extracted.features, &device).unwrap();
        assert_eq!(probs.len(), 20);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_single_client_cannot_be_split() {
        let p1  = vec![tx("a", 1.0, "x", "d1")];
        let err = train_churn_model::<TestBackend>(&p1, &[], &small_config(1, 4), &Default::default())
            .err()
            .unwrap();
        assert!(matches!(
            err.downcast_ref::<ChurnError>(),
            Some(ChurnError::EmptySplit { train: 0, val: 1 })
        ));
    }

    #[test]
    fn test_progress_cadence() {
        assert!(should_report(0));
        assert!(!should_report(9));
        assert!(should_report(10));
        assert!(should_report(20));
        let reported: Vec<usize> = (0..25).filter(|&e| should_report(e)).collect();
        assert_eq!(reported, vec![0, 10, 20]);
    }

    #[test]
    fn test_zero_epochs_rejected() {
        let (p1, p2) = tables();
        let result = train_churn_model::<TestBackend>(&p1, &p2, &small_config(0, 4), &Default::default());
        assert!(result.is_err());
    }
}
