// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores everything needed to score new clients.
//
// What gets saved after training:
//   1. model.mpk.gz          — best-snapshot weights (full-precision
//                              gzip MessagePack, so a reloaded model
//                              scores exactly like the trained one)
//   2. train_config.json     — hyperparameters, to rebuild the model
//   3. scaler.json           — fitted per-column mean / scale
//   4. feature_schema.json   — category list → feature width
//
// Why save the schema and scaler separately?
//   The model only accepts vectors of exactly schema.width()
//   columns, standardised with the training statistics. Loading
//   weights without the matching schema and scaler would feed the
//   model inputs it was never trained on.
//
// File layout:
//   checkpoints/
//     model.mpk.gz
//     train_config.json
//     scaler.json
//     feature_schema.json
//     metrics.csv            ← written by MetricsLogger
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use std::{fs, path::{Path, PathBuf}};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};
use serde::{de::DeserializeOwned, Serialize};

use crate::application::train_use_case::TrainConfig;
use crate::data::scaler::StandardScaler;
use crate::domain::schema::FeatureSchema;
use crate::ml::model::ChurnTransformer;

const MODEL_FILE:  &str = "model";
const CONFIG_FILE: &str = "train_config.json";
const SCALER_FILE: &str = "scaler.json";
const SCHEMA_FILE: &str = "feature_schema.json";

type ModelRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

/// Manages the files of one checkpoint directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Open an existing checkpoint directory for reading. Never
    /// creates anything on disk.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            bail!(
                "Checkpoint dir '{}' does not exist. Have you trained the model first?",
                dir.display()
            );
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save model weights. The recorder appends `.mpk.gz`.
    pub fn save_model<B: Backend>(&self, model: &ChurnTransformer<B>) -> Result<()> {
        let path = self.dir.join(MODEL_FILE);
        ModelRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save model to '{}'", path.display()))?;
        tracing::debug!("Saved model weights to '{}'", path.display());
        Ok(())
    }

    /// Load weights into a freshly initialised model of the same
    /// architecture. Loading fails if the shapes do not match.
    pub fn load_model<B: Backend>(
        &self,
        model:  ChurnTransformer<B>,
        device: &B::Device,
    ) -> Result<ChurnTransformer<B>> {
        let path   = self.dir.join(MODEL_FILE);
        let record = ModelRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load model '{}'. Have you trained the model first?",
                    path.display())
            })?;
        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.write_json(CONFIG_FILE, cfg)
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        self.read_json(CONFIG_FILE)
    }

    pub fn save_scaler(&self, scaler: &StandardScaler) -> Result<()> {
        self.write_json(SCALER_FILE, scaler)
    }

    pub fn load_scaler(&self) -> Result<StandardScaler> {
        self.read_json(SCALER_FILE)
    }

    pub fn save_schema(&self, schema: &FeatureSchema) -> Result<()> {
        self.write_json(SCHEMA_FILE, schema)
    }

    pub fn load_schema(&self) -> Result<FeatureSchema> {
        self.read_json(SCHEMA_FILE)
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Saved '{}'", path.display());
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read '{}'. Make sure you have run 'train' before 'predict'.",
                    path.display()
                )
            })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed JSON in '{}'", path.display()))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use ndarray::array;
    use tempfile::tempdir;

    use crate::ml::model::ChurnTransformerConfig;

    type TestBackend = NdArray;

    #[test]
    fn test_json_artifacts_survive_a_reload() {
        let dir  = tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().join("ckpt")).unwrap();

        let scaler = StandardScaler::fit(&array![[1.0, 2.0], [3.0, 2.0]]).unwrap();
        let schema = FeatureSchema::new(vec!["toys".into(), "food".into()]);
        let cfg    = TrainConfig { epochs: 3, ..TrainConfig::default() };

        ckpt.save_scaler(&scaler).unwrap();
        ckpt.save_schema(&schema).unwrap();
        ckpt.save_config(&cfg).unwrap();

        assert_eq!(ckpt.load_scaler().unwrap(), scaler);
        assert_eq!(ckpt.load_schema().unwrap(), schema);
        assert_eq!(ckpt.load_config().unwrap().epochs, 3);
    }

    #[test]
    fn test_model_weights_survive_a_reload() {
        let dir    = tempdir().unwrap();
        let ckpt   = CheckpointManager::new(dir.path()).unwrap();
        let device = Default::default();
        let cfg    = ChurnTransformerConfig::new(9).with_d_model(8).with_num_heads(2);

        let trained: ChurnTransformer<TestBackend> = cfg.init(&device);
        ckpt.save_model(&trained).unwrap();

        let fresh: ChurnTransformer<TestBackend> = cfg.init(&device);
        let loaded = ckpt.load_model(fresh, &device).unwrap();

        let input = Tensor::<TestBackend, 2>::ones([2, 9], &device);
        let a = trained.forward(input.clone()).into_data().to_vec::<f32>().unwrap();
        let b = loaded.forward(input).into_data().to_vec::<f32>().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_open_reads_what_new_wrote() {
        let dir    = tempdir().unwrap();
        let schema = FeatureSchema::new(vec!["toys".into()]);
        CheckpointManager::new(dir.path()).unwrap().save_schema(&schema).unwrap();

        let opened = CheckpointManager::open(dir.path()).unwrap();
        assert_eq!(opened.load_schema().unwrap(), schema);
    }

    #[test]
    fn test_open_does_not_create_missing_dir() {
        let dir     = tempdir().unwrap();
        let missing = dir.path().join("typo");
        assert!(CheckpointManager::open(&missing).is_err());
        assert!(!missing.exists());
    }

    #[test]
    fn test_missing_artifacts_are_errors() {
        let dir  = tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        assert!(ckpt.load_scaler().is_err());
        assert!(ckpt.load_schema().is_err());
        assert!(ckpt.load_config().is_err());
    }
}
