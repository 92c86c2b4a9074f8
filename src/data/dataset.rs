use burn::data::dataset::Dataset;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// One scaled client feature vector with its churn label
/// (1 = churned, 0 = retained).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnSample {
    pub features: Vec<f32>,
    pub label:    u8,
}

impl ChurnSample {
    pub fn new(features: ArrayView1<f64>, label: u8) -> Self {
        Self {
            features: features.iter().map(|&v| v as f32).collect(),
            label,
        }
    }

    pub fn width(&self) -> usize {
        self.features.len()
    }
}

/// Pair each feature-matrix row with its parallel label.
pub fn zip_samples(features: &Array2<f64>, labels: &[u8]) -> Vec<ChurnSample> {
    features
        .rows()
        .into_iter()
        .zip(labels)
        .map(|(row, &label)| ChurnSample::new(row, label))
        .collect()
}

pub struct ChurnDataset {
    samples: Vec<ChurnSample>,
}

impl ChurnDataset {
    pub fn new(samples: Vec<ChurnSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }

    pub fn churn_count(&self) -> usize {
        self.samples.iter().filter(|s| s.label == 1).count()
    }
}

impl Dataset<ChurnSample> for ChurnDataset {
    fn get(&self, index: usize) -> Option<ChurnSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
