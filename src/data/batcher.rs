// ============================================================
// Layer 4 — Churn Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<ChurnSample>
// into tensors the model can consume.
//
//   Input:  N samples, each with `width` features
//   Output: features [N, width] (float), labels [N] (int)
//
// All samples come from one extraction call, so they share the
// same width and can be flattened row-major then reshaped.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::ChurnSample;

/// A batch of scaled feature vectors and their class indices.
#[derive(Debug, Clone)]
pub struct ChurnBatch<B: Backend> {
    /// shape: [batch_size, width]
    pub features: Tensor<B, 2>,

    /// shape: [batch_size], values in {0, 1}
    pub labels: Tensor<B, 1, Int>,
}

/// Holds the target device so tensors are created where the
/// model lives.
#[derive(Clone, Debug)]
pub struct ChurnBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ChurnBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<ChurnSample, ChurnBatch<B>> for ChurnBatcher<B> {
    fn batch(&self, items: Vec<ChurnSample>) -> ChurnBatch<B> {
        let batch_size = items.len();
        let width      = items[0].width();

        let features_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.features.iter().copied())
            .collect();

        let labels: Vec<i32> = items
            .iter()
            .map(|s| s.label as i32)
            .collect();

        let features = Tensor::<B, 1>::from_floats(
            features_flat.as_slice(), &self.device
        ).reshape([batch_size, width]);

        let labels = Tensor::<B, 1, Int>::from_ints(
            labels.as_slice(), &self.device
        );

        ChurnBatch { features, labels }
    }
}
