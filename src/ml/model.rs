// ============================================================
// Layer 5 — Churn Transformer
// ============================================================
//   features [batch, input_dim]
//       │  Linear (embedding)
//       ▼
//   [batch, 1, d_model]          ← one client = one "token"
//       │  EncoderBlock × num_layers
//       ▼
//   [batch, 1, d_model]
//       │  mean over the sequence axis
//       ▼
//   [batch, d_model]
//       │  Linear (classifier)
//       ▼
//   logits [batch, 2]            ← 0 = retained, 1 = churned
//
// NOTE: with a sequence of length 1 the attention weights are
// always exactly 1.0, so each attention sublayer reduces to its
// value/output projections. The stack is kept as-is so trained
// parameters keep the same shape and behaviour.

use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::domain::error::ChurnError;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct ChurnTransformerConfig {
    /// Width of one client feature vector (schema width)
    pub input_dim: usize,
    #[config(default = 128)]
    pub d_model:   usize,
    #[config(default = 4)]
    pub num_heads: usize,
    #[config(default = 2)]
    pub num_layers: usize,
    #[config(default = 0.1)]
    pub dropout:   f64,
}

impl ChurnTransformerConfig {
    /// Feed-forward width inside each encoder block.
    pub fn d_ff(&self) -> usize {
        self.d_model * 2
    }

    pub fn validate(&self) -> Result<(), ChurnError> {
        if self.input_dim == 0 || self.d_model == 0 || self.num_heads == 0 || self.num_layers == 0 {
            return Err(ChurnError::InvalidConfig(
                "input_dim, d_model, num_heads and num_layers must all be non-zero".into(),
            ));
        }
        if self.d_model % self.num_heads != 0 {
            return Err(ChurnError::InvalidConfig(format!(
                "d_model ({}) must be divisible by num_heads ({})",
                self.d_model, self.num_heads
            )));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(ChurnError::InvalidConfig(format!(
                "dropout must be in [0, 1), got {}",
                self.dropout
            )));
        }
        Ok(())
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> ChurnTransformer<B> {
        let embedding = LinearConfig::new(self.input_dim, self.d_model).init(device);
        let layers: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let classifier = LinearConfig::new(self.d_model, 2).init(device);
        ChurnTransformer { embedding, layers, classifier }
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn   = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff()).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff(), self.d_model).init(device);
        let norm1   = LayerNormConfig::new(self.d_model).init(device);
        let norm2   = LayerNormConfig::new(self.d_model).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2, dropout }
    }
}

/// Post-norm encoder layer: attention and ReLU feed-forward
/// sublayers, each wrapped in dropout + residual + LayerNorm.
#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let attn_output = self.self_attn.forward(MhaInput::self_attn(x.clone())).context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let hidden  = self.dropout.forward(relu(self.ffn_linear1.forward(x.clone())));
        let ffn_out = self.ffn_linear2.forward(hidden);
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

#[derive(Module, Debug)]
pub struct ChurnTransformer<B: Backend> {
    pub embedding:  Linear<B>,
    pub layers:     Vec<EncoderBlock<B>>,
    pub classifier: Linear<B>,
}

impl<B: Backend> ChurnTransformer<B> {
    /// features: [batch, input_dim] → logits: [batch, 2]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let [batch_size, _] = features.dims();

        let mut x = self.embedding.forward(features).unsqueeze_dim::<3>(1);
        for layer in &self.layers {
            x = layer.forward(x);
        }

        let [_, _, d_model] = x.dims();
        let pooled = x.mean_dim(1).reshape([batch_size, d_model]);
        self.classifier.forward(pooled)
    }

    /// Mean cross-entropy over the batch, plus the logits for metrics.
    pub fn forward_loss(
        &self,
        features: Tensor<B, 2>,
        labels:   Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(features);
        let ce     = CrossEntropyLossConfig::new().init(&logits.device());
        let loss   = ce.forward(logits.clone(), labels);
        (loss, logits)
    }
}
