// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model, training and inference code lives here.
//
//   model.rs      — The churn classifier
//                   • Linear embedding of the feature vector
//                   • Multi-head self-attention encoder blocks
//                   • ReLU feed-forward networks
//                   • Layer normalisation + residual connections
//                   • 2-class linear head
//
//   trainer.rs    — The training loop
//                   Feature extraction → scaling → split,
//                   then forward pass, loss, backward pass,
//                   Adam step, validation and best-snapshot
//                   selection per epoch
//
//   inferencer.rs — The inference engine
//                   Scales prepared rows, runs the model,
//                   returns churn probabilities
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Vaswani et al. (2017) Attention Is All You Need

/// Transformer churn classifier architecture
pub mod model;

/// Training loop with validation and best-snapshot selection
pub mod trainer;

/// Inference engine: scales rows and predicts churn probabilities
pub mod inferencer;
