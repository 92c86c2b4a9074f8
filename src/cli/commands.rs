// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `predict`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the churn model on two periods of transactions
    Train(TrainArgs),

    /// Score new clients with a trained checkpoint
    Predict(PredictArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// CSV of period-1 transactions (features are built from these)
    #[arg(long)]
    pub period1: String,

    /// CSV of period-2 transactions (clients missing here are churners)
    #[arg(long)]
    pub period2: String,

    /// Directory to save the model, scaler, schema and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 50)]
    pub epochs: usize,

    /// Number of clients processed together in one forward pass
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Hidden width of the encoder; the feed-forward layer is twice this
    #[arg(long, default_value_t = 128)]
    pub d_model: usize,

    /// Number of attention heads; d_model must be divisible by it
    #[arg(long, default_value_t = 4)]
    pub num_heads: usize,

    /// Number of stacked encoder layers
    #[arg(long, default_value_t = 2)]
    pub num_layers: usize,

    /// Dropout probability applied inside each encoder layer
    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Share of clients held out for validation
    #[arg(long, default_value_t = 0.2)]
    pub val_fraction: f64,

    /// Seed for the split, batch shuffling and weight initialisation
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            period1:        a.period1,
            period2:        a.period2,
            checkpoint_dir: a.checkpoint_dir,
            epochs:         a.epochs,
            batch_size:     a.batch_size,
            lr:             a.lr,
            d_model:        a.d_model,
            num_heads:      a.num_heads,
            num_layers:     a.num_layers,
            dropout:        a.dropout,
            val_fraction:   a.val_fraction,
            seed:           a.seed,
        }
    }
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// CSV of transactions for the clients to score
    #[arg(long)]
    pub transactions: String,

    /// Directory where `train` saved its checkpoint
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Write `client_id,churn_probability` rows here instead of stdout
    #[arg(long)]
    pub output: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_defaults() {
        let cli = Cli::parse_from(["churn-transformer", "train", "--period1", "a.csv", "--period2", "b.csv"]);
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.period1, "a.csv");
        assert_eq!(cfg, TrainConfig { period1: "a.csv".into(), period2: "b.csv".into(), ..TrainConfig::default() });
    }

    #[test]
    fn test_predict_args() {
        let cli = Cli::parse_from([
            "churn-transformer", "predict", "--transactions", "new.csv", "--output", "out.csv",
        ]);
        let Commands::Predict(args) = cli.command else { panic!("expected predict") };
        assert_eq!(args.checkpoint_dir, "checkpoints");
        assert_eq!(args.output.as_deref(), Some("out.csv"));
    }
}
