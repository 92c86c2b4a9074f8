// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`   — trains the model on two transaction periods
//   2. `predict` — loads a checkpoint and scores new clients

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, PredictArgs, TrainArgs};

use crate::application::predict_use_case::{write_predictions, PredictUseCase};
use crate::application::train_use_case::TrainUseCase;
use crate::data::loader::CsvTransactionLoader;

#[derive(Parser, Debug)]
#[command(
    name = "churn-transformer",
    version = "0.1.0",
    about = "Train a transformer churn classifier on client transactions, then score new clients."
)]
pub struct Cli {
    /// The subcommand to run (train or predict)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Predict(args) => run_predict(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    tracing::info!("Training on '{}' vs '{}'", args.period1, args.period2);

    let checkpoint_dir = args.checkpoint_dir.clone();
    let report = TrainUseCase::new(args.into()).execute()?;

    match report.best_epoch {
        Some(epoch) => println!(
            "Training complete. Best val loss {:.4} at epoch {}. Checkpoint saved to '{}'.",
            report.best_val_loss, epoch, checkpoint_dir
        ),
        None => println!(
            "Training complete. No epoch beat the initial parameters (val loss {:.4}). Checkpoint saved to '{}'.",
            report.initial_val_loss, checkpoint_dir
        ),
    }
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let use_case    = PredictUseCase::new(&args.checkpoint_dir)?;
    let predictions = use_case.predict(&CsvTransactionLoader::new(&args.transactions))?;

    match args.output {
        Some(path) => {
            write_predictions(&path, &predictions)?;
            println!("Wrote {} predictions to '{}'", predictions.len(), path);
        }
        None => {
            println!("client_id,churn_probability");
            for p in &predictions {
                println!("{},{:.6}", p.client_id, p.churn_probability);
            }
        }
    }
    Ok(())
}
