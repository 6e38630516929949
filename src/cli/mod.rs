// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `convert`  — encodes a corpus into training/inference data
//   2. `annotate` — renders a prediction file back onto the corpus

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{AnnotateArgs, Commands, ConvertArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "rec-lm",
    version = "0.1.0",
    about = "Convert text corpora into correction-model data, then render predictions."
)]
pub struct Cli {
    /// The subcommand to run (convert or annotate)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Convert(args)  => Self::run_convert(args),
            Commands::Annotate(args) => Self::run_annotate(args),
        }
    }

    /// Handles the `convert` subcommand.
    /// Converts CLI args into a RecLmConfig and hands off to Layer 2.
    fn run_convert(args: ConvertArgs) -> Result<()> {
        use crate::application::convert_use_case::ConvertUseCase;

        tracing::info!("Starting conversion of corpus: {}", args.input);

        let input     = args.input.clone();
        let store_dir = args.store_dir.clone();
        let tokenized = args.tokenized;
        let training  = args.train;
        let workers   = args.workers;

        // Convert CLI args → application config (separates presentation from domain)
        let use_case = ConvertUseCase::new(
            args.into(),
            input,
            store_dir,
            tokenized,
            training,
            workers,
        );
        use_case.execute()?;

        println!("Conversion complete. Data and config saved.");
        Ok(())
    }

    /// Handles the `annotate` subcommand.
    /// Prints one annotated line per input example.
    fn run_annotate(args: AnnotateArgs) -> Result<()> {
        use crate::application::annotate_use_case::AnnotateUseCase;

        let use_case = AnnotateUseCase::new(
            args.input.clone(),
            args.preds.clone(),
            args.store_dir.clone(),
            args.tokenized,
        );

        for line in use_case.execute()? {
            println!("{line}");
        }
        Ok(())
    }
}
