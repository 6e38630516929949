// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `convert` and `annotate`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)

use clap::{ArgAction, Args, Subcommand};

use crate::application::rec_lm::RecLmConfig;
use crate::data::truncate::TruncateMethod;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a corpus into noised training data or inference inputs
    Convert(ConvertArgs),

    /// Render a model prediction file back onto a corpus
    Annotate(AnnotateArgs),
}

/// All arguments for the `convert` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Corpus file: one example per line (plain text, or a JSON
    /// token array when --tokenized is set)
    #[arg(long)]
    pub input: String,

    /// Directory to save converted data, config and tokenizer
    #[arg(long, default_value = "store")]
    pub store_dir: String,

    /// Treat each input line as a pre-tokenized JSON array
    #[arg(long, default_value_t = false)]
    pub tokenized: bool,

    /// Generate noise labels for training (omit for inference data)
    #[arg(long, default_value_t = false)]
    pub train: bool,

    /// Number of parallel conversion workers
    #[arg(long, default_value_t = 1)]
    pub workers: usize,

    /// Maximum number of tokens per sequence, padding included
    #[arg(long, default_value_t = 128)]
    pub max_seq_length: usize,

    /// Per-token probability mass assigned to replacement noise
    #[arg(long, default_value_t = 0.05)]
    pub rep_prob: f64,

    /// Per-token probability mass assigned to omission noise
    #[arg(long, default_value_t = 0.05)]
    pub add_prob: f64,

    /// Per-token probability mass assigned to spurious-token noise
    #[arg(long, default_value_t = 0.05)]
    pub del_prob: f64,

    /// Which end of an over-long sequence gets cut
    #[arg(long, value_enum, default_value_t = TruncateMethod::Lifo)]
    pub truncate_method: TruncateMethod,

    /// Lowercase text before tokenizing
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    pub do_lower_case: bool,

    /// Total number of unique tokens the tokenizer may learn
    #[arg(long, default_value_t = 30522)]
    pub vocab_size: usize,

    /// Number of examples per batch at inference time
    #[arg(long, default_value_t = 8)]
    pub batch_size: usize,

    /// Number of compute devices batches are split across
    #[arg(long, default_value_t = 1)]
    pub n_devices: usize,

    /// Path to model weights, needed later for inference
    #[arg(long)]
    pub init_checkpoint: Option<String>,
}

/// Convert CLI ConvertArgs into the application-layer RecLmConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<ConvertArgs> for RecLmConfig {
    fn from(a: ConvertArgs) -> Self {
        RecLmConfig {
            max_seq_length:  a.max_seq_length,
            rep_prob:        a.rep_prob,
            add_prob:        a.add_prob,
            del_prob:        a.del_prob,
            do_lower_case:   a.do_lower_case,
            truncate_method: a.truncate_method,
            batch_size:      a.batch_size,
            n_devices:       a.n_devices,
            init_checkpoint: a.init_checkpoint,
            vocab_size:      a.vocab_size,
        }
    }
}

/// All arguments for the `annotate` command
#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// The corpus file the predictions were computed for
    #[arg(long)]
    pub input: String,

    /// JSON file with rep_preds/add_preds/del_preds matrices
    #[arg(long)]
    pub preds: String,

    /// Directory where `convert` saved its config and tokenizer
    #[arg(long, default_value = "store")]
    pub store_dir: String,

    /// Treat each input line as a pre-tokenized JSON array
    #[arg(long, default_value_t = false)]
    pub tokenized: bool,
}
