// ============================================================
// Layer 4 — Truncation Policies
// ============================================================
// Over-long token sequences must be cut down to max_seq_length
// before encoding. Which end gets cut is a policy decision:
//
//   LIFO — drop the most recently appended tokens (the tail).
//          The beginning of the sequence survives.
//   FIFO — drop the oldest tokens (the head). The end of the
//          sequence survives.
//
// The policy is selected by configuration and applied in place.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum TruncateMethod {
    /// Last in, first out — truncate from the back
    Lifo,
    /// First in, first out — truncate from the front
    Fifo,
}

impl fmt::Display for TruncateMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TruncateMethod::Lifo => write!(f, "lifo"),
            TruncateMethod::Fifo => write!(f, "fifo"),
        }
    }
}

/// Truncate `tokens` in place so that `tokens.len() <= max_length`.
pub fn truncate_tokens(tokens: &mut Vec<String>, max_length: usize, method: TruncateMethod) {
    if tokens.len() <= max_length {
        return;
    }
    match method {
        TruncateMethod::Lifo => tokens.truncate(max_length),
        TruncateMethod::Fifo => {
            let excess = tokens.len() - max_length;
            tokens.drain(..excess);
        }
    }
}
