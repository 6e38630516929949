// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Three error categories cover every failure the pipeline can
// surface to a caller:
//
//   InvalidInput       — a malformed example (wrong shape, bad
//                        tokenisation input). Aborts that
//                        conversion; in the parallel path a
//                        single bad example fails the batch.
//   Configuration      — an illegal option combination, caught
//                        eagerly before any conversion work
//                        starts (probability triple out of
//                        range, batch size not divisible by
//                        the device count, ...).
//   ResourceMissing    — a required inference-time attribute is
//                        absent. Every missing attribute is
//                        reported in ONE combined message, not
//                        one at a time.
//
// "No candidate left" during noise sampling is deliberately NOT
// in this taxonomy: budgets are best-effort ceilings and
// exhausted candidates end a phase silently.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A single example has a shape the encoder cannot accept.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An illegal configuration, rejected before conversion starts.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Required inference-time attributes are absent. Each entry
    /// is `name: description`, all joined into a single message.
    #[error(
        "initialize or train the model first, or feed values for the \
         following necessary attributes before running inference: {}",
        .missing.join("; ")
    )]
    ResourceMissing { missing: Vec<String> },
}

impl PipelineError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
