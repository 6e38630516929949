// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// By programming against traits instead of concrete types,
// we can swap implementations without changing the code
// that uses them. For example:
//   - the `tokenizers` crate adapter in Layer 6 implements
//     WordPiece for production use
//   - tests implement WordPiece with a ten-word vocabulary
//     and no file I/O at all
//
// This is the Dependency Inversion Principle from SOLID,
// applied using Rust's trait system.

use crate::domain::error::PipelineError;

// ─── WordPiece ────────────────────────────────────────────────────────────────
/// The external wordpiece tokenizer, consumed as a black box.
///
/// `Send + Sync` is part of the contract: the bucketed parallel
/// converter shares one tokenizer read-only across workers.
pub trait WordPiece: Send + Sync {
    /// Split an untokenized string into token strings.
    fn tokenize(&self, text: &str) -> Result<Vec<String>, PipelineError>;

    /// Map token strings to vocabulary ids. Unknown tokens map
    /// to the [UNK] id, never to an error.
    fn convert_tokens_to_ids(&self, tokens: &[String]) -> Vec<u32>;

    /// Map vocabulary ids back to token strings.
    fn convert_ids_to_tokens(&self, ids: &[u32]) -> Vec<String>;

    /// Total number of ids in the vocabulary. Id 0 is reserved
    /// for padding everywhere in this pipeline.
    fn vocab_size(&self) -> usize;
}
