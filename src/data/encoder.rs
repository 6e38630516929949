// ============================================================
// Layer 4 — Example Encoder
// ============================================================
// Turns ONE raw example into the fixed-length id sequence and,
// when training, the noise-sampled label triple.
//
// Steps, in order:
//   1. Resolve the example to a flat token sequence (tokenize
//      untokenized text via the external WordPiece tokenizer)
//   2. Truncate to max_seq_length under the configured policy
//   3. Map tokens to ids and right-pad with 0
//   4. Training only: draw the edit budget categorically over
//      {rep, add, del} and run the noise sampler
//   5. Keep the raw tokens so prediction can align them back
//      onto the original text
//
// The encoder is a plain value: cloning it gives a worker an
// isolated snapshot of the configuration plus a shared read-only
// handle on the tokenizer, which is exactly what the parallel
// converter needs.

use std::sync::Arc;

use rand::distributions::WeightedIndex;
use rand::Rng;

use crate::data::noise::{sample_wrong_tokens, EditBudget, LabeledSequence, PAD_ID};
use crate::data::truncate::{truncate_tokens, TruncateMethod};
use crate::domain::error::PipelineError;
use crate::domain::example::RawExample;
use crate::domain::traits::WordPiece;

// ─── Settings ─────────────────────────────────────────────────────────────────
/// The statically declared configuration snapshot an encoder
/// runs with. Every field that influences encoding is listed
/// here explicitly; workers replicate this value, never a live
/// reference.
#[derive(Debug, Clone)]
pub struct EncoderSettings {
    pub max_seq_length:  usize,
    pub truncate_method: TruncateMethod,
    /// Raw probability sum, in (0, 1); scales the total budget
    pub all_prob:        f64,
    /// Normalized [rep, add, del] weights for the budget draw
    pub probs:           [f64; 3],
}

impl EncoderSettings {
    /// Validate and normalize the raw probability triple.
    ///
    /// Each probability must be >= 0 and the sum must lie
    /// strictly between 0 and 1; violations are configuration
    /// errors raised before any conversion work begins.
    pub fn new(
        max_seq_length:  usize,
        rep_prob:        f64,
        add_prob:        f64,
        del_prob:        f64,
        truncate_method: TruncateMethod,
    ) -> Result<Self, PipelineError> {
        if max_seq_length == 0 {
            return Err(PipelineError::configuration(
                "`max_seq_length` must be a positive integer",
            ));
        }
        if rep_prob < 0.0 || add_prob < 0.0 || del_prob < 0.0 {
            return Err(PipelineError::configuration(format!(
                "`rep_prob`, `add_prob` and `del_prob` must each be >= 0, \
                 got ({rep_prob}, {add_prob}, {del_prob})"
            )));
        }
        let all_prob = rep_prob + add_prob + del_prob;
        if all_prob <= 0.0 || all_prob >= 1.0 {
            return Err(PipelineError::configuration(format!(
                "the sum of `rep_prob`, `add_prob` and `del_prob` should be \
                 larger than 0 and smaller than 1, got {all_prob}"
            )));
        }
        Ok(Self {
            max_seq_length,
            truncate_method,
            all_prob,
            probs: [
                rep_prob / all_prob,
                add_prob / all_prob,
                del_prob / all_prob,
            ],
        })
    }
}

// ─── Encoded output ───────────────────────────────────────────────────────────
/// One fully encoded example. `input_ids` always has exactly
/// `max_seq_length` entries; the label columns are empty unless
/// the example was encoded for training.
#[derive(Debug, Clone)]
pub struct EncodedExample {
    pub input_ids:     Vec<u32>,
    pub rep_label_ids: Vec<u32>,
    pub add_label_ids: Vec<u32>,
    pub del_label_ids: Vec<u32>,
    /// The truncated token strings, kept for answer alignment
    pub tokens:        Vec<String>,
}

// ─── Encoder ──────────────────────────────────────────────────────────────────
#[derive(Clone)]
pub struct ExampleEncoder {
    settings:  EncoderSettings,
    tokenizer: Arc<dyn WordPiece>,
}

impl ExampleEncoder {
    pub fn new(settings: EncoderSettings, tokenizer: Arc<dyn WordPiece>) -> Self {
        Self { settings, tokenizer }
    }

    /// Encode one example. `is_training` switches the noise
    /// sampler on and fills the label triple.
    pub fn encode<R: Rng>(
        &self,
        example:     &RawExample,
        is_training: bool,
        rng:         &mut R,
    ) -> Result<EncodedExample, PipelineError> {
        // ── Step 1: resolve to a flat token sequence ──────────────────────────
        let mut tokens = match example {
            RawExample::Text(text) => self.tokenizer.tokenize(text)?,
            RawExample::Tokens(tokens) => tokens.clone(),
        };

        // ── Step 2: truncate to fit ───────────────────────────────────────────
        truncate_tokens(&mut tokens, self.settings.max_seq_length, self.settings.truncate_method);

        // ── Step 3: ids + right padding ───────────────────────────────────────
        let mut input_ids = self.tokenizer.convert_tokens_to_ids(&tokens);
        let nonpad_seq_length = input_ids.len();
        input_ids.resize(self.settings.max_seq_length, PAD_ID);

        // ── Step 4: corruption sampling (training only) ───────────────────────
        if !is_training {
            return Ok(EncodedExample {
                input_ids,
                rep_label_ids: Vec::new(),
                add_label_ids: Vec::new(),
                del_label_ids: Vec::new(),
                tokens,
            });
        }

        let budget = self.draw_budget(nonpad_seq_length, rng);
        let mut seq = LabeledSequence::from_ids(&input_ids);
        sample_wrong_tokens(&mut seq, budget, self.tokenizer.vocab_size(), rng);
        let (input_ids, rep_label_ids, add_label_ids, del_label_ids) = seq.into_columns();

        Ok(EncodedExample {
            input_ids,
            rep_label_ids,
            add_label_ids,
            del_label_ids,
            tokens,
        })
    }

    /// Draw `round(nonpad_seq_length * all_prob)` categorical
    /// samples over {rep, add, del} and count them per type.
    fn draw_budget<R: Rng>(&self, nonpad_seq_length: usize, rng: &mut R) -> EditBudget {
        let max_all = (nonpad_seq_length as f64 * self.settings.all_prob).round() as usize;
        let mut counts = [0usize; 3];

        // The weights are validated at construction: non-negative
        // with a positive sum, so the distribution always builds.
        if let Ok(dist) = WeightedIndex::new(self.settings.probs) {
            for _ in 0..max_all {
                counts[rng.sample(&dist)] += 1;
            }
        }

        EditBudget {
            max_rep: counts[0],
            max_add: counts[1],
            max_del: counts[2],
        }
    }
}
