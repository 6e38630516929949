// ============================================================
// Layer 2 — AnnotateUseCase
// ============================================================
// Renders an external model's prediction file back onto the
// original corpus as human-readable annotations:
//
//   Step 1: Load the saved config       (Layer 6 - infra)
//   Step 2: Load the saved tokenizer    (Layer 6 - infra)
//   Step 3: Re-convert the corpus       (Layer 4 - data)
//   Step 4: Read the prediction file    (Layer 6 - infra)
//   Step 5: Reconstruct each example    (Layer 4 - data)
//
// Step 3 must reproduce the conversion that the predictions
// were computed against, which is why the config and tokenizer
// come from the store rather than the command line.

use anyhow::Result;
use std::sync::Arc;

use crate::application::rec_lm::{Annotated, RecLm};
use crate::domain::edits::EditPredictions;
use crate::domain::error::PipelineError;
use crate::infra::dataset_store::DatasetStore;
use crate::infra::tokenizer_store::TokenizerStore;

// ─── AnnotateUseCase ──────────────────────────────────────────────────────────
pub struct AnnotateUseCase {
    input:     String,
    preds:     String,
    store_dir: String,
    tokenized: bool,
}

impl AnnotateUseCase {
    pub fn new(input: String, preds: String, store_dir: String, tokenized: bool) -> Self {
        Self { input, preds, store_dir, tokenized }
    }

    /// Execute the annotation pipeline, returning one printable
    /// line per input example.
    pub fn execute(&self) -> Result<Vec<String>> {
        // ── Step 1: Load config from the convert run ──────────────────────────
        let store = DatasetStore::new(&self.store_dir);
        let config = store.load_config()?;

        // ── Step 2: Load the saved tokenizer ──────────────────────────────────
        let tok_store = TokenizerStore::new(&self.store_dir);
        let tokenizer = tok_store.load()?;

        let lm = RecLm::new(config, Arc::new(tokenizer))?;

        // ── Step 3: Re-convert the corpus without noise ───────────────────────
        let examples = DatasetStore::read_examples(&self.input, self.tokenized)?;
        let data = lm.convert(&examples, None, None, false, None)?;

        // ── Step 4: Read predictions ──────────────────────────────────────────
        let preds = DatasetStore::read_predictions(&self.preds)?;
        let n = data.n_inputs();
        for (name, rows) in [
            ("rep_preds", preds.rep_preds.len()),
            ("add_preds", preds.add_preds.len()),
            ("del_preds", preds.del_preds.len()),
        ] {
            if rows != n {
                return Err(PipelineError::invalid_input(format!(
                    "`{name}` has {rows} rows but the corpus has {n} examples",
                ))
                .into());
            }
        }

        // ── Step 5: Reconstruct each example ──────────────────────────────────
        let mut lines = Vec::with_capacity(n);
        for (i, example) in examples.iter().enumerate() {
            let input_length = data.input_ids[i].iter().filter(|&&id| id != 0).count();
            // Every row must cover the example's real tokens, or
            // reconstruction would index past the row's end.
            for (name, width) in [
                ("rep_preds", preds.rep_preds[i].len()),
                ("add_preds", preds.add_preds[i].len()),
                ("del_preds", preds.del_preds[i].len()),
            ] {
                if width < input_length {
                    return Err(PipelineError::invalid_input(format!(
                        "`{name}` row {i} has {width} positions but example {i} \
                         has {input_length} tokens",
                    ))
                    .into());
                }
            }
            let example_preds = EditPredictions {
                rep: preds.rep_preds[i].clone(),
                add: preds.add_preds[i].clone(),
                del: preds.del_preds[i].clone(),
            };
            let line = match lm.render(example, &data.tokens[i], &example_preds, input_length) {
                Annotated::Text(t) => t,
                Annotated::Tokens(ts) => serde_json::to_string(&ts)?,
            };
            lines.push(line);
        }
        Ok(lines)
    }
}
