// ============================================================
// Layer 2 — ConvertUseCase
// ============================================================
// Orchestrates the full corpus-conversion pipeline in order:
//
//   Step 1: Read the corpus file        (Layer 6 - infra)
//   Step 2: Build / load tokenizer      (Layer 6 - infra)
//   Step 3: Build the facade            (Layer 2 - rec_lm)
//   Step 4: Spin up the worker pool     (Layer 2 - here)
//   Step 5: Convert, in parallel        (Layer 4 - data)
//   Step 6: Persist data and config     (Layer 6 - infra)

use anyhow::Result;
use std::sync::Arc;

use crate::application::rec_lm::{RecLm, RecLmConfig};
use crate::domain::example::RawExample;
use crate::infra::{
    dataset_store::DatasetStore,
    tokenizer_store::TokenizerStore,
};

// ─── ConvertUseCase ───────────────────────────────────────────────────────────
pub struct ConvertUseCase {
    config:    RecLmConfig,
    input:     String,
    store_dir: String,
    tokenized: bool,
    training:  bool,
    workers:   usize,
}

impl ConvertUseCase {
    pub fn new(
        config:    RecLmConfig,
        input:     String,
        store_dir: String,
        tokenized: bool,
        training:  bool,
        workers:   usize,
    ) -> Self {
        Self { config, input, store_dir, tokenized, training, workers }
    }

    /// Execute the full conversion pipeline end to end
    pub fn execute(&self) -> Result<()> {
        // ── Step 1: Read the corpus ───────────────────────────────────────────
        tracing::info!("Reading corpus from '{}'", self.input);
        let examples = DatasetStore::read_examples(&self.input, self.tokenized)?;
        tracing::info!("Read {} examples", examples.len());

        // ── Step 2: Build / load tokenizer ────────────────────────────────────
        // Tokenized inputs are re-joined with spaces purely for
        // vocabulary counting; conversion uses the token lists.
        let texts: Vec<String> = examples
            .iter()
            .map(|ex| match ex {
                RawExample::Text(t) => t.clone(),
                RawExample::Tokens(ts) => ts.join(" "),
            })
            .collect();
        let tok_store = TokenizerStore::new(&self.store_dir);
        let tokenizer = tok_store.load_or_build(
            &texts,
            self.config.vocab_size,
            self.config.do_lower_case,
        )?;

        // ── Step 3: Build the facade ──────────────────────────────────────────
        let lm = RecLm::new(self.config.clone(), Arc::new(tokenizer))?;

        // ── Step 4: Worker pool, only when asked for ──────────────────────────
        let pool = if self.workers > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(self.workers)
                    .build()?,
            )
        } else {
            None
        };

        // ── Step 5: Convert ───────────────────────────────────────────────────
        let data = lm.convert(&examples, None, None, self.training, pool.as_ref())?;
        tracing::info!(
            "Converted {} examples ({})",
            data.n_inputs(),
            if self.training { "with noise labels" } else { "inference mode" },
        );

        // ── Step 6: Persist ───────────────────────────────────────────────────
        let store = DatasetStore::new(&self.store_dir);
        store.save_converted(&data)?;
        store.save_config(lm.config())?;

        Ok(())
    }
}
