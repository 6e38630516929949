// ============================================================
// Layer 2 — RecLm Facade
// ============================================================
// The single entry point callers program against. Owns the
// validated configuration and the tokenizer handle, and wires
// together converter → dataset → batcher → model seam →
// reconstructor.
//
// Configuration is validated ONCE, eagerly, at construction:
// nothing downstream ever re-checks the probability triple or
// the batch/device divisibility.

use std::sync::Arc;

use anyhow::Result;
use burn::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::batcher::RecBatcher;
use crate::data::converter::{convert_all, ConvertedData};
use crate::data::dataset::into_samples;
use crate::data::encoder::{EncoderSettings, ExampleEncoder};
use crate::data::reconstruct::{reconstruct_tokens, reconstruct_text};
use crate::data::truncate::TruncateMethod;
use crate::domain::edits::EditPredictions;
use crate::domain::error::PipelineError;
use crate::domain::example::RawExample;
use crate::domain::traits::WordPiece;
use crate::ml::model::RecModel;

use burn::data::dataloader::batcher::Batcher;

// ─── Configuration ────────────────────────────────────────────────────────────
// Every field that must be persisted or replicated to a worker
// is declared here, statically — nothing is discovered by
// reflection at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecLmConfig {
    pub max_seq_length:  usize,
    pub rep_prob:        f64,
    pub add_prob:        f64,
    pub del_prob:        f64,
    pub do_lower_case:   bool,
    pub truncate_method: TruncateMethod,
    pub batch_size:      usize,
    /// Number of compute devices batches are split across
    pub n_devices:       usize,
    /// Path to the external model weights, required for inference
    pub init_checkpoint: Option<String>,
    pub vocab_size:      usize,
}

impl Default for RecLmConfig {
    fn default() -> Self {
        Self {
            max_seq_length:  128,
            rep_prob:        0.05,
            add_prob:        0.05,
            del_prob:        0.05,
            do_lower_case:   true,
            truncate_method: TruncateMethod::Lifo,
            batch_size:      8,
            n_devices:       1,
            init_checkpoint: None,
            vocab_size:      30522,
        }
    }
}

/// Inference-time attributes audited before prediction. Missing
/// ones are reported together in one combined error.
const INFER_ATTRIBUTES: &[(&str, &str)] = &[(
    "init_checkpoint",
    "a path that directs to the checkpoint file used for initialization",
)];

// ─── Annotated output ─────────────────────────────────────────────────────────
/// Prediction output, mirroring the input shape: annotated text
/// for untokenized inputs, an annotated token list otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotated {
    Text(String),
    Tokens(Vec<String>),
}

// ─── RecLm ────────────────────────────────────────────────────────────────────
pub struct RecLm {
    config:    RecLmConfig,
    encoder:   ExampleEncoder,
    tokenizer: Arc<dyn WordPiece>,
}

impl std::fmt::Debug for RecLm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecLm")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RecLm {
    /// Build the facade, validating the whole configuration
    /// before any data is touched.
    pub fn new(config: RecLmConfig, tokenizer: Arc<dyn WordPiece>) -> Result<Self, PipelineError> {
        if config.n_devices > 1 && config.batch_size % config.n_devices != 0 {
            return Err(PipelineError::configuration(format!(
                "`batch_size` should be evenly divided by the number of \
                 devices, but got {} and {}",
                config.batch_size, config.n_devices,
            )));
        }

        let settings = EncoderSettings::new(
            config.max_seq_length,
            config.rep_prob,
            config.add_prob,
            config.del_prob,
            config.truncate_method,
        )?;
        let encoder = ExampleEncoder::new(settings, Arc::clone(&tokenizer));

        Ok(Self { config, encoder, tokenizer })
    }

    pub fn config(&self) -> &RecLmConfig {
        &self.config
    }

    /// Convert raw inputs into merged columnar data.
    ///
    /// This objective is self-supervised: labels are synthesized
    /// by the noise sampler, so `y` must be None.
    pub fn convert(
        &self,
        inputs:        &[RawExample],
        y:             Option<&[Value]>,
        sample_weight: Option<&[f32]>,
        is_training:   bool,
        pool:          Option<&ThreadPool>,
    ) -> Result<ConvertedData, PipelineError> {
        if y.is_some() {
            return Err(PipelineError::invalid_input(
                "this module is unsupervised; `y` should be None",
            ));
        }
        convert_all(&self.encoder, inputs, sample_weight, is_training, pool)
    }

    /// Run inference end to end: convert, batch, forward through
    /// the opaque model, and render annotated output per example.
    pub fn predict<B, M>(
        &self,
        inputs: &[RawExample],
        model:  &M,
        device: &B::Device,
        pool:   Option<&ThreadPool>,
    ) -> Result<Vec<Annotated>>
    where
        B: Backend,
        M: RecModel<B>,
    {
        self.audit_infer_attributes()?;

        let data = self.convert(inputs, None, None, false, pool)?;
        let samples = into_samples(&data);

        // ── Batched forward passes ────────────────────────────────────────────
        let batcher = RecBatcher::<B>::new(device.clone());
        let mut rep_preds: Vec<Vec<u32>> = Vec::with_capacity(samples.len());
        let mut add_preds: Vec<Vec<u32>> = Vec::with_capacity(samples.len());
        let mut del_preds: Vec<Vec<u32>> = Vec::with_capacity(samples.len());

        for chunk in samples.chunks(self.config.batch_size.max(1)) {
            let batch = batcher.batch(chunk.to_vec());
            let output = model.forward(&batch)?;
            rep_preds.extend(output.preds.rep_preds);
            add_preds.extend(output.preds.add_preds);
            del_preds.extend(output.preds.del_preds);
        }

        // ── Render annotations in input order ─────────────────────────────────
        let mut annotated = Vec::with_capacity(inputs.len());
        for (i, example) in inputs.iter().enumerate() {
            let input_length = data.input_ids[i].iter().filter(|&&id| id != 0).count();
            let preds = EditPredictions {
                rep: rep_preds[i].clone(),
                add: add_preds[i].clone(),
                del: del_preds[i].clone(),
            };
            annotated.push(self.render(example, &data.tokens[i], &preds, input_length));
        }
        Ok(annotated)
    }

    /// Render one example's predictions in the shape it came in.
    pub fn render(
        &self,
        example:      &RawExample,
        tokens:       &[String],
        preds:        &EditPredictions,
        input_length: usize,
    ) -> Annotated {
        match example {
            RawExample::Tokens(_) => Annotated::Tokens(reconstruct_tokens(
                tokens,
                preds,
                input_length,
                self.tokenizer.as_ref(),
            )),
            RawExample::Text(text) => Annotated::Text(reconstruct_text(
                text,
                tokens,
                preds,
                input_length,
                self.config.do_lower_case,
                self.tokenizer.as_ref(),
            )),
        }
    }

    /// Check every inference-time attribute and report ALL the
    /// missing ones at once.
    fn audit_infer_attributes(&self) -> Result<(), PipelineError> {
        let mut missing = Vec::new();
        for (name, description) in INFER_ATTRIBUTES {
            let present = match *name {
                "init_checkpoint" => self.config.init_checkpoint.is_some(),
                _ => true,
            };
            if !present {
                missing.push(format!("`{name}`: {description}"));
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::ResourceMissing { missing })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::batcher::RecBatch;
    use crate::domain::testutil::TinyVocab;
    use crate::ml::model::{BatchPredictions, RecModelOutput};
    use std::collections::HashMap;

    type TestBackend = burn::backend::NdArray;

    /// A model that finds nothing wrong, ever.
    struct ZeroModel;

    impl RecModel<TestBackend> for ZeroModel {
        fn forward(&self, batch: &RecBatch<TestBackend>) -> Result<RecModelOutput> {
            let [n, s] = batch.input_ids.dims();
            Ok(RecModelOutput {
                total_loss: 0.0,
                losses: HashMap::new(),
                probs: HashMap::new(),
                preds: BatchPredictions {
                    rep_preds: vec![vec![0; s]; n],
                    add_preds: vec![vec![0; s]; n],
                    del_preds: vec![vec![0; s]; n],
                },
            })
        }
    }

    /// A model convinced every first token is spurious.
    struct DelFirstModel;

    impl RecModel<TestBackend> for DelFirstModel {
        fn forward(&self, batch: &RecBatch<TestBackend>) -> Result<RecModelOutput> {
            let [n, s] = batch.input_ids.dims();
            let mut del = vec![vec![0; s]; n];
            for row in &mut del {
                row[0] = 1;
            }
            Ok(RecModelOutput {
                preds: BatchPredictions {
                    rep_preds: vec![vec![0; s]; n],
                    add_preds: vec![vec![0; s]; n],
                    del_preds: del,
                },
                ..RecModelOutput::default()
            })
        }
    }

    fn facade(init_checkpoint: Option<&str>) -> RecLm {
        let config = RecLmConfig {
            max_seq_length: 8,
            batch_size: 2,
            init_checkpoint: init_checkpoint.map(str::to_string),
            ..RecLmConfig::default()
        };
        RecLm::new(config, Arc::new(TinyVocab::new())).unwrap()
    }

    #[test]
    fn test_batch_size_must_divide_by_devices() {
        let config = RecLmConfig {
            batch_size: 7,
            n_devices: 2,
            ..RecLmConfig::default()
        };
        let err = RecLm::new(config, Arc::new(TinyVocab::new())).unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn test_labels_are_rejected() {
        let lm = facade(None);
        let inputs = [RawExample::Text("the cat".into())];
        let y = [serde_json::json!(1)];
        let err = lm
            .convert(&inputs, Some(&y), None, true, None)
            .unwrap_err();
        assert!(err.to_string().contains("unsupervised"));
    }

    #[test]
    fn test_predict_without_checkpoint_is_resource_missing() {
        let lm = facade(None);
        let inputs = [RawExample::Text("the cat".into())];
        let device = Default::default();
        let err = lm
            .predict::<TestBackend, _>(&inputs, &ZeroModel, &device, None)
            .unwrap_err();
        let err = err.downcast::<PipelineError>().unwrap();
        assert!(matches!(err, PipelineError::ResourceMissing { .. }));
        assert!(err.to_string().contains("init_checkpoint"));
    }

    #[test]
    fn test_round_trip_with_zero_predictions() {
        // Encoding then reconstructing with an all-zero model
        // must reproduce the original text unchanged.
        let lm = facade(Some("weights.ckpt"));
        let inputs = [
            RawExample::Text("the cat sat on the mat".into()),
            RawExample::Tokens(vec!["a".into(), "big".into(), "hat".into()]),
        ];
        let device = Default::default();
        let out = lm
            .predict::<TestBackend, _>(&inputs, &ZeroModel, &device, None)
            .unwrap();
        assert_eq!(
            out[0],
            Annotated::Text("the cat sat on the mat".to_string())
        );
        assert_eq!(
            out[1],
            Annotated::Tokens(vec!["a".into(), "big".into(), "hat".into()])
        );
    }

    #[test]
    fn test_predictions_render_as_annotations() {
        let lm = facade(Some("weights.ckpt"));
        let inputs = [
            RawExample::Text("the cat".into()),
            RawExample::Text("a dog ran".into()),
            RawExample::Text("the mat".into()),
        ];
        let device = Default::default();
        // batch_size 2 forces two forward passes; row order must
        // still line up with input order.
        let out = lm
            .predict::<TestBackend, _>(&inputs, &DelFirstModel, &device, None)
            .unwrap();
        assert_eq!(out[0], Annotated::Text("{del:the} cat".to_string()));
        assert_eq!(out[1], Annotated::Text("{del:a} dog ran".to_string()));
        assert_eq!(out[2], Annotated::Text("{del:the} mat".to_string()));
    }
}
