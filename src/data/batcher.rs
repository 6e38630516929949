// ============================================================
// Layer 4 — Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<RecSample>
// into tensors the model seam consumes.
//
// How batching works here:
//   Input:  Vec of N RecSamples, each with sequences of length S
//   Output: RecBatch with Int tensors of shape [N, S]
//
//   We flatten each column into one long Vec, then reshape:
//   [s1_t1, ..., s1_tS, s2_t1, ..., sN_tS] → [N, S]
//
// All sequences are already padded to max_seq_length by the
// encoder, so no dynamic padding is needed at this stage. Label
// tensors are present only when the first sample carries labels
// (training batches); sample weights ride along as a [N] float
// tensor either way.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::RecSample;

// ─── RecBatch ─────────────────────────────────────────────────────────────────
/// A batch of converted samples ready for the model forward
/// pass. All tensors have batch_size as their first dimension.
#[derive(Debug, Clone)]
pub struct RecBatch<B: Backend> {
    /// Token id sequences — shape: [batch_size, seq_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// Replacement labels — shape: [batch_size, seq_len]
    pub rep_label_ids: Option<Tensor<B, 2, Int>>,

    /// Omission labels — shape: [batch_size, seq_len]
    pub add_label_ids: Option<Tensor<B, 2, Int>>,

    /// Spurious-token flags — shape: [batch_size, seq_len]
    pub del_label_ids: Option<Tensor<B, 2, Int>>,

    /// Per-example loss weights — shape: [batch_size]
    pub sample_weight: Tensor<B, 1>,
}

impl<B: Backend> RecBatch<B> {
    pub fn batch_size(&self) -> usize {
        self.input_ids.dims()[0]
    }
}

// ─── RecBatcher ───────────────────────────────────────────────────────────────
/// Holds the target device so tensors are created on the
/// correct GPU/CPU.
#[derive(Clone, Debug)]
pub struct RecBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> RecBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    fn stack_column<F>(&self, items: &[RecSample], col: F) -> Tensor<B, 2, Int>
    where
        F: Fn(&RecSample) -> &[u32],
    {
        let batch_size = items.len();
        let seq_len = items.first().map_or(0, |s| col(s).len());
        let flat: Vec<i32> = items
            .iter()
            .flat_map(|s| col(s).iter().map(|&x| x as i32))
            .collect();
        Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len])
    }
}

impl<B: Backend> Batcher<RecSample, RecBatch<B>> for RecBatcher<B> {
    fn batch(&self, items: Vec<RecSample>) -> RecBatch<B> {
        // All sequences share the same pre-padded length; an
        // empty batch yields zero-row tensors.
        let with_labels = items.first().is_some_and(RecSample::has_labels);

        let input_ids = self.stack_column(&items, |s| &s.input_ids);
        let rep_label_ids =
            with_labels.then(|| self.stack_column(&items, |s| &s.rep_label_ids));
        let add_label_ids =
            with_labels.then(|| self.stack_column(&items, |s| &s.add_label_ids));
        let del_label_ids =
            with_labels.then(|| self.stack_column(&items, |s| &s.del_label_ids));

        let weights: Vec<f32> = items.iter().map(|s| s.sample_weight).collect();
        let sample_weight = Tensor::<B, 1>::from_floats(weights.as_slice(), &self.device);

        RecBatch {
            input_ids,
            rep_label_ids,
            add_label_ids,
            del_label_ids,
            sample_weight,
        }
    }
}
