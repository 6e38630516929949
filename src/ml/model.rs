use std::collections::HashMap;

use anyhow::Result;
use burn::prelude::*;

use crate::data::batcher::RecBatch;

/// Per-position discrete predictions for one batch, one row per
/// example. Each row has max_seq_length entries; value 0 means
/// "no edit of that type predicted here".
#[derive(Debug, Clone, Default)]
pub struct BatchPredictions {
    pub rep_preds: Vec<Vec<u32>>,
    pub add_preds: Vec<Vec<u32>>,
    pub del_preds: Vec<Vec<u32>>,
}

/// Everything a forward pass returns, mirroring the three-head
/// layout: a scalar total loss, named sub-losses, named
/// per-position probability rows, and discrete predictions.
#[derive(Debug, Clone, Default)]
pub struct RecModelOutput {
    pub total_loss: f32,
    pub losses:     HashMap<String, f32>,
    pub probs:      HashMap<String, Vec<Vec<f32>>>,
    pub preds:      BatchPredictions,
}

/// The opaque correction model. The pipeline feeds it batches
/// and consumes its outputs; what happens in between is not
/// this crate's business.
pub trait RecModel<B: Backend> {
    fn forward(&self, batch: &RecBatch<B>) -> Result<RecModelOutput>;
}
