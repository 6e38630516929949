// ============================================================
// Layer 4 — Bucketed Parallel Converter
// ============================================================
// Fans the input collection out over a worker pool and merges
// the encoded results back in ORIGINAL input order.
//
// How the fan-out works:
//   n_buckets = max(min(n_inputs, n_workers), 1)
//   example i  →  bucket (i mod n_buckets)
//
// Round-robin (not contiguous chunks) bounds the size skew of
// any bucket to 1 and makes the assignment deterministic, so
// the merge can invert it exactly:
//
//   output position i  =  bucket (i mod n_buckets),
//                         local offset (i div n_buckets)
//
// Each bucket is owned by exactly one worker, which runs it to
// completion with a cloned encoder (configuration snapshot plus
// a shared read-only tokenizer handle). The merge blocks until
// every worker returns, sorts bucket outputs by bucket index to
// defend against completion-order nondeterminism, then
// interleaves every column. A failing worker fails the whole
// conversion; there is no partial-failure tolerance.
//
// The sequential path (`pool` absent or single-threaded) is the
// only bit-reproducible mode: worker-local RNGs are not seeded
// deterministically across threads.

use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};

use crate::data::encoder::ExampleEncoder;
use crate::domain::error::PipelineError;
use crate::domain::example::RawExample;

// ─── ConvertedData ────────────────────────────────────────────────────────────
/// The merged columnar output of one conversion call, keyed by
/// field name when serialized. Label columns exist only for
/// training conversions; tokens are an in-memory backup for
/// answer alignment and are never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertedData {
    pub input_ids: Vec<Vec<u32>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rep_label_ids: Option<Vec<Vec<u32>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_label_ids: Option<Vec<Vec<u32>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub del_label_ids: Option<Vec<Vec<u32>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_weight: Option<Vec<f32>>,

    #[serde(skip)]
    pub tokens: Vec<Vec<String>>,
}

impl ConvertedData {
    pub fn n_inputs(&self) -> usize {
        self.input_ids.len()
    }
}

// ─── Buckets ──────────────────────────────────────────────────────────────────
/// One worker's share of the input, tagged with its original
/// bucket index for reassembly.
struct Bucket {
    index:    usize,
    examples: Vec<RawExample>,
    weights:  Option<Vec<f32>>,
}

struct BucketOutput {
    index: usize,
    data:  ConvertedData,
}

/// Round-robin distribution: example i goes to bucket i mod n.
fn make_buckets(
    inputs:  &[RawExample],
    weights: Option<&[f32]>,
    n_buckets: usize,
) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = (0..n_buckets)
        .map(|index| Bucket {
            index,
            examples: Vec::new(),
            weights:  weights.map(|_| Vec::new()),
        })
        .collect();

    for (i, example) in inputs.iter().enumerate() {
        let bucket = &mut buckets[i % n_buckets];
        bucket.examples.push(example.clone());
        if let (Some(ws), Some(all)) = (bucket.weights.as_mut(), weights) {
            ws.push(all[i]);
        }
    }
    buckets
}

/// Inverse of the round-robin assignment: cycle through the
/// per-bucket columns in bucket order, taking one element per
/// bucket per round, so output position i comes from bucket
/// (i mod n) at local offset (i div n).
fn interleave<T>(per_bucket: Vec<Vec<T>>) -> Vec<T> {
    let n_buckets = per_bucket.len();
    let total: usize = per_bucket.iter().map(Vec::len).sum();
    let mut iters: Vec<_> = per_bucket.into_iter().map(Vec::into_iter).collect();

    let mut out = Vec::with_capacity(total);
    for i in 0..total {
        if let Some(item) = iters[i % n_buckets].next() {
            out.push(item);
        }
    }
    debug_assert_eq!(out.len(), total, "bucket size skew exceeded 1");
    out
}

// ─── Conversion ───────────────────────────────────────────────────────────────

/// Run one bucket to completion, sequentially, in input order.
/// This is also the whole story for the non-parallel path.
fn convert_bucket(
    encoder:     &ExampleEncoder,
    bucket:      Bucket,
    is_training: bool,
) -> Result<BucketOutput, PipelineError> {
    let n = bucket.examples.len();
    let mut rng = rand::thread_rng();

    let mut input_ids = Vec::with_capacity(n);
    let mut rep_label_ids = Vec::with_capacity(n);
    let mut add_label_ids = Vec::with_capacity(n);
    let mut del_label_ids = Vec::with_capacity(n);
    let mut tokens = Vec::with_capacity(n);

    for example in &bucket.examples {
        let encoded = encoder.encode(example, is_training, &mut rng)?;
        input_ids.push(encoded.input_ids);
        if is_training {
            rep_label_ids.push(encoded.rep_label_ids);
            add_label_ids.push(encoded.add_label_ids);
            del_label_ids.push(encoded.del_label_ids);
        }
        tokens.push(encoded.tokens);
    }

    // Absent weights default to 1.0 per example when training
    let sample_weight = if is_training {
        Some(bucket.weights.unwrap_or_else(|| vec![1.0; n]))
    } else {
        None
    };

    Ok(BucketOutput {
        index: bucket.index,
        data: ConvertedData {
            input_ids,
            rep_label_ids: is_training.then_some(rep_label_ids),
            add_label_ids: is_training.then_some(add_label_ids),
            del_label_ids: is_training.then_some(del_label_ids),
            sample_weight,
            tokens,
        },
    })
}

/// Convert the whole input collection, optionally on a worker
/// pool. The merged output preserves input order exactly,
/// regardless of worker completion order.
pub fn convert_all(
    encoder:       &ExampleEncoder,
    inputs:        &[RawExample],
    sample_weight: Option<&[f32]>,
    is_training:   bool,
    pool:          Option<&ThreadPool>,
) -> Result<ConvertedData, PipelineError> {
    let n_inputs = inputs.len();

    if let Some(weights) = sample_weight {
        if weights.len() != n_inputs {
            return Err(PipelineError::invalid_input(format!(
                "length of `sample_weight` should be the same as the inputs \
                 ({} vs. {})",
                weights.len(),
                n_inputs,
            )));
        }
    }

    let n_workers = pool.map_or(1, ThreadPool::current_num_threads);

    // Degenerate case: sequential, reproducible, no bucketing
    let pool = match pool {
        Some(p) if n_workers > 1 && n_inputs > 1 => p,
        _ => {
            let bucket = Bucket {
                index:    0,
                examples: inputs.to_vec(),
                weights:  sample_weight.map(<[f32]>::to_vec),
            };
            return Ok(convert_bucket(encoder, bucket, is_training)?.data);
        }
    };

    let n_buckets = n_inputs.min(n_workers).max(1);
    tracing::info!(
        "Parsing {} inputs on {} parallel workers ({} buckets)",
        n_inputs,
        n_workers,
        n_buckets,
    );

    let buckets = make_buckets(inputs, sample_weight, n_buckets);

    // Barrier: install() blocks until every bucket has returned;
    // the first worker error aborts the whole batch.
    let mut outputs: Vec<BucketOutput> = pool.install(|| {
        buckets
            .into_par_iter()
            .map(|bucket| {
                let worker_encoder = encoder.clone();
                convert_bucket(&worker_encoder, bucket, is_training)
            })
            .collect::<Result<Vec<_>, _>>()
    })?;

    // Defend against completion-order nondeterminism
    outputs.sort_by_key(|o| o.index);

    let mut input_cols = Vec::with_capacity(n_buckets);
    let mut rep_cols = Vec::with_capacity(n_buckets);
    let mut add_cols = Vec::with_capacity(n_buckets);
    let mut del_cols = Vec::with_capacity(n_buckets);
    let mut weight_cols = Vec::with_capacity(n_buckets);
    let mut token_cols = Vec::with_capacity(n_buckets);
    for output in outputs {
        input_cols.push(output.data.input_ids);
        if let Some(col) = output.data.rep_label_ids {
            rep_cols.push(col);
        }
        if let Some(col) = output.data.add_label_ids {
            add_cols.push(col);
        }
        if let Some(col) = output.data.del_label_ids {
            del_cols.push(col);
        }
        if let Some(col) = output.data.sample_weight {
            weight_cols.push(col);
        }
        token_cols.push(output.data.tokens);
    }

    Ok(ConvertedData {
        input_ids: interleave(input_cols),
        rep_label_ids: is_training.then(|| interleave(rep_cols)),
        add_label_ids: is_training.then(|| interleave(add_cols)),
        del_label_ids: is_training.then(|| interleave(del_cols)),
        sample_weight: is_training.then(|| interleave(weight_cols)),
        tokens: interleave(token_cols),
    })
}
