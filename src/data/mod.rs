// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from raw caller input all the
// way to GPU-ready tensor batches.
//
// The pipeline flows in this order:
//
//   raw examples (text or token lists)
//       │
//       ▼
//   Truncation        → fits token sequences into max_seq_length
//       │
//       ▼
//   ExampleEncoder    → tokens to ids, right-padding, and (when
//       │               training) the noise-sampled label triple
//       ▼
//   NoiseSampler      → in-place add/rep/del corruption with
//       │               exact-budget label bookkeeping
//       ▼
//   Converter         → round-robin bucketing, worker fan-out,
//       │               order-preserving fan-in
//       ▼
//   RecDataset        → implements Burn's Dataset trait
//       │
//       ▼
//   RecBatcher        → stacks samples into tensor batches
//
// At prediction time two extra modules run after the model:
//
//   align.rs          → token-to-character span mapping
//   reconstruct.rs    → renders {rep:..}/{add:..}/{del:..}
//                       annotations into tokens or text
//
// Each module is responsible for exactly one step.

/// Truncation policies for over-long token sequences
pub mod truncate;

/// The add → rep → del corruption sampler
pub mod noise;

/// Encodes one raw example into ids + label triple
pub mod encoder;

/// Bucketed parallel conversion with ordered reassembly
pub mod converter;

/// Token/character alignment for untokenized inputs
pub mod align;

/// Renders model predictions back into annotated output
pub mod reconstruct;

/// Implements Burn's Dataset trait for converted samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
