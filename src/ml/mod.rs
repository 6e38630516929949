// ============================================================
// Layer 5 — ML / Model Seam (Burn)
// ============================================================
// This layer contains ALL Burn framework specific surface.
// No other layer imports from burn directly — only this one and
// the dataset/batcher pair in Layer 4.
//
// The network itself is an external collaborator: the pipeline
// never sees its architecture, loss math or gradients. It only
// knows the `RecModel` trait — tensors in, named losses /
// probabilities / discrete predictions out. Anything that
// implements the trait (a real RecBERT encoder, a remote
// inference service, a test stub) plugs into the prediction
// path unchanged.

/// The opaque model contract and its output types
pub mod model;
