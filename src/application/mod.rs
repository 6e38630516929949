// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// a specific goal (converting a corpus or annotating it with
// model predictions).
//
// Rules for this layer:
//   - No sampling math or tensor code here
//   - No UI or printing here (that's Layer 1)
//   - No direct file parsing here (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Think of this layer as the "director" — it tells other
// layers what to do but doesn't do the work itself.

// The language-model facade: config validation, conversion and
// prediction entry points
pub mod rec_lm;

// The corpus-conversion workflow
pub mod convert_use_case;

// The prediction-rendering workflow
pub mod annotate_use_case;
