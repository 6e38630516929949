// ============================================================
// Layer 3 — Prediction Triples
// ============================================================
// The model learns three kinds of corruption, each with its own
// label sequence and its own prediction head:
//
//   rep — a token was REPLACED by a wrong one; the label holds
//         the original (correct) token id
//   add — a token was OMITTED after this position; the label
//         holds the id of the missing token
//   del — this token is SPURIOUS and should be deleted; the
//         label is a 0/1 flag
//
// Label value 0 always means "no edit of that type here".

use serde::{Deserialize, Serialize};

/// Per-position predictions for ONE example, as emitted by the
/// model heads. All three sequences share the encoded length.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditPredictions {
    pub rep: Vec<u32>,
    pub add: Vec<u32>,
    pub del: Vec<u32>,
}

impl EditPredictions {
    /// All-zero predictions of the given length ("no edits found")
    pub fn empty(len: usize) -> Self {
        Self {
            rep: vec![0; len],
            add: vec![0; len],
            del: vec![0; len],
        }
    }
}
