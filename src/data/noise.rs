// ============================================================
// Layer 4 — Noise Sampler
// ============================================================
// Synthesizes corrupted training examples by mutating a
// fixed-length token-id sequence in place, under three budget
// counts, and records a parallel label triple describing every
// edit so the model can learn to undo it.
//
// The sampling follows the order `add -> rep -> del`. The order
// is load-bearing: each phase filters its candidates on the
// labels written by earlier phases, so reordering changes which
// positions stay eligible.
//
//   add — collapse an adjacent non-pad pair: position i absorbs
//         the id at i+1 into its add label, the sequence shifts
//         left, and a pad is appended. The model must learn
//         "a token is missing after i".
//         e.g. 124 591 9521 → 124 9521
//   rep — overwrite a non-pad id with a random wrong id and
//         record the original in the rep label.
//         e.g. 124 591 9521 → 124 789 9521
//   del — insert a random wrong id before a non-pad position,
//         flag it in the del label, and trim the tail pad.
//         Requires free space at the end of the sequence.
//         e.g. 124 591 → 124 92 591
//
// Every phase samples uniformly among its currently eligible
// positions. Running out of candidates ends the phase silently;
// budgets are ceilings, not exact guarantees.

use rand::seq::SliceRandom;
use rand::Rng;

/// Padding / reserved id. Never produced as a wrong id.
pub const PAD_ID: u32 = 0;

// ─── TokenSlot / LabeledSequence ──────────────────────────────────────────────
// One record per position keeps the id and all three labels
// together, so an insert or remove can never leave one label
// sequence out of alignment with the others.

/// One position of the encoded sequence with its label triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenSlot {
    pub id:  u32,
    pub rep: u32,
    pub add: u32,
    pub del: u32,
}

impl TokenSlot {
    fn pad() -> Self {
        Self::default()
    }
}

/// A fixed-length sequence of token slots. Every mutation keeps
/// the length constant: a removal appends a pad slot, an
/// insertion trims the tail.
#[derive(Debug, Clone)]
pub struct LabeledSequence {
    slots: Vec<TokenSlot>,
}

impl LabeledSequence {
    /// Wrap an already-padded id sequence; all labels start at 0.
    pub fn from_ids(ids: &[u32]) -> Self {
        let slots = ids
            .iter()
            .map(|&id| TokenSlot { id, ..TokenSlot::default() })
            .collect();
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, i: usize) -> &TokenSlot {
        &self.slots[i]
    }

    /// Split the sequence back into the four parallel columns:
    /// (ids, rep_labels, add_labels, del_labels).
    pub fn into_columns(self) -> (Vec<u32>, Vec<u32>, Vec<u32>, Vec<u32>) {
        let mut ids = Vec::with_capacity(self.slots.len());
        let mut rep = Vec::with_capacity(self.slots.len());
        let mut add = Vec::with_capacity(self.slots.len());
        let mut del = Vec::with_capacity(self.slots.len());
        for s in self.slots {
            ids.push(s.id);
            rep.push(s.rep);
            add.push(s.add);
            del.push(s.del);
        }
        (ids, rep, add, del)
    }

    /// Add-phase edit: absorb the id at `i + 1` into slot `i`'s
    /// add label, shift everything after left by one, and append
    /// a pad slot to preserve the length.
    fn collapse_pair(&mut self, i: usize) {
        let absorbed = self.slots.remove(i + 1).id;
        self.slots.push(TokenSlot::pad());
        self.slots[i].add = absorbed;
    }

    /// Rep-phase edit: record the original id in the rep label
    /// and overwrite the id with `wrong_id`.
    fn replace_id(&mut self, i: usize, wrong_id: u32) {
        self.slots[i].rep = self.slots[i].id;
        self.slots[i].id = wrong_id;
    }

    /// Del-phase edit: insert a spurious token before `i` with
    /// the del flag set, then trim the tail pad.
    fn insert_spurious(&mut self, i: usize, wrong_id: u32) {
        self.slots.insert(
            i,
            TokenSlot { id: wrong_id, rep: 0, add: 0, del: 1 },
        );
        self.slots.pop();
    }
}

// ─── Sampling ─────────────────────────────────────────────────────────────────

/// Requested edit counts for one example, drawn categorically by
/// the encoder. Realized counts may be lower.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditBudget {
    pub max_rep: usize,
    pub max_add: usize,
    pub max_del: usize,
}

/// Pick one eligible index uniformly at random, or None when no
/// candidate is left. "None" ends the calling phase; it is never
/// an error.
fn pick_candidate<R, F>(seq: &LabeledSequence, upper: usize, rng: &mut R, eligible: F) -> Option<usize>
where
    R: Rng,
    F: Fn(&LabeledSequence, usize) -> bool,
{
    let candidates: Vec<usize> = (0..upper).filter(|&i| eligible(seq, i)).collect();
    candidates.choose(rng).copied()
}

/// Corrupt `seq` in place under `budget`. Wrong ids are drawn
/// uniformly from `[1, vocab_size - 1]` so the pad id is never
/// produced. `vocab_size` must be at least 2.
pub fn sample_wrong_tokens<R: Rng>(
    seq: &mut LabeledSequence,
    budget: EditBudget,
    vocab_size: usize,
    rng: &mut R,
) {
    let len = seq.len();
    if len == 0 {
        return;
    }

    // ── `add`: collapse adjacent pairs ────────────────────────────────────────
    // Eligible: both i and i+1 carry real tokens and neither has
    // been add-labeled yet.
    for _ in 0..budget.max_add {
        let picked = pick_candidate(seq, len.saturating_sub(1), rng, |s, i| {
            s.slot(i).id != PAD_ID
                && s.slot(i + 1).id != PAD_ID
                && s.slot(i).add == 0
                && s.slot(i + 1).add == 0
        });
        match picked {
            Some(i) => seq.collapse_pair(i),
            None => break,
        }
    }

    // ── `rep`: overwrite with wrong ids ───────────────────────────────────────
    for _ in 0..budget.max_rep {
        let picked = pick_candidate(seq, len, rng, |s, i| {
            s.slot(i).id != PAD_ID && s.slot(i).rep == 0
        });
        match picked {
            Some(i) => {
                let wrong = rng.gen_range(1..vocab_size as u32);
                seq.replace_id(i, wrong);
            }
            None => break,
        }
    }

    // ── `del`: insert spurious tokens ─────────────────────────────────────────
    for _ in 0..budget.max_del {
        // No free space at the end means the sequence is full
        if seq.slot(len - 1).id != PAD_ID {
            break;
        }
        let picked = pick_candidate(seq, len, rng, |s, i| {
            s.slot(i).id != PAD_ID && s.slot(i).del == 0
        });
        match picked {
            Some(i) => {
                let wrong = rng.gen_range(1..vocab_size as u32);
                seq.insert_spurious(i, wrong);
            }
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    fn seq(ids: &[u32]) -> LabeledSequence {
        LabeledSequence::from_ids(ids)
    }

    #[test]
    fn test_rep_records_original_and_mutates_id() {
        // ids = [5, 7, 9, 0, 0], budget (1, 0, 0): exactly one of
        // positions 0..3 carries a rep label equal to the original
        // id, and the id there now differs from the label.
        let mut rng = thread_rng();
        for _ in 0..50 {
            let mut s = seq(&[5, 7, 9, 0, 0]);
            let budget = EditBudget { max_rep: 1, max_add: 0, max_del: 0 };
            sample_wrong_tokens(&mut s, budget, 100, &mut rng);

            let (ids, rep, add, del) = s.into_columns();
            assert_eq!(ids.len(), 5);
            assert!(add.iter().all(|&x| x == 0));
            assert!(del.iter().all(|&x| x == 0));

            let labelled: Vec<usize> = (0..5).filter(|&i| rep[i] != 0).collect();
            assert_eq!(labelled.len(), 1);
            let i = labelled[0];
            assert!(i < 3, "padding positions must never be edited");
            assert_eq!(rep[i], [5, 7, 9][i]);
            assert_ne!(ids[i], rep[i]);
            assert!(ids[i] >= 1 && ids[i] < 100);
        }
    }

    #[test]
    fn test_add_collapses_one_pair_and_pads() {
        let mut rng = thread_rng();
        for _ in 0..50 {
            let mut s = seq(&[5, 7, 9, 0, 0]);
            let budget = EditBudget { max_rep: 0, max_add: 1, max_del: 0 };
            sample_wrong_tokens(&mut s, budget, 100, &mut rng);

            let (ids, _rep, add, _del) = s.into_columns();
            // Fixed length preserved, one extra trailing pad
            assert_eq!(ids.len(), 5);
            assert_eq!(&ids[2..], &[0, 0, 0]);

            // Exactly one add label set, holding the absorbed id
            let labelled: Vec<usize> = (0..5).filter(|&i| add[i] != 0).collect();
            assert_eq!(labelled.len(), 1);
            let i = labelled[0];
            match i {
                0 => {
                    // either 7 absorbed into 5, or (after no other
                    // candidates) the pair was (5, 7)
                    assert_eq!(add[0], 7);
                    assert_eq!(ids[0], 5);
                    assert_eq!(ids[1], 9);
                }
                1 => {
                    assert_eq!(add[1], 9);
                    assert_eq!(ids[0], 5);
                    assert_eq!(ids[1], 7);
                }
                _ => panic!("add label at impossible position {i}"),
            }
        }
    }

    #[test]
    fn test_del_inserts_flagged_token() {
        let mut rng = thread_rng();
        for _ in 0..50 {
            let mut s = seq(&[5, 7, 0, 0]);
            let budget = EditBudget { max_rep: 0, max_add: 0, max_del: 1 };
            sample_wrong_tokens(&mut s, budget, 100, &mut rng);

            let (ids, _rep, _add, del) = s.into_columns();
            assert_eq!(ids.len(), 4);
            let flagged: Vec<usize> = (0..4).filter(|&i| del[i] == 1).collect();
            assert_eq!(flagged.len(), 1);
            let i = flagged[0];
            assert!(ids[i] >= 1, "inserted token must be a real id");
            // Original tokens survive, shifted right by one
            let survivors: Vec<u32> = (0..4)
                .filter(|&j| j != i)
                .map(|j| ids[j])
                .filter(|&x| x != 0)
                .collect();
            assert_eq!(survivors, vec![5, 7]);
        }
    }

    #[test]
    fn test_del_stops_when_sequence_full() {
        let mut rng = thread_rng();
        let mut s = seq(&[5, 7, 9]);
        let budget = EditBudget { max_rep: 0, max_add: 0, max_del: 2 };
        sample_wrong_tokens(&mut s, budget, 100, &mut rng);
        let (ids, _, _, del) = s.into_columns();
        assert_eq!(ids, vec![5, 7, 9]);
        assert!(del.iter().all(|&x| x == 0));
    }

    #[test]
    fn test_budgets_are_ceilings() {
        // Two non-pad tokens can take at most 2 rep edits no
        // matter how large the budget is.
        let mut rng = thread_rng();
        let mut s = seq(&[5, 7, 0, 0, 0]);
        let budget = EditBudget { max_rep: 10, max_add: 0, max_del: 0 };
        sample_wrong_tokens(&mut s, budget, 100, &mut rng);
        let (_, rep, _, _) = s.into_columns();
        assert_eq!(rep.iter().filter(|&&x| x != 0).count(), 2);
    }

    #[test]
    fn test_no_position_carries_rep_and_del() {
        let mut rng = thread_rng();
        for _ in 0..50 {
            let mut s = seq(&[3, 4, 5, 6, 7, 8, 0, 0, 0, 0]);
            let budget = EditBudget { max_rep: 2, max_add: 1, max_del: 2 };
            sample_wrong_tokens(&mut s, budget, 50, &mut rng);
            let (_, rep, _, del) = s.into_columns();
            for i in 0..rep.len() {
                assert!(
                    !(rep[i] != 0 && del[i] != 0),
                    "rep and del coexist at position {i}"
                );
            }
        }
    }

    #[test]
    fn test_all_pad_sequence_untouched() {
        let mut rng = thread_rng();
        let mut s = seq(&[0, 0, 0]);
        let budget = EditBudget { max_rep: 2, max_add: 2, max_del: 2 };
        sample_wrong_tokens(&mut s, budget, 100, &mut rng);
        let (ids, rep, add, del) = s.into_columns();
        assert_eq!(ids, vec![0, 0, 0]);
        assert!(rep.iter().chain(&add).chain(&del).all(|&x| x == 0));
    }
}
