// ============================================================
// Layer 4 — Answer Reconstructor
// ============================================================
// Renders the model's per-position predictions back onto the
// original input with inline edit annotations:
//
//   {rep:old->new}  the token was wrong; `new` is the correction
//   {del:old}       the token is spurious and should be deleted
//   {add:new}       `new` is missing and belongs right after
//
// The rep/del pair is checked as if/elif — at render time a rep
// prediction takes precedence over a del prediction at the same
// position. The add check is independent and always runs. This
// asymmetry is deliberate: rep and del compete for the SAME
// token, while add describes the gap after it.
//
// Insertions grow the output, so both modes track a running
// offset `n` that keeps later positions anchored.

use crate::data::align::align_tokens_with_text;
use crate::domain::edits::EditPredictions;
use crate::domain::traits::WordPiece;

/// Token-sequence mode: annotate a pre-tokenized input.
/// `input_length` is the number of real (non-pad) positions.
pub fn reconstruct_tokens(
    tokens: &[String],
    preds: &EditPredictions,
    input_length: usize,
    vocab: &dyn WordPiece,
) -> Vec<String> {
    let mut output: Vec<String> = tokens.to_vec();
    let mut n = 0usize; // insertions so far

    for i in 0..bounded_length(input_length.min(tokens.len()), preds) {
        if preds.rep[i] != 0 {
            let new = id_to_token(vocab, preds.rep[i]);
            output[i + n] = format!("{{rep:{}->{}}}", output[i + n], new);
        } else if preds.del[i] != 0 {
            output[i + n] = format!("{{del:{}}}", output[i + n]);
        }
        if preds.add[i] != 0 {
            let new = id_to_token(vocab, preds.add[i]);
            output.insert(i + 1 + n, format!("{{add:{new}}}"));
            n += 1;
        }
    }
    output
}

/// Text mode: annotate the ORIGINAL untokenized text in place,
/// using the token/character alignment to locate each span.
/// Continuation markers (`##`) on predicted tokens are stripped
/// for human-readable output.
pub fn reconstruct_text(
    text: &str,
    tokens: &[String],
    preds: &EditPredictions,
    input_length: usize,
    do_lower_case: bool,
    vocab: &dyn WordPiece,
) -> String {
    let (mapping_start, mapping_end) = align_tokens_with_text(tokens, text, do_lower_case);

    let mut output = text.to_string();
    let mut n = 0isize; // running byte-offset delta

    for i in 0..bounded_length(input_length.min(tokens.len()), preds) {
        if preds.rep[i] != 0 {
            let start = (mapping_start[i] as isize + n) as usize;
            let end = (mapping_end[i] as isize + n) as usize;
            let replaced = output[start..end].to_string();
            let new = id_to_token(vocab, preds.rep[i]).replace("##", "");
            let annotation = format!("{{rep:{replaced}->{new}}}");
            output.replace_range(start..end, &annotation);
            n += annotation.len() as isize - replaced.len() as isize;
        } else if preds.del[i] != 0 {
            let start = (mapping_start[i] as isize + n) as usize;
            let end = (mapping_end[i] as isize + n) as usize;
            let deleted = output[start..end].to_string();
            let annotation = format!("{{del:{deleted}}}");
            output.replace_range(start..end, &annotation);
            n += annotation.len() as isize - deleted.len() as isize;
        }
        if preds.add[i] != 0 {
            let new = id_to_token(vocab, preds.add[i]).replace("##", "");
            let annotation = format!("{{add:{new}}}");
            let ptr = (mapping_end[i] as isize + n) as usize;
            output.insert_str(ptr, &annotation);
            n += annotation.len() as isize;
        }
    }
    output
}

/// Positions beyond the shortest prediction row carry no edits.
fn bounded_length(input_length: usize, preds: &EditPredictions) -> usize {
    input_length
        .min(preds.rep.len())
        .min(preds.add.len())
        .min(preds.del.len())
}

fn id_to_token(vocab: &dyn WordPiece, id: u32) -> String {
    vocab
        .convert_ids_to_tokens(&[id])
        .into_iter()
        .next()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testutil::TinyVocab;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn id_of(vocab: &TinyVocab, token: &str) -> u32 {
        vocab.convert_tokens_to_ids(&[token.to_string()])[0]
    }

    #[test]
    fn test_zero_predictions_leave_tokens_unchanged() {
        let vocab = TinyVocab::new();
        let tokens = toks(&["the", "cat", "sat"]);
        let preds = EditPredictions::empty(8);
        let out = reconstruct_tokens(&tokens, &preds, 3, &vocab);
        assert_eq!(out, tokens);
    }

    #[test]
    fn test_zero_predictions_leave_text_unchanged() {
        // Round-trip property: encode + all-zero predictions
        // must reproduce the original text byte for byte.
        let vocab = TinyVocab::new();
        let text = "The cat sat on the mat";
        let tokens = vocab.tokenize(text).unwrap();
        let preds = EditPredictions::empty(8);
        let out = reconstruct_text(text, &tokens, &preds, tokens.len(), true, &vocab);
        assert_eq!(out, text);
    }

    #[test]
    fn test_short_prediction_rows_never_panic() {
        // Rows narrower than the token sequence leave the extra
        // positions unannotated in both modes.
        let vocab = TinyVocab::new();
        let tokens = toks(&["the", "cat", "sat"]);
        let mut preds = EditPredictions::empty(2);
        preds.del[1] = 1;

        let out = reconstruct_tokens(&tokens, &preds, 3, &vocab);
        assert_eq!(out, toks(&["the", "{del:cat}", "sat"]));

        let out = reconstruct_text("the cat sat", &tokens, &preds, 3, true, &vocab);
        assert_eq!(out, "the {del:cat} sat");
    }

    #[test]
    fn test_rep_annotation_in_token_mode() {
        let vocab = TinyVocab::new();
        let tokens = toks(&["the", "cat", "sat"]);
        let mut preds = EditPredictions::empty(8);
        preds.rep[1] = id_of(&vocab, "dog");
        let out = reconstruct_tokens(&tokens, &preds, 3, &vocab);
        assert_eq!(out, toks(&["the", "{rep:cat->dog}", "sat"]));
    }

    #[test]
    fn test_rep_takes_precedence_over_del() {
        let vocab = TinyVocab::new();
        let tokens = toks(&["the", "cat"]);
        let mut preds = EditPredictions::empty(8);
        preds.rep[0] = id_of(&vocab, "a");
        preds.del[0] = 1;
        let out = reconstruct_tokens(&tokens, &preds, 2, &vocab);
        assert_eq!(out[0], "{rep:the->a}");
    }

    #[test]
    fn test_add_inserts_after_position_and_shifts() {
        let vocab = TinyVocab::new();
        let tokens = toks(&["the", "cat", "sat"]);
        let mut preds = EditPredictions::empty(8);
        preds.add[0] = id_of(&vocab, "big");
        preds.rep[2] = id_of(&vocab, "ran");
        let out = reconstruct_tokens(&tokens, &preds, 3, &vocab);
        // The insertion after position 0 must not break the rep
        // annotation landing on the original position 2.
        assert_eq!(
            out,
            toks(&["the", "{add:big}", "cat", "{rep:sat->ran}"])
        );
    }

    #[test]
    fn test_del_annotation_in_token_mode() {
        let vocab = TinyVocab::new();
        let tokens = toks(&["the", "the", "cat"]);
        let mut preds = EditPredictions::empty(8);
        preds.del[1] = 1;
        let out = reconstruct_tokens(&tokens, &preds, 3, &vocab);
        assert_eq!(out, toks(&["the", "{del:the}", "cat"]));
    }

    #[test]
    fn test_text_mode_rep() {
        let vocab = TinyVocab::new();
        let text = "the cat sat";
        let tokens = vocab.tokenize(text).unwrap();
        let mut preds = EditPredictions::empty(8);
        preds.rep[1] = id_of(&vocab, "dog");
        let out = reconstruct_text(text, &tokens, &preds, 3, true, &vocab);
        assert_eq!(out, "the {rep:cat->dog} sat");
    }

    #[test]
    fn test_text_mode_add_inserts_at_span_end() {
        let vocab = TinyVocab::new();
        let text = "the cat sat";
        let tokens = vocab.tokenize(text).unwrap();
        let mut preds = EditPredictions::empty(8);
        preds.add[1] = id_of(&vocab, "big");
        let out = reconstruct_text(text, &tokens, &preds, 3, true, &vocab);
        assert_eq!(out, "the cat{add:big} sat");
    }

    #[test]
    fn test_text_mode_del_and_following_edit() {
        let vocab = TinyVocab::new();
        let text = "the cat sat";
        let tokens = vocab.tokenize(text).unwrap();
        let mut preds = EditPredictions::empty(8);
        preds.del[0] = 1;
        preds.rep[2] = id_of(&vocab, "ran");
        let out = reconstruct_text(text, &tokens, &preds, 3, true, &vocab);
        assert_eq!(out, "{del:the} cat {rep:sat->ran}");
    }

    #[test]
    fn test_text_mode_strips_continuation_marker() {
        let vocab = TinyVocab::new();
        let text = "the cat";
        let tokens = vocab.tokenize(text).unwrap();
        let mut preds = EditPredictions::empty(8);
        preds.add[1] = id_of(&vocab, "##ing");
        let out = reconstruct_text(text, &tokens, &preds, 2, true, &vocab);
        assert_eq!(out, "the cat{add:ing}");
    }

    #[test]
    fn test_token_mode_keeps_continuation_marker() {
        // Only the human-readable text mode strips `##`.
        let vocab = TinyVocab::new();
        let tokens = toks(&["the", "cat"]);
        let mut preds = EditPredictions::empty(8);
        preds.add[1] = id_of(&vocab, "##ing");
        let out = reconstruct_tokens(&tokens, &preds, 2, &vocab);
        assert_eq!(out[2], "{add:##ing}");
    }
}
