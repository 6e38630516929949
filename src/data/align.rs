// ============================================================
// Layer 4 — Token / Character Alignment
// ============================================================
// For untokenized inputs the reconstructor edits the ORIGINAL
// text, so it needs to know which character span each wordpiece
// token occupies. This module computes that mapping:
//
//   mapping_start[i] .. mapping_end[i]  =  byte span of token i
//
// The mapping is computed once per example at prediction time
// and consumed immediately; it is never persisted.
//
// Matching is a left-to-right scan: each token (with any `##`
// continuation marker stripped, lowercased when the tokenizer
// lowercases) is searched for at or after the previous token's
// end. A token that cannot be located (e.g. [UNK]) gets a
// zero-width span at the cursor so later tokens stay anchored.

/// Character offsets are returned as byte indices into the
/// original text, always on UTF-8 boundaries.
pub fn align_tokens_with_text(
    tokens: &[String],
    text: &str,
    do_lower_case: bool,
) -> (Vec<usize>, Vec<usize>) {
    // Char-by-char normalization keeps the char count identical
    // to the original so offsets can be translated back.
    let chars: Vec<char> = text.chars().collect();
    let normalized: Vec<char> = chars
        .iter()
        .map(|&c| if do_lower_case { lower_first(c) } else { c })
        .collect();

    // byte offset of each char index, plus the end of the text
    let mut byte_offsets: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
    byte_offsets.push(text.len());

    let mut mapping_start = Vec::with_capacity(tokens.len());
    let mut mapping_end = Vec::with_capacity(tokens.len());
    let mut cursor = 0usize; // char index

    for token in tokens {
        let clean = token.trim_start_matches("##");
        let needle: Vec<char> = clean
            .chars()
            .map(|c| if do_lower_case { lower_first(c) } else { c })
            .collect();

        match find_from(&normalized, &needle, cursor) {
            Some(start) if !needle.is_empty() => {
                mapping_start.push(byte_offsets[start]);
                mapping_end.push(byte_offsets[start + needle.len()]);
                cursor = start + needle.len();
            }
            _ => {
                // Unlocatable token: zero-width span at the cursor
                mapping_start.push(byte_offsets[cursor]);
                mapping_end.push(byte_offsets[cursor]);
            }
        }
    }

    (mapping_start, mapping_end)
}

/// First lowercase equivalent of a char; multi-char expansions
/// are truncated so the text length never changes.
fn lower_first(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// First occurrence of `needle` in `haystack` at or after `from`.
fn find_from(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (from..=haystack.len() - needle.len())
        .find(|&start| haystack[start..start + needle.len()] == *needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_simple_alignment() {
        let text = "the cat sat";
        let (start, end) = align_tokens_with_text(&toks(&["the", "cat", "sat"]), text, true);
        assert_eq!(start, vec![0, 4, 8]);
        assert_eq!(end, vec![3, 7, 11]);
        assert_eq!(&text[start[1]..end[1]], "cat");
    }

    #[test]
    fn test_continuation_marker_stripped_for_matching() {
        let text = "playing";
        let (start, end) = align_tokens_with_text(&toks(&["play", "##ing"]), text, true);
        assert_eq!((start[0], end[0]), (0, 4));
        assert_eq!((start[1], end[1]), (4, 7));
    }

    #[test]
    fn test_lowercased_tokens_match_mixed_case_text() {
        let text = "The Cat";
        let (start, end) = align_tokens_with_text(&toks(&["the", "cat"]), text, true);
        assert_eq!(&text[start[1]..end[1]], "Cat");
    }

    #[test]
    fn test_unknown_token_gets_zero_width_span() {
        let text = "the cat";
        let (start, end) = align_tokens_with_text(&toks(&["the", "[UNK]", "cat"]), text, true);
        assert_eq!(start[1], end[1]);
        // The following token still aligns correctly
        assert_eq!(&text[start[2]..end[2]], "cat");
    }

    #[test]
    fn test_repeated_words_advance_left_to_right() {
        let text = "a cat and a cat";
        let (start, _end) = align_tokens_with_text(&toks(&["a", "cat", "and", "a", "cat"]), text, true);
        assert_eq!(start, vec![0, 2, 6, 10, 12]);
    }
}
