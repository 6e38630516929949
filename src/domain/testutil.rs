// Test-only WordPiece implementation: a ten-word whitespace
// vocabulary with no file I/O, shared by unit tests across the
// data and application layers.

use std::collections::HashMap;

use crate::domain::error::PipelineError;
use crate::domain::traits::WordPiece;

pub const UNK_ID: u32 = 1;

pub struct TinyVocab {
    token_to_id: HashMap<String, u32>,
    id_to_token: HashMap<u32, String>,
}

impl TinyVocab {
    pub fn new() -> Self {
        let words = [
            "the", "cat", "sat", "on", "mat", "dog", "ran", "a", "big", "hat", "##ing",
        ];
        let mut token_to_id = HashMap::new();
        let mut id_to_token = HashMap::new();
        token_to_id.insert("[PAD]".to_string(), 0);
        token_to_id.insert("[UNK]".to_string(), UNK_ID);
        id_to_token.insert(0, "[PAD]".to_string());
        id_to_token.insert(UNK_ID, "[UNK]".to_string());
        for (i, w) in words.iter().enumerate() {
            let id = 2 + i as u32;
            token_to_id.insert(w.to_string(), id);
            id_to_token.insert(id, w.to_string());
        }
        Self { token_to_id, id_to_token }
    }
}

impl WordPiece for TinyVocab {
    fn tokenize(&self, text: &str) -> Result<Vec<String>, PipelineError> {
        Ok(text
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect())
    }

    fn convert_tokens_to_ids(&self, tokens: &[String]) -> Vec<u32> {
        tokens
            .iter()
            .map(|t| self.token_to_id.get(t).copied().unwrap_or(UNK_ID))
            .collect()
    }

    fn convert_ids_to_tokens(&self, ids: &[u32]) -> Vec<String> {
        ids.iter()
            .map(|id| {
                self.id_to_token
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| "[UNK]".to_string())
            })
            .collect()
    }

    fn vocab_size(&self) -> usize {
        self.token_to_id.len()
    }
}
