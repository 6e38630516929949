// ============================================================
// Layer 6 — Infrastructure
// ============================================================
// This layer handles all external-world concerns:
//   - Building, saving and loading the tokenizer
//   - Persisting converted datasets and run configuration
//   - Reading prediction files produced by the external model
//
// No other layer touches the filesystem directly.

// Tokenizer build/load and the WordPiece adapter
pub mod tokenizer_store;

// Converted-data and config persistence, prediction files
pub mod dataset_store;
