// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// This is the heart of the application — pure Rust structs
// and traits that define the core concepts of the system.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//   - NO ML-specific code
//   - Only plain Rust structs, enums, and traits
//
// Why keep this layer pure?
//   - Easy to unit test (no GPU needed)
//   - Easy to understand (no framework noise)
//   - Easy to swap implementations (just implement the trait)
//
// Think of this layer as the "dictionary" of the system —
// it defines what things ARE, not how they work.

// A raw input example, before tokenisation and encoding
pub mod example;

// Per-example prediction triples produced by the model
pub mod edits;

// Core abstractions (traits) that other layers implement
pub mod traits;

// The error taxonomy shared by every layer
pub mod error;

// In-memory tokenizer stub for unit tests
#[cfg(test)]
pub mod testutil;
