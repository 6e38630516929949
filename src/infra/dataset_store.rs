// ============================================================
// Layer 6 — Dataset Store
// ============================================================
// Persists the artifacts a conversion run produces and reads
// the prediction files the external model writes back.
//
// File naming convention:
//   <store_dir>/
//     converted.json       ← columnar converted data
//     rec_lm_config.json   ← the configuration used to convert
//     tokenizer.json       ← written by the TokenizerStore
//
// Why save the config separately?
//   Annotating predictions later must use the exact same
//   max_seq_length, probabilities and truncation method that
//   produced the converted data, or positions will not line up.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};

use crate::application::rec_lm::RecLmConfig;
use crate::data::converter::ConvertedData;
use crate::domain::example::RawExample;

/// One prediction file row set, as the external model writes it:
/// three parallel matrices, one row per converted example.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionFile {
    pub rep_preds: Vec<Vec<u32>>,
    pub add_preds: Vec<Vec<u32>>,
    pub del_preds: Vec<Vec<u32>>,
}

pub struct DatasetStore {
    dir: PathBuf,
}

impl DatasetStore {
    /// Create a new DatasetStore, creating the directory if it
    /// does not already exist.
    pub fn new(dir: impl Into<String>) -> Self {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Write the converted columnar data to converted.json.
    pub fn save_converted(&self, data: &ConvertedData) -> Result<()> {
        let path = self.dir.join("converted.json");
        let json = serde_json::to_string(data)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write converted data to '{}'", path.display()))?;
        tracing::info!(
            "Saved {} converted examples to '{}'",
            data.n_inputs(),
            path.display()
        );
        Ok(())
    }

    /// Save the run configuration so a later annotation run can
    /// reproduce the exact encoding.
    pub fn save_config(&self, cfg: &RecLmConfig) -> Result<()> {
        let path = self.dir.join("rec_lm_config.json");
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved config to '{}'", path.display());
        Ok(())
    }

    /// Load the configuration saved by a previous convert run.
    pub fn load_config(&self) -> Result<RecLmConfig> {
        let path = self.dir.join("rec_lm_config.json");
        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'convert' before 'annotate'.",
                    path.display()
                )
            })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Read one example per line from a corpus file. Plain lines
    /// are raw text; with `tokenized` each line must be a JSON
    /// array of token strings.
    pub fn read_examples(path: impl AsRef<Path>, tokenized: bool) -> Result<Vec<RawExample>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Cannot read corpus file '{}'", path.display()))?;

        let mut examples = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let example = if tokenized {
                let value: serde_json::Value = serde_json::from_str(line)
                    .with_context(|| {
                        format!("Line {} of '{}' is not valid JSON", lineno + 1, path.display())
                    })?;
                RawExample::from_value(&value, true)
                    .with_context(|| format!("Line {} of '{}'", lineno + 1, path.display()))?
            } else {
                RawExample::Text(line.to_string())
            };
            examples.push(example);
        }
        Ok(examples)
    }

    /// Read a prediction file written by the external model.
    pub fn read_predictions(path: impl AsRef<Path>) -> Result<PredictionFile> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read predictions from '{}'", path.display()))?;
        let preds: PredictionFile = serde_json::from_str(&json)
            .with_context(|| format!("Malformed prediction file '{}'", path.display()))?;
        Ok(preds)
    }
}
