use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::data::converter::ConvertedData;

/// One converted row, ready for batching. Label columns are
/// empty for inference-time samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecSample {
    pub input_ids:     Vec<u32>,
    pub rep_label_ids: Vec<u32>,
    pub add_label_ids: Vec<u32>,
    pub del_label_ids: Vec<u32>,
    pub sample_weight: f32,
}

impl RecSample {
    pub fn has_labels(&self) -> bool {
        !self.rep_label_ids.is_empty()
    }

    /// Number of real (non-pad) positions.
    pub fn nonpad_seq_length(&self) -> usize {
        self.input_ids.iter().filter(|&&id| id != 0).count()
    }
}

pub struct RecDataset {
    samples: Vec<RecSample>,
}

impl RecDataset {
    pub fn new(samples: Vec<RecSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<RecSample> for RecDataset {
    fn get(&self, index: usize) -> Option<RecSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

/// Split merged columnar data back into per-example rows.
pub fn into_samples(data: &ConvertedData) -> Vec<RecSample> {
    let n = data.n_inputs();
    (0..n)
        .map(|i| RecSample {
            input_ids: data.input_ids[i].clone(),
            rep_label_ids: data
                .rep_label_ids
                .as_ref()
                .map(|c| c[i].clone())
                .unwrap_or_default(),
            add_label_ids: data
                .add_label_ids
                .as_ref()
                .map(|c| c[i].clone())
                .unwrap_or_default(),
            del_label_ids: data
                .del_label_ids
                .as_ref()
                .map(|c| c[i].clone())
                .unwrap_or_default(),
            sample_weight: data
                .sample_weight
                .as_ref()
                .map(|w| w[i])
                .unwrap_or(1.0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_get_and_len() {
        let samples = vec![
            RecSample {
                input_ids:     vec![5, 7, 0, 0],
                rep_label_ids: vec![0, 0, 0, 0],
                add_label_ids: vec![0, 0, 0, 0],
                del_label_ids: vec![0, 0, 0, 0],
                sample_weight: 1.0,
            };
            3
        ];
        let ds = RecDataset::new(samples);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.get(1).unwrap().nonpad_seq_length(), 2);
        assert!(ds.get(3).is_none());
    }

    #[test]
    fn test_inference_rows_have_no_labels() {
        let data = ConvertedData {
            input_ids: vec![vec![5, 0], vec![7, 0]],
            ..ConvertedData::default()
        };
        let rows = into_samples(&data);
        assert_eq!(rows.len(), 2);
        assert!(!rows[0].has_labels());
        assert_eq!(rows[0].sample_weight, 1.0);
    }
}
