use std::sync::Arc;

use thiserror::Error;

use crate::inference::domain::blob::{build_blob, BlobSpec};
use crate::inference::domain::inference_error::InferenceError;
use crate::inference::domain::inference_network::InferenceNetwork;
use crate::inference::domain::model_set::ModelSet;
use crate::inference::domain::tensor_decoder::{select_label_index, DecodeError};
use crate::pipeline::pipeline_config::PipelineConfig;
use crate::shared::frame::Frame;

use super::label_table::LabelTable;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error("{network} output does not match its label table: {source}")]
    LabelMismatch {
        network: String,
        #[source]
        source: DecodeError,
    },
}

/// Pairs one classifier network with its label table.
///
/// Age and gender estimation are two instances of this type that differ
/// only in network and labels.
pub struct RegionClassifier {
    network: Arc<dyn InferenceNetwork>,
    labels: LabelTable,
    blob: BlobSpec,
}

impl RegionClassifier {
    pub fn new(network: Arc<dyn InferenceNetwork>, labels: LabelTable, blob: BlobSpec) -> Self {
        Self {
            network,
            labels,
            blob,
        }
    }

    pub fn age(models: &ModelSet, config: &PipelineConfig) -> Self {
        Self::new(models.age().clone(), LabelTable::AGE, config.classifier_blob())
    }

    pub fn gender(models: &ModelSet, config: &PipelineConfig) -> Self {
        Self::new(
            models.gender().clone(),
            LabelTable::GENDER,
            config.classifier_blob(),
        )
    }

    pub fn labels(&self) -> LabelTable {
        self.labels
    }

    /// Label of the highest-scoring class for a cropped face.
    ///
    /// A score vector that cannot address the label table is a broken
    /// model/label pairing and fails instead of guessing.
    pub fn classify(&self, region: &Frame) -> Result<&'static str, ClassifyError> {
        let input = build_blob(region, &self.blob)?;
        let output = self.network.forward(input)?;
        let scores: Vec<f32> = output.iter().copied().collect();

        let index = select_label_index(&scores, self.labels.len()).map_err(|source| {
            ClassifyError::LabelMismatch {
                network: self.network.name().to_string(),
                source,
            }
        })?;
        self.labels
            .get(index)
            .ok_or_else(|| ClassifyError::LabelMismatch {
                network: self.network.name().to_string(),
                source: DecodeError::IndexOutOfRange {
                    index,
                    labels: self.labels.len(),
                },
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{solid_frame, FailingNetwork, StubNetwork};
    use rstest::rstest;

    fn classifier(network: Arc<StubNetwork>, labels: LabelTable) -> RegionClassifier {
        RegionClassifier::new(network, labels, PipelineConfig::default().classifier_blob())
    }

    #[test]
    fn test_classify_feeds_227x227_blob() {
        let network = Arc::new(StubNetwork::scores("gender", &[0.3, 0.7]));
        let face = solid_frame(40, 55, [120, 100, 90]);
        classifier(network.clone(), LabelTable::GENDER)
            .classify(&face)
            .unwrap();
        assert_eq!(network.last_input_shape(), Some(vec![1, 3, 227, 227]));
        assert_eq!(network.calls(), 1);
    }

    #[rstest]
    #[case::male(vec![0.8, 0.2], "Male")]
    #[case::female(vec![0.1, 0.9], "Female")]
    #[case::tie_goes_to_first(vec![0.5, 0.5], "Male")]
    fn test_classify_gender(#[case] scores: Vec<f32>, #[case] expected: &str) {
        let network = Arc::new(StubNetwork::scores("gender", &scores));
        let face = solid_frame(30, 30, [0, 0, 0]);
        let label = classifier(network, LabelTable::GENDER)
            .classify(&face)
            .unwrap();
        assert_eq!(label, expected);
    }

    #[test]
    fn test_classify_age_bracket() {
        let scores = [0.01, 0.02, 0.05, 0.1, 0.6, 0.1, 0.1, 0.02];
        let network = Arc::new(StubNetwork::scores("age", &scores));
        let face = solid_frame(30, 30, [0, 0, 0]);
        let label = classifier(network, LabelTable::AGE).classify(&face).unwrap();
        assert_eq!(label, "(25-32)");
    }

    #[test]
    fn test_classify_reads_flattened_4d_output() {
        let network = Arc::new(StubNetwork::new("gender", &[1, 2, 1, 1], vec![0.2, 0.8]));
        let face = solid_frame(30, 30, [0, 0, 0]);
        let label = classifier(network, LabelTable::GENDER)
            .classify(&face)
            .unwrap();
        assert_eq!(label, "Female");
    }

    #[test]
    fn test_short_output_is_a_hard_error() {
        let network = Arc::new(StubNetwork::scores("age", &[0.4, 0.6]));
        let face = solid_frame(30, 30, [0, 0, 0]);
        let result = classifier(network, LabelTable::AGE).classify(&face);
        match result {
            Err(ClassifyError::LabelMismatch { network, source }) => {
                assert_eq!(network, "age");
                assert_eq!(source, DecodeError::OutputTooShort { len: 2, labels: 8 });
            }
            other => panic!("expected label mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_winner_past_label_table_is_a_hard_error() {
        let network = Arc::new(StubNetwork::scores("gender", &[0.1, 0.2, 0.7]));
        let face = solid_frame(30, 30, [0, 0, 0]);
        let result = classifier(network, LabelTable::GENDER).classify(&face);
        assert!(matches!(
            result,
            Err(ClassifyError::LabelMismatch {
                source: DecodeError::IndexOutOfRange { index: 2, labels: 2 },
                ..
            })
        ));
    }

    #[test]
    fn test_empty_region_is_rejected_before_inference() {
        let network = Arc::new(StubNetwork::scores("gender", &[0.1, 0.9]));
        let region = Frame::new(Vec::new(), 0, 0, 3, 0);
        let result = classifier(network.clone(), LabelTable::GENDER).classify(&region);
        assert!(matches!(
            result,
            Err(ClassifyError::Inference(InferenceError::EmptyInput))
        ));
        assert_eq!(network.calls(), 0);
    }

    #[test]
    fn test_network_failure_propagates() {
        let classifier = RegionClassifier::new(
            Arc::new(FailingNetwork),
            LabelTable::GENDER,
            PipelineConfig::default().classifier_blob(),
        );
        let face = solid_frame(30, 30, [0, 0, 0]);
        assert!(matches!(
            classifier.classify(&face),
            Err(ClassifyError::Inference(InferenceError::Run { .. }))
        ));
    }

    #[test]
    fn test_model_set_constructors_pick_matching_tables() {
        let models = ModelSet::new(
            Arc::new(StubNetwork::detections(&[])),
            Arc::new(StubNetwork::scores("age", &[0.0; 8])),
            Arc::new(StubNetwork::scores("gender", &[0.0; 2])),
        );
        let config = PipelineConfig::default();
        assert_eq!(RegionClassifier::age(&models, &config).labels(), LabelTable::AGE);
        assert_eq!(
            RegionClassifier::gender(&models, &config).labels(),
            LabelTable::GENDER
        );
    }
}
