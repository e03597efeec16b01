use std::sync::Arc;

use crate::inference::domain::blob::{build_blob, BlobSpec};
use crate::inference::domain::inference_error::InferenceError;
use crate::inference::domain::inference_network::InferenceNetwork;
use crate::inference::domain::tensor_decoder::decode_detections;
use crate::pipeline::pipeline_config::PipelineConfig;
use crate::shared::frame::Frame;

use super::detection_candidate::DetectionCandidate;

/// Finds faces in a whole frame with an SSD-style detector network.
///
/// Stateless across frames: the same frame and network always give the
/// same candidates, in the network's row order.
pub struct FaceDetector {
    network: Arc<dyn InferenceNetwork>,
    blob: BlobSpec,
    confidence: f32,
}

impl FaceDetector {
    pub fn new(network: Arc<dyn InferenceNetwork>, config: &PipelineConfig) -> Self {
        Self {
            network,
            blob: config.detector_blob(),
            confidence: config.confidence_threshold,
        }
    }

    /// Returns clipped, non-degenerate candidates with `confidence > threshold`.
    ///
    /// The frame must be non-empty; callers stop at end of stream before
    /// getting here.
    pub fn detect(&self, frame: &Frame) -> Result<Vec<DetectionCandidate>, InferenceError> {
        let input = build_blob(frame, &self.blob)?;
        let output = self.network.forward(input)?;

        let shape = output.shape().to_vec();
        let data: Vec<f32> = output.iter().copied().collect();
        Ok(decode_detections(
            &data,
            &shape,
            frame.width(),
            frame.height(),
            self.confidence,
        ))
    }
}
