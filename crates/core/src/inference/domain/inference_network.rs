use ndarray::{Array4, ArrayD};

use super::inference_error::InferenceError;

/// A loaded model that maps one NCHW input blob to one output tensor.
///
/// Handles are read-only after load and shared between the detector and
/// classifiers, so `forward` takes `&self`. Implementations run inference
/// exactly once per call and never retry.
pub trait InferenceNetwork: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    fn forward(&self, blob: Array4<f32>) -> Result<ArrayD<f32>, InferenceError>;
}
