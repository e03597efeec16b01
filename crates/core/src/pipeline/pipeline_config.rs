use crate::inference::domain::blob::BlobSpec;

pub const CONFIDENCE_THRESHOLD: f32 = 0.5;
pub const DETECTOR_INPUT_SIZE: (u32, u32) = (300, 300);
pub const CLASSIFIER_INPUT_SIZE: (u32, u32) = (227, 227);
/// B, G, R means of the res10 SSD training set.
pub const DETECTOR_MEAN: [f32; 3] = [104.0, 177.0, 123.0];
/// B, G, R means of the Adience age/gender training set.
pub const CLASSIFIER_MEAN: [f32; 3] = [78.426_34, 87.768_914, 114.895_85];

/// Fixed numeric configuration of the detection/classification core.
///
/// The values are the ones the bundled networks were trained with and are
/// not meant to be tuned at runtime; `Default` is the only constructor the
/// application uses.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    pub confidence_threshold: f32,
    pub detector_input_size: (u32, u32),
    pub classifier_input_size: (u32, u32),
    pub detector_mean: [f32; 3],
    pub classifier_mean: [f32; 3],
}

impl PipelineConfig {
    pub fn detector_blob(&self) -> BlobSpec {
        BlobSpec::new(self.detector_input_size, self.detector_mean)
    }

    pub fn classifier_blob(&self) -> BlobSpec {
        BlobSpec::new(self.classifier_input_size, self.classifier_mean)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: CONFIDENCE_THRESHOLD,
            detector_input_size: DETECTOR_INPUT_SIZE,
            classifier_input_size: CLASSIFIER_INPUT_SIZE,
            detector_mean: DETECTOR_MEAN,
            classifier_mean: CLASSIFIER_MEAN,
        }
    }
}
