use crate::shared::bounding_box::BoundingBox;

/// One proposed face location that survived thresholding and clipping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectionCandidate {
    pub confidence: f32,
    pub bbox: BoundingBox,
}
