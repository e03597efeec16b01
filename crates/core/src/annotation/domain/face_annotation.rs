use crate::shared::bounding_box::BoundingBox;

/// Everything the pipeline learned about one face in one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceAnnotation {
    pub bbox: BoundingBox,
    pub confidence: f32,
    pub gender: &'static str,
    pub age: &'static str,
}

impl FaceAnnotation {
    /// Overlay text drawn above the face box.
    pub fn label(&self) -> String {
        format!("Gender: {}, Age: {}", self.gender, self.age)
    }
}
