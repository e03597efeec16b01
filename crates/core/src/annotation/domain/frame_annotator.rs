use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Draws a face box and its label onto a frame.
///
/// Implementations modify the frame in place and never read or write pixels
/// outside it.
pub trait FrameAnnotator: Send + Sync {
    fn annotate(
        &self,
        frame: &mut Frame,
        bbox: &BoundingBox,
        text: &str,
    ) -> Result<(), Box<dyn std::error::Error>>;
}
