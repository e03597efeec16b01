use crate::shared::frame::Frame;

use super::source_kind::SourceKind;

/// Pulls decoded frames one at a time from a camera, video or image.
///
/// Implementations handle codec and device details; the pipeline only sees
/// RGB [`Frame`]s in arrival order.
pub trait FrameSource {
    fn open(&mut self, kind: &SourceKind) -> Result<(), Box<dyn std::error::Error>>;

    /// Next frame, or `None` once the stream is exhausted.
    ///
    /// Reading before a successful `open` is an error.
    fn read(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;

    /// Nominal frames per second, when the container reports one.
    fn frame_rate(&self) -> Option<f64> {
        None
    }

    /// Drops any device or file handles. Safe to call more than once.
    fn release(&mut self);
}
