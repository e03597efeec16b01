use std::time::Duration;

use crate::shared::frame::Frame;

/// Receives annotated frames and reports whether the operator asked to stop.
pub trait DisplaySink {
    /// Prepares the output for a stream titled `title`.
    fn open(
        &mut self,
        title: &str,
        frame_rate: Option<f64>,
    ) -> Result<(), Box<dyn std::error::Error>>;

    fn show(&mut self, title: &str, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Waits at most `timeout` for a cancellation request.
    fn poll_cancel(&mut self, timeout: Duration) -> bool;

    /// Flushes and closes the output. Safe to call more than once.
    fn release(&mut self);
}
