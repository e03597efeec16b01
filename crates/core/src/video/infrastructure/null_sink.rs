use std::time::Duration;

use crate::shared::frame::Frame;
use crate::video::domain::cancel_signal::CancelSignal;
use crate::video::domain::display_sink::DisplaySink;

/// Discards frames; results are only visible through logging.
pub struct NullSink {
    cancel: CancelSignal,
    frames_shown: usize,
}

impl NullSink {
    pub fn new(cancel: CancelSignal) -> Self {
        Self {
            cancel,
            frames_shown: 0,
        }
    }

    pub fn frames_shown(&self) -> usize {
        self.frames_shown
    }
}

impl DisplaySink for NullSink {
    fn open(
        &mut self,
        _title: &str,
        _frame_rate: Option<f64>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    fn show(&mut self, _title: &str, _frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        self.frames_shown += 1;
        Ok(())
    }

    fn poll_cancel(&mut self, timeout: Duration) -> bool {
        self.cancel.poll(timeout)
    }

    fn release(&mut self) {}
}
