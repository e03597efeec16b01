use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;

use crate::shared::constants::ESCAPE_KEY;

/// Operator stop request shared between the pipeline loop and its inputs.
///
/// Combines a flag that any thread may raise with an optional stream of
/// key presses. Once raised the signal stays raised.
#[derive(Clone, Default)]
pub struct CancelSignal {
    cancelled: Arc<AtomicBool>,
    keys: Option<Receiver<String>>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also treats ESC or `q` arriving on `keys` as a stop request.
    pub fn with_keys(keys: Receiver<String>) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            keys: Some(keys),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Waits up to `timeout` for a key, then reports the flag.
    ///
    /// Without a key stream this never blocks.
    pub fn poll(&self, timeout: Duration) -> bool {
        if self.is_cancelled() {
            return true;
        }
        if let Some(keys) = &self.keys {
            // Timeout and a closed key stream both mean "keep going".
            if let Ok(input) = keys.recv_timeout(timeout) {
                if is_cancel_key(&input) {
                    self.cancel();
                }
            }
        }
        self.is_cancelled()
    }
}

/// ESC anywhere in the line, or a bare `q`.
pub fn is_cancel_key(input: &str) -> bool {
    input.contains(ESCAPE_KEY) || input.trim().eq_ignore_ascii_case("q")
}
