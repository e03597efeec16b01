use std::time::{Duration, Instant};

use crate::shared::constants::CANCEL_POLL_TIMEOUT_MS;
use crate::video::domain::display_sink::DisplaySink;
use crate::video::domain::frame_source::FrameSource;
use crate::video::domain::source_kind::SourceKind;

use super::face_analyzer::FaceAnalyzer;
use super::pipeline_error::PipelineError;
use super::pipeline_logger::PipelineLogger;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Running,
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    EndOfStream,
    Cancelled,
    FrameLimit,
}

/// Drives the read → analyze → show → poll loop for one source at a time.
///
/// Processing is strictly sequential. Whatever ends a run (end of stream,
/// cancellation, a failed open or any error) the source and sink are
/// released and the state is `Stopped`.
pub struct PipelineController {
    analyzer: FaceAnalyzer,
    logger: Box<dyn PipelineLogger>,
    state: PipelineState,
    max_frames: Option<usize>,
    poll_timeout: Duration,
}

impl PipelineController {
    pub fn new(analyzer: FaceAnalyzer, logger: Box<dyn PipelineLogger>) -> Self {
        Self {
            analyzer,
            logger,
            state: PipelineState::Idle,
            max_frames: None,
            poll_timeout: Duration::from_millis(CANCEL_POLL_TIMEOUT_MS),
        }
    }

    /// Stops with [`StopReason::FrameLimit`] after `max_frames` frames.
    pub fn with_max_frames(mut self, max_frames: Option<usize>) -> Self {
        self.max_frames = max_frames;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn run(
        &mut self,
        kind: &SourceKind,
        source: &mut dyn FrameSource,
        sink: &mut dyn DisplaySink,
    ) -> Result<StopReason, PipelineError> {
        let Self {
            analyzer,
            logger,
            state,
            max_frames,
            poll_timeout,
        } = self;
        *state = PipelineState::Idle;
        let title = kind.window_title();
        let mut session = ReleaseGuard {
            source,
            sink,
            state,
        };

        session
            .source
            .open(kind)
            .map_err(|e| PipelineError::SourceOpen {
                source_name: kind.to_string(),
                message: e.to_string(),
            })?;
        session
            .sink
            .open(title, session.source.frame_rate())
            .map_err(|e| PipelineError::Display {
                message: e.to_string(),
            })?;
        *session.state = PipelineState::Running;
        logger.info(&format!("Processing {kind}"));

        let mut processed = 0usize;
        let reason = loop {
            if max_frames.is_some_and(|max| processed >= max) {
                break StopReason::FrameLimit;
            }

            let frame = session.source.read().map_err(|e| PipelineError::Source {
                message: e.to_string(),
            })?;
            let Some(mut frame) = frame.filter(|f| !f.is_empty()) else {
                break StopReason::EndOfStream;
            };

            let faces = analyzer.analyze(&mut frame, &mut **logger)?;
            logger.frame(frame.index(), &faces);

            let t = Instant::now();
            session
                .sink
                .show(title, &frame)
                .map_err(|e| PipelineError::Display {
                    message: e.to_string(),
                })?;
            logger.timing("display", t.elapsed().as_secs_f64() * 1000.0);
            processed += 1;

            if session.sink.poll_cancel(*poll_timeout) {
                break StopReason::Cancelled;
            }
        };

        logger.info(&format!("Stopped {kind} after {processed} frames: {reason:?}"));
        logger.summary();
        Ok(reason)
    }
}

/// Releases the source and sink and marks the run stopped when dropped.
struct ReleaseGuard<'a> {
    source: &'a mut dyn FrameSource,
    sink: &'a mut dyn DisplaySink,
    state: &'a mut PipelineState,
}

impl Drop for ReleaseGuard<'_> {
    fn drop(&mut self) {
        self.source.release();
        self.sink.release();
        *self.state = PipelineState::Stopped;
    }
}
