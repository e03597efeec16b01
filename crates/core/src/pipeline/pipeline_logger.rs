use std::collections::HashMap;
use std::time::Instant;

use crate::annotation::domain::face_annotation::FaceAnnotation;

/// Observer for per-frame pipeline events.
///
/// Keeps the controller free of any particular output mechanism: the CLI
/// logs progress and a timing summary, tests stay silent.
pub trait PipelineLogger: Send {
    /// Report the faces found in one processed frame.
    fn frame(&mut self, index: usize, faces: &[FaceAnnotation]);

    /// Record how long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn frame(&mut self, _index: usize, _faces: &[FaceAnnotation]) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Logs face results through `log` and keeps per-stage timings for a
/// closing summary.
///
/// Per-frame lines go out at `info` every `throttle_frames` frames and at
/// `debug` otherwise, so live camera runs do not flood the terminal.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    timings: HashMap<String, Vec<f64>>,
    face_counts: Vec<usize>,
    start_time: Instant,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            face_counts: Vec::new(),
            start_time: Instant::now(),
        }
    }

    pub fn frames(&self) -> usize {
        self.face_counts.len()
    }

    pub fn total_faces(&self) -> usize {
        self.face_counts.iter().sum()
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    /// Formatted summary, or `None` before the first frame.
    pub fn summary_string(&self) -> Option<String> {
        let frames = self.frames();
        if frames == 0 {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Pipeline summary ({frames} frames, {} faces, {:.1}s total):",
            self.total_faces(),
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len().max(1) as f64;
            lines.push(format!(
                "  {stage:10}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms"
            ));
        }

        let avg_faces = self.total_faces() as f64 / frames as f64;
        lines.push(format!("  Faces per frame: avg {avg_faces:.1}"));

        if elapsed_ms > 0.0 {
            let fps = frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn frame(&mut self, index: usize, faces: &[FaceAnnotation]) {
        self.face_counts.push(faces.len());

        let line = format!("Frame {index}: {} face(s)", faces.len());
        if index % self.throttle_frames == 0 {
            log::info!("{line}");
        } else {
            log::debug!("{line}");
        }
        for face in faces {
            let b = face.bbox;
            log::debug!(
                "  {} conf={:.2} box=({}, {})-({}, {})",
                face.label(),
                face.confidence,
                b.x1,
                b.y1,
                b.x2,
                b.y2
            );
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::bounding_box::BoundingBox;
    use approx::assert_relative_eq;

    fn face() -> FaceAnnotation {
        FaceAnnotation {
            bbox: BoundingBox::new(1, 2, 30, 40),
            confidence: 0.97,
            gender: "Male",
            age: "(25-32)",
        }
    }

    #[test]
    fn test_null_logger_accepts_everything() {
        let mut logger = NullPipelineLogger;
        logger.frame(0, &[face()]);
        logger.timing("detect", 5.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_frame_counts_faces() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.frame(0, &[face(), face()]);
        logger.frame(1, &[]);
        logger.frame(2, &[face()]);
        assert_eq!(logger.frames(), 3);
        assert_eq!(logger.total_faces(), 3);
    }

    #[test]
    fn test_timing_records_values() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing("detect", 20.0);
        logger.timing("detect", 30.0);
        logger.timing("classify", 5.0);

        let detect = logger.timings_for("detect").unwrap();
        assert_eq!(detect.len(), 2);
        assert_relative_eq!(detect.iter().sum::<f64>() / 2.0, 25.0);
        assert_eq!(logger.timings_for("classify").unwrap().len(), 1);
        assert!(logger.timings_for("display").is_none());
    }

    #[test]
    fn test_summary_lists_stages_faces_and_fps() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.frame(0, &[face()]);
        logger.frame(1, &[face(), face(), face()]);
        logger.timing("detect", 12.0);
        logger.timing("annotate", 1.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Pipeline summary (2 frames, 4 faces"));
        assert!(summary.contains("detect"));
        assert!(summary.contains("annotate"));
        assert!(summary.contains("Faces per frame: avg 2.0"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing("detect", 3.0);
        assert!(logger.summary_string().is_none());
    }

    #[test]
    fn test_throttle_is_at_least_one() {
        let mut logger = StdoutPipelineLogger::new(0);
        logger.frame(7, &[]);
        assert_eq!(logger.throttle_frames, 1);
    }
}
