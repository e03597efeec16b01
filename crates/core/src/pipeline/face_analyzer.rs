use std::time::Instant;

use crate::annotation::domain::face_annotation::FaceAnnotation;
use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::annotation::infrastructure::overlay_annotator::OverlayAnnotator;
use crate::classification::domain::region_classifier::RegionClassifier;
use crate::detection::domain::detection_candidate::DetectionCandidate;
use crate::detection::domain::face_detector::FaceDetector;
use crate::inference::domain::model_set::ModelSet;
use crate::shared::frame::Frame;

use super::pipeline_config::PipelineConfig;
use super::pipeline_error::PipelineError;
use super::pipeline_logger::PipelineLogger;

/// Per-frame core: detect → classify each face twice → annotate.
///
/// Holds no state between frames.
pub struct FaceAnalyzer {
    detector: FaceDetector,
    gender: RegionClassifier,
    age: RegionClassifier,
    annotator: Box<dyn FrameAnnotator>,
}

impl FaceAnalyzer {
    pub fn new(models: &ModelSet, config: &PipelineConfig) -> Self {
        Self {
            detector: FaceDetector::new(models.face().clone(), config),
            gender: RegionClassifier::gender(models, config),
            age: RegionClassifier::age(models, config),
            annotator: Box::new(OverlayAnnotator::default()),
        }
    }

    pub fn with_annotator(mut self, annotator: Box<dyn FrameAnnotator>) -> Self {
        self.annotator = annotator;
        self
    }

    /// Classifies the face inside `candidate` without touching the frame.
    pub fn classify(
        &self,
        frame: &Frame,
        candidate: DetectionCandidate,
    ) -> Result<FaceAnnotation, PipelineError> {
        let region = frame.crop(&candidate.bbox);
        let gender = self.gender.classify(&region)?;
        let age = self.age.classify(&region)?;
        Ok(FaceAnnotation {
            bbox: candidate.bbox,
            confidence: candidate.confidence,
            gender,
            age,
        })
    }

    /// Finds, labels and draws every face in `frame`.
    ///
    /// All faces are classified before any drawing, so no crop ever contains
    /// another face's overlay.
    pub fn analyze(
        &self,
        frame: &mut Frame,
        logger: &mut dyn PipelineLogger,
    ) -> Result<Vec<FaceAnnotation>, PipelineError> {
        let t = Instant::now();
        let candidates = self.detector.detect(frame)?;
        logger.timing("detect", elapsed_ms(t));
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let t = Instant::now();
        let faces = candidates
            .into_iter()
            .map(|candidate| self.classify(frame, candidate))
            .collect::<Result<Vec<_>, _>>()?;
        logger.timing("classify", elapsed_ms(t));

        let t = Instant::now();
        for face in &faces {
            self.annotator
                .annotate(frame, &face.bbox, &face.label())
                .map_err(|e| PipelineError::Annotate {
                    message: e.to_string(),
                })?;
        }
        logger.timing("annotate", elapsed_ms(t));

        Ok(faces)
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
