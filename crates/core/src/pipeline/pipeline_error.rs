use thiserror::Error;

use crate::classification::domain::region_classifier::ClassifyError;
use crate::inference::domain::inference_error::InferenceError;

/// Why a pipeline run ended early.
///
/// I/O adapters report boxed errors; their messages are captured here so the
/// error stays `Send` and comparable in tests.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to open {source_name}: {message}")]
    SourceOpen {
        source_name: String,
        message: String,
    },
    #[error("Frame source failed: {message}")]
    Source { message: String },
    #[error("Display sink failed: {message}")]
    Display { message: String },
    #[error("Annotation failed: {message}")]
    Annotate { message: String },
    #[error("Face detection failed: {0}")]
    Inference(#[from] InferenceError),
    #[error("Face classification failed: {0}")]
    Classify(#[from] ClassifyError),
}
