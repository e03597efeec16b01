/// Inference networks backed by ONNX Runtime via `ort`.
///
/// The res10 SSD detector and the age/gender classifiers are loaded from
/// their ONNX conversions; all three share this wrapper.
use std::fmt::Display;
use std::path::Path;
use std::sync::{Arc, Mutex};

use ndarray::{Array4, ArrayD};

use crate::inference::domain::inference_error::InferenceError;
use crate::inference::domain::inference_network::InferenceNetwork;
use crate::inference::domain::model_set::ModelSet;

use super::model_resolver::ModelPaths;

/// One ONNX Runtime session.
///
/// `Session::run` needs `&mut`, so the session sits behind a mutex to keep
/// the handle shareable and `forward` callable through `&self`.
pub struct OnnxNetwork {
    name: String,
    session: Mutex<ort::session::Session>,
}

impl OnnxNetwork {
    pub fn load(name: &str, model_path: &Path) -> Result<Self, InferenceError> {
        let session = ort::session::Session::builder()
            .map_err(|e| load_error(model_path, e))?
            .with_execution_providers(preferred_execution_providers())
            .map_err(|e| load_error(model_path, e))?
            .commit_from_file(model_path)
            .map_err(|e| load_error(model_path, e))?;

        if session.inputs().is_empty() || session.outputs().is_empty() {
            return Err(InferenceError::EmptyModel {
                path: model_path.to_path_buf(),
            });
        }

        log::debug!("Loaded {name} network from {}", model_path.display());
        Ok(Self {
            name: name.to_string(),
            session: Mutex::new(session),
        })
    }

    fn run_error(&self, e: impl Display) -> InferenceError {
        InferenceError::Run {
            network: self.name.clone(),
            message: e.to_string(),
        }
    }
}

impl InferenceNetwork for OnnxNetwork {
    fn name(&self) -> &str {
        &self.name
    }

    fn forward(&self, blob: Array4<f32>) -> Result<ArrayD<f32>, InferenceError> {
        let input_value = ort::value::Tensor::from_array(blob).map_err(|e| self.run_error(e))?;
        let mut session = self
            .session
            .lock()
            .map_err(|e| self.run_error(format!("Lock poisoned: {e}")))?;
        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(|e| self.run_error(e))?;
        if outputs.len() == 0 {
            return Err(InferenceError::NoOutput {
                network: self.name.clone(),
            });
        }
        let tensor = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| self.run_error(e))?;
        Ok(tensor.to_owned())
    }
}

/// Loads the face, age and gender networks. Any failure is fatal.
pub fn load_model_set(paths: &ModelPaths) -> Result<ModelSet, InferenceError> {
    let face = OnnxNetwork::load("face", &paths.face)?;
    let age = OnnxNetwork::load("age", &paths.age)?;
    let gender = OnnxNetwork::load("gender", &paths.gender)?;
    Ok(ModelSet::new(Arc::new(face), Arc::new(age), Arc::new(gender)))
}

fn load_error(path: &Path, e: impl Display) -> InferenceError {
    InferenceError::Load {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Platform execution providers; ONNX Runtime falls back to CPU when the
/// preferred one is unavailable.
fn preferred_execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}
