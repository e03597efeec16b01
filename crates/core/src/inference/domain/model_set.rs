use std::sync::Arc;

use super::inference_network::InferenceNetwork;

/// The three loaded networks, passed explicitly into the pipeline.
///
/// Cloning shares the underlying handles.
#[derive(Clone)]
pub struct ModelSet {
    face: Arc<dyn InferenceNetwork>,
    age: Arc<dyn InferenceNetwork>,
    gender: Arc<dyn InferenceNetwork>,
}

impl ModelSet {
    pub fn new(
        face: Arc<dyn InferenceNetwork>,
        age: Arc<dyn InferenceNetwork>,
        gender: Arc<dyn InferenceNetwork>,
    ) -> Self {
        Self { face, age, gender }
    }

    pub fn face(&self) -> &Arc<dyn InferenceNetwork> {
        &self.face
    }

    pub fn age(&self) -> &Arc<dyn InferenceNetwork> {
        &self.age
    }

    pub fn gender(&self) -> &Arc<dyn InferenceNetwork> {
        &self.gender
    }
}
