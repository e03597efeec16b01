//! Stub networks and frame builders shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use ndarray::{Array4, ArrayD, IxDyn};

use crate::inference::domain::inference_error::InferenceError;
use crate::inference::domain::inference_network::InferenceNetwork;
use crate::shared::frame::Frame;

/// Returns a fixed tensor for every call and records what it was fed.
pub struct StubNetwork {
    name: String,
    output: ArrayD<f32>,
    calls: AtomicUsize,
    last_input_shape: Mutex<Option<Vec<usize>>>,
}

impl StubNetwork {
    pub fn new(name: &str, shape: &[usize], data: Vec<f32>) -> Self {
        Self {
            name: name.to_string(),
            output: ArrayD::from_shape_vec(IxDyn(shape), data).unwrap(),
            calls: AtomicUsize::new(0),
            last_input_shape: Mutex::new(None),
        }
    }

    /// SSD-style `[1, 1, N, 7]` detector output.
    pub fn detections(rows: &[[f32; 7]]) -> Self {
        let data = rows.iter().flatten().copied().collect();
        Self::new("face", &[1, 1, rows.len(), 7], data)
    }

    /// Classifier-style `[1, N]` score vector.
    pub fn scores(name: &str, values: &[f32]) -> Self {
        Self::new(name, &[1, values.len()], values.to_vec())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_input_shape(&self) -> Option<Vec<usize>> {
        self.last_input_shape.lock().unwrap().clone()
    }
}

impl InferenceNetwork for StubNetwork {
    fn name(&self) -> &str {
        &self.name
    }

    fn forward(&self, blob: Array4<f32>) -> Result<ArrayD<f32>, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_input_shape.lock().unwrap() = Some(blob.shape().to_vec());
        Ok(self.output.clone())
    }
}

/// Always fails, as an unloaded or broken network would.
pub struct FailingNetwork;

impl InferenceNetwork for FailingNetwork {
    fn name(&self) -> &str {
        "broken"
    }

    fn forward(&self, _blob: Array4<f32>) -> Result<ArrayD<f32>, InferenceError> {
        Err(InferenceError::Run {
            network: "broken".to_string(),
            message: "session not initialized".to_string(),
        })
    }
}

/// One SSD detection row with normalized corners.
pub fn face_row(confidence: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> [f32; 7] {
    [0.0, 1.0, confidence, x1, y1, x2, y2]
}

pub fn solid_frame(width: u32, height: u32, rgb: [u8; 3]) -> Frame {
    solid_frame_at(width, height, rgb, 0)
}

pub fn solid_frame_at(width: u32, height: u32, rgb: [u8; 3], index: usize) -> Frame {
    let data = rgb
        .iter()
        .copied()
        .cycle()
        .take((width * height * 3) as usize)
        .collect();
    Frame::new(data, width, height, 3, index)
}
