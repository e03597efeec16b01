//! Input blob construction shared by the detector and both classifiers.
//!
//! Frames are RGB in memory while all three networks were trained on BGR
//! input, so planes are written in B, G, R order with BGR-ordered means.
//! No further scaling is applied (scale factor 1.0).

use image::imageops::{self, FilterType};
use ndarray::Array4;

use crate::shared::frame::Frame;

use super::inference_error::InferenceError;

/// Target size and per-plane mean for one network's input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlobSpec {
    /// `(width, height)` the image is resized to.
    pub input_size: (u32, u32),
    /// Mean subtracted from the B, G and R planes respectively.
    pub mean: [f32; 3],
}

impl BlobSpec {
    pub const fn new(input_size: (u32, u32), mean: [f32; 3]) -> Self {
        Self { input_size, mean }
    }
}

/// Resize `frame` to `spec.input_size` (bilinear) and lay it out as a
/// `[1, 3, H, W]` mean-subtracted BGR tensor.
pub fn build_blob(frame: &Frame, spec: &BlobSpec) -> Result<Array4<f32>, InferenceError> {
    if frame.is_empty() {
        return Err(InferenceError::EmptyInput);
    }
    let image = frame
        .to_rgb_image()
        .ok_or(InferenceError::UnsupportedChannels {
            channels: frame.channels(),
        })?;

    let (tw, th) = spec.input_size;
    let resized = if image.dimensions() == (tw, th) {
        image
    } else {
        imageops::resize(&image, tw, th, FilterType::Triangle)
    };

    let mut tensor = Array4::<f32>::zeros((1, 3, th as usize, tw as usize));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for plane in 0..3 {
            // plane 0 = B = RGB channel 2
            let value = pixel.0[2 - plane] as f32;
            tensor[[0, plane, y as usize, x as usize]] = value - spec.mean[plane];
        }
    }
    Ok(tensor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn solid_frame(width: u32, height: u32, rgb: [u8; 3]) -> Frame {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take((width * height * 3) as usize)
            .collect();
        Frame::new(data, width, height, 3, 0)
    }

    #[test]
    fn test_blob_shape_is_nchw_at_target_size() {
        let frame = solid_frame(64, 48, [0, 0, 0]);
        let blob = build_blob(&frame, &BlobSpec::new((30, 20), [0.0; 3])).unwrap();
        assert_eq!(blob.shape(), &[1, 3, 20, 30]);
    }

    #[test]
    fn test_blob_planes_are_bgr_ordered() {
        let frame = solid_frame(8, 8, [10, 20, 30]);
        let blob = build_blob(&frame, &BlobSpec::new((4, 4), [0.0; 3])).unwrap();
        assert_relative_eq!(blob[[0, 0, 1, 1]], 30.0);
        assert_relative_eq!(blob[[0, 1, 1, 1]], 20.0);
        assert_relative_eq!(blob[[0, 2, 1, 1]], 10.0);
    }

    #[test]
    fn test_blob_subtracts_mean_per_plane() {
        let frame = solid_frame(300, 300, [123, 177, 104]);
        let blob = build_blob(&frame, &BlobSpec::new((300, 300), [104.0, 177.0, 123.0])).unwrap();
        assert!(blob.iter().all(|v| v.abs() < 1e-6));
    }

    #[test]
    fn test_blob_is_not_rescaled() {
        let frame = solid_frame(5, 5, [255, 255, 255]);
        let blob = build_blob(&frame, &BlobSpec::new((5, 5), [0.0; 3])).unwrap();
        assert_relative_eq!(blob[[0, 0, 0, 0]], 255.0);
    }

    #[test]
    fn test_blob_rejects_empty_frame() {
        let frame = Frame::new(Vec::new(), 0, 0, 3, 0);
        let result = build_blob(&frame, &BlobSpec::new((4, 4), [0.0; 3]));
        assert!(matches!(result, Err(InferenceError::EmptyInput)));
    }

    #[test]
    fn test_blob_rejects_single_channel() {
        let frame = Frame::new(vec![0u8; 4], 2, 2, 1, 0);
        let result = build_blob(&frame, &BlobSpec::new((4, 4), [0.0; 3]));
        assert!(matches!(
            result,
            Err(InferenceError::UnsupportedChannels { channels: 1 })
        ));
    }
}
