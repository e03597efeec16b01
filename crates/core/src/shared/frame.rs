use image::{ImageBuffer, Rgb, RgbImage};

use super::bounding_box::BoundingBox;

/// A single captured frame: contiguous RGB bytes in row-major order.
///
/// Sources convert to RGB at their boundary; annotation draws straight into
/// the pixel buffer, so a frame is mutable in place and owned by exactly one
/// pipeline iteration.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    /// Wraps a decoded RGB image as frame `index`.
    pub fn from_rgb_image(image: RgbImage, index: usize) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, 3, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// True for the zero-sized frame some capture backends hand out at end of stream.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }

    /// Borrows the pixel buffer as an RGB image for in-place drawing.
    ///
    /// Returns `None` unless the frame has exactly three channels.
    pub fn as_rgb_image_mut(&mut self) -> Option<ImageBuffer<Rgb<u8>, &mut [u8]>> {
        if self.channels != 3 {
            return None;
        }
        ImageBuffer::from_raw(self.width, self.height, self.data.as_mut_slice())
    }

    /// Copies an owned RGB image out of the frame.
    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        if self.channels != 3 {
            return None;
        }
        RgbImage::from_raw(self.width, self.height, self.data.clone())
    }

    /// Deep-copies the pixels covered by `bbox`: columns `x1..x2` and rows
    /// `y1..y2`, so the crop is `bbox.width()` by `bbox.height()`.
    ///
    /// The box must already be clipped to this frame; pixels outside the
    /// frame are never read.
    pub fn crop(&self, bbox: &BoundingBox) -> Frame {
        let channels = self.channels as usize;
        let fw = self.width as usize;
        let x1 = bbox.x1.max(0) as usize;
        let y1 = bbox.y1.max(0) as usize;
        let x2 = (bbox.x2.max(0) as usize).min(fw);
        let y2 = (bbox.y2.max(0) as usize).min(self.height as usize);
        if self.is_empty() || x2 <= x1 || y2 <= y1 {
            return Frame::new(Vec::new(), 0, 0, self.channels, self.index);
        }

        let cw = x2 - x1;
        let ch = y2 - y1;
        let mut data = Vec::with_capacity(cw * ch * channels);
        for row in y1..y2 {
            let start = (row * fw + x1) * channels;
            data.extend_from_slice(&self.data[start..start + cw * channels]);
        }
        Frame::new(data, cw as u32, ch as u32, self.channels, self.index)
    }
}
