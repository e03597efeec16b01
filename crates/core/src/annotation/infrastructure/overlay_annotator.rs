use image::{GenericImage, Rgb};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

use super::bitmap_font::{glyph, text_size, GLYPH_ADVANCE, GLYPH_WIDTH};

pub const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const BOX_THICKNESS: u32 = 2;
pub const TEXT_SCALE: u32 = 2;
/// Gap between the label baseline and the top edge of the box.
pub const TEXT_OFFSET: i32 = 10;

/// Draws green face boxes with bitmap-font labels straight into the frame.
pub struct OverlayAnnotator {
    color: Rgb<u8>,
    thickness: u32,
    text_scale: u32,
}

impl OverlayAnnotator {
    pub fn new(color: Rgb<u8>, thickness: u32, text_scale: u32) -> Self {
        Self {
            color,
            thickness: thickness.max(1),
            text_scale: text_scale.max(1),
        }
    }

    /// Top-left corner of the label for `bbox`.
    ///
    /// Sits `TEXT_OFFSET` pixels above the box and is clamped so the label
    /// stays inside the frame when the box touches an edge.
    pub fn text_anchor(
        &self,
        bbox: &BoundingBox,
        text: &str,
        frame_width: u32,
        frame_height: u32,
    ) -> (i32, i32) {
        let (text_w, text_h) = text_size(text, self.text_scale);
        let max_x = (frame_width as i32 - text_w as i32).max(0);
        let max_y = (frame_height as i32 - text_h as i32).max(0);
        let x = bbox.x1.clamp(0, max_x);
        let y = (bbox.y1 - TEXT_OFFSET - text_h as i32).clamp(0, max_y);
        (x, y)
    }

    fn draw_box<I>(&self, image: &mut I, bbox: &BoundingBox)
    where
        I: GenericImage<Pixel = Rgb<u8>>,
    {
        // Inset rings so a box on the frame border stays fully visible.
        for ring in 0..self.thickness as i32 {
            let w = bbox.width() - 2 * ring;
            let h = bbox.height() - 2 * ring;
            if w <= 0 || h <= 0 {
                break;
            }
            let rect = Rect::at(bbox.x1 + ring, bbox.y1 + ring).of_size(w as u32, h as u32);
            draw_hollow_rect_mut(image, rect, self.color);
        }
    }

    fn draw_text<I>(&self, image: &mut I, origin: (i32, i32), text: &str)
    where
        I: GenericImage<Pixel = Rgb<u8>>,
    {
        let (width, height) = (image.width() as i32, image.height() as i32);
        let scale = self.text_scale as i32;

        for (i, ch) in text.chars().enumerate() {
            let gx = origin.0 + (i as u32 * GLYPH_ADVANCE) as i32 * scale;
            if gx >= width {
                break;
            }
            for (row, bits) in glyph(ch).iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                        continue;
                    }
                    for dy in 0..scale {
                        for dx in 0..scale {
                            let px = gx + col as i32 * scale + dx;
                            let py = origin.1 + row as i32 * scale + dy;
                            if px >= 0 && py >= 0 && px < width && py < height {
                                image.put_pixel(px as u32, py as u32, self.color);
                            }
                        }
                    }
                }
            }
        }
    }
}

impl Default for OverlayAnnotator {
    fn default() -> Self {
        Self::new(BOX_COLOR, BOX_THICKNESS, TEXT_SCALE)
    }
}

impl FrameAnnotator for OverlayAnnotator {
    fn annotate(
        &self,
        frame: &mut Frame,
        bbox: &BoundingBox,
        text: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let (fw, fh) = (frame.width(), frame.height());
        let anchor = self.text_anchor(bbox, text, fw, fh);
        let bbox = bbox.clip(fw, fh);

        let mut image = frame
            .as_rgb_image_mut()
            .ok_or("OverlayAnnotator: frame is not 3-channel RGB")?;
        if !bbox.is_degenerate() {
            self.draw_box(&mut image, &bbox);
        }
        self.draw_text(&mut image, anchor, text);
        Ok(())
    }
}
