/// An axis-aligned face box in frame pixel coordinates.
///
/// Covers columns `x1..x2` and rows `y1..y2`; the right and bottom edges are
/// exclusive. A clipped box satisfies `0 <= x1 < x2 <= width - 1` and
/// `0 <= y1 < y2 <= height - 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Scales `[x1, y1, x2, y2]` fractions of the frame size to pixels.
    ///
    /// Scaling runs in f64 before truncating toward zero, so a fraction that
    /// lands just under a pixel boundary is not rounded up by f32 precision.
    /// Out-of-range and non-finite inputs saturate and are brought back into
    /// the frame by [`BoundingBox::clip`].
    pub fn from_normalized(coords: [f32; 4], frame_width: u32, frame_height: u32) -> Self {
        let scale = |c: f32, size: u32| (f64::from(c) * f64::from(size)) as i32;
        Self {
            x1: scale(coords[0], frame_width),
            y1: scale(coords[1], frame_height),
            x2: scale(coords[2], frame_width),
            y2: scale(coords[3], frame_height),
        }
    }

    /// Clamps both corners into `[0, width - 1] x [0, height - 1]`.
    ///
    /// Clipping never reorders corners; an inverted box stays inverted and is
    /// caught by [`BoundingBox::is_degenerate`].
    pub fn clip(&self, frame_width: u32, frame_height: u32) -> Self {
        let max_x = (frame_width as i32 - 1).max(0);
        let max_y = (frame_height as i32 - 1).max(0);
        Self {
            x1: self.x1.clamp(0, max_x),
            y1: self.y1.clamp(0, max_y),
            x2: self.x2.clamp(0, max_x),
            y2: self.y2.clamp(0, max_y),
        }
    }

    /// Empty or inverted along either axis.
    pub fn is_degenerate(&self) -> bool {
        self.x2 <= self.x1 || self.y2 <= self.y1
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }
}
