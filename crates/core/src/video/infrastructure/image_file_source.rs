use crate::shared::frame::Frame;
use crate::video::domain::frame_source::FrameSource;
use crate::video::domain::source_kind::SourceKind;

/// Serves a still image as a one-frame stream.
#[derive(Default)]
pub struct ImageFileSource {
    opened: bool,
    pending: Option<Frame>,
}

impl ImageFileSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSource for ImageFileSource {
    fn open(&mut self, kind: &SourceKind) -> Result<(), Box<dyn std::error::Error>> {
        self.release();
        let SourceKind::File(path) = kind else {
            return Err(format!("ImageFileSource cannot open {kind}").into());
        };
        let image = image::open(path)?.to_rgb8();
        self.pending = Some(Frame::from_rgb_image(image, 0));
        self.opened = true;
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        if !self.opened {
            return Err("ImageFileSource: not opened".into());
        }
        Ok(self.pending.take())
    }

    fn release(&mut self) {
        self.opened = false;
        self.pending = None;
    }
}
