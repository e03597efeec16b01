use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::shared::frame::Frame;
use crate::video::domain::cancel_signal::CancelSignal;
use crate::video::domain::display_sink::DisplaySink;

/// Writes each annotated frame as `frame_NNNNNN.png` in a directory.
pub struct ImageSequenceSink {
    dir: PathBuf,
    cancel: CancelSignal,
    frames_written: usize,
}

impl ImageSequenceSink {
    pub fn new(dir: &Path, cancel: CancelSignal) -> Self {
        Self {
            dir: dir.to_path_buf(),
            cancel,
            frames_written: 0,
        }
    }

    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("frame_{index:06}.png"))
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }
}

impl DisplaySink for ImageSequenceSink {
    fn open(
        &mut self,
        title: &str,
        _frame_rate: Option<f64>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::create_dir_all(&self.dir)?;
        log::info!("{title}: writing frames to {}", self.dir.display());
        Ok(())
    }

    fn show(&mut self, _title: &str, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let image = frame
            .to_rgb_image()
            .ok_or("ImageSequenceSink: frame is not 3-channel RGB")?;
        image.save(self.frame_path(frame.index()))?;
        self.frames_written += 1;
        Ok(())
    }

    fn poll_cancel(&mut self, timeout: Duration) -> bool {
        self.cancel.poll(timeout)
    }

    fn release(&mut self) {
        if self.frames_written > 0 {
            log::debug!(
                "{} frames written to {}",
                self.frames_written,
                self.dir.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::solid_frame_at;

    #[test]
    fn test_frames_are_numbered_by_index() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("frames");
        let mut sink = ImageSequenceSink::new(&out, CancelSignal::new());
        sink.open("Video Face Analysis", None).unwrap();
        sink.show("Video Face Analysis", &solid_frame_at(20, 10, [1, 2, 3], 0))
            .unwrap();
        sink.show("Video Face Analysis", &solid_frame_at(20, 10, [4, 5, 6], 7))
            .unwrap();
        sink.release();

        assert_eq!(sink.frames_written(), 2);
        assert!(out.join("frame_000000.png").exists());
        let img = image::open(out.join("frame_000007.png")).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (20, 10));
        assert_eq!(img.get_pixel(0, 0).0, [4, 5, 6]);
    }

    #[test]
    fn test_open_fails_when_dir_cannot_be_created() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let mut sink = ImageSequenceSink::new(&blocker.join("frames"), CancelSignal::new());
        assert!(sink.open("Video Face Analysis", None).is_err());
    }

    #[test]
    fn test_non_rgb_frame_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ImageSequenceSink::new(dir.path(), CancelSignal::new());
        let gray = Frame::new(vec![0; 4], 2, 2, 1, 0);
        assert!(sink.show("Video Face Analysis", &gray).is_err());
    }
}
