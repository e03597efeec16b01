use std::path::{Path, PathBuf};
use std::time::Duration;

use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video;

use crate::shared::constants::DEFAULT_OUTPUT_FPS;
use crate::shared::frame::Frame;
use crate::video::domain::cancel_signal::CancelSignal;
use crate::video::domain::display_sink::DisplaySink;

/// Records annotated frames to a video file with ffmpeg's MPEG4 encoder.
///
/// The encoder is created on the first frame, once the frame size is known.
/// Every later frame must have the same size.
pub struct VideoFileSink {
    path: PathBuf,
    cancel: CancelSignal,
    fps: i32,
    encoder: Option<EncodeStream>,
    frames_written: usize,
}

impl VideoFileSink {
    pub fn new(path: &Path, cancel: CancelSignal) -> Self {
        Self {
            path: path.to_path_buf(),
            cancel,
            fps: DEFAULT_OUTPUT_FPS as i32,
            encoder: None,
            frames_written: 0,
        }
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }
}

impl DisplaySink for VideoFileSink {
    fn open(
        &mut self,
        title: &str,
        frame_rate: Option<f64>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.fps = frame_rate
            .map(|fps| fps.round() as i32)
            .filter(|fps| *fps > 0)
            .unwrap_or(DEFAULT_OUTPUT_FPS as i32);
        log::info!(
            "{title}: recording to {} at {} fps",
            self.path.display(),
            self.fps
        );
        Ok(())
    }

    fn show(&mut self, _title: &str, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if self.encoder.is_none() {
            self.encoder = Some(EncodeStream::start(
                &self.path,
                frame.width(),
                frame.height(),
                self.fps,
            )?);
        }
        let Some(encoder) = self.encoder.as_mut() else {
            return Err("VideoFileSink: encoder unavailable".into());
        };
        encoder.encode(frame)?;
        self.frames_written += 1;
        Ok(())
    }

    fn poll_cancel(&mut self, timeout: Duration) -> bool {
        self.cancel.poll(timeout)
    }

    fn release(&mut self) {
        if let Some(mut encoder) = self.encoder.take() {
            if let Err(e) = encoder.finish() {
                log::warn!("Failed to finalize {}: {e}", self.path.display());
            } else {
                log::info!(
                    "Wrote {} frames to {}",
                    self.frames_written,
                    self.path.display()
                );
            }
        }
    }
}

impl Drop for VideoFileSink {
    fn drop(&mut self) {
        self.release();
    }
}

/// Open muxer, encoder and RGB -> YUV converter for one output file.
struct EncodeStream {
    output: ffmpeg_next::format::context::Output,
    encoder: ffmpeg_next::codec::encoder::video::Encoder,
    scaler: scaling::Context,
    width: u32,
    height: u32,
    time_base: ffmpeg_next::Rational,
    stream_time_base: ffmpeg_next::Rational,
    next_pts: i64,
}

impl EncodeStream {
    fn start(
        path: &Path,
        width: u32,
        height: u32,
        fps: i32,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;
        if width < 2 || height < 2 {
            return Err(format!("VideoFileSink: cannot encode {width}x{height} frames").into());
        }
        // YUV420P needs even dimensions.
        let (out_w, out_h) = (width & !1, height & !1);

        let mut output = ffmpeg_next::format::output(path)?;
        let global_header = output
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4)
            .ok_or("MPEG4 encoder not found")?;
        let mut stream = output.add_stream(Some(codec))?;

        let mut context = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;
        context.set_width(out_w);
        context.set_height(out_h);
        context.set_format(ffmpeg_next::format::Pixel::YUV420P);
        let time_base = ffmpeg_next::Rational(1, fps);
        context.set_time_base(time_base);
        context.set_frame_rate(Some(ffmpeg_next::Rational(fps, 1)));
        if global_header {
            context.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = context.open_with(ffmpeg_next::Dictionary::new())?;
        stream.set_parameters(&encoder);
        output.write_header()?;
        let stream_time_base = output
            .stream(0)
            .ok_or("VideoFileSink: output stream missing")?
            .time_base();

        let scaler = scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::format::Pixel::YUV420P,
            out_w,
            out_h,
            scaling::Flags::BILINEAR,
        )?;

        Ok(Self {
            output,
            encoder,
            scaler,
            width,
            height,
            time_base,
            stream_time_base,
            next_pts: 0,
        })
    }

    fn encode(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if frame.width() != self.width || frame.height() != self.height || frame.channels() != 3 {
            return Err(format!(
                "VideoFileSink: expected {}x{} RGB frames, got {}x{}x{}",
                self.width,
                self.height,
                frame.width(),
                frame.height(),
                frame.channels()
            )
            .into());
        }

        let mut rgb = Video::new(ffmpeg_next::format::Pixel::RGB24, self.width, self.height);
        let stride = rgb.stride(0);
        let row_bytes = self.width as usize * 3;
        let dst = rgb.data_mut(0);
        for (row, src) in frame.data().chunks_exact(row_bytes).enumerate() {
            let start = row * stride;
            dst[start..start + row_bytes].copy_from_slice(src);
        }

        let mut yuv = Video::empty();
        self.scaler.run(&rgb, &mut yuv)?;
        yuv.set_pts(Some(self.next_pts));
        self.next_pts += 1;

        self.encoder.send_frame(&yuv)?;
        self.write_packets()
    }

    fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.encoder.send_eof()?;
        self.write_packets()?;
        self.output.write_trailer()?;
        Ok(())
    }

    fn write_packets(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let mut packet = ffmpeg_next::Packet::empty();
        while self.encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(0);
            packet.rescale_ts(self.time_base, self.stream_time_base);
            packet.write_interleaved(&mut self.output)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{solid_frame, solid_frame_at};

    #[test]
    fn test_writes_playable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        let mut sink = VideoFileSink::new(&path, CancelSignal::new());
        sink.open("Video Face Analysis", Some(30.0)).unwrap();
        for i in 0..3 {
            sink.show("Video Face Analysis", &solid_frame_at(64, 48, [200, 10, 10], i))
                .unwrap();
        }
        sink.release();

        assert_eq!(sink.frames_written(), 3);
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_no_frames_means_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.mp4");
        let mut sink = VideoFileSink::new(&path, CancelSignal::new());
        sink.open("Video Face Analysis", None).unwrap();
        sink.release();
        assert!(!path.exists());
    }

    #[test]
    fn test_odd_frame_size_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odd.mp4");
        let mut sink = VideoFileSink::new(&path, CancelSignal::new());
        sink.open("Camera Face Analysis", None).unwrap();
        sink.show("Camera Face Analysis", &solid_frame(65, 49, [0, 0, 0]))
            .unwrap();
        sink.release();
        assert!(path.exists());
    }

    #[test]
    fn test_frame_size_change_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        let mut sink = VideoFileSink::new(&path, CancelSignal::new());
        sink.open("Video Face Analysis", None).unwrap();
        sink.show("Video Face Analysis", &solid_frame(64, 48, [0, 0, 0]))
            .unwrap();
        assert!(sink
            .show("Video Face Analysis", &solid_frame(32, 24, [0, 0, 0]))
            .is_err());
    }

    #[test]
    fn test_release_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        let mut sink = VideoFileSink::new(&path, CancelSignal::new());
        sink.open("Video Face Analysis", None).unwrap();
        sink.show("Video Face Analysis", &solid_frame(64, 48, [0, 0, 0]))
            .unwrap();
        sink.release();
        sink.release();
    }

    #[test]
    fn test_poll_cancel_follows_signal() {
        let dir = tempfile::tempdir().unwrap();
        let signal = CancelSignal::new();
        let mut sink = VideoFileSink::new(&dir.path().join("out.mp4"), signal.clone());
        assert!(!sink.poll_cancel(Duration::from_millis(1)));
        signal.cancel();
        assert!(sink.poll_cancel(Duration::from_millis(1)));
    }
}
