use std::path::Path;

use ffmpeg_next::format::context::Input;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video;

use crate::shared::frame::Frame;
use crate::video::domain::frame_source::FrameSource;
use crate::video::domain::source_kind::SourceKind;

/// Decodes camera or file video via ffmpeg-next (libavformat + libavcodec).
///
/// Each decoded picture is converted to RGB24 and handed out as a [`Frame`].
/// Cameras are opened through the platform capture backend registered with
/// libavdevice.
#[derive(Default)]
pub struct FfmpegSource {
    stream: Option<DecodeStream>,
}

impl FfmpegSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSource for FfmpegSource {
    fn open(&mut self, kind: &SourceKind) -> Result<(), Box<dyn std::error::Error>> {
        self.release();
        ffmpeg_next::init()?;

        let input = match kind {
            SourceKind::File(path) => ffmpeg_next::format::input(path)?,
            SourceKind::Camera(index) => open_camera(*index)?,
        };
        let stream = DecodeStream::new(input)?;
        log::debug!(
            "Opened {kind}: {}x{} @ {:?} fps",
            stream.decoder.width(),
            stream.decoder.height(),
            stream.frame_rate
        );
        self.stream = Some(stream);
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let stream = self.stream.as_mut().ok_or("FfmpegSource: not opened")?;
        stream.next_frame()
    }

    fn frame_rate(&self) -> Option<f64> {
        self.stream.as_ref().and_then(|s| s.frame_rate)
    }

    fn release(&mut self) {
        self.stream = None;
    }
}

/// Demuxer, decoder and colour converter for the best video stream.
struct DecodeStream {
    input: Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: Option<scaling::Context>,
    stream_index: usize,
    frame_rate: Option<f64>,
    next_index: usize,
    flushing: bool,
    done: bool,
}

impl DecodeStream {
    fn new(input: Input) -> Result<Self, Box<dyn std::error::Error>> {
        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;
        let stream_index = stream.index();
        let frame_rate = rational_to_fps(stream.avg_frame_rate())
            .or_else(|| rational_to_fps(stream.rate()));
        let decoder = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?
            .decoder()
            .video()?;

        Ok(Self {
            input,
            decoder,
            scaler: None,
            stream_index,
            frame_rate,
            next_index: 0,
            flushing: false,
            done: false,
        })
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        loop {
            if self.done {
                return Ok(None);
            }
            if let Some(frame) = self.receive()? {
                return Ok(Some(frame));
            }
            if self.flushing {
                self.done = true;
                return Ok(None);
            }

            match self.input.packets().next() {
                Some((stream, packet)) => {
                    if stream.index() != self.stream_index {
                        continue;
                    }
                    if let Err(e) = self.decoder.send_packet(&packet) {
                        log::debug!("Skipping undecodable packet: {e}");
                    }
                }
                None => {
                    self.decoder.send_eof()?;
                    self.flushing = true;
                }
            }
        }
    }

    fn receive(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let mut decoded = Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }

        let (width, height) = (decoded.width(), decoded.height());
        if self.scaler.is_none() {
            self.scaler = Some(scaling::Context::get(
                decoded.format(),
                width,
                height,
                ffmpeg_next::format::Pixel::RGB24,
                width,
                height,
                scaling::Flags::BILINEAR,
            )?);
        }
        let Some(scaler) = self.scaler.as_mut() else {
            return Err("FfmpegSource: scaler unavailable".into());
        };

        let mut rgb = Video::empty();
        scaler.run(&decoded, &mut rgb)?;
        let frame = Frame::new(
            packed_rgb(&rgb, width, height),
            width,
            height,
            3,
            self.next_index,
        );
        self.next_index += 1;
        Ok(Some(frame))
    }
}

fn rational_to_fps(rate: ffmpeg_next::Rational) -> Option<f64> {
    if rate.numerator() > 0 && rate.denominator() > 0 {
        Some(rate.numerator() as f64 / rate.denominator() as f64)
    } else {
        None
    }
}

/// Copies an RGB24 picture into a tightly packed buffer, dropping row padding.
fn packed_rgb(rgb: &Video, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb.stride(0);
    let data = rgb.data(0);
    let row_bytes = width as usize * 3;

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_bytes]);
    }
    pixels
}

fn open_camera(index: u32) -> Result<Input, Box<dyn std::error::Error>> {
    ffmpeg_next::device::register_all();
    let (backends, locator) = camera_locator(index)?;

    let format = ffmpeg_next::device::input::video()
        .find(|f| backends.contains(&f.name()))
        .ok_or_else(|| format!("No camera capture backend ({}) available", backends.join("/")))?;
    let context = ffmpeg_next::format::open_with(
        Path::new(&locator),
        &ffmpeg_next::format::format::Format::Input(format),
        ffmpeg_next::Dictionary::new(),
    )?;
    Ok(context.input())
}

type CameraLocator = (&'static [&'static str], String);

#[cfg(target_os = "linux")]
fn camera_locator(index: u32) -> Result<CameraLocator, Box<dyn std::error::Error>> {
    Ok((&["video4linux2", "v4l2"], format!("/dev/video{index}")))
}

#[cfg(target_os = "macos")]
fn camera_locator(index: u32) -> Result<CameraLocator, Box<dyn std::error::Error>> {
    Ok((&["avfoundation"], format!("{index}:none")))
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn camera_locator(index: u32) -> Result<CameraLocator, Box<dyn std::error::Error>> {
    Err(format!("Camera {index}: capture by index is only supported on Linux and macOS").into())
}
