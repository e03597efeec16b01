mod menu;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use crossbeam_channel::Receiver;

use face_insight_core::inference::domain::model_set::ModelSet;
use face_insight_core::inference::infrastructure::model_resolver;
use face_insight_core::inference::infrastructure::onnx_network::load_model_set;
use face_insight_core::pipeline::face_analyzer::FaceAnalyzer;
use face_insight_core::pipeline::pipeline_config::PipelineConfig;
use face_insight_core::pipeline::pipeline_controller::{PipelineController, StopReason};
use face_insight_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use face_insight_core::shared::constants::IMAGE_EXTENSIONS;
use face_insight_core::video::domain::cancel_signal::CancelSignal;
use face_insight_core::video::domain::display_sink::DisplaySink;
use face_insight_core::video::domain::frame_source::FrameSource;
use face_insight_core::video::domain::source_kind::SourceKind;
use face_insight_core::video::infrastructure::ffmpeg_source::FfmpegSource;
use face_insight_core::video::infrastructure::image_file_source::ImageFileSource;
use face_insight_core::video::infrastructure::image_sequence_sink::ImageSequenceSink;
use face_insight_core::video::infrastructure::null_sink::NullSink;
use face_insight_core::video::infrastructure::video_file_sink::VideoFileSink;

use menu::MenuAction;

/// Live face detection with age and gender estimation.
///
/// While a stream is running, type `q` (or ESC) and press Enter to stop it.
#[derive(Parser)]
#[command(name = "face-insight")]
struct Cli {
    /// Capture from the camera with this device index.
    #[arg(long)]
    camera: Option<u32>,

    /// Analyze a video file.
    #[arg(long)]
    video: Option<PathBuf>,

    /// Analyze a single image.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Pick sources from a menu (default when no source is given).
    #[arg(long)]
    interactive: bool,

    /// Directory holding face_detector.onnx, age_net.onnx and gender_net.onnx.
    #[arg(long)]
    models_dir: Option<PathBuf>,

    /// Write annotated frames to this video file.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write annotated frames as numbered PNGs into this directory.
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<usize>,
}

enum Mode {
    Single(SourceKind),
    Interactive,
}

#[derive(Clone)]
enum SinkChoice {
    Video(PathBuf),
    Frames(PathBuf),
    Null,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mode = validate(&cli)?;
    let sink = sink_choice(&cli);

    let models = load_models(cli.models_dir.as_deref())?;
    let keys = spawn_key_reader();

    match mode {
        Mode::Single(kind) => {
            analyze_source(&kind, &models, &sink, cli.max_frames, &keys)?;
        }
        Mode::Interactive => run_interactive(&models, &sink, cli.max_frames, &keys),
    }
    Ok(())
}

fn load_models(models_dir: Option<&Path>) -> Result<ModelSet, Box<dyn std::error::Error>> {
    println!("Loading models...");
    let paths = model_resolver::resolve_all(models_dir)?;
    let models = load_model_set(&paths)?;
    println!("All models loaded.");
    Ok(models)
}

/// Forwards stdin lines to a channel so the pipeline can poll for keys
/// without blocking.
fn spawn_key_reader() -> Receiver<String> {
    let (tx, rx) = crossbeam_channel::unbounded();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::debug!("stdin closed: {e}");
                    break;
                }
            }
        }
    });
    rx
}

fn run_interactive(
    models: &ModelSet,
    sink: &SinkChoice,
    max_frames: Option<usize>,
    keys: &Receiver<String>,
) {
    loop {
        print!("{}", menu::render());
        let _ = std::io::stdout().flush();
        let Ok(choice) = keys.recv() else {
            return;
        };

        let mut prompt = |question: &str| {
            print!("{question}");
            let _ = std::io::stdout().flush();
            keys.recv().ok()
        };
        match menu::dispatch(&choice, &mut prompt) {
            Some(MenuAction::Run(kind)) => {
                println!("{} started. Type q or ESC and press Enter to stop.", kind.window_title());
                // A failed source returns to the menu.
                if let Err(e) = analyze_source(&kind, models, sink, max_frames, keys) {
                    eprintln!("Error: {e}");
                }
            }
            Some(MenuAction::Quit) => {
                println!("Exiting.");
                return;
            }
            None => println!("Invalid choice. Enter C, V or Q."),
        }
    }
}

fn analyze_source(
    kind: &SourceKind,
    models: &ModelSet,
    sink: &SinkChoice,
    max_frames: Option<usize>,
    keys: &Receiver<String>,
) -> Result<StopReason, Box<dyn std::error::Error>> {
    let mut source = open_source(kind);
    let mut sink = build_sink(sink, CancelSignal::with_keys(keys.clone()));

    let analyzer = FaceAnalyzer::new(models, &PipelineConfig::default());
    let mut controller =
        PipelineController::new(analyzer, Box::new(StdoutPipelineLogger::default()))
            .with_max_frames(max_frames);

    let reason = controller.run(kind, &mut *source, &mut *sink)?;
    match reason {
        StopReason::EndOfStream => println!("Stream ended."),
        StopReason::Cancelled => println!("Stopped by user."),
        StopReason::FrameLimit => println!("Frame limit reached."),
    }
    Ok(reason)
}

fn open_source(kind: &SourceKind) -> Box<dyn FrameSource> {
    match kind {
        SourceKind::File(path) if is_image(path) => Box::new(ImageFileSource::new()),
        _ => Box::new(FfmpegSource::new()),
    }
}

fn build_sink(choice: &SinkChoice, cancel: CancelSignal) -> Box<dyn DisplaySink> {
    match choice {
        SinkChoice::Video(path) => Box::new(VideoFileSink::new(path, cancel)),
        SinkChoice::Frames(dir) => Box::new(ImageSequenceSink::new(dir, cancel)),
        SinkChoice::Null => Box::new(NullSink::new(cancel)),
    }
}

fn sink_choice(cli: &Cli) -> SinkChoice {
    match (&cli.output, &cli.frames_dir) {
        (Some(path), _) => SinkChoice::Video(path.clone()),
        (None, Some(dir)) => SinkChoice::Frames(dir.clone()),
        (None, None) => SinkChoice::Null,
    }
}

fn validate(cli: &Cli) -> Result<Mode, Box<dyn std::error::Error>> {
    let mut sources = Vec::new();
    if let Some(index) = cli.camera {
        sources.push(SourceKind::Camera(index));
    }
    for path in [&cli.video, &cli.image].into_iter().flatten() {
        if !path.exists() {
            return Err(format!("Input file not found: {}", path.display()).into());
        }
        sources.push(SourceKind::File(path.clone()));
    }
    if let Some(path) = &cli.image {
        if !is_image(path) {
            return Err(format!(
                "--image expects one of: {}, got {}",
                IMAGE_EXTENSIONS.join(", "),
                path.display()
            )
            .into());
        }
    }

    if cli.output.is_some() && cli.frames_dir.is_some() {
        return Err("--output and --frames-dir are mutually exclusive".into());
    }
    if cli.max_frames == Some(0) {
        return Err("--max-frames must be at least 1".into());
    }
    if cli.interactive && !sources.is_empty() {
        return Err("--interactive cannot be combined with --camera, --video or --image".into());
    }
    if sources.len() > 1 {
        return Err("Choose only one of --camera, --video or --image".into());
    }

    Ok(match sources.pop() {
        Some(kind) => Mode::Single(kind),
        None => Mode::Interactive,
    })
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("face-insight").chain(args.iter().copied()))
    }

    #[test]
    fn test_no_source_means_interactive() {
        assert!(matches!(validate(&parse(&[])), Ok(Mode::Interactive)));
        assert!(matches!(
            validate(&parse(&["--interactive"])),
            Ok(Mode::Interactive)
        ));
    }

    #[test]
    fn test_camera_source() {
        match validate(&parse(&["--camera", "2"])) {
            Ok(Mode::Single(kind)) => assert_eq!(kind, SourceKind::Camera(2)),
            _ => panic!("expected single camera source"),
        }
    }

    #[test]
    fn test_existing_video_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"").unwrap();
        match validate(&parse(&["--video", path.to_str().unwrap()])) {
            Ok(Mode::Single(kind)) => assert_eq!(kind, SourceKind::File(path)),
            _ => panic!("expected single file source"),
        }
    }

    #[rstest]
    #[case::missing_video(&["--video", "/nonexistent/clip.mp4"])]
    #[case::two_sinks(&["--camera", "0", "--output", "a.mp4", "--frames-dir", "out"])]
    #[case::zero_frames(&["--camera", "0", "--max-frames", "0"])]
    #[case::interactive_with_source(&["--interactive", "--camera", "0"])]
    fn test_invalid_combinations(#[case] args: &[&str]) {
        assert!(validate(&parse(args)).is_err());
    }

    #[test]
    fn test_two_sources_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"").unwrap();
        let cli = parse(&["--camera", "0", "--video", path.to_str().unwrap()]);
        assert!(validate(&cli).is_err());
    }

    #[test]
    fn test_image_flag_requires_image_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"").unwrap();
        assert!(validate(&parse(&["--image", path.to_str().unwrap()])).is_err());
    }

    #[rstest]
    #[case("photo.JPG", true)]
    #[case("scan.png", true)]
    #[case("clip.mp4", false)]
    #[case("noext", false)]
    fn test_is_image(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_image(Path::new(name)), expected);
    }

    #[test]
    fn test_sink_choice() {
        assert!(matches!(
            sink_choice(&parse(&["--output", "out.mp4"])),
            SinkChoice::Video(_)
        ));
        assert!(matches!(
            sink_choice(&parse(&["--frames-dir", "frames"])),
            SinkChoice::Frames(_)
        ));
        assert!(matches!(sink_choice(&parse(&[])), SinkChoice::Null));
    }
}
