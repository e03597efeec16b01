pub const FACE_MODEL_NAME: &str = "face_detector.onnx";
pub const AGE_MODEL_NAME: &str = "age_net.onnx";
pub const GENDER_MODEL_NAME: &str = "gender_net.onnx";

/// Directory name used under the platform cache dir for model lookup.
pub const APP_DIR_NAME: &str = "Face Insight";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Output frame rate for annotated video when the source does not report one.
pub const DEFAULT_OUTPUT_FPS: f64 = 30.0;

/// Per-frame cancellation poll budget.
pub const CANCEL_POLL_TIMEOUT_MS: u64 = 1;

pub const ESCAPE_KEY: char = '\u{1b}';
