use std::fmt;
use std::path::PathBuf;

/// Where frames come from, resolved once when the source is opened.
///
/// Only labelling depends on the kind; detection and classification treat
/// every frame the same.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Camera(u32),
    File(PathBuf),
}

impl SourceKind {
    pub fn window_title(&self) -> &'static str {
        match self {
            SourceKind::Camera(_) => "Camera Face Analysis",
            SourceKind::File(_) => "Video Face Analysis",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Camera(index) => write!(f, "camera {index}"),
            SourceKind::File(path) => write!(f, "{}", path.display()),
        }
    }
}
