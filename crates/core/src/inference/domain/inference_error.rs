use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("failed to load model {path}: {message}")]
    Load { path: PathBuf, message: String },
    #[error("model {path} is empty or has no inputs")]
    EmptyModel { path: PathBuf },
    #[error("{network} inference failed: {message}")]
    Run { network: String, message: String },
    #[error("{network} produced no output tensor")]
    NoOutput { network: String },
    #[error("cannot build an input blob from an empty image")]
    EmptyInput,
    #[error("cannot build an input blob from a {channels}-channel image")]
    UnsupportedChannels { channels: u8 },
}
