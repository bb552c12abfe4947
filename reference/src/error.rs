use thiserror::Error;
use util::frame::FrameError;

#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("Failed to load price data from {path}: {message}")]
    Data { path: String, message: String },

    #[error("Inputs do not line up: {0}")]
    ShapeMismatch(String),

    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Frame(#[from] FrameError),
}
