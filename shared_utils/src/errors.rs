use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::media_kind::MediaKind;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Unknown target extension: {0}")]
    UnknownExtension(String),

    #[error("Cannot convert {source_kind} to {target_kind}")]
    IllegalConversion {
        source_kind: MediaKind,
        target_kind: MediaKind,
    },

    #[error("FFmpeg failed (exit code: {exit_code:?}): {stderr}")]
    FfmpegFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("FFprobe failed for {path}: {message}")]
    FfprobeFailed { path: PathBuf, message: String },

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("{tool} did not finish within {}s", .limit.as_secs())]
    Timeout { tool: String, limit: Duration },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
