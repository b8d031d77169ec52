//! FFprobe wrapper module
//!
//! Stream inventory of a media file, used to decide whether a video carries an
//! audio track before encoding.

use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use crate::errors::{ConvertError, Result};
use crate::ffmpeg_process::{safe_path_arg, FfmpegProcess};

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamInventory {
    pub video_streams: usize,
    pub audio_streams: usize,
    pub audio_codec: Option<String>,
}

impl StreamInventory {
    pub fn has_audio(&self) -> bool {
        self.audio_streams > 0
    }
}

/// Parse `ffprobe -print_format json -show_streams` output.
pub fn parse_streams(json: &str) -> std::result::Result<StreamInventory, serde_json::Error> {
    let parsed: ProbeOutput = serde_json::from_str(json)?;
    let mut inventory = StreamInventory::default();
    for stream in parsed.streams {
        match stream.codec_type.as_deref() {
            Some("video") => inventory.video_streams += 1,
            Some("audio") => {
                inventory.audio_streams += 1;
                if inventory.audio_codec.is_none() {
                    inventory.audio_codec = stream.codec_name;
                }
            }
            _ => {}
        }
    }
    Ok(inventory)
}

pub fn probe_streams(ffprobe: &Path, path: &Path, limit: Option<Duration>) -> Result<StreamInventory> {
    let mut cmd = Command::new(ffprobe);
    cmd.args([
        "-v",
        "error",
        "-print_format",
        "json",
        "-show_entries",
        "stream=codec_type,codec_name",
        "-i",
    ])
    .arg(safe_path_arg(path));

    let output = FfmpegProcess::spawn_capturing(&mut cmd)?.wait_for_output(limit)?;

    if !output.status.success() {
        let stderr = output.stderr.trim();
        return Err(ConvertError::FfprobeFailed {
            path: path.to_path_buf(),
            message: if stderr.is_empty() {
                format!("exit code {:?}", output.status.code())
            } else {
                stderr.to_string()
            },
        });
    }

    parse_streams(&output.stdout).map_err(|e| ConvertError::FfprobeFailed {
        path: path.to_path_buf(),
        message: format!("unreadable ffprobe output: {}", e),
    })
}
