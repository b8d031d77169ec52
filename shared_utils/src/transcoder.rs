//! Transcoder Module
//!
//! The codec capability the conversion matrix delegates to. The matrix only
//! sees the [`Transcoder`] trait; [`MediaTranscoder`] is the production
//! implementation (ffmpeg/ffprobe subprocesses for audio and video, the `image`
//! crate for stills).

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::codecs::VideoCodecPair;
use crate::errors::Result;
use crate::ffmpeg_process::{run_ffmpeg, safe_path_arg};
use crate::{ffprobe, image_formats};

pub const FFMPEG_ENV: &str = "MEDIA_CONVERT_FFMPEG";
pub const FFPROBE_ENV: &str = "MEDIA_CONVERT_FFPROBE";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

pub trait Transcoder {
    /// Whether `source` carries at least one audio stream.
    fn has_audio(&self, source: &Path) -> Result<bool>;

    /// Re-encode a video into the container of `dest`. `keep_audio == false` drops audio.
    fn encode_video(
        &self,
        source: &Path,
        dest: &Path,
        codecs: VideoCodecPair,
        keep_audio: bool,
    ) -> Result<()>;

    /// Write the audio of `source` (audio file or video) to `dest` using `codec`.
    fn encode_audio(&self, source: &Path, dest: &Path, codec: &str) -> Result<()>;

    /// Re-encode a still image into the format named by the extension of `dest`.
    fn encode_image(&self, source: &Path, dest: &Path) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct TranscoderConfig {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    /// Upper bound for a single external process. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl TranscoderConfig {
    /// Defaults, with binaries overridable through `MEDIA_CONVERT_FFMPEG` / `MEDIA_CONVERT_FFPROBE`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(path) = std::env::var_os(FFMPEG_ENV).filter(|v| !v.is_empty()) {
            config.ffmpeg = PathBuf::from(path);
        }
        if let Some(path) = std::env::var_os(FFPROBE_ENV).filter(|v| !v.is_empty()) {
            config.ffprobe = PathBuf::from(path);
        }
        config
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Names of configured tools that cannot be found on PATH.
    pub fn missing_tools(&self) -> Vec<String> {
        [&self.ffmpeg, &self.ffprobe]
            .into_iter()
            .filter(|tool| which::which(tool).is_err())
            .map(|tool| tool.display().to_string())
            .collect()
    }
}

pub struct MediaTranscoder {
    config: TranscoderConfig,
}

impl MediaTranscoder {
    pub fn new(config: TranscoderConfig) -> Self {
        Self { config }
    }

    fn ffmpeg_command(&self, source: &Path) -> Command {
        let mut cmd = Command::new(&self.config.ffmpeg);
        // -n: the allocated destination is claimed, never overwritten
        cmd.args(["-hide_banner", "-nostdin", "-n", "-i"])
            .arg(safe_path_arg(source));
        cmd
    }
}

impl Transcoder for MediaTranscoder {
    fn has_audio(&self, source: &Path) -> Result<bool> {
        let inventory = ffprobe::probe_streams(&self.config.ffprobe, source, self.config.timeout)?;
        debug!(
            source = %source.display(),
            video_streams = inventory.video_streams,
            audio_streams = inventory.audio_streams,
            audio_codec = inventory.audio_codec.as_deref().unwrap_or("-"),
            "Probed streams"
        );
        if !inventory.has_audio() {
            info!(source = %source.display(), "No audio stream");
        }
        Ok(inventory.has_audio())
    }

    fn encode_video(
        &self,
        source: &Path,
        dest: &Path,
        codecs: VideoCodecPair,
        keep_audio: bool,
    ) -> Result<()> {
        let mut cmd = self.ffmpeg_command(source);
        cmd.args(["-c:v", codecs.video]);
        if keep_audio {
            cmd.args(["-c:a", codecs.audio]);
        } else {
            warn!(source = %source.display(), "Writing video without audio track");
            cmd.arg("-an");
        }
        cmd.arg(safe_path_arg(dest));
        run_ffmpeg(&mut cmd, self.config.timeout)
    }

    fn encode_audio(&self, source: &Path, dest: &Path, codec: &str) -> Result<()> {
        let mut cmd = self.ffmpeg_command(source);
        cmd.args(["-vn", "-c:a", codec]).arg(safe_path_arg(dest));
        run_ffmpeg(&mut cmd, self.config.timeout)
    }

    fn encode_image(&self, source: &Path, dest: &Path) -> Result<()> {
        image_formats::encode_image(source, dest)
    }
}
