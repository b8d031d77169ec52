//! Codec Policy Module
//!
//! Fixed encoder choices per target extension. These are policy constants,
//! not per-call settings.

use serde::Serialize;

/// ffmpeg encoder for an audio target extension. Unknown extensions fall back to AAC.
pub fn audio_codec_for_ext(ext: &str) -> &'static str {
    match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "mp3" => "libmp3lame",
        "wav" => "pcm_s16le",
        "m4a" => "aac",
        "flac" => "flac",
        "ogg" => "libvorbis",
        _ => "aac",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VideoCodecPair {
    pub video: &'static str,
    pub audio: &'static str,
}

pub const VP9_OPUS: VideoCodecPair = VideoCodecPair {
    video: "libvpx-vp9",
    audio: "libopus",
};

pub const H264_AAC: VideoCodecPair = VideoCodecPair {
    video: "libx264",
    audio: "aac",
};

/// WebM gets VP9/Opus; every other container gets H.264/AAC.
pub fn video_codecs_for_ext(ext: &str) -> VideoCodecPair {
    if ext.trim_start_matches('.').eq_ignore_ascii_case("webm") {
        VP9_OPUS
    } else {
        H264_AAC
    }
}

/// Image targets whose encoders only take opaque 8-bit RGB.
pub fn requires_opaque_rgb(ext: &str) -> bool {
    matches!(
        ext.trim_start_matches('.').to_ascii_lowercase().as_str(),
        "jpg" | "jpeg"
    )
}
