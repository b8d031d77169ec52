//! Conversion Matrix Module
//!
//! Decides, per file, between a same-format copy and one of the four legal
//! transformations, and turns every error into a `Failed` outcome so one bad
//! file never stops a batch.
//!
//! | Source | Target | Action                                               |
//! |--------|--------|------------------------------------------------------|
//! | Video  | Video  | re-encode; a silent source produces a silent output  |
//! | Video  | Audio  | extract audio; a silent source is skipped            |
//! | Audio  | Audio  | re-encode with the target audio codec                |
//! | Image  | Image  | re-encode, adapting the color model to the encoder   |

use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::codecs::{audio_codec_for_ext, video_codecs_for_ext};
use crate::errors::{ConvertError, Result};
use crate::file_copier::{copy_preserving, same_extension};
use crate::media_kind::{MediaKind, TargetFormat};
use crate::path_allocator::{output_candidate, unique_file_path};
use crate::transcoder::Transcoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    UnsupportedType,
    NoAudio,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedType => f.write_str("unsupported type"),
            SkipReason::NoAudio => f.write_str("no audio"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionOutcome {
    Converted { output: PathBuf },
    Copied { output: PathBuf },
    Skipped { reason: SkipReason },
    Failed { reason: String },
}

impl ConversionOutcome {
    pub fn failed(err: impl fmt::Display) -> Self {
        ConversionOutcome::Failed {
            reason: err.to_string(),
        }
    }
}

/// Apply the conversion matrix to one file whose destination is already allocated.
///
/// The same-extension copy is checked before anything else. Errors never escape:
/// they become `Failed` with the error text, and a partial output left by a
/// failed encoder is removed.
pub fn convert<T: Transcoder + ?Sized>(
    transcoder: &T,
    source_kind: MediaKind,
    source: &Path,
    target_kind: MediaKind,
    target_ext: &str,
    dest: &Path,
) -> ConversionOutcome {
    if same_extension(source, dest) {
        return match copy_preserving(source, dest) {
            Ok(bytes) => {
                info!(source = %source.display(), dest = %dest.display(), bytes, "Copied (already correct format)");
                ConversionOutcome::Copied {
                    output: dest.to_path_buf(),
                }
            }
            Err(e) => ConversionOutcome::failed(e),
        };
    }

    let preexisting = dest.symlink_metadata().is_ok();
    match dispatch(transcoder, source_kind, source, target_kind, target_ext, dest) {
        Ok(outcome) => outcome,
        Err(e) => {
            if !preexisting && dest.exists() {
                if let Err(rm) = fs::remove_file(dest) {
                    warn!(dest = %dest.display(), error = %rm, "Failed to remove partial output");
                }
            }
            ConversionOutcome::failed(e)
        }
    }
}

fn dispatch<T: Transcoder + ?Sized>(
    transcoder: &T,
    source_kind: MediaKind,
    source: &Path,
    target_kind: MediaKind,
    target_ext: &str,
    dest: &Path,
) -> Result<ConversionOutcome> {
    match (source_kind, target_kind) {
        (MediaKind::Video, MediaKind::Video) => {
            let keep_audio = transcoder.has_audio(source)?;
            transcoder.encode_video(source, dest, video_codecs_for_ext(target_ext), keep_audio)?;
        }
        (MediaKind::Video, MediaKind::Audio) => {
            if !transcoder.has_audio(source)? {
                return Ok(ConversionOutcome::Skipped {
                    reason: SkipReason::NoAudio,
                });
            }
            transcoder.encode_audio(source, dest, audio_codec_for_ext(target_ext))?;
        }
        (MediaKind::Audio, MediaKind::Audio) => {
            transcoder.encode_audio(source, dest, audio_codec_for_ext(target_ext))?;
        }
        (MediaKind::Image, MediaKind::Image) => {
            transcoder.encode_image(source, dest)?;
        }
        (source_kind, target_kind) => {
            return Err(ConvertError::IllegalConversion {
                source_kind,
                target_kind,
            })
        }
    }

    Ok(ConversionOutcome::Converted {
        output: dest.to_path_buf(),
    })
}

/// A resolved conversion intent for one kind of source, bound to an output directory.
///
/// Built once per file in single-file mode and once per kind group in folder
/// mode, where it is reused for every file of the group.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    source_kind: MediaKind,
    target: TargetFormat,
    out_dir: PathBuf,
}

impl ConversionRequest {
    /// Fails with `IllegalConversion` when the pair is not in the matrix.
    pub fn new(source_kind: MediaKind, target: TargetFormat, out_dir: &Path) -> Result<Self> {
        if !source_kind.can_convert_to(target.kind()) {
            return Err(ConvertError::IllegalConversion {
                source_kind,
                target_kind: target.kind(),
            });
        }
        Ok(Self {
            source_kind,
            target,
            out_dir: out_dir.to_path_buf(),
        })
    }

    pub fn target(&self) -> &TargetFormat {
        &self.target
    }

    /// Allocate a free destination for `source` and run the matrix on it.
    pub fn dispatch<T: Transcoder + ?Sized>(&self, source: &Path, transcoder: &T) -> ConversionOutcome {
        let dest = unique_file_path(&output_candidate(
            source,
            &self.out_dir,
            self.target.extension(),
        ));
        convert(
            transcoder,
            self.source_kind,
            source,
            self.target.kind(),
            self.target.extension(),
            &dest,
        )
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::codecs::VideoCodecPair;
    use std::cell::RefCell;
    use std::collections::HashSet;

    /// Scripted transcoder: writes a marker file instead of encoding.
    #[derive(Default)]
    pub struct FakeTranscoder {
        pub silent: HashSet<String>,
        pub broken: HashSet<String>,
        pub leave_partial: bool,
        pub calls: RefCell<Vec<String>>,
    }

    impl FakeTranscoder {
        pub fn silent(mut self, name: &str) -> Self {
            self.silent.insert(name.to_string());
            self
        }

        pub fn broken(mut self, name: &str) -> Self {
            self.broken.insert(name.to_string());
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        fn name(path: &Path) -> String {
            path.file_name().unwrap().to_string_lossy().into_owned()
        }

        fn write(&self, op: &str, source: &Path, dest: &Path) -> Result<()> {
            let name = Self::name(source);
            self.calls
                .borrow_mut()
                .push(format!("{} {} -> {}", op, name, Self::name(dest)));
            if self.broken.contains(&name) {
                if self.leave_partial {
                    fs::write(dest, b"")?;
                }
                return Err(ConvertError::FfmpegFailed {
                    exit_code: Some(1),
                    stderr: format!("{}: Invalid data found when processing input", name),
                });
            }
            fs::write(dest, format!("{} {}", op, name))?;
            Ok(())
        }
    }

    impl Transcoder for FakeTranscoder {
        fn has_audio(&self, source: &Path) -> Result<bool> {
            Ok(!self.silent.contains(&Self::name(source)))
        }

        fn encode_video(
            &self,
            source: &Path,
            dest: &Path,
            codecs: VideoCodecPair,
            keep_audio: bool,
        ) -> Result<()> {
            let audio = if keep_audio { codecs.audio } else { "none" };
            self.write(&format!("video[{}+{}]", codecs.video, audio), source, dest)
        }

        fn encode_audio(&self, source: &Path, dest: &Path, codec: &str) -> Result<()> {
            self.write(&format!("audio[{}]", codec), source, dest)
        }

        fn encode_image(&self, source: &Path, dest: &Path) -> Result<()> {
            self.write("image", source, dest)
        }
    }
}
