//! Run configuration: output directory selection, preset targets and the
//! transcoder settings that go with them.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use shared_utils::{
    unique_output_folder, ConvertError, IntentResolver, MediaKind, PresetResolver, TargetFormat,
    TranscoderConfig,
};

/// Folder created next to the input when no output folder is given.
pub const DEFAULT_OUTPUT_FOLDER: &str = "Converted Media";

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Input path does not exist: {0}")]
    InputNotFound(PathBuf),

    #[error("Output folder does not exist or is not a directory: {0}")]
    InvalidOutputFolder(PathBuf),

    #[error("Cannot create output folder {path}: {source}")]
    CreateOutputFolder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("--{flag}: {source}")]
    InvalidPreset {
        flag: &'static str,
        #[source]
        source: ConvertError,
    },
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub out_dir: PathBuf,
    pub transcoder: TranscoderConfig,
}

impl EngineConfig {
    pub fn new(out_dir: impl Into<PathBuf>, transcoder: TranscoderConfig) -> Self {
        Self {
            out_dir: out_dir.into(),
            transcoder,
        }
    }
}

/// `--timeout 0` disables the limit; no flag keeps the transcoder default.
pub fn timeout_from_secs(secs: Option<u64>, default: Option<Duration>) -> Option<Duration> {
    match secs {
        None => default,
        Some(0) => None,
        Some(s) => Some(Duration::from_secs(s)),
    }
}

pub fn check_input(input: &Path) -> Result<(), SetupError> {
    if input.exists() {
        Ok(())
    } else {
        Err(SetupError::InputNotFound(input.to_path_buf()))
    }
}

/// `<folder>/Converted Media` for a folder, `<parent>/Converted Media` for a file.
pub fn default_output_dir(input: &Path) -> PathBuf {
    let base = if input.is_dir() {
        input
    } else {
        input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    };
    base.join(DEFAULT_OUTPUT_FOLDER)
}

/// Settle the output directory for a run.
///
/// A chosen folder must already exist and is used as is. Without one, a fresh
/// `Converted Media` folder is allocated and created so earlier results are
/// never mixed in.
pub fn prepare_output_dir(input: &Path, chosen: Option<&Path>) -> Result<PathBuf, SetupError> {
    if let Some(dir) = chosen {
        if !dir.is_dir() {
            return Err(SetupError::InvalidOutputFolder(dir.to_path_buf()));
        }
        return Ok(dir.to_path_buf());
    }

    let dir = unique_output_folder(&default_output_dir(input));
    std::fs::create_dir_all(&dir).map_err(|source| SetupError::CreateOutputFolder {
        path: dir.clone(),
        source,
    })?;
    info!("📁 Output folder: {}", dir.display());
    Ok(dir)
}

/// Per-kind targets given up front. Kinds without one are asked interactively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Presets {
    pub video: Option<TargetFormat>,
    pub audio: Option<TargetFormat>,
    pub image: Option<TargetFormat>,
}

impl Presets {
    /// Reject presets that can never succeed, such as `--audio-to png`.
    pub fn validate(&self) -> Result<(), SetupError> {
        let checks = [
            ("video-to", MediaKind::Video, &self.video),
            ("audio-to", MediaKind::Audio, &self.audio),
            ("image-to", MediaKind::Image, &self.image),
        ];
        for (flag, kind, target) in checks {
            if let Some(target) = target {
                if !kind.can_convert_to(target.kind()) {
                    return Err(SetupError::InvalidPreset {
                        flag,
                        source: ConvertError::IllegalConversion {
                            source_kind: kind,
                            target_kind: target.kind(),
                        },
                    });
                }
            }
        }
        Ok(())
    }

    pub fn into_resolver<F: IntentResolver>(self, fallback: Option<F>) -> PresetResolver<F> {
        let mut resolver = PresetResolver::new(fallback);
        for (kind, target) in [
            (MediaKind::Video, self.video),
            (MediaKind::Audio, self.audio),
            (MediaKind::Image, self.image),
        ] {
            if let Some(target) = target {
                resolver = resolver.with_target(kind, target);
            }
        }
        resolver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn target(ext: &str) -> Option<TargetFormat> {
        Some(TargetFormat::parse(ext).unwrap())
    }

    #[test]
    fn test_default_output_dir() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("clip.mov");
        fs::write(&file, b"x").unwrap();

        assert_eq!(default_output_dir(&file), dir.path().join("Converted Media"));
        assert_eq!(
            default_output_dir(dir.path()),
            dir.path().join("Converted Media")
        );
        assert_eq!(
            default_output_dir(Path::new("clip.mov")),
            Path::new(".").join("Converted Media")
        );
    }

    #[test]
    fn test_prepare_output_dir_never_reuses_default() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("Converted Media")).unwrap();

        let out = prepare_output_dir(dir.path(), None).unwrap();
        assert_eq!(out, dir.path().join("Converted Media (1)"));
        assert!(out.is_dir());
    }

    #[test]
    fn test_prepare_output_dir_chosen() {
        let dir = TempDir::new().unwrap();
        let out = prepare_output_dir(dir.path(), Some(dir.path())).unwrap();
        assert_eq!(out, dir.path());

        let missing = dir.path().join("nope");
        assert!(matches!(
            prepare_output_dir(dir.path(), Some(&missing)),
            Err(SetupError::InvalidOutputFolder(_))
        ));
        assert!(!missing.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_uncreatable_output_dir() {
        let dir = TempDir::new().unwrap();
        // a regular file where the parent directory should be
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();
        let input = blocker.join("clip.mov");

        assert!(matches!(
            prepare_output_dir(&input, None),
            Err(SetupError::CreateOutputFolder { .. })
        ));
    }

    #[test]
    fn test_check_input() {
        let dir = TempDir::new().unwrap();
        assert!(check_input(dir.path()).is_ok());
        assert!(matches!(
            check_input(&dir.path().join("missing.mp4")),
            Err(SetupError::InputNotFound(_))
        ));
    }

    #[test]
    fn test_timeout_from_secs() {
        let default = Some(Duration::from_secs(1800));
        assert_eq!(timeout_from_secs(None, default), default);
        assert_eq!(timeout_from_secs(Some(0), default), None);
        assert_eq!(timeout_from_secs(Some(5), None), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_presets_validation() {
        let ok = Presets {
            video: target("mp3"),
            audio: target("flac"),
            image: target("webp"),
        };
        assert!(ok.validate().is_ok());

        let bad = Presets {
            audio: target("png"),
            ..Presets::default()
        };
        let err = bad.validate().unwrap_err();
        assert!(err.to_string().starts_with("--audio-to"));
    }
}
