//! Media Kind Module
//!
//! Extension based classification of input files and validated output targets.
//! The three extension sets are disjoint, so an extension alone decides the kind.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::errors::{ConvertError, Result};

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "flac", "ogg"];

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "gif", "tiff"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    Image,
    Unsupported,
}

impl MediaKind {
    /// Kinds a folder is grouped into, in processing order.
    pub const CONVERTIBLE: [MediaKind; 3] = [MediaKind::Video, MediaKind::Audio, MediaKind::Image];

    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Video
        } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Audio
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Image
        } else {
            MediaKind::Unsupported
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Video => VIDEO_EXTENSIONS,
            MediaKind::Audio => AUDIO_EXTENSIONS,
            MediaKind::Image => IMAGE_EXTENSIONS,
            MediaKind::Unsupported => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Image => "image",
            MediaKind::Unsupported => "unsupported",
        }
    }

    /// Target kinds the conversion matrix accepts for this source kind.
    pub fn legal_targets(&self) -> &'static [MediaKind] {
        match self {
            MediaKind::Video => &[MediaKind::Video, MediaKind::Audio],
            MediaKind::Audio => &[MediaKind::Audio],
            MediaKind::Image => &[MediaKind::Image],
            MediaKind::Unsupported => &[],
        }
    }

    pub fn can_convert_to(&self, target: MediaKind) -> bool {
        self.legal_targets().contains(&target)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a file by its extension. Pure, case-insensitive, never touches the disk.
pub fn classify(path: &Path) -> MediaKind {
    path.extension()
        .and_then(|e| e.to_str())
        .map(MediaKind::from_extension)
        .unwrap_or(MediaKind::Unsupported)
}

/// A validated output extension together with the kind it produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetFormat {
    kind: MediaKind,
    extension: String,
}

impl TargetFormat {
    pub fn parse(ext: &str) -> Result<Self> {
        let extension = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        match MediaKind::from_extension(&extension) {
            MediaKind::Unsupported => Err(ConvertError::UnknownExtension(ext.trim().to_string())),
            kind => Ok(Self { kind, extension }),
        }
    }

    /// Like [`TargetFormat::parse`], but the extension must also produce `kind`.
    pub fn parse_for_kind(kind: MediaKind, ext: &str) -> Result<Self> {
        let target = Self::parse(ext)?;
        if target.kind != kind {
            return Err(ConvertError::UnknownExtension(ext.trim().to_string()));
        }
        Ok(target)
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension)
    }
}

impl std::str::FromStr for TargetFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_classify_every_supported_extension() {
        for ext in VIDEO_EXTENSIONS {
            assert_eq!(classify(Path::new(&format!("a.{}", ext))), MediaKind::Video);
        }
        for ext in AUDIO_EXTENSIONS {
            assert_eq!(classify(Path::new(&format!("a.{}", ext))), MediaKind::Audio);
        }
        for ext in IMAGE_EXTENSIONS {
            assert_eq!(classify(Path::new(&format!("a.{}", ext))), MediaKind::Image);
        }
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify(Path::new("CLIP.MOV")), MediaKind::Video);
        assert_eq!(classify(Path::new("song.Flac")), MediaKind::Audio);
        assert_eq!(classify(Path::new("photo.JPEG")), MediaKind::Image);
    }

    #[test]
    fn test_classify_unsupported() {
        assert_eq!(classify(Path::new("notes.txt")), MediaKind::Unsupported);
        assert_eq!(classify(Path::new("Makefile")), MediaKind::Unsupported);
        assert_eq!(classify(Path::new(".hidden")), MediaKind::Unsupported);
        assert_eq!(classify(Path::new("archive.tar.gz")), MediaKind::Unsupported);
        assert_eq!(classify(Path::new("image.heic")), MediaKind::Unsupported);
    }

    #[test]
    fn test_extension_sets_are_disjoint() {
        for ext in VIDEO_EXTENSIONS {
            assert!(!AUDIO_EXTENSIONS.contains(ext));
            assert!(!IMAGE_EXTENSIONS.contains(ext));
        }
        for ext in AUDIO_EXTENSIONS {
            assert!(!IMAGE_EXTENSIONS.contains(ext));
        }
    }

    #[test]
    fn test_legal_targets() {
        assert!(MediaKind::Video.can_convert_to(MediaKind::Video));
        assert!(MediaKind::Video.can_convert_to(MediaKind::Audio));
        assert!(!MediaKind::Video.can_convert_to(MediaKind::Image));
        assert!(MediaKind::Audio.can_convert_to(MediaKind::Audio));
        assert!(!MediaKind::Audio.can_convert_to(MediaKind::Video));
        assert!(MediaKind::Image.can_convert_to(MediaKind::Image));
        assert!(!MediaKind::Unsupported.can_convert_to(MediaKind::Image));
    }

    #[test]
    fn test_target_format_parse() {
        let t = TargetFormat::parse(" .MP3 ").unwrap();
        assert_eq!(t.kind(), MediaKind::Audio);
        assert_eq!(t.extension(), "mp3");

        // webp is accepted as an image target
        assert_eq!(TargetFormat::parse("webp").unwrap().kind(), MediaKind::Image);

        assert!(matches!(
            TargetFormat::parse("docx"),
            Err(ConvertError::UnknownExtension(_))
        ));
        assert!(TargetFormat::parse("").is_err());
    }

    #[test]
    fn test_target_format_parse_for_kind() {
        assert!(TargetFormat::parse_for_kind(MediaKind::Video, "mkv").is_ok());
        assert!(TargetFormat::parse_for_kind(MediaKind::Video, "mp3").is_err());
        assert!(TargetFormat::parse_for_kind(MediaKind::Image, "tiff").is_ok());
    }

    proptest! {
        #[test]
        fn prop_classification_is_total_and_matches_exactly_one_set(ext in "[a-zA-Z0-9]{0,6}") {
            let kind = classify(Path::new(&format!("file.{}", ext)));
            let lower = ext.to_ascii_lowercase();
            let hits = [VIDEO_EXTENSIONS, AUDIO_EXTENSIONS, IMAGE_EXTENSIONS]
                .iter()
                .filter(|set| set.contains(&lower.as_str()))
                .count();
            prop_assert!(hits <= 1);
            prop_assert_eq!(kind == MediaKind::Unsupported, hits == 0);
        }

        #[test]
        fn prop_classification_ignores_case(idx in 0usize..17, upper in any::<bool>()) {
            let all: Vec<&str> = VIDEO_EXTENSIONS
                .iter()
                .chain(AUDIO_EXTENSIONS)
                .chain(IMAGE_EXTENSIONS)
                .copied()
                .collect();
            let ext = all[idx];
            let cased = if upper { ext.to_ascii_uppercase() } else { ext.to_string() };
            prop_assert_eq!(
                classify(Path::new(&format!("x.{}", cased))),
                MediaKind::from_extension(ext)
            );
        }
    }
}
