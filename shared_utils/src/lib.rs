//! Shared Utilities for the media_convert tools
//!
//! The conversion engine, independent of any user interface:
//! - Classification of files by extension (video / audio / image)
//! - Conversion matrix with same-format copy short-circuit
//! - Collision-free output naming
//! - Folder planning (one intent per kind group)
//! - Run summary and report
//! - ffmpeg/ffprobe process handling with timeouts
//! - Logging setup

pub mod batch;
pub mod codecs;
pub mod conversion;
pub mod errors;
pub mod ffmpeg_process;
pub mod ffprobe;
pub mod file_copier;
pub mod image_formats;
pub mod intent;
pub mod logging;
pub mod media_kind;
pub mod path_allocator;
pub mod report;
pub mod runner;
pub mod transcoder;

pub use batch::{plan_folder, FolderPlan, KindGroup};
pub use codecs::{audio_codec_for_ext, video_codecs_for_ext, VideoCodecPair};
pub use conversion::{convert, ConversionOutcome, ConversionRequest, SkipReason};
pub use errors::{ConvertError, Result};
pub use intent::{IntentQuestion, IntentResolver, IntentScope, PresetResolver};
pub use media_kind::{classify, MediaKind, TargetFormat};
pub use path_allocator::{unique_file_path, unique_output_folder};
pub use report::{RunSummary, SummaryEntry};
pub use runner::{run_conversion, RunAborted, Runner};
pub use transcoder::{MediaTranscoder, Transcoder, TranscoderConfig};
