//! media-convert
//!
//! Batch converter for video, audio and image files. The conversion engine
//! lives in `shared_utils`; this crate adds the operator-facing layer:
//! output folder selection, per-kind presets and interactive prompts.

pub mod config;
pub mod prompt;

pub use config::{EngineConfig, Presets, SetupError, DEFAULT_OUTPUT_FOLDER};
pub use prompt::ConsolePrompt;
