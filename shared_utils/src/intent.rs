//! Intent Resolution Module
//!
//! The engine asks "what should files of this kind become?" through
//! [`IntentResolver`], once per file in single-file mode and once per kind
//! group in folder mode. Prompting, presets and test doubles all plug in here.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use crate::media_kind::{MediaKind, TargetFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentScope<'a> {
    SingleFile(&'a Path),
    /// Every convertible file in the folder has this kind.
    HomogeneousFolder,
    /// One of several kind groups in a mixed folder.
    MixedFolder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntentQuestion<'a> {
    pub kind: MediaKind,
    pub file_count: usize,
    pub scope: IntentScope<'a>,
}

pub trait IntentResolver {
    /// Target format for every file described by `question`.
    ///
    /// An error aborts the run (e.g. the operator's input stream closed).
    fn resolve(&mut self, question: &IntentQuestion<'_>) -> io::Result<TargetFormat>;
}

impl<R: IntentResolver + ?Sized> IntentResolver for &mut R {
    fn resolve(&mut self, question: &IntentQuestion<'_>) -> io::Result<TargetFormat> {
        (**self).resolve(question)
    }
}

/// Fixed targets per kind, falling back to another resolver for kinds without one.
pub struct PresetResolver<F> {
    presets: HashMap<MediaKind, TargetFormat>,
    fallback: Option<F>,
}

impl<F: IntentResolver> PresetResolver<F> {
    pub fn new(fallback: Option<F>) -> Self {
        Self {
            presets: HashMap::new(),
            fallback,
        }
    }

    pub fn with_target(mut self, kind: MediaKind, target: TargetFormat) -> Self {
        self.presets.insert(kind, target);
        self
    }
}

impl<F: IntentResolver> IntentResolver for PresetResolver<F> {
    fn resolve(&mut self, question: &IntentQuestion<'_>) -> io::Result<TargetFormat> {
        if let Some(target) = self.presets.get(&question.kind) {
            return Ok(target.clone());
        }
        match self.fallback.as_mut() {
            Some(fallback) => fallback.resolve(question),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no target format given for {} files", question.kind),
            )),
        }
    }
}
