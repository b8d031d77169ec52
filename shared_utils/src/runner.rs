//! Runner Module
//!
//! Drives one conversion run: single file or folder, one outcome per examined
//! file, everything recorded into a [`RunSummary`] owned by the run.

use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

use crate::batch::plan_folder;
use crate::conversion::{ConversionOutcome, ConversionRequest, SkipReason};
use crate::errors::{ConvertError, Result};
use crate::intent::{IntentQuestion, IntentResolver, IntentScope};
use crate::media_kind::{classify, MediaKind};
use crate::report::RunSummary;
use crate::transcoder::Transcoder;

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub struct Runner<'a, T: Transcoder + ?Sized> {
    transcoder: &'a T,
    out_dir: PathBuf,
    summary: RunSummary,
}

impl<'a, T: Transcoder + ?Sized> Runner<'a, T> {
    /// `out_dir` must already exist and be writable.
    pub fn new(transcoder: &'a T, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            transcoder,
            out_dir: out_dir.into(),
            summary: RunSummary::new(),
        }
    }

    pub fn finish(self) -> RunSummary {
        self.summary
    }

    fn record(&mut self, source: &Path, outcome: ConversionOutcome) {
        let label = file_label(source);
        match &outcome {
            ConversionOutcome::Converted { output } => {
                info!("✅ {} → {}", label, output.display())
            }
            ConversionOutcome::Copied { output } => {
                info!("📋 {} → {} (already correct format)", label, output.display())
            }
            ConversionOutcome::Skipped { reason } => info!("⏭️ {} → SKIP ({})", label, reason),
            ConversionOutcome::Failed { reason } => warn!("❌ {} → FAILED ({})", label, reason),
        }
        self.summary.record(&outcome, &label);
    }

    fn run_group<R: IntentResolver + ?Sized>(
        &mut self,
        kind: MediaKind,
        files: &[PathBuf],
        scope: IntentScope<'_>,
        resolver: &mut R,
    ) -> Result<()> {
        let target = resolver.resolve(&IntentQuestion {
            kind,
            file_count: files.len(),
            scope,
        })?;

        let request = match ConversionRequest::new(kind, target, &self.out_dir) {
            Ok(request) => request,
            Err(e) => {
                for file in files {
                    self.record(file, ConversionOutcome::failed(&e));
                }
                return Ok(());
            }
        };

        info!(
            kind = %kind,
            target = %request.target(),
            files = files.len(),
            "Converting group"
        );
        for file in files {
            let outcome = request.dispatch(file, self.transcoder);
            self.record(file, outcome);
        }
        Ok(())
    }

    pub fn convert_single_file<R: IntentResolver + ?Sized>(
        &mut self,
        source: &Path,
        resolver: &mut R,
    ) -> Result<()> {
        let kind = classify(source);
        if kind == MediaKind::Unsupported {
            self.record(
                source,
                ConversionOutcome::Skipped {
                    reason: SkipReason::UnsupportedType,
                },
            );
            return Ok(());
        }
        info!("Detected file type: {}", kind.as_str().to_uppercase());
        self.run_group(
            kind,
            std::slice::from_ref(&source.to_path_buf()),
            IntentScope::SingleFile(source),
            resolver,
        )
    }

    /// Convert the immediate children of `dir`, resolving one intent per kind group.
    pub fn convert_folder<R: IntentResolver + ?Sized>(
        &mut self,
        dir: &Path,
        resolver: &mut R,
    ) -> Result<()> {
        let plan = plan_folder(dir)?;
        info!(
            "📂 {} files in {} ({} unsupported)",
            plan.file_count(),
            dir.display(),
            plan.unsupported.len()
        );

        for file in &plan.unsupported {
            self.record(
                file,
                ConversionOutcome::Skipped {
                    reason: SkipReason::UnsupportedType,
                },
            );
        }

        let scope = if plan.is_homogeneous() {
            info!("Folder contains only {} files", plan.groups[0].kind);
            IntentScope::HomogeneousFolder
        } else {
            if !plan.groups.is_empty() {
                info!("Folder contains multiple file types");
            }
            IntentScope::MixedFolder
        };

        for group in &plan.groups {
            self.run_group(group.kind, &group.files, scope, resolver)?;
        }
        Ok(())
    }
}

/// A run that stopped early. `summary` holds every file handled before the stop.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct RunAborted {
    pub summary: RunSummary,
    #[source]
    pub source: ConvertError,
}

/// Convert `input` (file or folder) into `out_dir` and return the summary.
pub fn run_conversion<T, R>(
    input: &Path,
    out_dir: &Path,
    transcoder: &T,
    resolver: &mut R,
) -> std::result::Result<RunSummary, RunAborted>
where
    T: Transcoder + ?Sized,
    R: IntentResolver + ?Sized,
{
    let started = Instant::now();
    let mut runner = Runner::new(transcoder, out_dir);
    let result = if input.is_dir() {
        runner.convert_folder(input, resolver)
    } else {
        runner.convert_single_file(input, resolver)
    };
    let summary = runner.finish();
    info!(
        total = summary.total(),
        converted = summary.converted,
        copied = summary.copied,
        skipped = summary.skipped,
        failed = summary.failed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Run finished"
    );
    match result {
        Ok(()) => Ok(summary),
        Err(source) => {
            warn!(error = %source, "Run aborted");
            Err(RunAborted { summary, source })
        }
    }
}
