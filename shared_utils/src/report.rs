//! Report Module
//!
//! Run-wide outcome bookkeeping and the end-of-run summary.

use serde::Serialize;
use std::fmt::Write as _;

use crate::conversion::ConversionOutcome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Outcome counts for one run plus the audit lists.
///
/// Converted files are only counted. Copied lists the written file name,
/// Skipped and Failed list the source name with the reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub converted: usize,
    pub copied: usize,
    pub skipped: usize,
    pub failed: usize,
    pub copied_files: Vec<SummaryEntry>,
    pub skipped_files: Vec<SummaryEntry>,
    pub failed_files: Vec<SummaryEntry>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one outcome. `filename` is the source file name.
    pub fn record(&mut self, outcome: &ConversionOutcome, filename: &str) {
        match outcome {
            ConversionOutcome::Converted { .. } => self.converted += 1,
            ConversionOutcome::Copied { output } => {
                self.copied += 1;
                let written = output
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| filename.to_string());
                self.copied_files.push(SummaryEntry {
                    file: written,
                    reason: None,
                });
            }
            ConversionOutcome::Skipped { reason } => {
                self.skipped += 1;
                self.skipped_files.push(SummaryEntry {
                    file: filename.to_string(),
                    reason: Some(reason.to_string()),
                });
            }
            ConversionOutcome::Failed { reason } => {
                self.failed += 1;
                self.failed_files.push(SummaryEntry {
                    file: filename.to_string(),
                    reason: Some(reason.clone()),
                });
            }
        }
    }

    /// Number of files examined.
    pub fn total(&self) -> usize {
        self.converted + self.copied + self.skipped + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\n==== SUMMARY ====");
        let _ = writeln!(out, "Converted: {}", self.converted);
        let _ = writeln!(out, "Copied (already correct format): {}", self.copied);
        render_list(&mut out, "Files already correct format", &self.copied_files);
        let _ = writeln!(out, "Skipped: {}", self.skipped);
        render_list(&mut out, "Skipped files", &self.skipped_files);
        let _ = writeln!(out, "Failed: {}", self.failed);
        render_list(&mut out, "Failed files", &self.failed_files);
        let _ = writeln!(out, "Total: {}", self.total());
        let _ = writeln!(out, "=================");
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct WithTotal<'a> {
            total: usize,
            #[serde(flatten)]
            summary: &'a RunSummary,
        }
        serde_json::to_string_pretty(&WithTotal {
            total: self.total(),
            summary: self,
        })
    }
}

fn render_list(out: &mut String, title: &str, entries: &[SummaryEntry]) {
    if entries.is_empty() {
        return;
    }
    let _ = writeln!(out, "  - {}:", title);
    for entry in entries {
        match &entry.reason {
            Some(reason) => {
                let _ = writeln!(out, "    • {} ({})", entry.file, reason);
            }
            None => {
                let _ = writeln!(out, "    • {}", entry.file);
            }
        }
    }
}
