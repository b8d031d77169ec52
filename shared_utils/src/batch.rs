//! Batch Planning Module
//!
//! Splits a folder's immediate children into per-kind groups. Subfolders are
//! not descended into; unsupported files are set aside for the caller to record.

use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::errors::Result;
use crate::media_kind::{classify, MediaKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindGroup {
    pub kind: MediaKind,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderPlan {
    /// Non-empty groups in video, audio, image order. Files sorted by name.
    pub groups: Vec<KindGroup>,
    pub unsupported: Vec<PathBuf>,
}

impl FolderPlan {
    /// Exactly one kind present, so a single intent covers the whole folder.
    pub fn is_homogeneous(&self) -> bool {
        self.groups.len() == 1
    }

    pub fn file_count(&self) -> usize {
        self.unsupported.len() + self.groups.iter().map(|g| g.files.len()).sum::<usize>()
    }

    pub fn group(&self, kind: MediaKind) -> Option<&KindGroup> {
        self.groups.iter().find(|g| g.kind == kind)
    }
}

/// Regular files directly inside `dir`, sorted by file name.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) if e.depth() == 0 => return Err(std::io::Error::from(e).into()),
            Err(e) => warn!(error = %e, "Ignoring unreadable entry"),
        }
    }
    Ok(files)
}

pub fn plan_folder(dir: &Path) -> Result<FolderPlan> {
    let mut plan = FolderPlan::default();
    let mut buckets: [Vec<PathBuf>; 3] = Default::default();

    for file in list_files(dir)? {
        match classify(&file) {
            MediaKind::Video => buckets[0].push(file),
            MediaKind::Audio => buckets[1].push(file),
            MediaKind::Image => buckets[2].push(file),
            MediaKind::Unsupported => plan.unsupported.push(file),
        }
    }

    plan.groups = MediaKind::CONVERTIBLE
        .into_iter()
        .zip(buckets)
        .filter(|(_, files)| !files.is_empty())
        .map(|(kind, files)| KindGroup { kind, files })
        .collect();

    Ok(plan)
}
