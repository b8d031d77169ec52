//! Path Allocator Module
//!
//! Collision-free output naming. An occupied `name.ext` becomes `name (1).ext`,
//! then `name (2).ext`, and so on until a free path is found.
//!
//! These functions only query existence. Call them right before the destination
//! is written; writers open the returned path with create-new semantics so a
//! path claimed in the meantime fails loudly instead of being overwritten.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

fn disambiguated(candidate: &Path, n: u32, keep_extension: bool) -> PathBuf {
    let (stem, ext) = if keep_extension {
        (
            candidate.file_stem().map(OsString::from).unwrap_or_default(),
            candidate.extension(),
        )
    } else {
        (
            candidate.file_name().map(OsString::from).unwrap_or_default(),
            None,
        )
    };

    let mut name = stem;
    name.push(format!(" ({})", n));
    if let Some(ext) = ext {
        name.push(".");
        name.push(ext);
    }
    candidate.with_file_name(name)
}

fn first_free(candidate: &Path, keep_extension: bool) -> PathBuf {
    // symlink_metadata so a dangling link still counts as occupied
    let taken = |p: &Path| p.symlink_metadata().is_ok();

    if !taken(candidate) {
        return candidate.to_path_buf();
    }

    let mut n = 1;
    loop {
        let next = disambiguated(candidate, n, keep_extension);
        if !taken(&next) {
            return next;
        }
        n += 1;
    }
}

/// Return `candidate` if nothing exists there, otherwise the first free
/// `stem (n).ext` sibling.
pub fn unique_file_path(candidate: &Path) -> PathBuf {
    first_free(candidate, true)
}

/// Same scheme as [`unique_file_path`] applied to a directory name; dots in the
/// folder name are not treated as an extension.
pub fn unique_output_folder(candidate: &Path) -> PathBuf {
    first_free(candidate, false)
}

/// `<dir>/<source stem>.<extension>`, before disambiguation.
pub fn output_candidate(source: &Path, out_dir: &Path, extension: &str) -> PathBuf {
    let mut name = source
        .file_stem()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".");
    name.push(extension);
    out_dir.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_free_path_is_returned_unchanged() {
        let dir = TempDir::new().unwrap();
        let candidate = dir.path().join("a.png");
        assert_eq!(unique_file_path(&candidate), candidate);
    }

    #[test]
    fn test_skips_existing_disambiguators() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.png"), b"x").unwrap();
        fs::write(dir.path().join("a (1).png"), b"x").unwrap();

        let got = unique_file_path(&dir.path().join("a.png"));
        assert_eq!(got, dir.path().join("a (2).png"));
        assert!(!got.exists());
    }

    #[test]
    fn test_file_without_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("README"), b"x").unwrap();
        assert_eq!(
            unique_file_path(&dir.path().join("README")),
            dir.path().join("README (1)")
        );
    }

    #[test]
    fn test_only_last_extension_is_kept() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("my.clip.mp4"), b"x").unwrap();
        assert_eq!(
            unique_file_path(&dir.path().join("my.clip.mp4")),
            dir.path().join("my.clip (1).mp4")
        );
    }

    #[test]
    fn test_output_folder_disambiguation() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("Converted Media");
        assert_eq!(unique_output_folder(&base), base);

        fs::create_dir(&base).unwrap();
        assert_eq!(
            unique_output_folder(&base),
            dir.path().join("Converted Media (1)")
        );

        fs::create_dir(dir.path().join("Converted Media (1)")).unwrap();
        assert_eq!(
            unique_output_folder(&base),
            dir.path().join("Converted Media (2)")
        );
    }

    #[test]
    fn test_folder_with_dot_keeps_whole_name() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("out.v2");
        fs::create_dir(&base).unwrap();
        assert_eq!(unique_output_folder(&base), dir.path().join("out.v2 (1)"));
    }

    #[test]
    fn test_existing_directory_blocks_file_name() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("clip.mp4")).unwrap();
        assert_eq!(
            unique_file_path(&dir.path().join("clip.mp4")),
            dir.path().join("clip (1).mp4")
        );
    }

    #[test]
    fn test_output_candidate() {
        let got = output_candidate(Path::new("/in/clip.mov"), Path::new("/out"), "mp4");
        assert_eq!(got, Path::new("/out/clip.mp4"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]
        #[test]
        fn prop_never_returns_existing_path(occupied in 0usize..6) {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("a.png"), b"x").unwrap();
            for n in 1..=occupied {
                fs::write(dir.path().join(format!("a ({}).png", n)), b"x").unwrap();
            }
            let got = unique_file_path(&dir.path().join("a.png"));
            prop_assert!(!got.exists());
            prop_assert_eq!(got, dir.path().join(format!("a ({}).png", occupied + 1)));
        }
    }
}
