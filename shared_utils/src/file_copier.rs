//! File Copier Module
//!
//! Byte-preserving copy used when the source is already in the requested
//! format. Access and modification times are carried over.

use filetime::FileTime;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use tracing::warn;

/// Copy `src` to `dest` without ever replacing an existing `dest`.
///
/// Returns the number of bytes copied.
pub fn copy_preserving(src: &Path, dest: &Path) -> io::Result<u64> {
    let mut reader = File::open(src)?;
    let mut writer = OpenOptions::new().write(true).create_new(true).open(dest)?;

    let copied = match io::copy(&mut reader, &mut writer).and_then(|n| writer.sync_all().map(|_| n)) {
        Ok(n) => n,
        Err(e) => {
            drop(writer);
            let _ = fs::remove_file(dest);
            return Err(e);
        }
    };

    match fs::metadata(src) {
        Ok(meta) => carry_metadata(&meta, dest),
        Err(e) => warn!(src = %src.display(), error = %e, "Cannot read source metadata"),
    }

    Ok(copied)
}

/// Best effort: the bytes are already in place, so a failure here is only logged.
fn carry_metadata(meta: &fs::Metadata, dest: &Path) {
    if let Err(e) = filetime::set_file_times(
        dest,
        FileTime::from_last_access_time(meta),
        FileTime::from_last_modification_time(meta),
    ) {
        warn!(dest = %dest.display(), error = %e, "Failed to preserve timestamps");
    }
    if let Err(e) = fs::set_permissions(dest, meta.permissions()) {
        warn!(dest = %dest.display(), error = %e, "Failed to preserve permissions");
    }
}

/// Case-insensitive extension equality; two paths without an extension are equal.
pub fn same_extension(a: &Path, b: &Path) -> bool {
    match (
        a.extension().and_then(|e| e.to_str()),
        b.extension().and_then(|e| e.to_str()),
    ) {
        (Some(x), Some(y)) => x.eq_ignore_ascii_case(y),
        (None, None) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_is_byte_identical_and_keeps_mtime() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("song.mp3");
        let payload: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        fs::write(&src, &payload).unwrap();
        let old = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&src, old).unwrap();

        let dest = dir.path().join("out.mp3");
        assert_eq!(copy_preserving(&src, &dest).unwrap(), 10_000);
        assert_eq!(fs::read(&dest).unwrap(), payload);

        let meta = fs::metadata(&dest).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&meta), old);
    }

    #[test]
    fn test_copy_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.png");
        let dest = dir.path().join("b.png");
        fs::write(&src, b"new").unwrap();
        fs::write(&dest, b"old").unwrap();

        let err = copy_preserving(&src, &dest).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&dest).unwrap(), b"old");
    }

    #[test]
    fn test_missing_source_leaves_nothing_behind() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out.wav");
        assert!(copy_preserving(&dir.path().join("nope.wav"), &dest).is_err());
        assert!(!dest.exists());
    }

    #[test]
    fn test_read_only_source_copies_with_its_permissions() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("clip.mkv");
        fs::write(&src, b"frames").unwrap();
        let mut perms = fs::metadata(&src).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&src, perms).unwrap();

        let dest = dir.path().join("copy.mkv");
        assert_eq!(copy_preserving(&src, &dest).unwrap(), 6);
        assert!(fs::metadata(&dest).unwrap().permissions().readonly());
    }

    #[test]
    fn test_metadata_failure_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.wav");
        fs::write(&src, b"x").unwrap();
        let meta = fs::metadata(&src).unwrap();

        // neither call can succeed on a missing destination; both only warn
        carry_metadata(&meta, &dir.path().join("gone.wav"));
        assert!(!dir.path().join("gone.wav").exists());
    }

    #[test]
    fn test_same_extension() {
        assert!(same_extension(Path::new("a.MP4"), Path::new("b.mp4")));
        assert!(!same_extension(Path::new("a.jpg"), Path::new("a.jpeg")));
        assert!(!same_extension(Path::new("a.mov"), Path::new("a")));
        assert!(same_extension(Path::new("a"), Path::new("b")));
    }
}
