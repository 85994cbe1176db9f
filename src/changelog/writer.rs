//! Write the rendered changelog to disk.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ChangelogError;

/// Atomically replace `path` with `content`.
///
/// The temp file lives in the destination directory so the final rename never
/// crosses filesystems.
pub fn write_changelog(path: &Path, content: &str) -> Result<(), ChangelogError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(ChangelogError::WriteFailed)?;
    file.write_all(content.as_bytes())
        .map_err(ChangelogError::WriteFailed)?;
    file.flush().map_err(ChangelogError::WriteFailed)?;
    file.persist(path).map_err(ChangelogError::PersistFailed)?;

    debug!(path = %path.display(), bytes = content.len(), "Wrote changelog");
    Ok(())
}

/// One-line confirmation for the user.
pub fn generate_summary(entries: usize, path: &Path) -> String {
    let entry_word = if entries == 1 { "entry" } else { "entries" };
    format!("Wrote {} {} to {}", entries, entry_word, path.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AI_CHANGELOG.md");
        write_changelog(&path, "## [Unreleased]\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "## [Unreleased]\n");
    }

    #[test]
    fn test_write_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AI_CHANGELOG.md");
        std::fs::write(&path, "old").unwrap();
        write_changelog(&path, "new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.md");
        assert!(matches!(
            write_changelog(&path, "x"),
            Err(ChangelogError::WriteFailed(_))
        ));
    }

    #[test]
    fn test_generate_summary() {
        let path = Path::new("AI_CHANGELOG.md");
        assert_eq!(generate_summary(1, path), "Wrote 1 entry to AI_CHANGELOG.md");
        assert_eq!(generate_summary(3, path), "Wrote 3 entries to AI_CHANGELOG.md");
    }
}
