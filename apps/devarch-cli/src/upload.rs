//! Uploaded configuration files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::debug;

/// File extensions accepted as uploads.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["yaml", "yml", "tf", "json", "sh"];

/// Read an uploaded file as UTF-8 text. No path means no upload and yields
/// an empty string.
///
/// # Errors
///
/// Fails for extensions outside [`ALLOWED_EXTENSIONS`], unreadable files and
/// content that is not valid UTF-8.
pub fn read_upload(path: Option<&Path>) -> Result<String> {
    let Some(path) = path else {
        return Ok(String::new());
    };

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        bail!(
            "unsupported upload {}: expected one of {}",
            path.display(),
            ALLOWED_EXTENSIONS.join(", ")
        );
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read upload: {}", path.display()))?;
    debug!(path = %path.display(), len = content.len(), "upload read");
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_return_empty_without_upload() {
        assert_eq!(read_upload(None).expect("should succeed"), "");
    }

    #[test]
    fn test_should_read_allowed_extensions() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        for ext in ["yaml", "YML", "tf", "json", "sh"] {
            let path = dir.path().join(format!("upload.{ext}"));
            fs::write(&path, "on: push\n").expect("should write upload");
            assert_eq!(
                read_upload(Some(&path)).expect("should read upload"),
                "on: push\n"
            );
        }
    }

    #[test]
    fn test_should_reject_other_extensions() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        for name in ["notes.txt", "Makefile"] {
            let path = dir.path().join(name);
            fs::write(&path, "x").expect("should write file");
            let err = read_upload(Some(&path)).unwrap_err();
            assert!(err.to_string().contains("unsupported upload"));
        }
    }

    #[test]
    fn test_should_reject_non_utf8_content() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("binary.json");
        fs::write(&path, [0xff, 0xfe, 0x00]).expect("should write file");
        assert!(read_upload(Some(&path)).is_err());
    }

    #[test]
    fn test_should_fail_for_missing_file() {
        let err = read_upload(Some(Path::new("/nonexistent/main.tf"))).unwrap_err();
        assert!(err.to_string().contains("failed to read upload"));
    }
}
