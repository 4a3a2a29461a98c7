//! Uploaded image storage.
//!
//! Files land in the configured upload directory as `<unix-millis>-<name>` and
//! are referenced by their public path, `/uploads/<file>`.

use chrono::Utc;
use std::path::{Path, PathBuf};
use crate::{BackofficeError, Result};

/// Public URL prefix the upload directory is served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Maximum accepted file size (1 MB)
pub const MAX_FILE_SIZE: usize = 1_000_000;

/// Accepted image extensions
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile { pub file_name: String, pub bytes: Vec<u8> }

/// Keeps ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
fn sanitize(file_name: &str) -> String {
    let base = Path::new(file_name).file_name().and_then(|n| n.to_str()).unwrap_or("upload");
    base.chars().map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' }).collect()
}

fn validate(file: &UploadedFile) -> Result<()> {
    if file.bytes.is_empty() { return Err(BackofficeError::validation("Empty file")); }
    if file.bytes.len() > MAX_FILE_SIZE {
        return Err(BackofficeError::validation(format!("File too large: {} bytes (max {MAX_FILE_SIZE})", file.bytes.len())));
    }
    let ext = Path::new(&file.file_name).extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()).unwrap_or_default();
    if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
        return Err(BackofficeError::validation(format!("Unsupported format: {ext}. Supported: png, jpg, jpeg, gif, webp")));
    }
    Ok(())
}

/// Writes `file` under `dir` and returns its public path.
pub async fn store(dir: &Path, file: &UploadedFile) -> Result<String> {
    validate(file)?;
    tokio::fs::create_dir_all(dir).await?;
    let stored_name = format!("{}-{}", Utc::now().timestamp_millis(), sanitize(&file.file_name));
    tokio::fs::write(dir.join(&stored_name), &file.bytes).await?;
    tracing::debug!(file = %stored_name, size = file.bytes.len(), "stored upload");
    Ok(format!("{PUBLIC_PREFIX}/{stored_name}"))
}

/// Removes a file previously returned by [`store`]. Used when the record
/// referencing it could not be written.
pub async fn discard(dir: &Path, public_path: &str) {
    let Some(name) = public_path.strip_prefix(PUBLIC_PREFIX).map(|n| n.trim_start_matches('/')) else { return };
    let path: PathBuf = dir.join(sanitize(name));
    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!(path = %path.display(), error = %e, "failed to discard upload");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_paths_and_odd_chars() {
        assert_eq!(sanitize("../../etc/passwd"), "passwd");
        assert_eq!(sanitize("my photo (1).PNG"), "my_photo__1_.PNG");
    }

    #[tokio::test]
    async fn test_store_and_discard() {
        let dir = tempfile::tempdir().unwrap();
        let file = UploadedFile { file_name: "logo.png".into(), bytes: vec![1, 2, 3] };
        let path = store(dir.path(), &file).await.unwrap();
        assert!(path.starts_with("/uploads/") && path.ends_with("-logo.png"));
        let on_disk = dir.path().join(path.trim_start_matches("/uploads/"));
        assert!(on_disk.exists());
        discard(dir.path(), &path).await;
        assert!(!on_disk.exists());
    }

    #[tokio::test]
    async fn test_rejects_bad_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let exe = UploadedFile { file_name: "run.exe".into(), bytes: vec![0] };
        assert!(matches!(store(dir.path(), &exe).await, Err(BackofficeError::Validation(_))));
        let big = UploadedFile { file_name: "big.jpg".into(), bytes: vec![0; MAX_FILE_SIZE + 1] };
        assert!(matches!(store(dir.path(), &big).await, Err(BackofficeError::Validation(_))));
    }
}
