//! Storage for form attachments (photos, signatures).
//!
//! Files land in one configured directory under a timestamp-prefixed name
//! (`20240611_093012_photo.jpg`). Records keep only that name. Two uploads of
//! the same file name within the same second overwrite each other.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::errors::AppError;

/// Extensions accepted by the upload handler.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "pdf"];

/// Extensions accepted for photo fields.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// A file received in a multipart request, fully buffered.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        IncomingFile { filename: filename.into(), bytes: bytes.into() }
    }
}

/// Lowercased extension after the last dot.
pub fn extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn has_extension(filename: &str, allowed: &[&str]) -> bool {
    extension(filename).is_some_and(|ext| allowed.contains(&ext.as_str()))
}

/// Reduce a client-supplied name to a safe plain file name.
///
/// Path separators and whitespace become `_`, anything outside
/// `[A-Za-z0-9._-]` is dropped, leading/trailing dots and underscores are
/// stripped. May return an empty string.
pub fn secure_filename(name: &str) -> String {
    let spaced: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// Stored reference for `original` uploaded at `now`.
pub fn stored_name(original: &str, now: DateTime<Local>) -> Option<String> {
    let safe = secure_filename(original);
    if safe.is_empty() {
        return None;
    }
    Some(format!("{}{}", now.format("%Y%m%d_%H%M%S_"), safe))
}

/// True for names that refer to a file directly inside the upload directory.
pub fn is_plain_name(reference: &str) -> bool {
    !reference.is_empty()
        && reference != "."
        && reference != ".."
        && !reference.contains(|c| matches!(c, '/' | '\\' | '\0'))
}

/// Upload directory plus size policy.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        UploadStore { dir: dir.into(), max_bytes }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub async fn ensure_dir(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Write `file` and return its stored reference.
    ///
    /// Files whose extension is not on the allow-list, or whose name
    /// sanitizes to nothing, are skipped and yield `None`.
    pub async fn save(&self, file: &IncomingFile) -> Result<Option<String>, AppError> {
        if !has_extension(&file.filename, ALLOWED_EXTENSIONS) {
            log::warn!("Ignoring upload '{}' with disallowed extension", file.filename);
            return Ok(None);
        }
        let Some(name) = stored_name(&file.filename, Local::now()) else {
            log::warn!("Ignoring upload with unusable name '{}'", file.filename);
            return Ok(None);
        };
        tokio::fs::write(self.dir.join(&name), &file.bytes).await?;
        log::info!("Stored upload {} ({} bytes)", name, file.bytes.len());
        Ok(Some(name))
    }

    /// Path of a stored reference, `None` if the reference is not a plain name.
    pub fn resolve(&self, reference: &str) -> Option<PathBuf> {
        is_plain_name(reference).then(|| self.dir.join(reference))
    }
}
