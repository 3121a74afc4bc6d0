//! Image uploads
//!
//! Accepts a multipart form with an `image` field, writes the bytes under the
//! upload directory with a random name and returns the public URL.

use futures::TryStreamExt;
use serde::Serialize;
use std::path::{Path, PathBuf};
use warp::multipart::{FormData, Part};
use warp::Buf;

/// Multipart field carrying the file
pub const IMAGE_FIELD: &str = "image";

/// Reply body of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    /// Public URL of the stored file
    pub image_url: String,
}

/// Upload failures
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Form had no `image` field
    #[error("missing multipart field 'image'")]
    MissingImage,

    /// Field is not an image
    #[error("unsupported content type: {0}")]
    NotAnImage(String),

    /// Uploaded file was empty
    #[error("uploaded file is empty")]
    Empty,

    /// Malformed multipart stream
    #[error("multipart error: {0}")]
    Multipart(#[from] warp::Error),

    /// Writing the file failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// Whether the client sent something unusable
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

/// Stores uploaded images in one directory
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Store files under `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save the `image` field of `form`, returning the stored file name
    ///
    /// # Errors
    /// See [`UploadError`].
    pub async fn save(&self, mut form: FormData) -> Result<String, UploadError> {
        while let Some(part) = form.try_next().await? {
            if part.name() == IMAGE_FIELD {
                return self.save_part(part).await;
            }
        }
        Err(UploadError::MissingImage)
    }

    async fn save_part(&self, part: Part) -> Result<String, UploadError> {
        let content_type = part.content_type().map(str::to_string);
        if let Some(ct) = &content_type {
            if !ct.starts_with("image/") {
                return Err(UploadError::NotAnImage(ct.clone()));
            }
        }

        let extension = extension_for(part.filename(), content_type.as_deref());
        let bytes = part
            .stream()
            .try_fold(Vec::new(), |mut acc, buf| async move {
                acc.extend_from_slice(buf.chunk());
                Ok(acc)
            })
            .await?;
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let file_name = match extension {
            Some(ext) => format!("{}.{}", uuid::Uuid::new_v4(), ext),
            None => uuid::Uuid::new_v4().to_string(),
        };
        tokio::fs::write(self.dir.join(&file_name), &bytes).await?;

        tracing::info!(file = %file_name, bytes = bytes.len(), "image stored");
        Ok(file_name)
    }
}

/// Extension to keep, from the client file name or else the content type
fn extension_for(file_name: Option<&str>, content_type: Option<&str>) -> Option<String> {
    let from_name = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(str::to_ascii_lowercase);

    from_name.or_else(|| {
        content_type
            .and_then(|ct| ct.strip_prefix("image/"))
            .map(|sub| {
                sub.split(['+', ';'])
                    .next()
                    .unwrap_or(sub)
                    .trim()
                    .to_ascii_lowercase()
            })
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_from_file_name() {
        assert_eq!(extension_for(Some("pika.PNG"), None), Some("png".into()));
        assert_eq!(extension_for(Some("a.b.jpeg"), Some("image/png")), Some("jpeg".into()));
    }

    #[test]
    fn extension_from_content_type() {
        assert_eq!(extension_for(Some("noext"), Some("image/webp")), Some("webp".into()));
        assert_eq!(extension_for(None, Some("image/svg+xml")), Some("svg".into()));
        assert_eq!(extension_for(None, None), None);
    }

    #[test]
    fn rejects_suspicious_extensions() {
        assert_eq!(extension_for(Some("x./../etc"), None), None);
        assert_eq!(extension_for(Some("x.p h p"), Some("image/gif")), Some("gif".into()));
    }

    #[test]
    fn client_errors() {
        assert!(UploadError::MissingImage.is_client_error());
        assert!(!UploadError::Io(std::io::Error::other("disk")).is_client_error());
    }
}
