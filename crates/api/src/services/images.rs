//! Storage for uploaded product images.
//!
//! Files land under the configured upload directory with a generated name
//! and are served back at `{public_base_url}/uploads/{name}`. The returned
//! public URL is what gets stored on the product row.

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// Image file types accepted for product photos.
const ACCEPTED: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
    ("image/avif", "avif"),
];

/// Errors that can occur while storing an uploaded image.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The upload is not a supported image type.
    #[error("unsupported image type")]
    UnsupportedType,

    /// Writing the file failed.
    #[error("failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

/// Stores uploaded product images on the local filesystem.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    public_base_url: String,
}

impl ImageStore {
    /// Create an image store rooted at `dir`, served under
    /// `{public_base_url}/uploads`.
    #[must_use]
    pub const fn new(dir: PathBuf, public_base_url: String) -> Self {
        Self {
            dir,
            public_base_url,
        }
    }

    /// The directory uploads are written to.
    #[must_use]
    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    /// Persist an uploaded image and return its public URL.
    ///
    /// The extension is taken from the declared content type, falling back
    /// to the client file name.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::UnsupportedType` for non-image uploads and
    /// `ImageError::Io` if the file cannot be written.
    pub async fn save(
        &self,
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<String, ImageError> {
        let ext = extension_for(file_name, content_type).ok_or(ImageError::UnsupportedType)?;
        let name = format!("{}.{ext}", Uuid::new_v4());

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&name), bytes).await?;

        Ok(format!("{}/uploads/{name}", self.public_base_url))
    }
}

/// Resolve the stored extension from the declared content type, falling back
/// to the client file name. Returns `None` for anything that is not a
/// supported image type.
fn extension_for(file_name: Option<&str>, content_type: Option<&str>) -> Option<&'static str> {
    if let Some(content_type) = content_type {
        return ACCEPTED
            .iter()
            .find(|(mime, _)| mime.eq_ignore_ascii_case(content_type))
            .map(|(_, ext)| *ext);
    }

    let ext = file_name?.rsplit('.').next()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("jpg"),
        "png" => Some("png"),
        "webp" => Some("webp"),
        "gif" => Some("gif"),
        "avif" => Some("avif"),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_from_content_type() {
        assert_eq!(extension_for(None, Some("image/jpeg")), Some("jpg"));
        assert_eq!(extension_for(None, Some("IMAGE/PNG")), Some("png"));
        assert_eq!(extension_for(Some("a.png"), Some("image/webp")), Some("webp"));
    }

    #[test]
    fn test_extension_from_file_name_fallback() {
        assert_eq!(extension_for(Some("photo.JPEG"), None), Some("jpg"));
        assert_eq!(extension_for(Some("photo.gif"), None), Some("gif"));
    }

    #[test]
    fn test_rejects_non_images() {
        assert_eq!(extension_for(None, Some("application/pdf")), None);
        assert_eq!(extension_for(Some("script.sh"), None), None);
        assert_eq!(extension_for(None, None), None);
    }

    #[tokio::test]
    async fn test_save_writes_file_and_builds_url() {
        let dir = std::env::temp_dir().join(format!("ambre-images-{}", Uuid::new_v4()));
        let store = ImageStore::new(dir.clone(), "http://localhost:5000".to_string());

        let url = store
            .save(Some("perfume.png"), Some("image/png"), b"not-really-a-png")
            .await
            .unwrap();

        assert!(url.starts_with("http://localhost:5000/uploads/"));
        assert!(url.ends_with(".png"));

        let name = url.rsplit('/').next().unwrap();
        let stored = tokio::fs::read(dir.join(name)).await.unwrap();
        assert_eq!(stored, b"not-really-a-png");

        tokio::fs::remove_dir_all(dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_rejects_unsupported_type() {
        let dir = std::env::temp_dir().join(format!("ambre-images-{}", Uuid::new_v4()));
        let store = ImageStore::new(dir, "http://localhost:5000".to_string());

        let result = store.save(Some("nope.exe"), None, b"MZ").await;
        assert!(matches!(result, Err(ImageError::UnsupportedType)));
    }
}
