//! Image uploads for posters and avatars.
//!
//! Files are stored under the configured upload root as
//! `<category>/<sha256>.<ext>`, so identical uploads share one file.

use std::path::Path;

use axum::body::Bytes;
use axum::extract::Multipart;
use sha2::{Digest, Sha256};

use crate::error::{AppError, AppResult};

/// Accepted image file extensions (lowercase).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Sub-directory of the upload root for media posters.
pub const POSTERS: &str = "posters";
/// Sub-directory of the upload root for user avatars.
pub const AVATARS: &str = "avatars";

/// An image read from the `file` field of a multipart body.
#[derive(Debug)]
pub struct UploadedImage {
    pub extension: String,
    pub data: Bytes,
}

/// Lowercase extension of `file_name`, if it is an accepted image type.
pub fn image_extension(file_name: &str) -> AppResult<String> {
    let ext = match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    };
    if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unsupported image format '.{ext}'. Supported: .{}",
            IMAGE_EXTENSIONS.join(", .")
        )));
    }
    Ok(ext)
}

/// Content-addressed file name: hex SHA-256 of the bytes plus the extension.
pub fn content_file_name(data: &[u8], extension: &str) -> String {
    let digest = Sha256::digest(data);
    format!("{digest:x}.{extension}")
}

/// Read the required `file` field, ignoring any other fields.
pub async fn read_image(multipart: &mut Multipart, max_bytes: usize) -> AppResult<UploadedImage> {
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let extension = image_extension(&file_name)?;
        let data = field.bytes().await?;
        image = Some(UploadedImage { extension, data });
    }

    let image =
        image.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    if image.data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }
    if image.data.len() > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "File exceeds the {max_bytes} byte limit"
        )));
    }
    Ok(image)
}

/// Write `image` under `root/category` and return its path relative to `root`.
pub async fn store_image(root: &Path, category: &str, image: &UploadedImage) -> AppResult<String> {
    let dir = root.join(category);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to create upload dir: {e}")))?;

    let file_name = content_file_name(&image.data, &image.extension);
    tokio::fs::write(dir.join(&file_name), &image.data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;

    tracing::debug!(category, file = %file_name, bytes = image.data.len(), "Image stored");
    Ok(format!("{category}/{file_name}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn accepts_known_extensions_case_insensitively() {
        assert_eq!(image_extension("poster.PNG").unwrap(), "png");
        assert_eq!(image_extension("a.b.jpeg").unwrap(), "jpeg");
    }

    #[test]
    fn rejects_other_extensions() {
        assert_matches!(image_extension("clip.mp4"), Err(AppError::BadRequest(_)));
        assert_matches!(image_extension("noext"), Err(AppError::BadRequest(_)));
    }

    #[test]
    fn file_name_is_content_addressed() {
        let a = content_file_name(b"same bytes", "png");
        let b = content_file_name(b"same bytes", "png");
        let c = content_file_name(b"other bytes", "png");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64 + ".png".len());
    }

    #[tokio::test]
    async fn stores_under_category() {
        let root = tempfile::tempdir().unwrap();
        let image = UploadedImage {
            extension: "webp".into(),
            data: Bytes::from_static(b"RIFF....WEBP"),
        };
        let path = store_image(root.path(), POSTERS, &image).await.unwrap();
        assert!(path.starts_with("posters/"));
        assert!(root.path().join(&path).exists());
    }
}
