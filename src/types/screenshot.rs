use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Id;
use crate::error::{CatalogError, Result};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Screenshot {
    #[serde(alias = "_id")]
    pub id: Id,
    /// URL of the persisted image
    pub image: String,
    #[serde(default, alias = "priorityOrder")]
    pub priority_order: Option<i64>,
    #[serde(default)]
    pub project: Option<Id>,
}

/// Image bytes waiting to become a screenshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CatalogError::FileNotFound(path.display().to_string()));
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();

        let bytes = std::fs::read(path).map_err(|e| CatalogError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        Ok(Self {
            content_type: guess_content_type(&file_name),
            file_name,
            bytes,
        })
    }
}

fn guess_content_type(filename: &str) -> String {
    let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_image_types() {
        assert_eq!(guess_content_type("shot.PNG"), "image/png");
        assert_eq!(guess_content_type("photo.jpeg"), "image/jpeg");
        assert_eq!(guess_content_type("anim.webp"), "image/webp");
        assert_eq!(guess_content_type("notes"), "application/octet-stream");
    }

    #[test]
    fn reads_upload_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("home.png");
        std::fs::write(&path, b"\x89PNG").unwrap();

        let upload = ImageUpload::from_path(&path).unwrap();
        assert_eq!(upload.file_name, "home.png");
        assert_eq!(upload.content_type, "image/png");
        assert_eq!(upload.bytes, b"\x89PNG");
    }

    #[test]
    fn missing_file_is_reported() {
        let err = ImageUpload::from_path(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, CatalogError::FileNotFound(_)));
    }
}
