use std::path::Path;

use shared::domain::Notification;
use thiserror::Error;

pub const MAX_PHOTO_BYTES: usize = 2 * 1024 * 1024;
pub const ALLOWED_PHOTO_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhotoRejection {
    #[error("Invalid image type. Allowed: JPEG, PNG, GIF.")]
    UnsupportedType { content_type: String },
    #[error("Image too large. Maximum size is 2 MB.")]
    TooLarge { size: usize },
}

impl PhotoRejection {
    pub fn title(&self) -> &'static str {
        match self {
            PhotoRejection::UnsupportedType { .. } => "Invalid file",
            PhotoRejection::TooLarge { .. } => "File too large",
        }
    }

    pub fn to_notification(&self) -> Notification {
        Notification::warning(self.title(), self.to_string())
    }
}

/// A photo picked for upload, held in memory until the form is submitted.
#[derive(Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    /// Without an explicit content type, one is guessed from the file name.
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type.unwrap_or_else(|| {
            mime_guess::from_path(&file_name)
                .first_raw()
                .unwrap_or(FALLBACK_CONTENT_TYPE)
                .to_string()
        });
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub async fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        Ok(Self::new(file_name, None, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Type is checked before size, matching what the user is told first.
    pub fn validate(&self) -> Result<(), PhotoRejection> {
        let allowed = ALLOWED_PHOTO_TYPES
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&self.content_type));
        if !allowed {
            return Err(PhotoRejection::UnsupportedType {
                content_type: self.content_type.clone(),
            });
        }
        if self.size() > MAX_PHOTO_BYTES {
            return Err(PhotoRejection::TooLarge { size: self.size() });
        }
        Ok(())
    }
}

impl std::fmt::Debug for PhotoUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}
