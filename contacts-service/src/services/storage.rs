//! Avatar file storage and image validation.

use async_trait::async_trait;
use service_core::error::AppError;
use std::path::PathBuf;
use tracing::info;

/// Where processed avatar bytes end up. Local disk in this deployment;
/// the trait keeps object storage possible without touching handlers.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist `data` under `file_name`, returning the public URL path.
    async fn upload(&self, file_name: &str, data: &[u8]) -> Result<String, AppError>;

    async fn delete(&self, file_name: &str) -> Result<(), AppError>;
}

pub struct LocalStorage {
    root: PathBuf,
    public_path: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_path: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_path: public_path.into(),
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(&self, file_name: &str, data: &[u8]) -> Result<String, AppError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(file_name);
        tokio::fs::write(&path, data).await?;
        info!(file = file_name, bytes = data.len(), "avatar stored");
        Ok(format!("{}/{}", self.public_path, file_name))
    }

    async fn delete(&self, file_name: &str) -> Result<(), AppError> {
        let path = self.root.join(file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Image format accepted for avatars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }
}

/// Normalizes uploaded image bytes before they are persisted. Processing
/// happens strictly before the store is touched, so a failure here leaves
/// no partial state behind.
#[async_trait]
pub trait ImageProcessor: Send + Sync {
    async fn process(&self, data: &[u8]) -> Result<(Vec<u8>, ImageFormat), AppError>;
}

/// Checks magic bytes and passes valid PNG/JPEG data through unchanged.
pub struct FormatValidatingProcessor;

const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

#[async_trait]
impl ImageProcessor for FormatValidatingProcessor {
    async fn process(&self, data: &[u8]) -> Result<(Vec<u8>, ImageFormat), AppError> {
        if data.starts_with(PNG_MAGIC) {
            Ok((data.to_vec(), ImageFormat::Png))
        } else if data.starts_with(JPEG_MAGIC) {
            Ok((data.to_vec(), ImageFormat::Jpeg))
        } else {
            Err(AppError::BadRequest(anyhow::anyhow!(
                "Unsupported image format; expected PNG or JPEG"
            )))
        }
    }
}
