use crate::error::{MagicError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_UPLOAD_MIME: &str = "image/jpeg";
pub const DEFAULT_RESULT_MIME: &str = "image/png";

/// Raw image bytes plus their MIME type.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageData")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageData {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn from_base64(mime_type: impl Into<String>, data: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(data.trim())
            .map_err(|e| MagicError::SerializationError(format!("Invalid base64 image: {}", e)))?;
        Ok(Self::new(mime_type, bytes))
    }

    /// Parses `data:<mime>;base64,<payload>`.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| MagicError::Validation("Not a data URI".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| MagicError::Validation("Data URI has no payload".into()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| MagicError::Validation("Only base64 data URIs are supported".into()))?;
        let mime = if mime.is_empty() { DEFAULT_UPLOAD_MIME } else { mime };
        Self::from_base64(mime, payload)
    }

    /// Reads an uploaded picture from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|e| MagicError::Validation(format!("Cannot read {}: {}", path.display(), e)))?;
        if bytes.is_empty() {
            return Err(MagicError::Validation(format!("{} is empty", path.display())));
        }
        Ok(Self::new(mime_from_path(path), bytes))
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, &self.bytes)?;
        log::info!("💾 Saved {} ({} bytes)", path.display(), self.bytes.len());
        Ok(())
    }
}

pub fn mime_from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        _ => DEFAULT_UPLOAD_MIME,
    }
}
