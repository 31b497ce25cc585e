use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A raw file as captured by the upload surface, before validation.
#[derive(Debug, Clone)]
pub struct RawUpload {
    pub filename: String,
    /// Declared media type (e.g. `image/png`).
    pub media_type: String,
    pub bytes: Bytes,
}

impl RawUpload {
    pub fn new(
        filename: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// Revocable reference to a staged image's decoded-for-display preview.
///
/// Revocation consumes the handle ([`PreviewHandle::into_key`]), so a handle
/// can be released at most once; the registry entry it points at must be
/// alive exactly as long as its image is staged.
#[derive(Debug)]
pub struct PreviewHandle {
    key: Uuid,
}

impl PreviewHandle {
    pub fn new(key: Uuid) -> Self {
        Self { key }
    }

    pub fn key(&self) -> Uuid {
        self.key
    }

    /// Consume the handle, yielding the registry key to revoke.
    pub fn into_key(self) -> Uuid {
        self.key
    }
}

/// An accepted image held in the staging store.
///
/// Created only through successful validation; the store owns the bytes and
/// the preview handle from acceptance until removal or clear.
#[derive(Debug)]
pub struct StagedImage {
    pub id: Uuid,
    pub filename: String,
    pub media_type: String,
    pub bytes: Bytes,
    pub preview: PreviewHandle,
}

/// Gallery-facing projection of a staged image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedImageMeta {
    pub id: Uuid,
    pub filename: String,
    pub media_type: String,
    pub size_bytes: usize,
    pub preview_url: String,
}

/// Per-image outcome of one extraction invocation. Not persisted, not retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionResult {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            success: true,
            extracted_text: Some(text.into()),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            extracted_text: None,
            error: Some(message.into()),
        }
    }
}
