//! Upload validation — pure accept/reject predicate over a file's declared
//! media type and byte size. No I/O, no side effects.

use thiserror::Error;

/// Media types accepted for staging.
pub const ALLOWED_TYPES: [&str; 4] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Inclusive size ceiling: exactly this many bytes is still accepted.
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Why a file was rejected. `Display` is the user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("Only image files (JPEG, PNG, GIF, WebP) are allowed")]
    UnsupportedType,

    #[error("File size must be less than 10MB")]
    TooLarge,
}

/// Accept or reject a file based on its declared media type and size.
///
/// Any type outside the allow-list is rejected regardless of size.
pub fn validate(media_type: &str, size_bytes: u64) -> Result<(), RejectReason> {
    if !ALLOWED_TYPES.contains(&media_type) {
        return Err(RejectReason::UnsupportedType);
    }
    if size_bytes > MAX_IMAGE_BYTES {
        return Err(RejectReason::TooLarge);
    }
    Ok(())
}
