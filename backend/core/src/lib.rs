pub mod error;
pub mod traits;
pub mod types;
pub mod validate;

pub use error::LensError;
pub use traits::NotificationSink;
pub use types::{
    ExtractionResult, PreviewHandle, RawUpload, StagedImage, StagedImageMeta,
};
pub use validate::{validate, RejectReason, ALLOWED_TYPES, MAX_IMAGE_BYTES};
