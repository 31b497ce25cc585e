pub mod client;
pub mod fence;

pub use client::{ExtractionClient, ImageInput};
pub use fence::strip_code_fence;
