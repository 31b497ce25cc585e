pub mod store;
pub mod surface;
pub mod writer;

pub use store::StagingStore;
pub use surface::{BatchOutcome, DragState, UploadSurface};
pub use writer::StoreWriter;
