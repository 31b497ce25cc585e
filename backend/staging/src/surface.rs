//! Upload surface — the capture side of a staging session.
//!
//! Drop, paste, and file-picker input all funnel into [`UploadSurface::
//! handle_raw_input`], which is also the addressable entry point for
//! programmatic injection (page-level clipboard handling lives outside this
//! boundary). Each raw file is validated in order; accepted files get a
//! preview registered and are appended to the store as one batch through the
//! single-writer queue.

use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use postlens_core::{validate, LensError, RawUpload, StagedImage};

use crate::store::StagingStore;
use crate::writer::StoreWriter;

/// Visual drag affordance; carries no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    DragActive,
}

#[derive(Debug)]
struct SurfaceState {
    drag: DragState,
    loading: bool,
    /// Single visible rejection message; later rejections in a batch
    /// overwrite earlier ones.
    last_error: Option<String>,
}

/// Summary of one raw-input batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub staged: usize,
    pub rejected: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub total_staged: usize,
}

pub struct UploadSurface {
    store: Arc<StagingStore>,
    writer: StoreWriter,
    state: RwLock<SurfaceState>,
}

impl UploadSurface {
    pub fn new(store: Arc<StagingStore>, writer: StoreWriter) -> Self {
        Self {
            store,
            writer,
            state: RwLock::new(SurfaceState {
                drag: DragState::Idle,
                loading: false,
                last_error: None,
            }),
        }
    }

    pub fn drag_enter(&self) {
        self.state.write().expect("surface lock poisoned").drag = DragState::DragActive;
    }

    pub fn drag_leave(&self) {
        self.state.write().expect("surface lock poisoned").drag = DragState::Idle;
    }

    pub fn drag_state(&self) -> DragState {
        self.state.read().expect("surface lock poisoned").drag
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().expect("surface lock poisoned").loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.read().expect("surface lock poisoned").last_error.clone()
    }

    /// Validate and stage one raw-input batch (drop, paste, picker, or
    /// programmatic injection).
    ///
    /// Accepted files are appended to the store as a single batch in input
    /// order. Rejected files never reach the store; the batch's last
    /// rejection reason becomes the surface's visible error. The loading flag
    /// is lowered unconditionally, even if applying the batch failed.
    pub async fn handle_raw_input(&self, files: Vec<RawUpload>) -> BatchOutcome {
        {
            let mut state = self.state.write().expect("surface lock poisoned");
            // A drop ends any active drag affordance.
            state.drag = DragState::Idle;
            state.last_error = None;
            state.loading = true;
        }

        let mut accepted = Vec::new();
        let mut rejected = 0usize;
        let mut last_rejection: Option<String> = None;

        for file in files {
            match validate(&file.media_type, file.bytes.len() as u64) {
                Ok(()) => {
                    let preview = self
                        .store
                        .register_preview(file.media_type.clone(), file.bytes.clone());
                    accepted.push(StagedImage {
                        id: Uuid::new_v4(),
                        filename: file.filename,
                        media_type: file.media_type,
                        bytes: file.bytes,
                        preview,
                    });
                }
                Err(reason) => {
                    let err = LensError::from(reason);
                    warn!(filename = %file.filename, error = %err, "Rejected upload");
                    last_rejection = Some(err.to_string());
                    rejected += 1;
                }
            }
        }

        let staged = accepted.len();
        let apply_result = if accepted.is_empty() {
            Ok(self.store.len())
        } else {
            self.writer.apply_batch(accepted).await
        };

        let error = match apply_result {
            Ok(_) => last_rejection,
            Err(err) => {
                warn!(error = %err, "Failed to apply staged batch");
                Some(LensError::Internal(err).to_string())
            }
        };

        let outcome = BatchOutcome {
            staged,
            rejected,
            error: error.clone(),
            total_staged: self.store.len(),
        };

        // Guaranteed cleanup: the loading flag never survives a batch.
        let mut state = self.state.write().expect("surface lock poisoned");
        state.loading = false;
        state.last_error = error;

        info!(
            staged,
            rejected,
            total = outcome.total_staged,
            "Processed raw-input batch"
        );
        outcome
    }

    /// Remove a staged image by its current rendered position, independent of
    /// any in-flight batch. Out-of-range is a guarded no-op.
    pub fn remove(&self, index: usize) -> Option<Uuid> {
        self.store.remove_image(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use postlens_core::MAX_IMAGE_BYTES;

    fn surface() -> (Arc<StagingStore>, UploadSurface) {
        let store = Arc::new(StagingStore::new());
        let writer = StoreWriter::spawn(Arc::clone(&store));
        let surface = UploadSurface::new(Arc::clone(&store), writer);
        (store, surface)
    }

    fn png(name: &str) -> RawUpload {
        RawUpload::new(name, "image/png", Bytes::from_static(b"\x89PNG"))
    }

    #[tokio::test]
    async fn drag_transitions() {
        let (_store, surface) = surface();
        assert_eq!(surface.drag_state(), DragState::Idle);
        surface.drag_enter();
        assert_eq!(surface.drag_state(), DragState::DragActive);
        surface.drag_leave();
        assert_eq!(surface.drag_state(), DragState::Idle);
    }

    #[tokio::test]
    async fn drop_ends_drag_affordance() {
        let (_store, surface) = surface();
        surface.drag_enter();
        surface.handle_raw_input(vec![png("a.png")]).await;
        assert_eq!(surface.drag_state(), DragState::Idle);
    }

    #[tokio::test]
    async fn mixed_batch_stages_only_the_valid_file() {
        let (store, surface) = surface();
        let oversize = RawUpload::new(
            "big.png",
            "image/png",
            Bytes::from(vec![0u8; (MAX_IMAGE_BYTES + 1) as usize]),
        );
        let outcome = surface.handle_raw_input(vec![oversize, png("ok.png")]).await;

        assert_eq!(outcome.staged, 1);
        assert_eq!(outcome.rejected, 1);
        assert_eq!(
            outcome.error.as_deref(),
            Some("File size must be less than 10MB")
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.metas()[0].filename, "ok.png");
    }

    #[tokio::test]
    async fn later_rejection_overwrites_earlier_one() {
        let (_store, surface) = surface();
        let wrong_type = RawUpload::new("doc.pdf", "application/pdf", Bytes::from_static(b"%PDF"));
        let oversize = RawUpload::new(
            "big.png",
            "image/png",
            Bytes::from(vec![0u8; (MAX_IMAGE_BYTES + 1) as usize]),
        );
        let outcome = surface.handle_raw_input(vec![wrong_type, oversize]).await;

        assert_eq!(outcome.rejected, 2);
        assert_eq!(
            outcome.error.as_deref(),
            Some("File size must be less than 10MB")
        );
        assert_eq!(
            surface.last_error().as_deref(),
            Some("File size must be less than 10MB")
        );
    }

    #[tokio::test]
    async fn successful_batch_clears_previous_error_and_loading() {
        let (_store, surface) = surface();
        let bad = RawUpload::new("doc.pdf", "application/pdf", Bytes::from_static(b"%PDF"));
        surface.handle_raw_input(vec![bad]).await;
        assert!(surface.last_error().is_some());

        surface.handle_raw_input(vec![png("a.png")]).await;
        assert!(surface.last_error().is_none());
        assert!(!surface.is_loading());
    }

    #[tokio::test]
    async fn batch_appends_preserve_input_order() {
        let (store, surface) = surface();
        surface
            .handle_raw_input(vec![png("1.png"), png("2.png"), png("3.png")])
            .await;
        let names: Vec<String> = store.metas().into_iter().map(|m| m.filename).collect();
        assert_eq!(names, ["1.png", "2.png", "3.png"]);
    }

    #[tokio::test]
    async fn empty_batch_is_a_noop() {
        let (store, surface) = surface();
        let outcome = surface.handle_raw_input(Vec::new()).await;
        assert_eq!(outcome.staged, 0);
        assert_eq!(outcome.rejected, 0);
        assert!(outcome.error.is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn removal_is_positional() {
        let (store, surface) = surface();
        surface
            .handle_raw_input(vec![png("1.png"), png("2.png")])
            .await;
        assert!(surface.remove(0).is_some());
        assert_eq!(store.metas()[0].filename, "2.png");
        assert!(surface.remove(7).is_none());
    }
}
