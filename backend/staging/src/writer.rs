//! Single-writer batch application.
//!
//! Overlapping raw-input batches are not applied to the store directly:
//! each batch is posted as an apply-request on a bounded mpsc channel, and a
//! single consumer task applies them in receipt order. Cross-batch append
//! order therefore matches submission order, instead of depending on task
//! interleaving.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use postlens_core::StagedImage;

use crate::store::StagingStore;

/// Buffer for pending apply-requests; senders back off when full.
const DEFAULT_BUFFER_SIZE: usize = 64;

enum StoreCommand {
    ApplyBatch {
        batch: Vec<StagedImage>,
        done: oneshot::Sender<usize>,
    },
}

/// Handle for posting batches to the single consumer task.
#[derive(Clone)]
pub struct StoreWriter {
    tx: mpsc::Sender<StoreCommand>,
}

impl StoreWriter {
    /// Spawn the consumer task over `store` and return a posting handle.
    pub fn spawn(store: Arc<StagingStore>) -> Self {
        Self::spawn_with_buffer(store, DEFAULT_BUFFER_SIZE)
    }

    pub fn spawn_with_buffer(store: Arc<StagingStore>, buffer: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<StoreCommand>(buffer);
        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    StoreCommand::ApplyBatch { batch, done } => {
                        let size = batch.len();
                        let total = store.add_images(batch);
                        debug!(size, total, "Applied staged batch");
                        // Receiver may have given up waiting; that's fine.
                        let _ = done.send(total);
                    }
                }
            }
            info!("Store writer channel closed; consumer exiting");
        });
        Self { tx }
    }

    /// Post one batch and wait until the consumer has applied it.
    /// Resolves to the store length after the append.
    pub async fn apply_batch(&self, batch: Vec<StagedImage>) -> Result<usize> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::ApplyBatch {
                batch,
                done: done_tx,
            })
            .await
            .map_err(|_| anyhow!("store writer is not running"))?;
        done_rx
            .await
            .map_err(|_| anyhow!("store writer dropped the batch"))
    }
}
