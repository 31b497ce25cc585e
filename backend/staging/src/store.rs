//! Staging store — session-lived ordered list of accepted images, plus the
//! preview registry backing their display handles.
//!
//! The store is constructed explicitly and shared behind `Arc`; there is no
//! module-level singleton. A single lock covers both the list and the
//! registry, so every operation is atomic and the "preview alive iff image
//! staged" invariant cannot be observed half-applied.

use std::collections::HashMap;
use std::sync::RwLock;

use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

use postlens_core::{PreviewHandle, StagedImage, StagedImageMeta};

/// Decoded-for-display bytes served under a staged image's preview URL.
#[derive(Debug, Clone)]
pub struct Preview {
    pub media_type: String,
    pub bytes: Bytes,
}

#[derive(Default)]
struct Inner {
    images: Vec<StagedImage>,
    previews: HashMap<Uuid, Preview>,
}

#[derive(Default)]
pub struct StagingStore {
    inner: RwLock<Inner>,
}

impl StagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register preview bytes for an image about to be staged.
    ///
    /// The returned handle must end up inside the `StagedImage` appended by
    /// the same batch; the registry entry lives until that image is removed.
    pub fn register_preview(&self, media_type: impl Into<String>, bytes: Bytes) -> PreviewHandle {
        let key = Uuid::new_v4();
        let mut inner = self.inner.write().expect("staging store lock poisoned");
        inner.previews.insert(
            key,
            Preview {
                media_type: media_type.into(),
                bytes,
            },
        );
        PreviewHandle::new(key)
    }

    /// Append a batch to the end of the list, preserving batch order.
    /// Never deduplicates by content.
    pub fn add_images(&self, batch: Vec<StagedImage>) -> usize {
        let mut inner = self.inner.write().expect("staging store lock poisoned");
        let appended = batch.len();
        inner.images.extend(batch);
        let total = inner.images.len();
        debug!(appended, total, "Appended batch to staging store");
        total
    }

    /// Remove the image at `index`, shifting later entries down by one and
    /// releasing its preview handle. Out-of-range returns `None`.
    pub fn remove_image(&self, index: usize) -> Option<Uuid> {
        let mut inner = self.inner.write().expect("staging store lock poisoned");
        if index >= inner.images.len() {
            return None;
        }
        let removed = inner.images.remove(index);
        let id = removed.id;
        inner.previews.remove(&removed.preview.into_key());
        debug!(%id, index, remaining = inner.images.len(), "Removed staged image");
        Some(id)
    }

    /// Empty the list, releasing every discarded preview handle.
    /// Returns how many images were discarded.
    pub fn clear_images(&self) -> usize {
        let mut guard = self.inner.write().expect("staging store lock poisoned");
        let Inner { images, previews } = &mut *guard;
        let discarded = images.len();
        for image in images.drain(..) {
            previews.remove(&image.preview.into_key());
        }
        debug!(discarded, "Cleared staging store");
        discarded
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("staging store lock poisoned").images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live preview registry entries. Equals `len()` at rest.
    pub fn preview_count(&self) -> usize {
        self.inner.read().expect("staging store lock poisoned").previews.len()
    }

    /// Gallery projection of the current list, in insertion order.
    pub fn metas(&self) -> Vec<StagedImageMeta> {
        let inner = self.inner.read().expect("staging store lock poisoned");
        inner
            .images
            .iter()
            .map(|image| StagedImageMeta {
                id: image.id,
                filename: image.filename.clone(),
                media_type: image.media_type.clone(),
                size_bytes: image.bytes.len(),
                preview_url: format!("/api/previews/{}", image.id),
            })
            .collect()
    }

    /// Look up preview bytes by image id.
    pub fn preview(&self, image_id: Uuid) -> Option<Preview> {
        let inner = self.inner.read().expect("staging store lock poisoned");
        let image = inner.images.iter().find(|image| image.id == image_id)?;
        inner.previews.get(&image.preview.key()).cloned()
    }

    /// Snapshot of `(media_type, bytes)` for every staged image, in order.
    /// `Bytes` clones are cheap reference bumps.
    pub fn snapshot_files(&self) -> Vec<(String, Bytes)> {
        let inner = self.inner.read().expect("staging store lock poisoned");
        inner
            .images
            .iter()
            .map(|image| (image.media_type.clone(), image.bytes.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staged(store: &StagingStore, name: &str) -> StagedImage {
        let bytes = Bytes::from(name.as_bytes().to_vec());
        let preview = store.register_preview("image/png", bytes.clone());
        StagedImage {
            id: Uuid::new_v4(),
            filename: name.to_string(),
            media_type: "image/png".to_string(),
            bytes,
            preview,
        }
    }

    fn names(store: &StagingStore) -> Vec<String> {
        store.metas().into_iter().map(|m| m.filename).collect()
    }

    #[test]
    fn append_preserves_batch_order() {
        let store = StagingStore::new();
        let batch = vec![staged(&store, "a"), staged(&store, "b")];
        store.add_images(batch);
        store.add_images(vec![staged(&store, "c")]);
        assert_eq!(names(&store), ["a", "b", "c"]);
        assert_eq!(store.preview_count(), 3);
    }

    #[test]
    fn remove_shifts_later_entries_down() {
        let store = StagingStore::new();
        store.add_images(vec![
            staged(&store, "a"),
            staged(&store, "b"),
            staged(&store, "c"),
        ]);

        assert!(store.remove_image(1).is_some());
        assert_eq!(names(&store), ["a", "c"]);
        // Removing index 1 again removes what shifted into that slot.
        assert!(store.remove_image(1).is_some());
        assert_eq!(names(&store), ["a"]);
        assert_eq!(store.preview_count(), 1);
    }

    #[test]
    fn remove_out_of_range_is_a_guarded_noop() {
        let store = StagingStore::new();
        store.add_images(vec![staged(&store, "a")]);
        assert!(store.remove_image(5).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_releases_preview() {
        let store = StagingStore::new();
        store.add_images(vec![staged(&store, "a")]);
        let id = store.metas()[0].id;
        assert!(store.preview(id).is_some());

        store.remove_image(0);
        assert!(store.preview(id).is_none());
        assert_eq!(store.preview_count(), 0);
    }

    #[test]
    fn clear_empties_and_releases_all_previews() {
        let store = StagingStore::new();
        store.add_images(vec![staged(&store, "a"), staged(&store, "b")]);
        assert_eq!(store.clear_images(), 2);
        assert!(store.is_empty());
        assert_eq!(store.preview_count(), 0);

        // Clearing an empty store is fine.
        assert_eq!(store.clear_images(), 0);
    }

    #[test]
    fn length_tracks_adds_minus_removals() {
        let store = StagingStore::new();
        store.add_images(vec![
            staged(&store, "a"),
            staged(&store, "b"),
            staged(&store, "c"),
        ]);
        store.remove_image(0);
        store.remove_image(10); // no-op
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn snapshot_matches_insertion_order() {
        let store = StagingStore::new();
        store.add_images(vec![staged(&store, "x"), staged(&store, "y")]);
        let files = store.snapshot_files();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].1, Bytes::from_static(b"x"));
        assert_eq!(files[1].1, Bytes::from_static(b"y"));
    }
}
