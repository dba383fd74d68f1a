//! Local file handles and preview lifecycle.
//!
//! A selected image lives client-side in two parts: the opaque bytes that
//! eventually get uploaded, and a locally generated preview URL shown in
//! the form. Preview URLs hold a renderer resource, so each one is tied to
//! a `PreviewHandle` that releases its registry slot on drop — a discarded
//! or superseded preview can never leak.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// An image selected in the UI but not yet uploaded. The backend never sees
/// this type; `upload_image` turns it into a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        ImageFile {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// Registry of live preview URLs. Cloning shares the registry; the tree
/// controller owns one and hands out handles for draft thumbnails.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashSet<Uuid>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a preview URL for a selected file. The slot stays live
    /// until the returned handle is dropped.
    pub fn acquire(&self, file: &ImageFile) -> PreviewHandle {
        let id = Uuid::new_v4();
        if let Ok(mut live) = self.live.lock() {
            live.insert(id);
        }
        PreviewHandle {
            id,
            url: format!("preview://{id}/{}", file.file_name),
            live: Arc::clone(&self.live),
        }
    }

    /// Number of preview URLs currently held. Zero once every handle has
    /// been dropped.
    pub fn live_count(&self) -> usize {
        self.live.lock().map(|live| live.len()).unwrap_or(0)
    }
}

/// A live preview URL. Releases its registry slot when dropped.
#[derive(Debug)]
pub struct PreviewHandle {
    id: Uuid,
    url: String,
    live: Arc<Mutex<HashSet<Uuid>>>,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        if let Ok(mut live) = self.live.lock() {
            live.remove(&self.id);
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
