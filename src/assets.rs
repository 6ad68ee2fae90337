//! Load-once image cache
//!
//! Images are keyed by logical path and live for the whole session. Loads of
//! the same key are serialized through a per-key `OnceCell`, so a key is
//! loaded at most once even when two widgets ask for it at the same time.
//!
//! Failed or cancelled loads are not cached: their entry is removed, the
//! widget renders without an image and the next request for that key tries
//! the loader again.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{Mutex, OnceCell, watch};

use crate::default_image_key;
use crate::error::AssetError;

/// Encoded image bytes; decoding is up to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub path: String,
    pub data: Vec<u8>,
}

/// Source of image data
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, path: &str) -> Result<Image, AssetError>;
}

/// Reads images from a directory on disk
#[derive(Debug, Clone)]
pub struct FsImageLoader {
    root: PathBuf,
}

impl FsImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ImageLoader for FsImageLoader {
    async fn load(&self, path: &str) -> Result<Image, AssetError> {
        let full_path = self.root.join(path);
        let data = tokio::fs::read(&full_path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AssetError::NotFound(full_path.display().to_string()),
            _ => AssetError::Read {
                path: full_path.display().to_string(),
                source: e,
            },
        })?;

        if data.is_empty() {
            return Err(AssetError::Empty(path.to_string()));
        }

        Ok(Image {
            path: path.to_string(),
            data,
        })
    }
}

/// An in-flight operation was abandoned because the scene went away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Receiving side of a cancellation signal
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

/// Sending side of a cancellation signal
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl CancelToken {
    pub fn pair() -> (CancelHandle, CancelToken) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, CancelToken { rx })
    }

    /// A token that is never cancelled
    pub fn never() -> Self {
        let (_, token) = Self::pair();
        token
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is signalled; pends forever if the handle is dropped
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Cache key for an answer button image
pub fn image_key(label_id: usize, custom_path: Option<&str>) -> String {
    match custom_path {
        Some(path) if !path.is_empty() => path.to_string(),
        _ => default_image_key(label_id),
    }
}

pub struct AssetCache<L: ImageLoader> {
    loader: L,
    entries: Mutex<HashMap<String, Arc<OnceCell<Arc<Image>>>>>,
    loads: AtomicUsize,
}

impl<L: ImageLoader> AssetCache<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            entries: Mutex::new(HashMap::new()),
            loads: AtomicUsize::new(0),
        }
    }

    /// Cached image for `key`, loading it on first use
    ///
    /// `Ok(None)` means the load failed and the caller should render without
    /// an image. `Err(Cancelled)` leaves the cache untouched.
    pub async fn get(&self, key: &str, cancel: &CancelToken) -> Result<Option<Arc<Image>>, Cancelled> {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }

        let cell = {
            let mut entries = self.entries.lock().await;
            entries.entry(key.to_string()).or_default().clone()
        };

        if let Some(image) = cell.get() {
            return Ok(Some(Arc::clone(image)));
        }

        let load = cell.get_or_try_init(|| async {
            self.loads.fetch_add(1, Ordering::Relaxed);
            self.loader.load(key).await.map(Arc::new)
        });

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log::debug!("Load of {} cancelled", key);
                Err(Cancelled)
            }
            result = load => match result {
                Ok(image) => Ok(Some(Arc::clone(image))),
                Err(e) => {
                    log::warn!("Failed to load image {}: {}", key, e);
                    Ok(None)
                }
            },
        };

        if !matches!(result, Ok(Some(_))) {
            self.forget_empty(key, &cell).await;
        }
        result
    }

    /// Drop the entry for `key` if it is still the unfilled `cell`
    async fn forget_empty(&self, key: &str, cell: &Arc<OnceCell<Arc<Image>>>) {
        let mut entries = self.entries.lock().await;
        if entries
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, cell) && !current.initialized())
        {
            entries.remove(key);
        }
    }

    /// Keys with an entry in the cache, loaded or in flight
    pub async fn entry_count(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether `key` has been loaded successfully
    pub async fn contains(&self, key: &str) -> bool {
        let entries = self.entries.lock().await;
        entries.get(key).is_some_and(|cell| cell.initialized())
    }

    /// Number of loaded images
    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.values().filter(|cell| cell.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Loader calls issued so far (successful or not)
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}
