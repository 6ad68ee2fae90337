//! Error types for the quiz engine
//!
//! Every variant is recoverable at the session boundary.

use thiserror::Error;

use crate::assets::Cancelled;
use crate::session::QuizPhase;

/// Errors emitted by the sequencer, generator, placement engine and session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("question bank is empty")]
    EmptyBank,
    #[error("{requested} answer slots requested but only {available} labels are available")]
    InsufficientDistractors { requested: usize, available: usize },
    #[error("label id {label_id} is outside the pool of {pool_size} labels")]
    InvalidLabel { label_id: usize, pool_size: usize },
    #[error("no answer zones supplied")]
    MissingZones,
    #[error("zone {zone_id} received {widgets} widgets but only has {slots} slots")]
    ZoneOverflow {
        zone_id: usize,
        widgets: usize,
        slots: usize,
    },
    #[error("selected widget {widget_id} is outside the {slot_count} answer slots")]
    SelectionOutOfRange { widget_id: usize, slot_count: usize },
    #[error("session is in phase {actual:?}, expected {expected:?}")]
    InvalidPhase {
        expected: QuizPhase,
        actual: QuizPhase,
    },
    #[error("question bank is invalid: {0}")]
    BankLoad(String),
    #[error("settings are invalid: {0}")]
    Settings(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// The scene went away mid-load; a normal exit, not a failure
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

impl QuizError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, QuizError::Cancelled(_))
    }
}

/// Errors returned by an `ImageLoader`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssetError {
    #[error("image not found: {0}")]
    NotFound(String),
    #[error("image {path} could not be read: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("image {0} is empty")]
    Empty(String),
}
