//! Math Quiz - question sequencing and answer placement engine
//!
//! Core modules:
//! - `engine`: Pure randomized logic (sequencing, answer sets, spatial placement)
//! - `session`: Per-question orchestration and scoring
//! - `assets`: Load-once image cache with cancellable loads
//! - `bank`: Question bank data loaded from JSON
//! - `host`: Narrow interface to the UI that renders the quiz
//! - `settings`: Data-driven session configuration

pub mod assets;
pub mod bank;
pub mod engine;
pub mod error;
pub mod host;
pub mod session;
pub mod settings;

pub use assets::{AssetCache, CancelHandle, CancelToken, Cancelled, FsImageLoader, Image, ImageLoader};
pub use bank::{ButtonLayout, Question, QuestionBank};
pub use error::{AssetError, QuizError};
pub use host::{PromptSide, RecordingHost, UiHost, WidgetTransform};
pub use session::{AnswerWidget, QuizPhase, QuizSession, Round, SelectionOutcome, SessionEvent};
pub use settings::{GameType, OverflowPolicy, Settings};

use rand::SeedableRng;
use rand_pcg::Pcg32;

/// Quiz configuration constants
pub mod consts {
    /// Number of labels in the answer pool
    pub const LABEL_COUNT: usize = 16;

    /// Answer buttons shown per question
    pub const ANSWER_SLOTS: usize = 5;

    /// Grid shape inside each answer zone (3 x 2 = 6 slots)
    pub const ZONE_COLUMNS: u32 = 3;
    pub const ZONE_ROWS: u32 = 2;

    /// Minimum free space kept between a button and its cell edge
    pub const BUTTON_MARGIN: f32 = 20.0;

    /// Button size used when a question carries no layout override
    pub const DEFAULT_BUTTON_SIZE: (f32, f32) = (160.0, 160.0);
}

/// Answer label table, indexed by label id
pub const LABELS: [&str; consts::LABEL_COUNT] = [
    "0", "1", "2", "3", "√2", "√4", "√6", "-2", "-4", "1/2", "1/3", "4/5", "0.2", "0.3", "0.5",
    "π",
];

/// Label text for an id, if it is inside the pool
#[inline]
pub fn label(label_id: usize) -> Option<&'static str> {
    LABELS.get(label_id).copied()
}

/// Default image key for a label (`image/button/button_07.png`)
#[inline]
pub fn default_image_key(label_id: usize) -> String {
    format!("image/button/button_{label_id:02}.png")
}

/// Create the session RNG from a seed
#[inline]
pub fn seeded_rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}
