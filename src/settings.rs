//! Session settings
//!
//! Loaded from a JSON file next to the question bank; every field is optional.

use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::QuizError;

/// Which quiz mode the player picked on the level select screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameType {
    #[default]
    GuessNumber,
    CalculateNumber,
    NumberSystem,
}

impl GameType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::GuessNumber => "GuessNumber",
            GameType::CalculateNumber => "CalculateNumber",
            GameType::NumberSystem => "NumberSystem",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "guessnumber" | "guess" => Some(GameType::GuessNumber),
            "calculatenumber" | "calculate" => Some(GameType::CalculateNumber),
            "numbersystem" | "system" => Some(GameType::NumberSystem),
            _ => None,
        }
    }
}

/// What to do when a zone is assigned more widgets than it has grid slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OverflowPolicy {
    /// Place the first `rows * columns` widgets and leave the rest untouched
    #[default]
    Drop,
    /// Add grid rows until every widget fits
    Grow,
    /// Fail the layout with `QuizError::ZoneOverflow`
    Reject,
}

/// Quiz session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Answer buttons per question (1 correct + distractors)
    pub answer_slots: usize,
    /// Grid columns inside each zone
    pub zone_columns: u32,
    /// Grid rows inside each zone
    pub zone_rows: u32,
    /// Minimum gap between a button and the edge of its grid cell
    pub button_margin: f32,
    /// Button size when the question has no layout override
    pub default_button_size: Vec2,
    /// Zone capacity policy
    pub overflow: OverflowPolicy,
    /// Fixed RNG seed (random when unset)
    pub seed: Option<u64>,
    /// Directory images are loaded from
    pub image_root: PathBuf,
    /// Selected level (1-5)
    pub level: u32,
    /// Selected game mode
    pub game_type: GameType,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            answer_slots: ANSWER_SLOTS,
            zone_columns: ZONE_COLUMNS,
            zone_rows: ZONE_ROWS,
            button_margin: BUTTON_MARGIN,
            default_button_size: Vec2::new(DEFAULT_BUTTON_SIZE.0, DEFAULT_BUTTON_SIZE.1),
            overflow: OverflowPolicy::Drop,
            seed: None,
            image_root: PathBuf::from("assets"),
            level: 1,
            game_type: GameType::GuessNumber,
        }
    }
}

impl Settings {
    /// Grid slots available in a single zone
    pub fn slots_per_zone(&self) -> usize {
        (self.zone_columns * self.zone_rows) as usize
    }

    /// Check values the engine cannot work with
    pub fn validate(&self) -> Result<(), QuizError> {
        if self.answer_slots == 0 {
            return Err(QuizError::Settings("answer_slots must be at least 1".into()));
        }
        if self.answer_slots > LABEL_COUNT {
            return Err(QuizError::InsufficientDistractors {
                requested: self.answer_slots,
                available: LABEL_COUNT,
            });
        }
        if self.zone_columns == 0 || self.zone_rows == 0 {
            return Err(QuizError::Settings("zone grid must have at least one cell".into()));
        }
        if self.button_margin.is_nan() || self.button_margin < 0.0 {
            return Err(QuizError::Settings("button_margin must be non-negative".into()));
        }
        Ok(())
    }

    /// Parse and validate settings from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, QuizError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, QuizError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is missing or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::info!("Using default settings ({})", e);
                Self::default()
            }
        }
    }
}
