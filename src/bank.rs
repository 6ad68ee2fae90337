//! Question bank
//!
//! The bank file mirrors the layout the quiz content is authored in:
//!
//! ```json
//! { "maths": [ { "question": "2 - 4 = ?", "answerIndex": 7,
//!                "answerButton": { "size": { "x": 120, "y": 120 } } } ] }
//! ```
//!
//! Styling fields (fonts, colors, text roots) are ignored here.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::LABEL_COUNT;
use crate::error::QuizError;

/// Two-component value as written in the bank file
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonVec2 {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

/// Three-component value as written in the bank file
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonVec3 {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

/// Image reference inside a button layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    #[serde(default)]
    pub source_image: Option<String>,
}

/// Per-question override for answer button size, scale and correct-answer image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonLayout {
    #[serde(default)]
    pub size: JsonVec2,
    #[serde(default)]
    pub scale: JsonVec3,
    #[serde(default)]
    pub button_background_image: Option<ImageRef>,
}

impl ButtonLayout {
    /// Size to apply to every button (None keeps the current size)
    pub fn size(&self) -> Option<Vec2> {
        let size = Vec2::new(self.size.x, self.size.y);
        (size != Vec2::ZERO).then_some(size)
    }

    /// Scale to apply to every button; an all-zero scale means unscaled
    pub fn scale(&self) -> Vec2 {
        if self.scale == JsonVec3::default() {
            Vec2::ONE
        } else {
            Vec2::new(self.scale.x, self.scale.y)
        }
    }

    /// Image path that replaces the correct answer's default image
    pub fn image_override(&self) -> Option<&str> {
        self.button_background_image
            .as_ref()
            .and_then(|img| img.source_image.as_deref())
            .filter(|path| !path.is_empty())
    }
}

/// A single quiz question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub prompt: String,
    #[serde(rename = "answerIndex")]
    pub correct_label_id: usize,
    #[serde(rename = "answerButton", default)]
    pub layout_override: Option<ButtonLayout>,
}

impl Question {
    pub fn new(prompt: impl Into<String>, correct_label_id: usize) -> Self {
        Self {
            prompt: prompt.into(),
            correct_label_id,
            layout_override: None,
        }
    }
}

/// Ordered, immutable list of questions for a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionBank {
    #[serde(rename = "maths", default)]
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Build a bank, checking every answer index against the label pool
    pub fn new(questions: Vec<Question>) -> Result<Self, QuizError> {
        if let Some((i, q)) = questions
            .iter()
            .enumerate()
            .find(|(_, q)| q.correct_label_id >= LABEL_COUNT)
        {
            return Err(QuizError::BankLoad(format!(
                "question {} answer index {} is outside 0..{}",
                i, q.correct_label_id, LABEL_COUNT
            )));
        }
        Ok(Self { questions })
    }

    pub fn from_json_str(json: &str) -> Result<Self, QuizError> {
        let raw: QuestionBank = serde_json::from_str(json)?;
        Self::new(raw.questions)
    }

    /// Load the bank file; an empty bank is returned as-is and rejected when the session starts
    pub fn load(path: impl AsRef<Path>) -> Result<Self, QuizError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let bank = Self::from_json_str(&json)?;
        if bank.is_empty() {
            log::error!("Question bank {} is empty", path.display());
        } else {
            log::info!("Loaded {} questions from {}", bank.len(), path.display());
        }
        Ok(bank)
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
