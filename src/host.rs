//! UI host interface
//!
//! The quiz core never touches widgets directly. It asks the host for zone
//! geometry and sends it fire-and-forget render calls.

use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::assets::Image;

/// Which prompt text box shows the question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptSide {
    Left,
    Right,
}

/// Local transform of an answer widget inside its zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WidgetTransform {
    pub zone_id: usize,
    /// Anchored position relative to the zone center
    pub position: Vec2,
    /// Unscaled widget size
    pub size: Vec2,
    pub scale: Vec2,
}

pub trait UiHost {
    /// Number of answer zones on screen
    fn zone_count(&self) -> usize;

    /// Current rectangle size of a zone (None if the zone is gone)
    fn zone_rect(&self, zone_id: usize) -> Option<Vec2>;

    fn render_prompt(&mut self, text: &str, side: PromptSide);

    /// Set a widget's image; None renders it without one
    fn set_button_visual(&mut self, widget_id: usize, image: Option<Arc<Image>>);

    fn set_button_transform(&mut self, widget_id: usize, transform: WidgetTransform);

    fn render_score(&mut self, score: u32);
}

/// Host that records every call, for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    pub zones: Vec<Vec2>,
    pub prompt: Option<(String, PromptSide)>,
    pub visuals: Vec<(usize, Option<Arc<Image>>)>,
    pub transforms: Vec<(usize, WidgetTransform)>,
    pub scores: Vec<u32>,
}

impl RecordingHost {
    pub fn with_zones(zones: Vec<Vec2>) -> Self {
        Self {
            zones,
            ..Default::default()
        }
    }
}

impl UiHost for RecordingHost {
    fn zone_count(&self) -> usize {
        self.zones.len()
    }

    fn zone_rect(&self, zone_id: usize) -> Option<Vec2> {
        self.zones.get(zone_id).copied()
    }

    fn render_prompt(&mut self, text: &str, side: PromptSide) {
        self.prompt = Some((text.to_string(), side));
    }

    fn set_button_visual(&mut self, widget_id: usize, image: Option<Arc<Image>>) {
        self.visuals.push((widget_id, image));
    }

    fn set_button_transform(&mut self, widget_id: usize, transform: WidgetTransform) {
        self.transforms.push((widget_id, transform));
    }

    fn render_score(&mut self, score: u32) {
        self.scores.push(score);
    }
}
