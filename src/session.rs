//! Quiz session orchestration
//!
//! One session per quiz scene. Each question goes through:
//! `ShowingQuestion` (sequence, generate, place, render) ->
//! `AwaitingSelection` -> `Scoring` -> back to `ShowingQuestion`.
//! A wrong answer still moves on to the next question.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::assets::{AssetCache, CancelToken, ImageLoader, image_key};
use crate::bank::QuestionBank;
use crate::consts::LABEL_COUNT;
use crate::engine::{self, AnswerSlotMap, Placement, QuestionSequencer, Zone, ZoneLayout};
use crate::error::QuizError;
use crate::host::{PromptSide, UiHost, WidgetTransform};
use crate::settings::Settings;
use crate::{label, seeded_rng};

/// Current phase of the quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizPhase {
    /// Waiting for a usable question bank
    Idle,
    /// Next question is being prepared and rendered
    ShowingQuestion,
    /// Buttons are on screen, waiting for the player
    AwaitingSelection,
    /// Checking the chosen answer
    Scoring,
}

/// Input from the host while a question is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Player pressed an answer button
    Select(usize),
    /// Host is navigating away from the quiz
    Leave,
}

/// One answer button for the current question
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerWidget {
    /// Stable id; also the slot index in the answer map
    pub widget_id: usize,
    pub label_id: usize,
    pub image_key: String,
    /// None when no zone could take the widget (it keeps its previous transform)
    pub placement: Option<Placement>,
}

/// Everything decided for one question
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub question_index: usize,
    pub prompt: String,
    pub prompt_side: PromptSide,
    pub answers: AnswerSlotMap,
    pub widgets: Vec<AnswerWidget>,
    pub widget_size: Vec2,
    pub widget_scale: Vec2,
    pub layouts: Vec<ZoneLayout>,
}

impl Round {
    pub fn widget(&self, widget_id: usize) -> Option<&AnswerWidget> {
        self.widgets.get(widget_id)
    }

    pub fn correct_widget(&self) -> &AnswerWidget {
        &self.widgets[self.answers.correct_slot()]
    }
}

/// Result of scoring a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionOutcome {
    pub widget_id: usize,
    pub chosen_label: usize,
    pub correct_label: usize,
    pub correct: bool,
    /// Score after this selection
    pub score: u32,
}

pub struct QuizSession<R: Rng = Pcg32> {
    bank: QuestionBank,
    settings: Settings,
    sequencer: QuestionSequencer,
    rng: R,
    phase: QuizPhase,
    score: u32,
    answered: u32,
    round: Option<Round>,
    /// Button size/scale carried over until a question overrides them
    button_size: Vec2,
    button_scale: Vec2,
}

impl QuizSession<Pcg32> {
    /// Session seeded from `settings.seed`, or from a random seed
    pub fn from_settings(bank: QuestionBank, settings: Settings) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        log::info!("Quiz session seed: {}", seed);
        Self::new(bank, settings, seeded_rng(seed))
    }
}

impl<R: Rng> QuizSession<R> {
    pub fn new(bank: QuestionBank, settings: Settings, rng: R) -> Self {
        Self {
            sequencer: QuestionSequencer::new(bank.len()),
            button_size: settings.default_button_size,
            button_scale: Vec2::ONE,
            bank,
            settings,
            rng,
            phase: QuizPhase::Idle,
            score: 0,
            answered: 0,
            round: None,
        }
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Selections scored so far
    pub fn answered(&self) -> u32 {
        self.answered
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Leave `Idle` once the bank and settings are usable
    pub fn start(&mut self) -> Result<(), QuizError> {
        if self.phase != QuizPhase::Idle {
            return Ok(());
        }
        if self.bank.is_empty() {
            log::error!("Question bank is empty, quiz stays idle");
            return Err(QuizError::EmptyBank);
        }
        self.settings.validate()?;

        log::info!(
            "Quiz started: level {}, type {}, {} questions",
            self.settings.level,
            self.settings.game_type.as_str(),
            self.bank.len()
        );
        self.phase = QuizPhase::ShowingQuestion;
        Ok(())
    }

    /// Zones the host currently exposes, using the configured grid
    pub fn zones_from_host<H: UiHost + ?Sized>(&self, host: &H) -> Vec<Zone> {
        (0..host.zone_count())
            .filter_map(|id| match host.zone_rect(id) {
                Some(size) => Some(Zone::new(
                    id,
                    size,
                    self.settings.zone_columns,
                    self.settings.zone_rows,
                )),
                None => {
                    log::warn!("Zone {} has no rect, skipping", id);
                    None
                }
            })
            .collect()
    }

    /// Pick the next question, build its answers and lay out the buttons
    pub fn prepare_round(&mut self, zones: &[Zone]) -> Result<&Round, QuizError> {
        self.expect_phase(QuizPhase::ShowingQuestion)?;

        let question_index = self.sequencer.next(&mut self.rng)?;
        let question = self.bank.get(question_index).ok_or(QuizError::EmptyBank)?;

        if let Some(layout) = &question.layout_override {
            if let Some(size) = layout.size() {
                self.button_size = size;
            }
            self.button_scale = layout.scale();
        }
        let image_override = question
            .layout_override
            .as_ref()
            .and_then(|layout| layout.image_override());

        let answers = engine::generate(
            question.correct_label_id,
            self.settings.answer_slots,
            LABEL_COUNT,
            &mut self.rng,
        )?;

        let prompt_side = if self.rng.random_bool(0.5) {
            PromptSide::Left
        } else {
            PromptSide::Right
        };

        let mut widgets: Vec<AnswerWidget> = answers
            .labels()
            .iter()
            .enumerate()
            .map(|(slot, &label_id)| {
                let custom = if answers.is_correct(slot) { image_override } else { None };
                AnswerWidget {
                    widget_id: slot,
                    label_id,
                    image_key: image_key(label_id, custom),
                    placement: None,
                }
            })
            .collect();

        let widget_extent = (self.button_size * self.button_scale).abs();
        let layouts = if zones.is_empty() {
            log::warn!("{}; buttons keep their previous positions", QuizError::MissingZones);
            Vec::new()
        } else {
            engine::layout(
                widgets.len(),
                zones,
                widget_extent,
                self.settings.button_margin,
                self.settings.overflow,
                &mut self.rng,
            )?
        };

        for placement in layouts.iter().flat_map(|l| &l.placements) {
            widgets[placement.widget_id].placement = Some(*placement);
        }

        log::debug!(
            "Question {} '{}': answers {:?}, correct slot {}",
            question_index,
            question.prompt,
            answers.labels(),
            answers.correct_slot()
        );

        let round = Round {
            question_index,
            prompt: question.prompt.clone(),
            prompt_side,
            answers,
            widgets,
            widget_size: self.button_size,
            widget_scale: self.button_scale,
            layouts,
        };
        Ok(&*self.round.insert(round))
    }

    /// Load the round's images, then send the render calls to the host
    ///
    /// Nothing is rendered until every image has loaded or failed. On
    /// cancellation no render call is made and the phase is unchanged.
    pub async fn present<H, L>(
        &mut self,
        host: &mut H,
        assets: &AssetCache<L>,
        cancel: &CancelToken,
    ) -> Result<(), QuizError>
    where
        H: UiHost + ?Sized,
        L: ImageLoader,
    {
        self.expect_phase(QuizPhase::ShowingQuestion)?;
        let Some(round) = &self.round else {
            return Err(QuizError::InvalidPhase {
                expected: QuizPhase::ShowingQuestion,
                actual: self.phase,
            });
        };

        let mut images = Vec::with_capacity(round.widgets.len());
        for widget in &round.widgets {
            images.push(assets.get(&widget.image_key, cancel).await?);
        }

        host.render_prompt(&round.prompt, round.prompt_side);
        for (widget, image) in round.widgets.iter().zip(images) {
            host.set_button_visual(widget.widget_id, image);
            if let Some(placement) = &widget.placement {
                host.set_button_transform(
                    widget.widget_id,
                    WidgetTransform {
                        zone_id: placement.zone_id,
                        position: placement.position(),
                        size: round.widget_size,
                        scale: round.widget_scale,
                    },
                );
            }
        }

        self.phase = QuizPhase::AwaitingSelection;
        Ok(())
    }

    /// Score the player's choice and move on to the next question
    pub fn submit(&mut self, widget_id: usize) -> Result<SelectionOutcome, QuizError> {
        self.expect_phase(QuizPhase::AwaitingSelection)?;
        let Some(round) = &self.round else {
            return Err(QuizError::InvalidPhase {
                expected: QuizPhase::AwaitingSelection,
                actual: self.phase,
            });
        };

        let Some(chosen_label) = round.answers.label_at(widget_id) else {
            log::warn!(
                "Ignoring selection of widget {} ({} answers on screen)",
                widget_id,
                round.answers.len()
            );
            return Err(QuizError::SelectionOutOfRange {
                widget_id,
                slot_count: round.answers.len(),
            });
        };

        self.phase = QuizPhase::Scoring;
        let correct = round.answers.is_correct(widget_id);
        let correct_label = round.answers.correct_label();
        if correct {
            self.score += 1;
        }
        self.answered += 1;

        log::info!(
            "Answer {} ({}) is {}; score {}",
            widget_id,
            label(chosen_label).unwrap_or("?"),
            if correct { "correct" } else { "wrong" },
            self.score
        );

        self.round = None;
        self.phase = QuizPhase::ShowingQuestion;

        Ok(SelectionOutcome {
            widget_id,
            chosen_label,
            correct_label,
            correct,
            score: self.score,
        })
    }

    /// Prepare and render the next question using the host's zones
    pub async fn show_next<H, L>(
        &mut self,
        host: &mut H,
        assets: &AssetCache<L>,
        cancel: &CancelToken,
    ) -> Result<(), QuizError>
    where
        H: UiHost + ?Sized,
        L: ImageLoader,
    {
        let zones = self.zones_from_host(host);
        self.prepare_round(&zones)?;
        self.present(host, assets, cancel).await
    }

    /// Drive the quiz until the host leaves, the event channel closes or `cancel` fires
    ///
    /// Returns the final score. Leaving and cancellation are normal exits.
    pub async fn run<H, L>(
        &mut self,
        host: &mut H,
        assets: &AssetCache<L>,
        events: &mut mpsc::Receiver<SessionEvent>,
        cancel: &CancelToken,
    ) -> Result<u32, QuizError>
    where
        H: UiHost + ?Sized,
        L: ImageLoader,
    {
        self.start()?;
        host.render_score(self.score);

        loop {
            match self.show_next(host, assets, cancel).await {
                Err(QuizError::Cancelled(_)) => {
                    log::info!("Quiz cancelled while loading; final score {}", self.score);
                    return Ok(self.score);
                }
                result => result?,
            }

            loop {
                let event = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    event = events.recv() => event,
                };

                match event {
                    None | Some(SessionEvent::Leave) => {
                        log::info!(
                            "Leaving quiz after {} answers; final score {}",
                            self.answered,
                            self.score
                        );
                        return Ok(self.score);
                    }
                    Some(SessionEvent::Select(widget_id)) => match self.submit(widget_id) {
                        Ok(outcome) => {
                            if outcome.correct {
                                host.render_score(outcome.score);
                            }
                            break;
                        }
                        Err(QuizError::SelectionOutOfRange { .. }) => continue,
                        Err(e) => return Err(e),
                    },
                }
            }
        }
    }

    fn expect_phase(&self, expected: QuizPhase) -> Result<(), QuizError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(QuizError::InvalidPhase {
                expected,
                actual: self.phase,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Image;
    use crate::bank::{ButtonLayout, ImageRef, JsonVec2, JsonVec3, Question};
    use crate::error::AssetError;
    use crate::host::RecordingHost;
    use async_trait::async_trait;

    /// Every path loads except the ones under `missing/`
    struct MemoryLoader;

    #[async_trait]
    impl ImageLoader for MemoryLoader {
        async fn load(&self, path: &str) -> Result<Image, AssetError> {
            if path.starts_with("missing/") {
                return Err(AssetError::NotFound(path.to_string()));
            }
            Ok(Image {
                path: path.to_string(),
                data: path.as_bytes().to_vec(),
            })
        }
    }

    fn bank(n: usize) -> QuestionBank {
        QuestionBank::new((0..n).map(|i| Question::new(format!("Q{}", i), i)).collect()).unwrap()
    }

    fn session(n: usize, seed: u64) -> QuizSession {
        QuizSession::new(bank(n), Settings::default(), seeded_rng(seed))
    }

    fn four_zones() -> Vec<Zone> {
        (0..4).map(|id| Zone::new(id, Vec2::new(600.0, 400.0), 3, 2)).collect()
    }

    #[test]
    fn test_empty_bank_stays_idle() {
        let mut s = session(0, 1);
        assert!(matches!(s.start(), Err(QuizError::EmptyBank)));
        assert_eq!(s.phase(), QuizPhase::Idle);
        assert!(matches!(
            s.prepare_round(&four_zones()),
            Err(QuizError::InvalidPhase { .. })
        ));
    }

    #[test]
    fn test_prepare_round() {
        let mut s = session(3, 42);
        s.start().unwrap();
        let round = s.prepare_round(&four_zones()).unwrap().clone();

        assert_eq!(round.widgets.len(), 5);
        assert_eq!(round.answers.correct_label(), round.question_index);
        assert!(round.widgets.iter().all(|w| w.placement.is_some()));
        assert_eq!(round.layouts.len(), 4);
        assert!(round.layouts.iter().all(|l| !l.placements.is_empty()));
        assert_eq!(
            round.correct_widget().image_key,
            crate::default_image_key(round.question_index)
        );
    }

    #[test]
    fn test_missing_zones_skips_placement() {
        let mut s = session(3, 42);
        s.start().unwrap();
        let round = s.prepare_round(&[]).unwrap();
        assert!(round.layouts.is_empty());
        assert!(round.widgets.iter().all(|w| w.placement.is_none()));
    }

    #[test]
    fn test_layout_override_applies_to_all_buttons() {
        let question = Question {
            prompt: "π?".into(),
            correct_label_id: 15,
            layout_override: Some(ButtonLayout {
                size: JsonVec2 { x: 90.0, y: 70.0 },
                button_background_image: Some(ImageRef {
                    source_image: Some("image/custom/pi.png".into()),
                }),
                ..Default::default()
            }),
        };
        let bank = QuestionBank::new(vec![question]).unwrap();
        let mut s = QuizSession::new(bank, Settings::default(), seeded_rng(9));
        s.start().unwrap();
        let round = s.prepare_round(&four_zones()).unwrap();

        assert_eq!(round.widget_size, Vec2::new(90.0, 70.0));
        assert_eq!(round.widget_scale, Vec2::ONE);
        assert_eq!(round.correct_widget().image_key, "image/custom/pi.png");
        for w in &round.widgets {
            if w.widget_id != round.answers.correct_slot() {
                assert_eq!(w.image_key, crate::default_image_key(w.label_id));
            }
        }
    }

    #[test]
    fn test_mirrored_buttons_stay_in_their_cells() {
        let question = Question {
            prompt: "mirror".into(),
            correct_label_id: 3,
            layout_override: Some(ButtonLayout {
                size: JsonVec2 { x: 80.0, y: 80.0 },
                scale: JsonVec3 { x: -1.0, y: 1.0, z: 1.0 },
                ..Default::default()
            }),
        };
        let bank = QuestionBank::new(vec![question]).unwrap();
        let mut s = QuizSession::new(bank, Settings::default(), seeded_rng(3));
        s.start().unwrap();
        let round = s.prepare_round(&four_zones()).unwrap();

        // Mirroring is kept for rendering but not for spacing
        assert_eq!(round.widget_scale, Vec2::new(-1.0, 1.0));
        for layout in &round.layouts {
            assert_eq!(layout.max_jitter, Vec2::new(40.0, 40.0));
            for p in &layout.placements {
                assert!(p.offset.x.abs() <= 40.0);
                assert!(p.offset.y.abs() <= 40.0);
            }
        }
    }

    #[tokio::test]
    async fn test_submit_scores_and_advances() {
        let mut s = session(4, 7);
        let mut host = RecordingHost::with_zones(vec![Vec2::new(600.0, 400.0); 4]);
        let assets = AssetCache::new(MemoryLoader);
        let cancel = CancelToken::never();
        s.start().unwrap();

        s.show_next(&mut host, &assets, &cancel).await.unwrap();
        assert_eq!(s.phase(), QuizPhase::AwaitingSelection);
        let correct = s.round().unwrap().answers.correct_slot();

        let outcome = s.submit(correct).unwrap();
        assert!(outcome.correct);
        assert_eq!(s.score(), 1);
        assert_eq!(s.phase(), QuizPhase::ShowingQuestion);
        assert!(s.round().is_none());

        s.show_next(&mut host, &assets, &cancel).await.unwrap();
        let wrong = (s.round().unwrap().answers.correct_slot() + 1) % 5;
        let outcome = s.submit(wrong).unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.score, 1);
        assert_eq!(s.score(), 1);
        assert_eq!(s.answered(), 2);
        assert_eq!(s.phase(), QuizPhase::ShowingQuestion);
    }

    #[tokio::test]
    async fn test_out_of_range_selection_is_ignored() {
        let mut s = session(2, 7);
        let mut host = RecordingHost::with_zones(vec![Vec2::new(600.0, 400.0); 4]);
        let assets = AssetCache::new(MemoryLoader);
        s.start().unwrap();
        s.show_next(&mut host, &assets, &CancelToken::never()).await.unwrap();
        let before = s.round().cloned();

        let err = s.submit(5).unwrap_err();
        assert!(matches!(
            err,
            QuizError::SelectionOutOfRange {
                widget_id: 5,
                slot_count: 5
            }
        ));
        assert_eq!(s.phase(), QuizPhase::AwaitingSelection);
        assert_eq!(s.score(), 0);
        assert_eq!(s.round().cloned(), before);
    }

    #[tokio::test]
    async fn test_present_renders_every_widget() {
        let mut s = session(3, 11);
        let mut host = RecordingHost::with_zones(vec![Vec2::new(600.0, 400.0); 4]);
        let assets = AssetCache::new(MemoryLoader);
        s.start().unwrap();
        s.show_next(&mut host, &assets, &CancelToken::never()).await.unwrap();

        let round = s.round().unwrap();
        let (prompt, side) = host.prompt.clone().unwrap();
        assert_eq!(prompt, round.prompt);
        assert_eq!(side, round.prompt_side);
        assert_eq!(host.visuals.len(), 5);
        assert!(host.visuals.iter().all(|(_, image)| image.is_some()));
        assert_eq!(host.transforms.len(), 5);
        for (id, transform) in &host.transforms {
            let placement = round.widget(*id).unwrap().placement.unwrap();
            assert_eq!(transform.position, placement.position());
            assert_eq!(transform.zone_id, placement.zone_id);
        }
    }

    #[tokio::test]
    async fn test_missing_image_renders_degraded() {
        let question = Question {
            prompt: "?".into(),
            correct_label_id: 1,
            layout_override: Some(ButtonLayout {
                button_background_image: Some(ImageRef {
                    source_image: Some("missing/one.png".into()),
                }),
                ..Default::default()
            }),
        };
        let mut s = QuizSession::new(
            QuestionBank::new(vec![question]).unwrap(),
            Settings::default(),
            seeded_rng(3),
        );
        let mut host = RecordingHost::with_zones(vec![Vec2::new(600.0, 400.0); 4]);
        let assets = AssetCache::new(MemoryLoader);
        s.start().unwrap();
        s.show_next(&mut host, &assets, &CancelToken::never()).await.unwrap();

        let correct = s.round().unwrap().answers.correct_slot();
        for (id, image) in &host.visuals {
            assert_eq!(image.is_none(), *id == correct);
        }
        assert_eq!(s.phase(), QuizPhase::AwaitingSelection);
    }

    #[tokio::test]
    async fn test_cancelled_present_renders_nothing() {
        let mut s = session(3, 11);
        let mut host = RecordingHost::with_zones(vec![Vec2::new(600.0, 400.0); 4]);
        let assets = AssetCache::new(MemoryLoader);
        let (handle, cancel) = CancelToken::pair();
        handle.cancel();
        s.start().unwrap();

        let err = s.show_next(&mut host, &assets, &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(host.prompt.is_none());
        assert!(host.visuals.is_empty());
        assert_eq!(s.phase(), QuizPhase::ShowingQuestion);
        assert_eq!(s.score(), 0);
        assert!(assets.is_empty().await);
    }

    #[test]
    fn test_same_seed_same_rounds() {
        let mut a = session(5, 2024);
        let mut b = session(5, 2024);
        a.start().unwrap();
        b.start().unwrap();

        for _ in 0..3 {
            let ra = a.prepare_round(&four_zones()).unwrap().clone();
            let rb = b.prepare_round(&four_zones()).unwrap().clone();
            assert_eq!(ra, rb);
        }
    }
}
