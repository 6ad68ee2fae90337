//! Math Quiz headless runner
//!
//! Plays a quiz session against a logging host with a scripted player.
//!
//! Usage: `math-quiz [questions.json] [settings.json] [answers]`

use std::sync::Arc;

use glam::Vec2;
use rand::Rng;
use tokio::sync::mpsc;

use math_quiz::{
    AssetCache, CancelToken, FsImageLoader, Image, PromptSide, QuestionBank, QuizError,
    QuizSession, SessionEvent, Settings, UiHost, WidgetTransform,
};

const SAMPLE_BANK: &str = r#"{
    "maths": [
        { "question": "1 + 2 = ?", "answerIndex": 3 },
        { "question": "-2 × 2 = ?", "answerIndex": 8 },
        { "question": "2 - 4 = ?", "answerIndex": 7 },
        { "question": "1 ÷ 2 = ?", "answerIndex": 9 },
        { "question": "Circumference ÷ diameter = ?", "answerIndex": 15 }
    ]
}"#;

/// Four answer areas, like the quiz scene layout
const ZONES: [(f32, f32); 4] = [(600.0, 400.0), (600.0, 400.0), (480.0, 360.0), (480.0, 360.0)];

/// Host that writes every render call to the log
struct ConsoleHost {
    zones: Vec<Vec2>,
}

impl UiHost for ConsoleHost {
    fn zone_count(&self) -> usize {
        self.zones.len()
    }

    fn zone_rect(&self, zone_id: usize) -> Option<Vec2> {
        self.zones.get(zone_id).copied()
    }

    fn render_prompt(&mut self, text: &str, side: PromptSide) {
        log::info!("[{:?}] {}", side, text);
    }

    fn set_button_visual(&mut self, widget_id: usize, image: Option<Arc<Image>>) {
        match image {
            Some(image) => log::debug!("Button {} image {}", widget_id, image.path),
            None => log::debug!("Button {} has no image", widget_id),
        }
    }

    fn set_button_transform(&mut self, widget_id: usize, transform: WidgetTransform) {
        log::info!(
            "Button {} -> zone {} at ({:.1}, {:.1})",
            widget_id,
            transform.zone_id,
            transform.position.x,
            transform.position.y
        );
    }

    fn render_score(&mut self, score: u32) {
        log::info!("Score: {}", score);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Math Quiz starting...");

    if let Err(e) = run().await {
        log::error!("Quiz failed: {}", e);
        std::process::exit(1);
    }
}

/// Queue random presses, one of them off the board, then leave
///
/// Returns how many events made it into the channel.
fn script_player<R: Rng + ?Sized>(
    tx: &mpsc::Sender<SessionEvent>,
    answers: usize,
    slots: usize,
    rng: &mut R,
) -> usize {
    let mut queued = 0;
    for i in 0..answers {
        let pick = if i == 2 { slots + 1 } else { rng.random_range(0..slots.max(1)) };
        match tx.try_send(SessionEvent::Select(pick)) {
            Ok(()) => queued += 1,
            Err(e) => log::warn!("Dropped scripted press {}: {}", pick, e),
        }
    }
    match tx.try_send(SessionEvent::Leave) {
        Ok(()) => queued += 1,
        Err(e) => log::warn!("Dropped scripted leave: {}", e),
    }
    queued
}

async fn run() -> Result<(), QuizError> {
    let mut args = std::env::args().skip(1);

    let bank = match args.next() {
        Some(path) => QuestionBank::load(path)?,
        None => QuestionBank::from_json_str(SAMPLE_BANK)?,
    };
    let settings = match args.next() {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let answers: usize = args.next().and_then(|n| n.parse().ok()).unwrap_or(8);

    let assets = AssetCache::new(FsImageLoader::new(&settings.image_root));
    let mut host = ConsoleHost {
        zones: ZONES.iter().map(|&(w, h)| Vec2::new(w, h)).collect(),
    };

    let (tx, mut events) = mpsc::channel(answers + 2);
    script_player(&tx, answers, settings.answer_slots, &mut rand::rng());
    drop(tx);

    let mut session = QuizSession::from_settings(bank, settings);
    let score = session
        .run(&mut host, &assets, &mut events, &CancelToken::never())
        .await?;

    log::info!(
        "Finished: {} of {} correct ({} images cached)",
        score,
        session.answered(),
        assets.len().await
    );
    Ok(())
}
