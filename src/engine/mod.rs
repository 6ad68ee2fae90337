//! Randomized quiz engine
//!
//! Everything in here is pure and synchronous:
//! - Randomness comes only from the `Rng` passed in
//! - No rendering, asset or platform dependencies
//! - Same seed, same inputs, same output

pub mod answers;
pub mod placement;
pub mod sequencer;

pub use answers::{AnswerSlotMap, generate};
pub use placement::{
    Placement, Zone, ZoneLayout, distribute, layout, max_jitter, place_within_zone, slot_centers,
};
pub use sequencer::QuestionSequencer;

use rand::Rng;

/// In-place uniform Fisher-Yates shuffle (i from len-1 down to 1, j in [0, i])
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}
