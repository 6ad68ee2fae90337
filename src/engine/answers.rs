//! Correct answer + distractor generation

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// Label shown in each answer slot for one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSlotMap {
    labels: Vec<usize>,
    correct_slot: usize,
}

impl AnswerSlotMap {
    pub fn label_at(&self, slot: usize) -> Option<usize> {
        self.labels.get(slot).copied()
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn correct_slot(&self) -> usize {
        self.correct_slot
    }

    pub fn correct_label(&self) -> usize {
        self.labels[self.correct_slot]
    }

    pub fn is_correct(&self, slot: usize) -> bool {
        slot == self.correct_slot
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Put `correct_label_id` in a random slot and fill the rest with distinct distractors
///
/// Distractors are sampled without replacement from `[0, pool_size)` minus the
/// correct label, so the result never repeats a label.
pub fn generate<R: Rng + ?Sized>(
    correct_label_id: usize,
    slot_count: usize,
    pool_size: usize,
    rng: &mut R,
) -> Result<AnswerSlotMap, QuizError> {
    if correct_label_id >= pool_size {
        return Err(QuizError::InvalidLabel {
            label_id: correct_label_id,
            pool_size,
        });
    }
    if slot_count == 0 || slot_count > pool_size {
        return Err(QuizError::InsufficientDistractors {
            requested: slot_count,
            available: pool_size,
        });
    }

    let correct_slot = rng.random_range(0..slot_count);
    let mut pool: Vec<usize> = (0..pool_size).filter(|&id| id != correct_label_id).collect();

    let mut labels = vec![correct_label_id; slot_count];
    for (slot, label) in labels.iter_mut().enumerate() {
        if slot == correct_slot {
            continue;
        }
        let pick = rng.random_range(0..pool.len());
        *label = pool.remove(pick);
    }

    Ok(AnswerSlotMap {
        labels,
        correct_slot,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::LABEL_COUNT;
    use crate::seeded_rng;

    #[test]
    fn test_generate_seven_of_five() {
        let mut rng = seeded_rng(2024);
        let map = generate(7, 5, LABEL_COUNT, &mut rng).unwrap();

        assert_eq!(map.len(), 5);
        assert_eq!(map.correct_label(), 7);
        assert_eq!(map.labels().iter().filter(|&&l| l == 7).count(), 1);

        let mut others: Vec<usize> = map
            .labels()
            .iter()
            .enumerate()
            .filter(|(slot, _)| *slot != map.correct_slot())
            .map(|(_, &l)| l)
            .collect();
        assert!(others.iter().all(|&l| l != 7 && l < LABEL_COUNT));
        others.sort_unstable();
        others.dedup();
        assert_eq!(others.len(), 4);
    }

    #[test]
    fn test_full_pool_uses_every_label() {
        let mut rng = seeded_rng(5);
        let map = generate(0, LABEL_COUNT, LABEL_COUNT, &mut rng).unwrap();
        let mut labels = map.labels().to_vec();
        labels.sort_unstable();
        assert_eq!(labels, (0..LABEL_COUNT).collect::<Vec<_>>());
    }

    #[test]
    fn test_single_slot_is_correct() {
        let mut rng = seeded_rng(5);
        let map = generate(3, 1, LABEL_COUNT, &mut rng).unwrap();
        assert_eq!(map.labels(), &[3]);
        assert!(map.is_correct(0));
    }

    #[test]
    fn test_insufficient_distractors() {
        let mut rng = seeded_rng(5);
        let err = generate(1, 17, LABEL_COUNT, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            QuizError::InsufficientDistractors {
                requested: 17,
                available: 16
            }
        ));
        assert!(generate(1, 0, LABEL_COUNT, &mut rng).is_err());
    }

    #[test]
    fn test_invalid_label() {
        let mut rng = seeded_rng(5);
        let err = generate(16, 5, LABEL_COUNT, &mut rng).unwrap_err();
        assert!(matches!(err, QuizError::InvalidLabel { label_id: 16, .. }));
    }

    #[test]
    fn test_correct_slot_varies() {
        let mut rng = seeded_rng(77);
        let mut hits = [0u32; 5];
        for _ in 0..500 {
            let map = generate(2, 5, LABEL_COUNT, &mut rng).unwrap();
            hits[map.correct_slot()] += 1;
        }
        assert!(hits.iter().all(|&h| h > 0));
    }
}
