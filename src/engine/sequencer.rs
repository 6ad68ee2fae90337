//! Non-repeating question order
//!
//! Walks a shuffled permutation of the bank; once every question has been
//! shown, the next call builds a fresh, independent permutation.

use rand::Rng;

use super::shuffle;
use crate::error::QuizError;

#[derive(Debug, Clone, Default)]
pub struct QuestionSequencer {
    bank_len: usize,
    order: Vec<usize>,
    cursor: usize,
    cycles: u32,
}

impl QuestionSequencer {
    pub fn new(bank_len: usize) -> Self {
        Self {
            bank_len,
            order: Vec::new(),
            cursor: 0,
            cycles: 0,
        }
    }

    /// Next question index; reshuffles first when the current cycle is used up
    pub fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<usize, QuizError> {
        if self.bank_len == 0 {
            return Err(QuizError::EmptyBank);
        }

        if self.order.len() != self.bank_len || self.cursor >= self.order.len() {
            self.reshuffle(rng);
        }

        let index = self.order[self.cursor];
        self.cursor += 1;
        Ok(index)
    }

    fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.order.clear();
        self.order.extend(0..self.bank_len);
        shuffle(&mut self.order, rng);
        self.cursor = 0;
        self.cycles += 1;
        log::debug!("Question order cycle {}: {:?}", self.cycles, self.order);
    }

    /// Questions left before the next reshuffle
    pub fn remaining(&self) -> usize {
        self.order.len() - self.cursor
    }

    /// Number of permutations built so far
    pub fn cycles(&self) -> u32 {
        self.cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeded_rng;

    #[test]
    fn test_empty_bank() {
        let mut seq = QuestionSequencer::new(0);
        let mut rng = seeded_rng(1);
        assert!(matches!(seq.next(&mut rng), Err(QuizError::EmptyBank)));
        assert_eq!(seq.cycles(), 0);
    }

    #[test]
    fn test_three_questions_then_reshuffle() {
        let mut seq = QuestionSequencer::new(3);
        let mut rng = seeded_rng(12345);

        let mut seen: Vec<usize> = (0..3).map(|_| seq.next(&mut rng).unwrap()).collect();
        assert_eq!(seq.remaining(), 0);
        assert_eq!(seq.cycles(), 1);
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2]);

        let fourth = seq.next(&mut rng).unwrap();
        assert!(fourth < 3);
        assert_eq!(seq.cycles(), 2);
        assert_eq!(seq.remaining(), 2);
    }

    #[test]
    fn test_every_cycle_is_complete() {
        let mut seq = QuestionSequencer::new(7);
        let mut rng = seeded_rng(99);

        for _ in 0..5 {
            let mut cycle: Vec<usize> = (0..7).map(|_| seq.next(&mut rng).unwrap()).collect();
            cycle.sort_unstable();
            assert_eq!(cycle, (0..7).collect::<Vec<_>>());
        }
        assert_eq!(seq.cycles(), 5);
    }

    #[test]
    fn test_single_question_repeats() {
        let mut seq = QuestionSequencer::new(1);
        let mut rng = seeded_rng(3);
        for _ in 0..4 {
            assert_eq!(seq.next(&mut rng).unwrap(), 0);
        }
    }
}
