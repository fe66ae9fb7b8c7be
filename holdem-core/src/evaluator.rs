//! Hand comparison and equity estimation consumed by showdown and by observations.
use crate::cards::{best_hand, Card, Deck, HandClass, HandError, HandRank};
use rand::prelude::*;
use rand_chacha::ChaChaRng;

pub trait HandEvaluator: std::fmt::Debug {
    /// Index into `hands` of the best hand given the shared board, and what it made
    fn compare(&self, hands: &[[Card; 2]], board: &[Card]) -> Result<(usize, HandClass), HandError>;

    /// Estimated chance in [0, 1] that `hole` wins against `opponents` random hands once the
    /// board is complete
    fn equity(&self, hole: [Card; 2], board: &[Card], opponents: usize, samples: usize) -> f64;
}

/// Best five of up to seven cards, with a seedable RNG for equity sampling.
#[derive(Debug, Clone)]
pub struct SevenCardEvaluator {
    seed: Option<u64>,
}

impl Default for SevenCardEvaluator {
    fn default() -> Self {
        Self { seed: None }
    }
}

impl SevenCardEvaluator {
    /// Equity estimates from this evaluator repeat exactly for the same inputs
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    fn rng(&self) -> ChaChaRng {
        match self.seed {
            Some(s) => ChaChaRng::seed_from_u64(s),
            None => ChaChaRng::from_entropy(),
        }
    }
}

fn rank_with_board(hole: &[Card; 2], board: &[Card]) -> Result<HandRank, HandError> {
    let cards: Vec<Card> = hole.iter().chain(board.iter()).copied().collect();
    best_hand(&cards)
}

impl HandEvaluator for SevenCardEvaluator {
    fn compare(&self, hands: &[[Card; 2]], board: &[Card]) -> Result<(usize, HandClass), HandError> {
        let mut best: Option<(usize, HandRank)> = None;
        for (idx, hole) in hands.iter().enumerate() {
            let rank = rank_with_board(hole, board)?;
            // strictly better only, so an exact tie stays with the earlier hand
            if best.map_or(true, |(_, b)| rank > b) {
                best = Some((idx, rank));
            }
        }
        best.map(|(idx, rank)| (idx, rank.class))
            .ok_or(HandError::NoHands)
    }

    fn equity(&self, hole: [Card; 2], board: &[Card], opponents: usize, samples: usize) -> f64 {
        if samples == 0 {
            return 0.0;
        }
        if opponents == 0 {
            return 1.0;
        }
        let known: Vec<Card> = hole.iter().chain(board.iter()).copied().collect();
        let to_come = 5usize.saturating_sub(board.len());
        let mut rng = self.rng();
        let mut score = 0.0;
        let mut played = 0usize;
        for _ in 0..samples {
            let mut deck = Deck::without(&known, &mut rng);
            let mut full_board = board.to_vec();
            let (opps, rest) = match (deck.deal_hole(2 * opponents), deck.deal_board(to_come)) {
                (Ok(o), Ok(r)) => (o, r),
                // more opponents than the deck can seat
                _ => break,
            };
            full_board.extend(rest);
            let ours = match rank_with_board(&hole, &full_board) {
                Ok(r) => r,
                Err(_) => break,
            };
            let mut best_other: Option<HandRank> = None;
            for pair in opps.chunks(2) {
                if let Ok(r) = rank_with_board(&[pair[0], pair[1]], &full_board) {
                    best_other = best_other.max(Some(r));
                }
            }
            played += 1;
            score += match best_other {
                Some(other) if other > ours => 0.0,
                Some(other) if other == ours => 0.5,
                _ => 1.0,
            };
        }
        if played == 0 {
            return 0.0;
        }
        score / played as f64
    }
}
