//! Deciding who wins the hand and paying them.
use crate::cards::{Card, HandClass};
use crate::evaluator::HandEvaluator;
use crate::seat::Seat;
use crate::{Currency, GameError, SeatIdx};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    pub winner: SeatIdx,
    /// What the winner showed down with. None when everyone else folded.
    pub hand: Option<HandClass>,
    pub winnings: Currency,
    /// Excess contribution handed back to each seat, indexed by seat
    pub refunds: Vec<Currency>,
    /// Every seat's stack once the pot was paid out
    pub stacks: Vec<Currency>,
}

impl Award {
    /// All chips paid out
    pub fn total(&self) -> Currency {
        self.winnings + self.refunds.iter().sum::<Currency>()
    }
}

impl std::fmt::Display for Award {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.hand {
            Some(class) => write!(f, "Seat {} wins {} with {}", self.winner, self.winnings, class),
            None => write!(f, "Seat {} wins {} uncontested", self.winner, self.winnings),
        }
    }
}

/// The winning seat among `contenders`. A lone contender wins without showing; otherwise the
/// evaluator picks the best hand. Exact ties go to the contender listed first.
pub fn find_winner(
    seats: &[Seat],
    contenders: &[SeatIdx],
    board: &[Card],
    evaluator: &dyn HandEvaluator,
) -> Result<(SeatIdx, Option<HandClass>), GameError> {
    match contenders {
        [] => Err(GameError::NoContenders),
        [only] => Ok((*only, None)),
        _ => {
            let hands = contenders
                .iter()
                .map(|i| seats[*i].hole.ok_or(GameError::MissingHoleCards))
                .collect::<Result<Vec<[Card; 2]>, GameError>>()?;
            let (best, class) = evaluator.compare(&hands, board)?;
            Ok((contenders[best], Some(class)))
        }
    }
}

/// Pay the winner. The winner can take at most its own hand contribution from each seat; a
/// seat that put in more gets the difference back.
pub fn award(seats: &mut [Seat], winner: SeatIdx, hand: Option<HandClass>) -> Award {
    let cap = seats[winner].max_win;
    let winnings: Currency = seats.iter().map(|s| s.max_win.min(cap)).sum();
    let refunds: Vec<Currency> = seats.iter().map(|s| (s.max_win - cap).max(0)).collect();
    for (seat, refund) in seats.iter_mut().zip(refunds.iter()) {
        seat.stack += refund;
    }
    seats[winner].stack += winnings;
    Award {
        winner,
        hand,
        winnings,
        refunds,
        stacks: seats.iter().map(|s| s.stack).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::card::cards_from_str;
    use crate::evaluator::SevenCardEvaluator;

    fn seats_with_max_win(max_wins: &[Currency]) -> Vec<Seat> {
        max_wins
            .iter()
            .map(|mw| {
                let mut s = Seat::new("p", 0);
                s.max_win = *mw;
                s
            })
            .collect()
    }

    #[test]
    fn capped_award_with_refund() {
        let mut seats = seats_with_max_win(&[100, 50, 200]);
        let a = award(&mut seats, 0, None);
        assert_eq!(a.winnings, 250);
        assert_eq!(a.refunds, vec![0, 0, 100]);
        assert_eq!(seats[0].stack, 250);
        assert_eq!(seats[1].stack, 0);
        assert_eq!(seats[2].stack, 100);
        assert_eq!(a.stacks, vec![250, 0, 100]);
        assert_eq!(a.total(), 350);
    }

    #[test]
    fn biggest_contributor_takes_all() {
        let mut seats = seats_with_max_win(&[100, 50, 200]);
        let a = award(&mut seats, 2, None);
        assert_eq!(a.winnings, 350);
        assert!(a.refunds.iter().all(|r| *r == 0));
    }

    #[test]
    fn lone_contender_wins() {
        let seats = seats_with_max_win(&[10, 20]);
        let ev = SevenCardEvaluator::default();
        assert_eq!(find_winner(&seats, &[1], &[], &ev).unwrap(), (1, None));
        assert!(matches!(
            find_winner(&seats, &[], &[], &ev),
            Err(GameError::NoContenders)
        ));
    }

    #[test]
    fn showdown_uses_evaluator() {
        let mut seats = seats_with_max_win(&[10, 10, 10]);
        let holes = cards_from_str("2c3d KhKs AhQd").unwrap();
        for (i, seat) in seats.iter_mut().enumerate() {
            seat.hole = Some([holes[2 * i], holes[2 * i + 1]]);
        }
        let board = cards_from_str("Kc7d9hJs4c").unwrap();
        let ev = SevenCardEvaluator::default();
        // seat 2 folded, so only 0 and 1 are compared
        assert_eq!(
            find_winner(&seats, &[0, 1], &board, &ev).unwrap(),
            (1, Some(HandClass::ThreeOfAKind))
        );
        seats[1].hole = None;
        assert!(matches!(
            find_winner(&seats, &[0, 1], &board, &ev),
            Err(GameError::MissingHoleCards)
        ));
    }
}
