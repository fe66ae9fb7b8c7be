//! Chip bookkeeping for one hand.
use crate::action::Action;
use crate::seat::Seat;
use crate::{Currency, GameError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotLedger {
    /// Settled chips from finished betting rounds
    pub community_pot: Currency,
    /// Chips put in during the betting round in progress
    pub current_round_pot: Currency,
    /// The round contribution every seat has to match, i.e. the largest seat pot this round.
    /// This is a level, not the size of the last single contribution: a seat raises when its
    /// round pot goes above it, however few chips that takes.
    pub min_call: Currency,
}

impl PotLedger {
    pub fn total(&self) -> Currency {
        self.community_pot + self.current_round_pot
    }

    /// How many chips `action` moves from the seat's stack. Pot raises and the 3BB raise are not
    /// clamped to the stack; the legal action check rules out the ones the seat can't afford.
    pub fn contribution(
        &self,
        action: Action,
        seat: &Seat,
        small_blind: Currency,
        big_blind: Currency,
    ) -> Currency {
        match action {
            Action::Fold | Action::Check => 0,
            Action::Call => (self.min_call - seat.pot).clamp(0, seat.stack),
            Action::Raise3Bb => 3 * big_blind - seat.pot,
            Action::RaiseHalfPot | Action::RaisePot | Action::Raise2Pot => {
                let (num, den) = action.pot_fraction().unwrap_or((1, 1));
                self.total() * num / den
            }
            Action::AllIn => seat.stack,
            Action::SmallBlind => small_blind.min(seat.stack),
            Action::BigBlind => big_blind.min(seat.stack),
        }
    }

    /// Move `amount` from the seat's stack into the pot. Returns whether this raised the level
    /// everyone else has to call.
    pub fn apply_contribution(
        &mut self,
        seat: &mut Seat,
        amount: Currency,
    ) -> Result<bool, GameError> {
        if amount < 0 {
            return Err(GameError::NegativeContribution);
        }
        if amount > seat.stack {
            return Err(GameError::ContributionExceedsStack);
        }
        seat.stack -= amount;
        seat.pot += amount;
        seat.max_win += amount;
        self.current_round_pot += amount;
        let raised = seat.pot > self.min_call;
        self.min_call = self.min_call.max(seat.pot);
        Ok(raised)
    }

    /// Close the betting round: the round's chips become community chips. Hand totals in
    /// `max_win` are kept for the award.
    pub fn settle_round(&mut self, seats: &mut [Seat]) {
        self.community_pot += self.current_round_pot;
        self.current_round_pot = 0;
        self.min_call = 0;
        for seat in seats.iter_mut() {
            seat.pot = 0;
        }
    }

    /// Empty the ledger, e.g. once the pot has been awarded
    pub(crate) fn clear(&mut self) -> Currency {
        let total = self.total();
        *self = Self::default();
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(stack: Currency) -> Seat {
        Seat::new("p", stack)
    }

    #[test]
    fn contribution_moves_chips() {
        let mut ledger = PotLedger::default();
        let mut s = seat(100);
        assert!(ledger.apply_contribution(&mut s, 30).unwrap());
        assert_eq!(s.stack, 70);
        assert_eq!(s.pot, 30);
        assert_eq!(s.max_win, 30);
        assert_eq!(ledger.current_round_pot, 30);
        assert_eq!(ledger.min_call, 30);
    }

    #[test]
    fn over_stack_is_rejected() {
        let mut ledger = PotLedger::default();
        let mut s = seat(10);
        assert!(matches!(
            ledger.apply_contribution(&mut s, 11),
            Err(GameError::ContributionExceedsStack)
        ));
        assert!(matches!(
            ledger.apply_contribution(&mut s, -1),
            Err(GameError::NegativeContribution)
        ));
        // nothing moved
        assert_eq!(s.stack, 10);
        assert_eq!(ledger, PotLedger::default());
    }

    #[test]
    fn call_is_not_a_raise() {
        let mut ledger = PotLedger::default();
        let mut a = seat(100);
        let mut b = seat(100);
        ledger.apply_contribution(&mut a, 20).unwrap();
        let amount = ledger.contribution(Action::Call, &b, 10, 20);
        assert_eq!(amount, 20);
        assert!(!ledger.apply_contribution(&mut b, amount).unwrap());
        assert_eq!(ledger.min_call, 20);
    }

    #[test]
    fn raise_is_measured_by_seat_pot() {
        let mut ledger = PotLedger::default();
        let mut a = seat(100);
        let mut b = seat(100);
        ledger.apply_contribution(&mut a, 20).unwrap();
        assert!(ledger.apply_contribution(&mut b, 30).unwrap());
        assert_eq!(ledger.min_call, 30);
        // only 20 more chips, but that takes a's round pot to 40
        assert!(ledger.apply_contribution(&mut a, 20).unwrap());
        assert_eq!(ledger.min_call, 40);
        assert!(!ledger.apply_contribution(&mut b, 10).unwrap());
        assert_eq!(ledger.min_call, 40);
    }

    #[test]
    fn call_is_clamped_to_stack() {
        let mut ledger = PotLedger::default();
        let mut a = seat(500);
        let b = seat(40);
        ledger.apply_contribution(&mut a, 300).unwrap();
        assert_eq!(ledger.contribution(Action::Call, &b, 10, 20), 40);
    }

    #[test]
    fn raise_sizes() {
        let mut ledger = PotLedger {
            community_pot: 60,
            current_round_pot: 0,
            min_call: 0,
        };
        let mut a = seat(1000);
        assert_eq!(ledger.contribution(Action::RaiseHalfPot, &a, 10, 20), 30);
        assert_eq!(ledger.contribution(Action::RaisePot, &a, 10, 20), 60);
        assert_eq!(ledger.contribution(Action::Raise2Pot, &a, 10, 20), 120);
        assert_eq!(ledger.contribution(Action::Raise3Bb, &a, 10, 20), 60);
        assert_eq!(ledger.contribution(Action::AllIn, &a, 10, 20), 1000);
        assert_eq!(ledger.contribution(Action::Check, &a, 10, 20), 0);
        ledger.apply_contribution(&mut a, 20).unwrap();
        assert_eq!(ledger.contribution(Action::Raise3Bb, &a, 10, 20), 40);
        // odd pots round down
        ledger.community_pot = 61;
        assert_eq!(ledger.contribution(Action::RaiseHalfPot, &a, 10, 20), 40);
    }

    #[test]
    fn blinds_are_clamped() {
        let ledger = PotLedger::default();
        assert_eq!(ledger.contribution(Action::BigBlind, &seat(15), 10, 20), 15);
        assert_eq!(ledger.contribution(Action::SmallBlind, &seat(15), 10, 20), 10);
    }

    #[test]
    fn settle_keeps_max_win() {
        let mut ledger = PotLedger::default();
        let mut seats = vec![seat(100), seat(100)];
        ledger.apply_contribution(&mut seats[0], 20).unwrap();
        ledger.apply_contribution(&mut seats[1], 20).unwrap();
        ledger.settle_round(&mut seats);
        assert_eq!(ledger.community_pot, 40);
        assert_eq!(ledger.current_round_pot, 0);
        assert_eq!(ledger.min_call, 0);
        assert!(seats.iter().all(|s| s.pot == 0 && s.max_win == 20));
        assert_eq!(ledger.clear(), 40);
        assert_eq!(ledger.total(), 0);
    }
}
