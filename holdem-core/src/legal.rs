//! Which actions the acting seat may take.
use crate::action::{Action, LegalMoves, ALL_ACTIONS};
use crate::pot::PotLedger;
use crate::seat::Seat;
use crate::{Currency, SeatIdx};

/// The legal actions for `seats[actor]`. Pure: the same state always gives the same set.
pub fn legal_actions(
    seats: &[Seat],
    actor: SeatIdx,
    ledger: &PotLedger,
    small_blind: Currency,
    big_blind: Currency,
) -> LegalMoves {
    let mut moves = LegalMoves::new();
    let seat = &seats[actor];
    let max_pot = seats.iter().map(|s| s.pot).max().unwrap_or(0);
    if seat.pot == max_pot {
        moves.insert(Action::Check);
    } else {
        moves.insert(Action::Call);
        moves.insert(Action::Fold);
    }

    let to_3bb = ledger.contribution(Action::Raise3Bb, seat, small_blind, big_blind);
    // must put in chips and reach at least the current call level
    if to_3bb > 0 && seat.stack >= to_3bb && seat.pot + to_3bb >= ledger.min_call {
        moves.insert(Action::Raise3Bb);
    }
    for raise in ALL_ACTIONS.into_iter().filter(Action::is_pot_raise) {
        let amount = ledger.contribution(raise, seat, small_blind, big_blind);
        if amount > 0 && seat.stack >= amount && amount >= ledger.min_call {
            moves.insert(raise);
        }
    }
    if seat.stack > 0 {
        moves.insert(Action::AllIn);
    }
    moves
}
