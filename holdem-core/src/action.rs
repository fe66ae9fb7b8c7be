use crate::Currency;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Everything a seat can do on its turn. The blinds are only ever posted by the table itself at
/// the start of a hand.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    derive_more::Display,
    Serialize,
    Deserialize,
)]
pub enum Action {
    Fold,
    Check,
    Call,
    #[display(fmt = "Raise3BB")]
    Raise3Bb,
    RaiseHalfPot,
    RaisePot,
    Raise2Pot,
    AllIn,
    SmallBlind,
    BigBlind,
}

pub const ALL_ACTIONS: [Action; 10] = [
    Action::Fold,
    Action::Check,
    Action::Call,
    Action::Raise3Bb,
    Action::RaiseHalfPot,
    Action::RaisePot,
    Action::Raise2Pot,
    Action::AllIn,
    Action::SmallBlind,
    Action::BigBlind,
];

impl Action {
    pub const fn is_blind(&self) -> bool {
        matches!(self, Action::SmallBlind | Action::BigBlind)
    }

    pub const fn is_pot_raise(&self) -> bool {
        matches!(
            self,
            Action::RaiseHalfPot | Action::RaisePot | Action::Raise2Pot
        )
    }

    /// Size of a pot raise relative to the total pot, as (numerator, denominator)
    pub(crate) const fn pot_fraction(&self) -> Option<(Currency, Currency)> {
        match self {
            Action::RaiseHalfPot => Some((1, 2)),
            Action::RaisePot => Some((1, 1)),
            Action::Raise2Pot => Some((2, 1)),
            _ => None,
        }
    }
}

/// The set of actions the acting seat may choose from, in a fixed order
pub type LegalMoves = BTreeSet<Action>;
