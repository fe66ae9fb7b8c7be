use crate::action::Action;
use crate::cards::Card;
use crate::state::Stage;
use crate::Currency;
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Per hand status of a seat, as tracked by the turn cycle
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct SeatStatus: u8 {
        /// Dealt into the current hand
        const IN_HAND = 0b0001;
        const FOLDED = 0b0010;
        /// No chips left behind. Still a contender, but never asked to act again this hand.
        const ALL_IN = 0b0100;
        /// Has acted since the last raise in this betting round
        const ACTED = 0b1000;
    }
}

impl SeatStatus {
    /// Still eligible to win the pot
    pub fn is_contender(&self) -> bool {
        self.contains(Self::IN_HAND) && !self.contains(Self::FOLDED)
    }

    /// Able to make a decision
    pub fn can_act(&self) -> bool {
        self.is_contender() && !self.contains(Self::ALL_IN)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub stage: Stage,
    pub action: Action,
    /// Chips moved from stack to pot by this action
    pub amount: Currency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub name: String,
    /// Stack at the start of the episode
    pub buy_in: Currency,
    pub stack: Currency,
    /// Contribution in the current betting round
    pub pot: Currency,
    /// Contribution over the whole hand. Bounds what this seat can win from any one opponent.
    pub max_win: Currency,
    pub hole: Option<[Card; 2]>,
    pub last_action: Option<Action>,
    /// Everything this seat did this hand, oldest first
    pub actions: Vec<ActionRecord>,
}

impl Seat {
    pub fn new(name: impl Into<String>, stack: Currency) -> Self {
        Self {
            name: name.into(),
            buy_in: stack,
            stack,
            pot: 0,
            max_win: 0,
            hole: None,
            last_action: None,
            actions: vec![],
        }
    }

    /// Forget everything about the previous hand. Only the stack carries over.
    pub(crate) fn clean_state(&mut self) {
        self.pot = 0;
        self.max_win = 0;
        self.hole = None;
        self.last_action = None;
        self.actions.clear();
    }

    pub(crate) fn record(&mut self, stage: Stage, action: Action, amount: Currency) {
        self.last_action = Some(action);
        self.actions.push(ActionRecord {
            stage,
            action,
            amount,
        });
    }

    pub fn has_chips(&self) -> bool {
        self.stack > 0
    }
}
