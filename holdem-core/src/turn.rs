//! Who acts next, and when a betting round is over.
use crate::seat::{Seat, SeatStatus};
use crate::state::Stage;
use crate::{Currency, SeatIdx};
use serde::{Deserialize, Serialize};

/// Why a betting round stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, Serialize, Deserialize)]
pub enum RoundEnd {
    /// Fewer than two seats have not folded
    OneContender,
    /// The round used up its step budget
    StepBudget,
    /// Every seat that can act has acted since the last raise and matched the bet
    ActionClosed,
    /// Nobody left who can make a meaningful decision, e.g. everyone else is all in
    NoActionPossible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Act(SeatIdx),
    Over(RoundEnd),
}

/// Counters for the current betting round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundCounters {
    /// Actions applied this round, blinds included
    pub steps: usize,
    pub steps_since_raise: usize,
    /// Only counts during preflop, once the big blind is in
    pub steps_since_bb: Option<usize>,
    pub max_steps: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnCycle {
    status: Vec<SeatStatus>,
    dealer: Option<SeatIdx>,
    /// The seat whose turn it is, or was most recently
    current: Option<SeatIdx>,
    counters: RoundCounters,
    max_raises: usize,
}

impl TurnCycle {
    pub fn new(num_seats: usize, max_raises_per_round: usize) -> Self {
        Self {
            status: vec![SeatStatus::empty(); num_seats],
            dealer: None,
            current: None,
            counters: RoundCounters::default(),
            max_raises: max_raises_per_round,
        }
    }

    pub fn num_seats(&self) -> usize {
        self.status.len()
    }

    pub fn status(&self, seat: SeatIdx) -> SeatStatus {
        self.status[seat]
    }

    pub fn statuses(&self) -> &[SeatStatus] {
        &self.status
    }

    pub fn dealer(&self) -> Option<SeatIdx> {
        self.dealer
    }

    pub fn current(&self) -> Option<SeatIdx> {
        self.current
    }

    pub fn counters(&self) -> RoundCounters {
        self.counters
    }

    pub fn contenders(&self) -> impl Iterator<Item = SeatIdx> + '_ {
        self.seats_where(SeatStatus::is_contender)
    }

    fn seats_where<'a>(
        &'a self,
        f: impl Fn(&SeatStatus) -> bool + 'a,
    ) -> impl Iterator<Item = SeatIdx> + 'a {
        self.status
            .iter()
            .enumerate()
            .filter(move |(_, s)| f(*s))
            .map(|(i, _)| i)
    }

    /// Seats after `idx` in table order, wrapping around, ending with `idx` itself
    fn seats_after(&self, idx: SeatIdx) -> impl Iterator<Item = SeatIdx> {
        let n = self.status.len();
        (1..=n).map(move |i| (idx + i) % n)
    }

    /// The seat that gets the button next hand: the first seat with chips after the current
    /// dealer. The very first hand's button goes to the first seat with chips.
    pub fn next_dealer(&self, seats: &[Seat]) -> Option<SeatIdx> {
        let n = self.status.len();
        match self.dealer {
            None => (0..n).find(|i| seats[*i].has_chips()),
            Some(d) => self.seats_after(d).find(|i| seats[*i].has_chips()),
        }
    }

    /// Deal in every seat with chips and move the button
    pub fn start_hand(&mut self, seats: &[Seat]) -> Option<SeatIdx> {
        for (status, seat) in self.status.iter_mut().zip(seats) {
            *status = if seat.has_chips() {
                SeatStatus::IN_HAND
            } else {
                SeatStatus::empty()
            };
        }
        self.dealer = self.next_dealer(seats);
        self.current = None;
        self.dealer
    }

    /// Reset the round counters and hand the action back to the button, so the first seat to
    /// act is the first one after it
    pub fn start_round(&mut self, stage: Stage) {
        for s in self.status.iter_mut() {
            s.remove(SeatStatus::ACTED);
        }
        // Sized by the seats still contending, so busted seats and earlier folds don't
        // stretch the round.
        let live = self.contenders().count();
        let max_steps = match stage {
            Stage::Preflop => live * self.max_raises + 2,
            _ => live * self.max_raises,
        };
        self.counters = RoundCounters {
            steps: 0,
            steps_since_raise: 0,
            steps_since_bb: None,
            max_steps,
        };
        self.current = self.dealer;
    }

    /// The first seat after `idx` that is still contending, e.g. for placing the blinds
    pub fn contender_after(&self, idx: SeatIdx) -> Option<SeatIdx> {
        self.seats_after(idx)
            .find(|i| self.status[*i].is_contender())
    }

    /// Decide whose turn it is. `seats` supplies the round contributions, which say who still
    /// owes chips.
    pub fn next_actor(&mut self, seats: &[Seat]) -> Turn {
        if self.contenders().count() < 2 {
            return Turn::Over(RoundEnd::OneContender);
        }
        if self.counters.steps >= self.counters.max_steps {
            return Turn::Over(RoundEnd::StepBudget);
        }
        let to_match: Currency = seats.iter().map(|s| s.pot).max().unwrap_or(0);
        let owes = |i: SeatIdx| seats[i].pot < to_match;
        let actable: Vec<SeatIdx> = self.seats_where(SeatStatus::can_act).collect();
        match actable.as_slice() {
            [] => return Turn::Over(RoundEnd::NoActionPossible),
            [only] if !owes(*only) => return Turn::Over(RoundEnd::NoActionPossible),
            _ => {}
        }
        let pending = |i: SeatIdx| {
            self.status[i].can_act() && (!self.status[i].contains(SeatStatus::ACTED) || owes(i))
        };
        if !actable.iter().any(|i| pending(*i)) {
            return Turn::Over(RoundEnd::ActionClosed);
        }
        let start = self.current.or(self.dealer).unwrap_or(0);
        match self.seats_after(start).find(|i| pending(*i)) {
            Some(next) => {
                self.current = Some(next);
                Turn::Act(next)
            }
            None => Turn::Over(RoundEnd::ActionClosed),
        }
    }

    fn step(&mut self) {
        self.counters.steps += 1;
        self.counters.steps_since_raise += 1;
        if let Some(n) = self.counters.steps_since_bb.as_mut() {
            *n += 1;
        }
    }

    /// A forced blind. It does not count as acting, so the big blind keeps its option.
    pub fn mark_blind(&mut self, seat: SeatIdx, big: bool) {
        self.current = Some(seat);
        self.step();
        if big {
            self.counters.steps_since_bb = Some(0);
        }
    }

    /// Fold
    pub fn deactivate(&mut self, seat: SeatIdx) {
        self.status[seat].insert(SeatStatus::FOLDED);
        self.step();
    }

    pub fn mark_all_in(&mut self, seat: SeatIdx) {
        self.status[seat].insert(SeatStatus::ALL_IN);
    }

    /// Everyone else has to act again before the round can close
    pub fn mark_raise(&mut self, seat: SeatIdx) {
        for s in self.status.iter_mut() {
            s.remove(SeatStatus::ACTED);
        }
        self.status[seat].insert(SeatStatus::ACTED);
        self.step();
        self.counters.steps_since_raise = 0;
    }

    pub fn mark_call(&mut self, seat: SeatIdx) {
        self.status[seat].insert(SeatStatus::ACTED);
        self.step();
    }

    pub fn mark_check(&mut self, seat: SeatIdx) {
        self.mark_call(seat)
    }
}
