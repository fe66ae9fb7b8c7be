//! Per stage action statistics, computed from seat histories on demand.
use crate::action::Action;
use crate::seat::Seat;
use crate::state::{Stage, BETTING_STAGES};
use crate::Currency;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatStageStats {
    pub checks: usize,
    pub calls: usize,
    /// Any raise size, and all-ins
    pub raises: usize,
    pub folds: usize,
    /// Chips put in during the stage, blinds included
    pub contributed: Currency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageStats {
    pub stage: Stage,
    /// Indexed by seat
    pub seats: Vec<SeatStageStats>,
}

/// Stats for each betting stage of the current hand
pub fn stage_stats(seats: &[Seat]) -> Vec<StageStats> {
    BETTING_STAGES
        .iter()
        .map(|stage| StageStats {
            stage: *stage,
            seats: seats.iter().map(|s| seat_stats(s, *stage)).collect(),
        })
        .collect()
}

fn seat_stats(seat: &Seat, stage: Stage) -> SeatStageStats {
    let mut st = SeatStageStats::default();
    for rec in seat.actions.iter().filter(|r| r.stage == stage) {
        st.contributed += rec.amount;
        match rec.action {
            Action::Check => st.checks += 1,
            Action::Call => st.calls += 1,
            Action::Fold => st.folds += 1,
            a if a.is_blind() => {}
            _ => st.raises += 1,
        }
    }
    st
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_stage() {
        let mut a = Seat::new("a", 1000);
        a.record(Stage::Preflop, Action::SmallBlind, 10);
        a.record(Stage::Preflop, Action::Call, 10);
        a.record(Stage::Flop, Action::RaisePot, 60);
        let mut b = Seat::new("b", 1000);
        b.record(Stage::Preflop, Action::BigBlind, 20);
        b.record(Stage::Preflop, Action::Check, 0);
        b.record(Stage::Flop, Action::Fold, 0);

        let stats = stage_stats(&[a, b]);
        assert_eq!(stats.len(), 4);
        assert_eq!(stats[0].stage, Stage::Preflop);
        assert_eq!(stats[0].seats[0].calls, 1);
        assert_eq!(stats[0].seats[0].contributed, 20);
        assert_eq!(stats[0].seats[1].checks, 1);
        assert_eq!(stats[1].seats[0].raises, 1);
        assert_eq!(stats[1].seats[1].folds, 1);
        assert_eq!(stats[3].seats[0], SeatStageStats::default());
    }
}
