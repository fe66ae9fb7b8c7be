use crate::action::Action;
use crate::cards::Card;
use crate::showdown::Award;
use crate::state::Stage;
use crate::turn::RoundEnd;
use crate::{Currency, SeatIdx, SeqNum};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogItem {
    HandStarted(usize, SeatIdx), // hand number, dealer seat
    HoleDealt(SeatIdx, Option<[Card; 2]>),
    Acted(SeatIdx, Action, Currency),
    NextToAct(SeatIdx),
    RoundEnded(Stage, RoundEnd),
    StageChanged(Stage, Stage),
    Board(Stage, Vec<Card>),
    Awarded(Award),
    EpisodeOver,
}

impl std::fmt::Display for LogItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogItem::HandStarted(n, dealer) => write!(f, "Hand #{n} starts, dealer is seat {dealer}"),
            LogItem::HoleDealt(seat, hole) => match hole {
                None => write!(f, "Seat {seat} dealt a hand"),
                Some(h) => write!(f, "Seat {seat} dealt {}{}", h[0], h[1]),
            },
            LogItem::Acted(seat, action, amount) => write!(f, "Seat {seat}: {action} ({amount})"),
            LogItem::NextToAct(seat) => write!(f, "Next to act is seat {seat}"),
            LogItem::RoundEnded(stage, why) => write!(f, "{stage} betting over: {why}"),
            LogItem::StageChanged(old, new) => write!(f, "Stage changed from {old} to {new}"),
            LogItem::Board(stage, cards) => write!(f, "{stage}: {}", cards.iter().join(" ")),
            LogItem::Awarded(award) => write!(f, "{award}"),
            LogItem::EpisodeOver => write!(f, "Episode over"),
        }
    }
}

impl LogItem {
    /// This item as `viewer` is allowed to see it. Everyone but the owner sees hole cards face
    /// down. With no viewer everything is visible.
    pub fn seen_by(self, viewer: Option<SeatIdx>) -> Self {
        match (self, viewer) {
            (LogItem::HoleDealt(seat, _), Some(v)) if seat != v => LogItem::HoleDealt(seat, None),
            (item, _) => item,
        }
    }
}

/// Sequence numbered hand history. The current hand's items are active; older hands are
/// archived.
#[derive(Debug, PartialEq, Eq, Default, Clone, Serialize, Deserialize)]
pub(crate) struct Log {
    active: Vec<(SeqNum, LogItem)>,
    archive: Vec<(SeqNum, LogItem)>,
    last_seq_num: SeqNum,
}

impl Log {
    pub(crate) fn push(&mut self, item: LogItem) {
        let seq = self.last_seq_num + 1;
        self.active.push((seq, item));
        self.last_seq_num = seq;
    }

    /// Archive the active items, e.g. at the start of a new hand
    pub(crate) fn rotate(&mut self) {
        self.archive.append(&mut self.active);
    }

    pub(crate) fn last_seq(&self) -> SeqNum {
        self.last_seq_num
    }

    pub(crate) fn items_since(
        &self,
        oldest_seq: SeqNum,
    ) -> impl Iterator<Item = (SeqNum, LogItem)> + '_ {
        self.archive
            .iter()
            .chain(self.active.iter())
            .skip_while(move |(seq, _item)| *seq <= oldest_seq)
            .cloned()
    }
}
