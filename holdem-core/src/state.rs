//! The table: one hand at a time, from blinds to award, then straight into the next hand.
use crate::action::{Action, LegalMoves};
use crate::cards::{Card, Deck, DeckSeed};
use crate::config::{self, TableConfig};
use crate::evaluator::{HandEvaluator, SevenCardEvaluator};
use crate::history::{Log, LogItem};
use crate::legal::legal_actions;
use crate::pot::PotLedger;
use crate::seat::{Seat, SeatStatus};
use crate::showdown::{self, Award};
use crate::turn::{RoundCounters, RoundEnd, Turn, TurnCycle};
use crate::{Currency, GameError, SeatIdx, SeqNum};
use itertools::Itertools;
use log::{debug, info, warn};
use rand::prelude::*;
use rand_chacha::ChaChaRng;
use serde::{Deserialize, Serialize};

pub const COMMUNITY_SIZE: usize = 5;

#[derive(
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Clone,
    Copy,
    derive_more::Display,
    Serialize,
    Deserialize,
)]
pub enum Stage {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    /// The hand ended because everyone else folded; no more cards are dealt
    EndHidden,
}

pub const BETTING_STAGES: [Stage; 4] = [Stage::Preflop, Stage::Flop, Stage::Turn, Stage::River];

impl Stage {
    /// The stage after this betting round, and how many board cards it deals
    pub fn next(self) -> Result<(Stage, usize), GameError> {
        match self {
            Stage::Preflop => Ok((Stage::Flop, 3)),
            Stage::Flop => Ok((Stage::Turn, 1)),
            Stage::Turn => Ok((Stage::River, 1)),
            Stage::River => Ok((Stage::Showdown, 0)),
            Stage::Showdown | Stage::EndHidden => Err(GameError::NoBettingRound(self)),
        }
    }
}

/// Result of offering an action to the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActOutcome {
    /// Not allowed right now. Nothing changed; the same seat is still to act.
    Illegal { legal: LegalMoves },
    Applied {
        seat: SeatIdx,
        action: Action,
        amount: Currency,
        /// Hands that finished as a consequence, oldest first. Usually zero or one, but if the
        /// next hand's blinds leave nobody able to act it plays out too.
        awards: Vec<Award>,
    },
}

#[derive(Debug)]
pub struct Table {
    config: TableConfig,
    seats: Vec<Seat>,
    cycle: TurnCycle,
    ledger: PotLedger,
    deck: Deck,
    board: Vec<Card>,
    /// Don't assign directly, see `change_stage`
    stage: Stage,
    hand_no: usize,
    /// Source of every hand's deck seed
    rng: ChaChaRng,
    evaluator: Box<dyn HandEvaluator>,
    logs: Log,
    actor: Option<SeatIdx>,
    done: bool,
}

impl Table {
    /// Seat `config.num_seats` players with the configured stack. The same `seed` always
    /// deals the same cards.
    pub fn new(config: TableConfig, seed: Option<DeckSeed>) -> Result<Self, GameError> {
        config.validate()?;
        let seats = (0..config.num_seats)
            .map(|i| Seat::new(format!("seat{}", i), config.initial_stack))
            .collect();
        let rng = match seed {
            Some(s) => ChaChaRng::from_seed(s.bytes()),
            None => ChaChaRng::from_entropy(),
        };
        Ok(Self {
            cycle: TurnCycle::new(config.num_seats, config.max_raises_per_round),
            config,
            seats,
            ledger: PotLedger::default(),
            deck: Deck::default(),
            board: Vec::with_capacity(COMMUNITY_SIZE),
            stage: Stage::Preflop,
            hand_no: 0,
            rng,
            evaluator: Box::new(SevenCardEvaluator::default()),
            logs: Log::default(),
            actor: None,
            done: false,
        })
    }

    pub fn with_evaluator(mut self, evaluator: Box<dyn HandEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Override starting stacks, one per seat
    pub fn with_stacks(mut self, stacks: &[Currency]) -> Result<Self, GameError> {
        if stacks.len() != self.seats.len() {
            return Err(GameError::StackCountMismatch {
                stacks: stacks.len(),
                seats: self.seats.len(),
            });
        }
        let total = stacks.iter().try_fold(0 as Currency, |acc, s| acc.checked_add(*s));
        config::check_chip_total(total)?;
        for (seat, stack) in self.seats.iter_mut().zip(stacks) {
            seat.stack = *stack;
            seat.buy_in = *stack;
        }
        Ok(self)
    }

    pub fn with_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        for (seat, name) in self.seats.iter_mut().zip(names) {
            seat.name = name.into();
        }
        self
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn board(&self) -> &[Card] {
        &self.board
    }

    pub fn ledger(&self) -> &PotLedger {
        &self.ledger
    }

    pub fn status(&self, seat: SeatIdx) -> SeatStatus {
        self.cycle.status(seat)
    }

    pub fn dealer(&self) -> Option<SeatIdx> {
        self.cycle.dealer()
    }

    pub fn round_counters(&self) -> RoundCounters {
        self.cycle.counters()
    }

    pub fn contenders(&self) -> Vec<SeatIdx> {
        self.cycle.contenders().collect()
    }

    pub fn evaluator(&self) -> &dyn HandEvaluator {
        self.evaluator.as_ref()
    }

    pub fn hand_no(&self) -> usize {
        self.hand_no
    }

    /// The seat that has to act next, if any
    pub fn current_actor(&self) -> Option<SeatIdx> {
        self.actor
    }

    /// No further hands can be played
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn last_seq(&self) -> SeqNum {
        self.logs.last_seq()
    }

    /// Hand history after `seq`, with other seats' hole cards hidden from `viewer`
    pub fn changes_since(
        &self,
        seq: SeqNum,
        viewer: Option<SeatIdx>,
    ) -> impl Iterator<Item = (SeqNum, LogItem)> + '_ {
        self.logs
            .items_since(seq)
            .map(move |(seq, item)| (seq, item.seen_by(viewer)))
    }

    fn funded_seats(&self) -> usize {
        self.seats.iter().filter(|s| s.has_chips()).count()
    }

    fn change_stage(&mut self, new: Stage) {
        if self.stage == new {
            return;
        }
        self.logs.push(LogItem::StageChanged(self.stage, new));
        // this is the only place the stage should ever be changed
        self.stage = new;
    }

    /// Start a hand and run it until some seat has to act. Fails if fewer than two seats have
    /// chips.
    pub fn start_hand(&mut self) -> Result<Vec<Award>, GameError> {
        if self.done {
            return Err(GameError::EpisodeOver);
        }
        if self.actor.is_some() {
            return Err(GameError::HandInProgress);
        }
        self.begin_hand()?;
        self.advance()
    }

    /// Shuffle, deal hole cards, move the button and post the blinds
    fn begin_hand(&mut self) -> Result<(), GameError> {
        if self.funded_seats() < 2 {
            return Err(GameError::NotEnoughPlayers);
        }
        self.hand_no += 1;
        self.logs.rotate();
        let seed = DeckSeed::new(self.rng.gen());
        self.deck = Deck::new(&seed);
        self.board.clear();
        self.ledger = PotLedger::default();
        self.actor = None;
        for seat in self.seats.iter_mut() {
            seat.clean_state();
        }
        let dealer = self
            .cycle
            .start_hand(&self.seats)
            .ok_or(GameError::NotEnoughPlayers)?;
        self.change_stage(Stage::Preflop);
        info!("Hand #{} starts, dealer is seat {}", self.hand_no, dealer);
        self.logs.push(LogItem::HandStarted(self.hand_no, dealer));

        for idx in 0..self.seats.len() {
            if !self.cycle.status(idx).contains(SeatStatus::IN_HAND) {
                continue;
            }
            let cards = self.deck.deal_hole(2)?;
            let hole = [cards[0], cards[1]];
            self.seats[idx].hole = Some(hole);
            debug!("Seat {} got {}{} and {}", idx, hole[0], hole[1], self.seats[idx].stack);
            self.logs.push(LogItem::HoleDealt(idx, Some(hole)));
        }

        self.cycle.start_round(Stage::Preflop);
        let sb = self
            .cycle
            .contender_after(dealer)
            .ok_or(GameError::NotEnoughPlayers)?;
        let bb = self
            .cycle
            .contender_after(sb)
            .ok_or(GameError::NotEnoughPlayers)?;
        self.post_blind(sb, Action::SmallBlind)?;
        self.post_blind(bb, Action::BigBlind)?;
        Ok(())
    }

    /// Forced bets skip the legality check
    fn post_blind(&mut self, idx: SeatIdx, blind: Action) -> Result<(), GameError> {
        let amount = self.ledger.contribution(
            blind,
            &self.seats[idx],
            self.config.small_blind,
            self.config.big_blind,
        );
        self.ledger.apply_contribution(&mut self.seats[idx], amount)?;
        self.seats[idx].record(self.stage, blind, amount);
        self.cycle.mark_blind(idx, blind == Action::BigBlind);
        if !self.seats[idx].has_chips() {
            self.cycle.mark_all_in(idx);
        }
        debug!("Seat {} posts {} ({})", idx, blind, amount);
        self.logs.push(LogItem::Acted(idx, blind, amount));
        Ok(())
    }

    /// What the current actor may do. Empty when nobody is to act.
    pub fn legal_actions(&self) -> LegalMoves {
        match self.actor {
            Some(idx) => legal_actions(
                &self.seats,
                idx,
                &self.ledger,
                self.config.small_blind,
                self.config.big_blind,
            ),
            None => LegalMoves::new(),
        }
    }

    /// Apply an action for the seat whose turn it is, then run the table forward until another
    /// decision is needed. Illegal actions change nothing.
    pub fn act(&mut self, action: Action) -> Result<ActOutcome, GameError> {
        if self.done {
            return Err(GameError::EpisodeOver);
        }
        let idx = self.actor.ok_or(GameError::NoActorPending)?;
        let legal = self.legal_actions();
        if !legal.contains(&action) {
            warn!(
                "Seat {}: {} is an illegal move. Currently allowed: {:?}",
                idx, action, legal
            );
            return Ok(ActOutcome::Illegal { legal });
        }

        let amount = self.ledger.contribution(
            action,
            &self.seats[idx],
            self.config.small_blind,
            self.config.big_blind,
        );
        let raised = self
            .ledger
            .apply_contribution(&mut self.seats[idx], amount)?;
        match action {
            Action::Fold => self.cycle.deactivate(idx),
            Action::Check => self.cycle.mark_check(idx),
            _ if raised => self.cycle.mark_raise(idx),
            _ => self.cycle.mark_call(idx),
        }
        if action != Action::Fold && !self.seats[idx].has_chips() {
            self.cycle.mark_all_in(idx);
        }
        self.seats[idx].record(self.stage, action, amount);
        debug!("Seat {}: {} ({})", idx, action, amount);
        self.logs.push(LogItem::Acted(idx, action, amount));
        self.actor = None;

        let awards = self.advance()?;
        self.check_conservation()?;
        Ok(ActOutcome::Applied {
            seat: idx,
            action,
            amount,
            awards,
        })
    }

    /// Close rounds, deal streets and finish hands until a seat has to act or the episode is
    /// over
    fn advance(&mut self) -> Result<Vec<Award>, GameError> {
        let mut awards = vec![];
        while !self.done {
            match self.cycle.next_actor(&self.seats) {
                Turn::Act(idx) => {
                    self.actor = Some(idx);
                    self.logs.push(LogItem::NextToAct(idx));
                    break;
                }
                Turn::Over(end) => {
                    if let Some(award) = self.end_round(end)? {
                        awards.push(award);
                        let out_of_hands = self
                            .config
                            .max_hands
                            .map_or(false, |max| self.hand_no >= max);
                        if self.funded_seats() < 2 || out_of_hands {
                            self.done = true;
                            info!("Episode over after {} hands", self.hand_no);
                            self.logs.push(LogItem::EpisodeOver);
                        } else {
                            self.begin_hand()?;
                        }
                    }
                }
            }
        }
        Ok(awards)
    }

    /// Returns the award if this ended the hand
    fn end_round(&mut self, end: RoundEnd) -> Result<Option<Award>, GameError> {
        debug!("{} betting over: {}", self.stage, end);
        self.logs.push(LogItem::RoundEnded(self.stage, end));
        self.ledger.settle_round(&mut self.seats);
        if end == RoundEnd::OneContender {
            self.change_stage(Stage::EndHidden);
            return self.finish_hand().map(Some);
        }
        let (next, n_cards) = self.stage.next()?;
        if n_cards > 0 {
            let cards = self.deck.deal_board(n_cards)?;
            self.board.extend(cards.iter().copied());
            info!("{}: {}", next, self.board.iter().join(" "));
            self.logs.push(LogItem::Board(next, cards));
        }
        self.change_stage(next);
        if next == Stage::Showdown {
            return self.finish_hand().map(Some);
        }
        self.cycle.start_round(next);
        Ok(None)
    }

    fn finish_hand(&mut self) -> Result<Award, GameError> {
        let contenders = self.contenders();
        let (winner, hand) = showdown::find_winner(
            &self.seats,
            &contenders,
            &self.board,
            self.evaluator.as_ref(),
        )?;
        let award = showdown::award(&mut self.seats, winner, hand);
        let pot = self.ledger.clear();
        if pot != award.total() {
            return Err(GameError::ChipsNotConserved {
                found: award.total(),
                expected: pot,
            });
        }
        info!("{}", award);
        self.logs.push(LogItem::Awarded(award.clone()));
        Ok(award)
    }

    /// Chips never enter or leave the table
    pub fn check_conservation(&self) -> Result<(), GameError> {
        let found = self.ledger.total() + self.seats.iter().map(|s| s.stack).sum::<Currency>();
        let expected = self.seats.iter().map(|s| s.buy_in).sum();
        if found != expected {
            return Err(GameError::ChipsNotConserved { found, expected });
        }
        Ok(())
    }
}
