pub mod action;
pub mod agent;
pub mod cards;
pub mod config;
pub mod env;
pub mod evaluator;
pub mod history;
pub mod legal;
pub mod pot;
pub mod seat;
pub mod showdown;
pub mod state;
pub mod stats;
pub mod turn;

pub use cards::{deck, hand};

use cards::{DeckError, HandError};
use config::ConfigError;

/// Most seats a table can have
pub const MAX_SEATS: usize = 12;
pub type Currency = i32;
pub type SeqNum = usize;
pub type SeatIdx = usize;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum GameError {
    NotEnoughPlayers,
    NoActorPending,
    HandInProgress,
    NoContenders,
    MissingHoleCards,
    EpisodeOver,
    #[display(fmt = "stage {} has no betting round", _0)]
    NoBettingRound(#[error(not(source))] state::Stage),
    NegativeContribution,
    ContributionExceedsStack,
    #[display(fmt = "chips not conserved: {} on the table, expected {}", found, expected)]
    ChipsNotConserved { found: Currency, expected: Currency },
    #[display(fmt = "{} stacks for {} seats", stacks, seats)]
    StackCountMismatch { stacks: usize, seats: usize },
    #[display(fmt = "{} agents for {} seats", agents, seats)]
    AgentCountMismatch { agents: usize, seats: usize },
    Deck(#[error(source)] DeckError),
    Hand(#[error(source)] HandError),
    Config(#[error(source)] ConfigError),
}

impl From<DeckError> for GameError {
    fn from(e: DeckError) -> Self {
        Self::Deck(e)
    }
}

impl From<HandError> for GameError {
    fn from(e: HandError) -> Self {
        Self::Hand(e)
    }
}

impl From<ConfigError> for GameError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
