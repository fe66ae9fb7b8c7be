use crate::{Currency, MAX_SEATS};
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Eq, Clone, Copy, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display(fmt = "need between 2 and {} seats, got {}", MAX_SEATS, _0)]
    SeatCount(#[error(not(source))] usize),
    #[display(fmt = "big blind must be positive")]
    BigBlind,
    #[display(fmt = "small blind must be positive and no larger than the big blind")]
    SmallBlind,
    #[display(fmt = "initial stack must be positive")]
    InitialStack,
    #[display(fmt = "at least one raise per round is needed")]
    MaxRaises,
    #[display(fmt = "a hand limit must allow at least one hand")]
    MaxHands,
    #[display(fmt = "chip amounts at this table would overflow")]
    ChipOverflow,
}

/// Table stakes and limits. Every field has a default, so a config file only needs the fields
/// it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub num_seats: usize,
    pub small_blind: Currency,
    pub big_blind: Currency,
    pub initial_stack: Currency,
    /// Sizes the step budget of each betting round
    pub max_raises_per_round: usize,
    /// Monte Carlo samples for the acting seat's equity in observations. 0 turns it off.
    pub equity_samples: usize,
    /// End the episode after this many hands even if several seats still have chips
    pub max_hands: Option<usize>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            num_seats: 3,
            small_blind: 10,
            big_blind: 20,
            initial_stack: 500,
            max_raises_per_round: 2,
            equity_samples: 1000,
            max_hands: None,
        }
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=MAX_SEATS).contains(&self.num_seats) {
            return Err(ConfigError::SeatCount(self.num_seats));
        }
        if self.big_blind <= 0 {
            return Err(ConfigError::BigBlind);
        }
        if self.small_blind <= 0 || self.small_blind > self.big_blind {
            return Err(ConfigError::SmallBlind);
        }
        if self.initial_stack <= 0 {
            return Err(ConfigError::InitialStack);
        }
        if self.max_raises_per_round == 0 {
            return Err(ConfigError::MaxRaises);
        }
        if self.max_hands == Some(0) {
            return Err(ConfigError::MaxHands);
        }
        let table_chips = (self.num_seats as Currency).checked_mul(self.initial_stack);
        check_chip_total(table_chips)?;
        // a 3BB raise is sized off the big blind alone
        self.big_blind
            .checked_mul(3)
            .ok_or(ConfigError::ChipOverflow)?;
        Ok(())
    }
}

/// Every chip on the table, doubled for a 2x pot raise, has to fit in a `Currency`
pub(crate) fn check_chip_total(total: Option<Currency>) -> Result<(), ConfigError> {
    total
        .and_then(|t| t.checked_mul(2))
        .map(|_| ())
        .ok_or(ConfigError::ChipOverflow)
}
