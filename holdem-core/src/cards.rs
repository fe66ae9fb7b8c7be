pub mod card;
pub mod deck;
pub mod hand;

pub use card::{Card, CardParseError, Rank, Suit};
pub use deck::{Deck, DeckError, DeckSeed};
pub use hand::{best_hand, HandClass, HandError, HandRank};
