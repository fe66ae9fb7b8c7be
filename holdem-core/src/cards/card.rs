use enum_map::Enum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const SPADE: char = 's';
pub const HEART: char = 'h';
pub const DIAMOND: char = 'd';
pub const CLUB: char = 'c';
pub const ALL_SUITS: [Suit; 4] = [Suit::Club, Suit::Diamond, Suit::Heart, Suit::Spade];
pub const ALL_RANKS: [Rank; 13] = [
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
    Rank::King,
    Rank::Ace,
];

#[derive(Debug, PartialEq, Eq, Clone, derive_more::Display, derive_more::Error)]
pub enum CardParseError {
    #[display(fmt = "expected two characters, got {:?}", _0)]
    BadLength(#[error(not(source))] String),
    #[display(fmt = "unknown rank {:?}", _0)]
    BadRank(#[error(not(source))] char),
    #[display(fmt = "unknown suit {:?}", _0)]
    BadSuit(#[error(not(source))] char),
}

#[derive(
    Hash, Enum, Clone, Copy, Debug, PartialEq, PartialOrd, Eq, Ord, Serialize, Deserialize,
)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub fn value(&self) -> u8 {
        *self as u8 + 2
    }

    fn symbol(&self) -> char {
        b"23456789TJQKA"[*self as usize] as char
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl TryFrom<char> for Rank {
    type Error = CardParseError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        ALL_RANKS
            .iter()
            .copied()
            .find(|r| r.symbol() == c.to_ascii_uppercase())
            .ok_or(CardParseError::BadRank(c))
    }
}

#[derive(Hash, Enum, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    Club,
    Diamond,
    Heart,
    Spade,
}

impl std::fmt::Display for Suit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Club => write!(f, "{}", CLUB),
            Self::Diamond => write!(f, "{}", DIAMOND),
            Self::Heart => write!(f, "{}", HEART),
            Self::Spade => write!(f, "{}", SPADE),
        }
    }
}

impl TryFrom<char> for Suit {
    type Error = CardParseError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_lowercase() {
            CLUB => Ok(Self::Club),
            DIAMOND => Ok(Self::Diamond),
            HEART => Ok(Self::Heart),
            SPADE => Ok(Self::Spade),
            _ => Err(CardParseError::BadSuit(c)),
        }
    }
}

/// Cards order by rank first, so sorting a hand puts it in rank order
#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

impl FromStr for Card {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(r), Some(s), None) => Ok(Card::new(r.try_into()?, s.try_into()?)),
            _ => Err(CardParseError::BadLength(s.to_string())),
        }
    }
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Card { rank, suit }
    }
}

/// Parse a run of two-character cards, with or without whitespace between them, e.g.
/// "AhKd 2c".
pub fn cards_from_str(s: &str) -> Result<Vec<Card>, CardParseError> {
    let compact: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() % 2 != 0 {
        return Err(CardParseError::BadLength(s.to_string()));
    }
    compact
        .chunks(2)
        .map(|pair| Ok(Card::new(pair[0].try_into()?, pair[1].try_into()?)))
        .collect()
}

/// Returns an UNSHUFFLED array of cards
pub fn all_cards() -> [Card; 52] {
    use itertools::Itertools;
    let mut cards: [Card; 52] = [Card::new(Rank::Two, Suit::Club); 52];
    let c_iter = ALL_RANKS
        .iter()
        .cartesian_product(ALL_SUITS.iter())
        .map(|(r, s)| Card::new(*r, *s));
    for (i, c) in c_iter.enumerate() {
        cards[i] = c;
    }
    cards
}
