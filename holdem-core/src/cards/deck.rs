use super::card::{all_cards, Card};
use base64ct::{self, Base64, Encoding};
use rand::prelude::*;
use rand_chacha::ChaChaRng;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

const DECK_LEN: usize = 52;
const SEED_LEN: usize = 32;
const ENCODED_SEED_LEN: usize = 4 * ((SEED_LEN + 3 - 1) / 3); // 4 * ceil(SEED_LEN / 3)

#[derive(PartialEq, Eq, Debug)]
pub enum DeckError {
    OutOfCards,
    DeckSeedDecodeError(base64ct::Error),
}

impl Error for DeckError {}

impl fmt::Display for DeckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckError::OutOfCards => write!(f, "No more cards in deck"),
            DeckError::DeckSeedDecodeError(e) => write!(f, "Bad deck seed: {}", e),
        }
    }
}

impl From<base64ct::Error> for DeckError {
    fn from(e: base64ct::Error) -> Self {
        Self::DeckSeedDecodeError(e)
    }
}

/// The cards not yet dealt this hand. A card leaves the deck when it is drawn, so nothing is
/// dealt twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Default for Deck {
    fn default() -> Self {
        Self::new(&DeckSeed::default())
    }
}

impl Deck {
    /// A full deck, shuffled by the given seed
    pub fn new(seed: &DeckSeed) -> Self {
        let mut d = Self {
            cards: all_cards().to_vec(),
        };
        d.seeded_shuffle(seed);
        d
    }

    /// A shuffled deck missing the given cards. Used to sample unseen cards around a set of
    /// known ones.
    pub fn without<R: Rng + ?Sized>(known: &[Card], rng: &mut R) -> Self {
        let mut cards: Vec<Card> = all_cards()
            .into_iter()
            .filter(|c| !known.contains(c))
            .collect();
        cards.shuffle(rng);
        Self { cards }
    }

    pub fn seeded_shuffle(&mut self, seed: &DeckSeed) {
        let mut rng = ChaChaRng::from_seed(seed.0);
        // For determinism given the same seed, the cards need to be in a known order before shuffling.
        self.cards.sort_unstable();
        self.cards.shuffle(&mut rng)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Draw the topmost card and return it, or return an error if there are no more cards.
    pub fn draw(&mut self) -> Result<Card, DeckError> {
        self.cards.pop().ok_or(DeckError::OutOfCards)
    }

    fn draw_n(&mut self, n: usize) -> Result<Vec<Card>, DeckError> {
        if n > self.cards.len() {
            return Err(DeckError::OutOfCards);
        }
        (0..n).map(|_| self.draw()).collect()
    }

    pub fn deal_hole(&mut self, n: usize) -> Result<Vec<Card>, DeckError> {
        self.draw_n(n)
    }

    pub fn deal_board(&mut self, n: usize) -> Result<Vec<Card>, DeckError> {
        self.draw_n(n)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeckSeed([u8; SEED_LEN]);

impl DeckSeed {
    pub const fn new(b: [u8; SEED_LEN]) -> Self {
        Self(b)
    }

    pub fn bytes(&self) -> [u8; SEED_LEN] {
        self.0
    }
}

impl Default for DeckSeed {
    fn default() -> Self {
        let mut b = [0u8; SEED_LEN];
        thread_rng().fill_bytes(&mut b);
        Self(b)
    }
}

impl std::fmt::Display for DeckSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut b = [0u8; ENCODED_SEED_LEN];
        let encoded = Base64::encode(&self.0, &mut b).map_err(|_| fmt::Error)?;
        write!(f, "{}", encoded)
    }
}

impl FromStr for DeckSeed {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut b: [u8; SEED_LEN] = [0; SEED_LEN];
        Base64::decode(s, &mut b)?;
        Ok(DeckSeed(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const SEED1: DeckSeed = DeckSeed([1; SEED_LEN]);
    const SEED2: DeckSeed = DeckSeed([0; SEED_LEN]);

    #[test]
    fn full_and_unique() {
        let d = Deck::default();
        assert_eq!(d.len(), DECK_LEN);
        let uniq: HashSet<Card> = d.cards.iter().copied().collect();
        assert_eq!(uniq.len(), DECK_LEN);
    }

    #[test]
    fn draw_until_empty() {
        let mut d = Deck::default();
        for _ in 0..DECK_LEN {
            assert!(d.draw().is_ok());
        }
        assert_eq!(d.draw().unwrap_err(), DeckError::OutOfCards);
    }

    #[test]
    fn dealt_cards_leave_the_deck() {
        let mut d = Deck::new(&SEED1);
        let hole = d.deal_hole(2).unwrap();
        let board = d.deal_board(5).unwrap();
        assert_eq!(d.len(), DECK_LEN - 7);
        for c in hole.iter().chain(board.iter()) {
            assert!(!d.cards.contains(c));
        }
    }

    #[test]
    fn deal_too_many() {
        let mut d = Deck::default();
        d.deal_board(50).unwrap();
        assert_eq!(d.deal_board(3).unwrap_err(), DeckError::OutOfCards);
        // a failed deal takes nothing
        assert_eq!(d.len(), 2);
    }

    #[test]
    fn without_known_cards() {
        let known = [d_card("Ah"), d_card("Kd")];
        let d = Deck::without(&known, &mut thread_rng());
        assert_eq!(d.len(), DECK_LEN - 2);
        assert!(!d.cards.contains(&known[0]));
        assert!(!d.cards.contains(&known[1]));
    }

    fn d_card(s: &str) -> Card {
        s.parse().unwrap()
    }

    /// Given a specific seed, the order of the cards should always be the same.
    #[test]
    fn deck_is_seedable() {
        let d1 = Deck::new(&SEED1);
        let d2 = Deck::new(&SEED1);
        let d3 = Deck::new(&SEED2);
        assert_eq!(d1, d2);
        assert_ne!(d1, d3);
    }

    #[test]
    fn seed_to_from_string() {
        let d = DeckSeed::default();
        let s = d.to_string();
        assert_eq!(s.len(), ENCODED_SEED_LEN);
        let d2: DeckSeed = s.parse().unwrap();
        assert_eq!(d, d2);
        assert!("not a seed".parse::<DeckSeed>().is_err());
    }
}
