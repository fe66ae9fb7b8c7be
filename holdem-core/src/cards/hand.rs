use super::card::{Card, Rank, ALL_RANKS};
use enum_map::EnumMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    derive_more::Display,
    Serialize,
    Deserialize,
)]
pub enum HandClass {
    HighCard,
    Pair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, derive_more::Display, derive_more::Error)]
pub enum HandError {
    #[display(fmt = "fewer than five cards to make a hand from")]
    NotEnoughCards,
    #[display(fmt = "the same card appears twice")]
    DuplicateCard,
    #[display(fmt = "no hands to compare")]
    NoHands,
}

/// A made five card hand. Ordering is hand strength: class first, then the tiebreak ranks
/// left to right.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandRank {
    pub class: HandClass,
    /// Ranks in the order they break ties, e.g. a full house KKK44 is [K, K, K, 4, 4]. For
    /// straights every entry is the high card, with the wheel being five high.
    pub tiebreak: [Rank; 5],
}

impl std::fmt::Display for HandRank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.class, self.tiebreak.iter().join(""))
    }
}

/// The high card of a straight made by these five distinct, descending ranks, if any
fn straight_high(ranks: &[Rank]) -> Option<Rank> {
    if ranks.len() != 5 {
        return None;
    }
    if ranks[0].value() - ranks[4].value() == 4 {
        return Some(ranks[0]);
    }
    // wheel, A5432
    if ranks == [Rank::Ace, Rank::Five, Rank::Four, Rank::Three, Rank::Two] {
        return Some(Rank::Five);
    }
    None
}

/// Classify exactly five cards
pub fn rank_five(cards: &[Card; 5]) -> HandRank {
    let mut counts: EnumMap<Rank, usize> = EnumMap::default();
    for c in cards {
        counts[c.rank] += 1;
    }
    // (count, rank), largest groups first, then higher ranks
    let groups: Vec<(usize, Rank)> = ALL_RANKS
        .iter()
        .filter(|r| counts[**r] > 0)
        .map(|r| (counts[*r], *r))
        .sorted_unstable()
        .rev()
        .collect();
    let distinct: Vec<Rank> = groups.iter().map(|(_, r)| *r).collect();
    let is_flush = cards.iter().map(|c| c.suit).all_equal();
    let straight = straight_high(&distinct);

    if let Some(high) = straight {
        let class = match (is_flush, high) {
            (true, Rank::Ace) => HandClass::RoyalFlush,
            (true, _) => HandClass::StraightFlush,
            (false, _) => HandClass::Straight,
        };
        return HandRank {
            class,
            tiebreak: [high; 5],
        };
    }

    let mut tiebreak = [Rank::Two; 5];
    for (slot, r) in tiebreak
        .iter_mut()
        .zip(groups.iter().flat_map(|(n, r)| std::iter::repeat(*r).take(*n)))
    {
        *slot = r;
    }
    let shape: Vec<usize> = groups.iter().map(|(n, _)| *n).collect();
    let class = match shape.as_slice() {
        [4, ..] => HandClass::FourOfAKind,
        [3, 2] => HandClass::FullHouse,
        _ if is_flush => HandClass::Flush,
        [3, ..] => HandClass::ThreeOfAKind,
        [2, 2, ..] => HandClass::TwoPair,
        [2, ..] => HandClass::Pair,
        _ => HandClass::HighCard,
    };
    HandRank { class, tiebreak }
}

/// The best five card hand that can be made from the given cards (usually two hole cards plus
/// the board).
pub fn best_hand(cards: &[Card]) -> Result<HandRank, HandError> {
    if cards.len() < 5 {
        return Err(HandError::NotEnoughCards);
    }
    if !cards.iter().all_unique() {
        return Err(HandError::DuplicateCard);
    }
    cards
        .iter()
        .copied()
        .combinations(5)
        .map(|five| rank_five(&[five[0], five[1], five[2], five[3], five[4]]))
        .max()
        .ok_or(HandError::NotEnoughCards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::card::cards_from_str;

    fn best(s: &'static str) -> HandRank {
        best_hand(&cards_from_str(s).unwrap()).unwrap()
    }

    fn class(s: &'static str) -> HandClass {
        best(s).class
    }

    #[test]
    fn classes() {
        assert_eq!(class("2c4d6h8sTc Qd Kh"), HandClass::HighCard);
        assert_eq!(class("2c2d6h8sTc"), HandClass::Pair);
        assert_eq!(class("2c2d6h6sTc"), HandClass::TwoPair);
        assert_eq!(class("2c2d2h6sTc"), HandClass::ThreeOfAKind);
        assert_eq!(class("2c3d4h5s6c"), HandClass::Straight);
        assert_eq!(class("Ac2d3h4s5c"), HandClass::Straight);
        assert_eq!(class("2c4c6c8cTc"), HandClass::Flush);
        assert_eq!(class("2c2d2h6s6c"), HandClass::FullHouse);
        assert_eq!(class("2c2d2h2s6c"), HandClass::FourOfAKind);
        assert_eq!(class("2c3c4c5c6c"), HandClass::StraightFlush);
        assert_eq!(class("TcJcQcKcAc"), HandClass::RoyalFlush);
    }

    #[test]
    fn best_of_seven() {
        // trips on board plus a pocket pair
        assert_eq!(class("AhAd 2h5h Kh Kd Ks"), HandClass::FullHouse);
        assert_eq!(class("Ah9h 2h5h Kh Qd 3s"), HandClass::Flush);
        assert_eq!(class("7c8d 9h Ts Jc 2d 2h"), HandClass::Straight);
    }

    #[test]
    fn wheel_loses_to_six_high() {
        assert!(best("Ac2d3h4s5c") < best("2c3d4h5s6c"));
        assert_eq!(best("Ac2d3h4s5c").tiebreak[0], Rank::Five);
    }

    #[test]
    fn kickers_matter() {
        assert!(best("AcAd9h4s2c") > best("AhAs8h4c3c"));
        assert!(best("KcKd4h4s2c") < best("KhKs4c4dAc"));
        assert_eq!(best("KcKd4h4s2c"), best("KhKs4c4d2d"));
        assert!(best("3c3d3hKsKc") > best("2c2d2hAsAc"));
    }

    #[test]
    fn bad_input() {
        assert_eq!(
            best_hand(&cards_from_str("AcKd").unwrap()),
            Err(HandError::NotEnoughCards)
        );
        assert_eq!(
            best_hand(&cards_from_str("AcAcKd2h3h").unwrap()),
            Err(HandError::DuplicateCard)
        );
    }
}
