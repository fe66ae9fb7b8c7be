//! Decision makers that sit at the table.
use crate::action::{Action, LegalMoves};
use crate::env::{Info, Observation};
use rand::prelude::*;
use rand_chacha::ChaChaRng;
use serde::{Deserialize, Serialize};

/// Whether the environment asks the agent itself, or hands control back to the caller whenever
/// this seat has to act
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentKind {
    Autoplay,
    ExternallyDriven,
}

pub trait Agent: std::fmt::Debug {
    fn name(&self) -> &str;

    fn kind(&self) -> AgentKind;

    /// Whether `choose_action` looks at `Observation::equity`. Sampling is skipped otherwise.
    fn wants_equity(&self) -> bool {
        false
    }

    /// Pick one of `legal`. Returning something else is tolerated but the table substitutes a
    /// passive action.
    fn choose_action(&mut self, legal: &LegalMoves, observation: &Observation, info: &Info)
        -> Action;
}

/// The first of `prefs` that is legal, else check or fold
fn first_legal(legal: &LegalMoves, prefs: &[Action]) -> Action {
    prefs
        .iter()
        .copied()
        .find(|a| legal.contains(a))
        .unwrap_or_else(|| passive(legal))
}

/// Check when free, otherwise fold
pub fn passive(legal: &LegalMoves) -> Action {
    if legal.contains(&Action::Check) {
        Action::Check
    } else {
        Action::Fold
    }
}

/// Uniformly random over the legal actions
#[derive(Debug, Clone)]
pub struct RandomAgent {
    name: String,
    rng: ChaChaRng,
}

impl RandomAgent {
    pub fn new(name: impl Into<String>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaChaRng::seed_from_u64(s),
            None => ChaChaRng::from_entropy(),
        };
        Self {
            name: name.into(),
            rng,
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Autoplay
    }

    fn choose_action(&mut self, legal: &LegalMoves, _: &Observation, _: &Info) -> Action {
        legal
            .iter()
            .copied()
            .choose(&mut self.rng)
            .unwrap_or(Action::Fold)
    }
}

/// Plays by its estimated chance of winning: raises with strong hands, calls with decent ones,
/// and otherwise gives up unless it can see the next card for free.
#[derive(Debug, Clone)]
pub struct EquityAgent {
    name: String,
    pub call_threshold: f64,
    pub raise_threshold: f64,
}

impl EquityAgent {
    pub fn new(name: impl Into<String>, call_threshold: f64, raise_threshold: f64) -> Self {
        Self {
            name: name.into(),
            call_threshold,
            raise_threshold,
        }
    }
}

impl Agent for EquityAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Autoplay
    }

    fn wants_equity(&self) -> bool {
        true
    }

    fn choose_action(&mut self, legal: &LegalMoves, observation: &Observation, _: &Info) -> Action {
        // without an estimate, treat the hand as a coin flip
        let equity = observation.equity.unwrap_or(0.5);
        if equity >= self.raise_threshold {
            first_legal(
                legal,
                &[Action::RaisePot, Action::RaiseHalfPot, Action::Raise3Bb, Action::Call],
            )
        } else if equity >= self.call_threshold {
            first_legal(legal, &[Action::Call])
        } else {
            passive(legal)
        }
    }
}

/// A seat whose decisions come from outside the environment, e.g. a human at a prompt
#[derive(Debug, Clone)]
pub struct ExternalSeat {
    name: String,
}

impl ExternalSeat {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Agent for ExternalSeat {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AgentKind {
        AgentKind::ExternallyDriven
    }

    /// Never polled by the environment
    fn choose_action(&mut self, legal: &LegalMoves, _: &Observation, _: &Info) -> Action {
        passive(legal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::tests::blank_view;

    fn moves(v: &[Action]) -> LegalMoves {
        v.iter().copied().collect()
    }

    #[test]
    fn random_stays_legal() {
        let (obs, info) = blank_view();
        let legal = moves(&[Action::Fold, Action::Call, Action::AllIn]);
        let mut agent = RandomAgent::new("r", Some(1));
        for _ in 0..100 {
            assert!(legal.contains(&agent.choose_action(&legal, &obs, &info)));
        }
        assert_eq!(agent.kind(), AgentKind::Autoplay);
        assert!(!agent.wants_equity());
    }

    #[test]
    fn equity_thresholds() {
        let (mut obs, info) = blank_view();
        let legal = moves(&[Action::Fold, Action::Call, Action::RaisePot, Action::AllIn]);
        let mut agent = EquityAgent::new("e", 0.3, 0.7);
        assert!(agent.wants_equity());
        obs.equity = Some(0.9);
        assert_eq!(agent.choose_action(&legal, &obs, &info), Action::RaisePot);
        obs.equity = Some(0.5);
        assert_eq!(agent.choose_action(&legal, &obs, &info), Action::Call);
        obs.equity = Some(0.1);
        assert_eq!(agent.choose_action(&legal, &obs, &info), Action::Fold);
        let free = moves(&[Action::Check, Action::AllIn]);
        assert_eq!(agent.choose_action(&free, &obs, &info), Action::Check);
        // strong, but raising isn't possible
        obs.equity = Some(0.9);
        assert_eq!(agent.choose_action(&free, &obs, &info), Action::Check);
    }

    #[test]
    fn external_is_tagged() {
        let seat = ExternalSeat::new("human");
        assert_eq!(seat.kind(), AgentKind::ExternallyDriven);
        assert_eq!(seat.name(), "human");
    }
}
