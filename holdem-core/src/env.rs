//! Episode boundary for agents: `reset` and `step`, plus a runner that keeps score across
//! episodes.
use crate::action::{Action, LegalMoves};
use crate::agent::{passive, Agent, AgentKind};
use crate::cards::{Card, DeckSeed};
use crate::config::TableConfig;
use crate::seat::SeatStatus;
use crate::showdown::Award;
use crate::state::{ActOutcome, Stage, Table};
use crate::stats::{stage_stats, StageStats};
use crate::turn::RoundCounters;
use crate::{Currency, GameError, SeatIdx};
use log::{info, warn};
use rand::prelude::*;
use rand_chacha::ChaChaRng;
use serde::Serialize;

/// Reward for offering an action that is not currently legal
pub const ILLEGAL_MOVE_REWARD: f64 = -1.0;

/// What the acting seat knows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub hand_no: usize,
    pub stage: Stage,
    pub board: Vec<Card>,
    pub acting_seat: Option<SeatIdx>,
    /// The acting seat's own cards
    pub hole: Option<[Card; 2]>,
    pub community_pot: Currency,
    pub current_round_pot: Currency,
    pub min_call: Currency,
    pub stacks: Vec<Currency>,
    /// Chance the acting seat's hand wins against the other contenders
    pub equity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatSnapshot {
    pub name: String,
    pub stack: Currency,
    pub pot: Currency,
    pub max_win: Currency,
    pub status: SeatStatus,
    pub last_action: Option<Action>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Info {
    pub legal_moves: LegalMoves,
    pub dealer: Option<SeatIdx>,
    pub seats: Vec<SeatSnapshot>,
    pub counters: RoundCounters,
    pub stage_stats: Vec<StageStats>,
    pub last_award: Option<Award>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f64,
    pub done: bool,
    pub info: Info,
}

/// The acting seat's view. Equity sampling is skipped unless `with_equity` is set.
fn observe(table: &Table, with_equity: bool) -> Observation {
    let actor = table.current_actor();
    let hole = actor.and_then(|i| table.seats()[i].hole);
    let samples = table.config().equity_samples;
    let equity = match hole {
        Some(h) if with_equity && samples > 0 => {
            let opponents = table.contenders().len().saturating_sub(1);
            Some(table.evaluator().equity(h, table.board(), opponents, samples))
        }
        _ => None,
    };
    let ledger = table.ledger();
    Observation {
        hand_no: table.hand_no(),
        stage: table.stage(),
        board: table.board().to_vec(),
        acting_seat: actor,
        hole,
        community_pot: ledger.community_pot,
        current_round_pot: ledger.current_round_pot,
        min_call: ledger.min_call,
        stacks: table.seats().iter().map(|s| s.stack).collect(),
        equity,
    }
}

fn describe(table: &Table, last_award: Option<&Award>) -> Info {
    let seats = table
        .seats()
        .iter()
        .enumerate()
        .map(|(i, s)| SeatSnapshot {
            name: s.name.clone(),
            stack: s.stack,
            pot: s.pot,
            max_win: s.max_win,
            status: table.status(i),
            last_action: s.last_action,
        })
        .collect();
    Info {
        legal_moves: table.legal_actions(),
        dealer: table.dealer(),
        seats,
        counters: table.round_counters(),
        stage_stats: stage_stats(table.seats()),
        last_award: last_award.cloned(),
    }
}

#[derive(Debug)]
pub struct Env {
    config: TableConfig,
    agents: Vec<Box<dyn Agent>>,
    /// Seeds each episode's table
    rng: ChaChaRng,
    table: Option<Table>,
    /// Finished hands not yet collected with `take_awards`
    awards: Vec<Award>,
    last_award: Option<Award>,
}

impl Env {
    /// One agent per seat. With a seed, the sequence of episodes is reproducible.
    pub fn new(
        config: TableConfig,
        agents: Vec<Box<dyn Agent>>,
        seed: Option<DeckSeed>,
    ) -> Result<Self, GameError> {
        config.validate()?;
        if agents.len() != config.num_seats {
            return Err(GameError::AgentCountMismatch {
                agents: agents.len(),
                seats: config.num_seats,
            });
        }
        let rng = match seed {
            Some(s) => ChaChaRng::from_seed(s.bytes()),
            None => ChaChaRng::from_entropy(),
        };
        Ok(Self {
            config,
            agents,
            rng,
            table: None,
            awards: vec![],
            last_award: None,
        })
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn agents(&self) -> &[Box<dyn Agent>] {
        &self.agents
    }

    pub fn is_done(&self) -> bool {
        self.table.as_ref().map_or(true, Table::is_done)
    }

    fn table_ref(&self) -> Result<&Table, GameError> {
        self.table.as_ref().ok_or(GameError::NoActorPending)
    }

    /// Hands finished since the last call, oldest first
    pub fn take_awards(&mut self) -> Vec<Award> {
        std::mem::take(&mut self.awards)
    }

    pub fn observation(&self) -> Result<Observation, GameError> {
        Ok(observe(self.table_ref()?, true))
    }

    pub fn info(&self) -> Result<Info, GameError> {
        Ok(describe(self.table_ref()?, self.last_award.as_ref()))
    }

    /// Sit everyone down with fresh stacks and play until an externally driven seat has to
    /// act, or the episode is already over
    pub fn reset(&mut self) -> Result<Observation, GameError> {
        let seed = DeckSeed::new(self.rng.gen());
        let names: Vec<String> = self.agents.iter().map(|a| a.name().to_string()).collect();
        let mut table = Table::new(self.config.clone(), Some(seed))?.with_names(names);
        self.awards.clear();
        self.last_award = None;
        let awards = table.start_hand()?;
        self.table = Some(table);
        self.collect(awards);
        self.autoplay()?;
        self.observation()
    }

    /// Apply the acting seat's action. The reward is that seat's stack change until control
    /// comes back to the caller, or `ILLEGAL_MOVE_REWARD` if the action was refused.
    ///
    /// The reward is not shaped per hand. If autoplay seats finish the hand and start the
    /// next one before control returns, it includes the award and any blind this seat posts
    /// in the new hand. A pot won on a later step is credited to that step instead.
    pub fn step(&mut self, action: Action) -> Result<StepResult, GameError> {
        let table = self.table.as_mut().ok_or(GameError::NoActorPending)?;
        if table.is_done() {
            return Err(GameError::EpisodeOver);
        }
        let actor = table.current_actor().ok_or(GameError::NoActorPending)?;
        let before = table.seats()[actor].stack;
        let reward = match table.act(action)? {
            ActOutcome::Illegal { .. } => ILLEGAL_MOVE_REWARD,
            ActOutcome::Applied { awards, .. } => {
                self.collect(awards);
                self.autoplay()?;
                let after = self.table_ref()?.seats()[actor].stack;
                f64::from(after - before)
            }
        };
        Ok(StepResult {
            observation: self.observation()?,
            reward,
            done: self.is_done(),
            info: self.info()?,
        })
    }

    fn collect(&mut self, awards: Vec<Award>) {
        if let Some(last) = awards.last() {
            self.last_award = Some(last.clone());
        }
        self.awards.extend(awards);
    }

    /// Let autoplay seats act until an externally driven seat is up or the episode ends
    fn autoplay(&mut self) -> Result<(), GameError> {
        loop {
            let table = match self.table.as_ref() {
                Some(t) if !t.is_done() => t,
                _ => return Ok(()),
            };
            let actor = match table.current_actor() {
                Some(a) => a,
                None => return Ok(()),
            };
            if self.agents[actor].kind() == AgentKind::ExternallyDriven {
                return Ok(());
            }
            let legal = table.legal_actions();
            let observation = observe(table, self.agents[actor].wants_equity());
            let info = describe(table, self.last_award.as_ref());
            let choice = self.agents[actor].choose_action(&legal, &observation, &info);

            let table = self.table.as_mut().ok_or(GameError::NoActorPending)?;
            let outcome = match table.act(choice)? {
                ActOutcome::Illegal { legal } => {
                    let fallback = passive(&legal);
                    warn!(
                        "{} chose illegal {}, playing {} instead",
                        self.agents[actor].name(),
                        choice,
                        fallback
                    );
                    table.act(fallback)?
                }
                applied => applied,
            };
            if let ActOutcome::Applied { awards, .. } = outcome {
                self.collect(awards);
            }
        }
    }

    /// Stacks right now, one per seat
    pub fn stacks(&self) -> Vec<Currency> {
        self.table
            .as_ref()
            .map(|t| t.seats().iter().map(|s| s.stack).collect())
            .unwrap_or_default()
    }
}

/// Results across episodes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct League {
    pub episodes: usize,
    /// Episodes won, per seat
    pub episode_wins: Vec<usize>,
    /// Hands won, per seat
    pub hand_wins: Vec<usize>,
    /// Stacks after every finished hand, over all episodes
    pub funds_history: Vec<Vec<Currency>>,
}

fn bump(counts: &mut Vec<usize>, idx: SeatIdx) {
    if counts.len() <= idx {
        counts.resize(idx + 1, 0);
    }
    counts[idx] += 1;
}

impl League {
    pub fn record_hand(&mut self, award: &Award) {
        bump(&mut self.hand_wins, award.winner);
        self.funds_history.push(award.stacks.clone());
    }

    /// The seat with the biggest final stack wins the episode; ties go to the lower seat
    pub fn record_episode(&mut self, final_stacks: &[Currency]) -> Option<SeatIdx> {
        let winner = final_stacks
            .iter()
            .enumerate()
            .rev()
            .max_by_key(|(_, stack)| **stack)
            .map(|(i, _)| i)?;
        self.episodes += 1;
        bump(&mut self.episode_wins, winner);
        Some(winner)
    }
}

/// Plays episodes and keeps the league table
#[derive(Debug, Default)]
pub struct EpisodeRunner {
    pub league: League,
}

impl EpisodeRunner {
    /// Play one full episode. `decide` is asked for every externally driven seat's action and
    /// sees each step's result, the first one with a zero reward.
    pub fn run_episode<F>(&mut self, env: &mut Env, mut decide: F) -> Result<Option<SeatIdx>, GameError>
    where
        F: FnMut(&StepResult) -> Action,
    {
        let observation = env.reset()?;
        let mut last = StepResult {
            observation,
            reward: 0.0,
            done: env.is_done(),
            info: env.info()?,
        };
        self.absorb(env);
        while !last.done {
            let action = decide(&last);
            last = env.step(action)?;
            self.absorb(env);
        }
        let winner = self.league.record_episode(&env.stacks());
        if let Some(w) = winner {
            info!("Episode {} won by seat {}", self.league.episodes, w);
        }
        Ok(winner)
    }

    fn absorb(&mut self, env: &mut Env) {
        for award in env.take_awards() {
            self.league.record_hand(&award);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::agent::{ExternalSeat, RandomAgent};

    const SEED: DeckSeed = DeckSeed::new([3; 32]);

    pub(crate) fn blank_view() -> (Observation, Info) {
        let obs = Observation {
            hand_no: 1,
            stage: Stage::Preflop,
            board: vec![],
            acting_seat: Some(0),
            hole: None,
            community_pot: 0,
            current_round_pot: 30,
            min_call: 20,
            stacks: vec![1000, 990, 980],
            equity: None,
        };
        let info = Info {
            legal_moves: LegalMoves::new(),
            dealer: Some(0),
            seats: vec![],
            counters: RoundCounters::default(),
            stage_stats: vec![],
            last_award: None,
        };
        (obs, info)
    }

    fn config() -> TableConfig {
        TableConfig {
            num_seats: 3,
            initial_stack: 1000,
            equity_samples: 0,
            ..Default::default()
        }
    }

    fn externals(n: usize) -> Vec<Box<dyn Agent>> {
        (0..n)
            .map(|i| Box::new(ExternalSeat::new(format!("ext{}", i))) as Box<dyn Agent>)
            .collect()
    }

    #[test]
    fn reset_waits_for_external_seat() {
        let mut env = Env::new(config(), externals(3), Some(SEED)).unwrap();
        let obs = env.reset().unwrap();
        assert_eq!(obs.acting_seat, Some(0));
        assert_eq!(obs.stage, Stage::Preflop);
        assert_eq!(obs.current_round_pot, 30);
        assert!(obs.hole.is_some());
        assert_eq!(obs.equity, None);
        let info = env.info().unwrap();
        assert!(info.legal_moves.contains(&Action::Call));
        assert_eq!(info.seats[2].pot, 20);
        assert_eq!(info.seats[1].stack, 990);
        assert!(info.seats[0].status.contains(SeatStatus::IN_HAND));
    }

    #[test]
    fn step_rewards() {
        let mut env = Env::new(config(), externals(3), Some(SEED)).unwrap();
        env.reset().unwrap();
        let res = env.step(Action::Check).unwrap();
        assert_eq!(res.reward, ILLEGAL_MOVE_REWARD);
        assert!(!res.done);
        assert_eq!(res.observation.acting_seat, Some(0));
        let res = env.step(Action::Call).unwrap();
        assert_eq!(res.reward, -20.0);
        assert_eq!(res.observation.acting_seat, Some(1));
        assert_eq!(res.info.seats[0].last_action, Some(Action::Call));
        assert_eq!(res.info.stage_stats[0].seats[0].calls, 1);
    }

    #[test]
    fn fold_out_rewards_winner() {
        let mut env = Env::new(config(), externals(3), Some(SEED)).unwrap();
        env.reset().unwrap();
        env.step(Action::Fold).unwrap();
        let res = env.step(Action::Fold).unwrap();
        // seat 1 gave up its small blind
        assert_eq!(res.reward, 0.0);
        let award = res.info.last_award.clone().unwrap();
        assert_eq!(award.winner, 2);
        assert_eq!(award.winnings, 30);
        assert_eq!(env.take_awards().len(), 1);
        assert!(env.take_awards().is_empty());
    }

    #[test]
    fn autoplay_episode_runs_to_the_end() {
        let agents: Vec<Box<dyn Agent>> = (0..3)
            .map(|i| Box::new(RandomAgent::new(format!("r{}", i), Some(i))) as Box<dyn Agent>)
            .collect();
        let cfg = TableConfig {
            max_hands: Some(200),
            ..config()
        };
        let mut env = Env::new(cfg, agents, Some(SEED)).unwrap();
        let mut runner = EpisodeRunner::default();
        let winner = runner
            .run_episode(&mut env, |_| panic!("no external seats"))
            .unwrap();
        assert!(env.is_done());
        assert!(winner.is_some());
        assert_eq!(runner.league.episodes, 1);
        assert!(!runner.league.funds_history.is_empty());
        let total: Currency = env.stacks().iter().sum();
        assert_eq!(total, 3000);
        for stacks in runner.league.funds_history.iter() {
            assert_eq!(stacks.iter().sum::<Currency>(), 3000);
        }
    }

    #[test]
    fn runner_drives_external_seat() {
        let mut agents: Vec<Box<dyn Agent>> = vec![Box::new(ExternalSeat::new("me"))];
        agents.push(Box::new(RandomAgent::new("r1", Some(1))));
        let cfg = TableConfig {
            num_seats: 2,
            max_hands: Some(5),
            ..config()
        };
        let mut env = Env::new(cfg, agents, Some(SEED)).unwrap();
        let mut runner = EpisodeRunner::default();
        let mut asked = 0;
        runner
            .run_episode(&mut env, |last| {
                asked += 1;
                assert_eq!(last.observation.acting_seat, Some(0));
                crate::agent::passive(&last.info.legal_moves)
            })
            .unwrap();
        assert!(asked > 0);
        assert!(runner.league.hand_wins.iter().sum::<usize>() <= 5);
    }

    /// Autoplay agent that only ever offers a move it can never make
    #[derive(Debug)]
    struct PostsBlinds;

    impl Agent for PostsBlinds {
        fn name(&self) -> &str {
            "blinds"
        }

        fn kind(&self) -> AgentKind {
            AgentKind::Autoplay
        }

        fn choose_action(&mut self, _: &LegalMoves, _: &Observation, _: &Info) -> Action {
            Action::BigBlind
        }
    }

    #[test]
    fn illegal_autoplay_choice_plays_passively() {
        let agents: Vec<Box<dyn Agent>> = vec![
            Box::new(ExternalSeat::new("me")),
            Box::new(PostsBlinds),
            Box::new(PostsBlinds),
        ];
        let mut env = Env::new(config(), agents, Some(SEED)).unwrap();
        env.reset().unwrap();
        // seat 1 owes part of the big blind, so it folds instead
        let res = env.step(Action::Call).unwrap();
        assert!(!res.done);
        assert_eq!(res.reward, -20.0);
        assert_eq!(res.info.seats[1].last_action, Some(Action::Fold));
        // the big blind checks its option and then checks the flop
        assert_eq!(res.info.seats[2].last_action, Some(Action::Check));
        assert_eq!(res.observation.stage, Stage::Flop);
        assert_eq!(res.observation.acting_seat, Some(0));
        assert_eq!(res.observation.community_pot, 50);
        assert!(env.take_awards().is_empty());
        env.table().unwrap().check_conservation().unwrap();
    }

    #[test]
    fn equity_only_when_asked() {
        let cfg = TableConfig {
            equity_samples: 50,
            ..config()
        };
        let mut env = Env::new(cfg, externals(3), Some(SEED)).unwrap();
        env.reset().unwrap();
        let table = env.table().unwrap();
        assert_eq!(observe(table, false).equity, None);
        let equity = env.observation().unwrap().equity.unwrap();
        assert!((0.0..=1.0).contains(&equity));
    }

    #[test]
    fn league_table() {
        let mut league = League::default();
        assert_eq!(league.record_episode(&[10, 50, 50]), Some(1));
        assert_eq!(league.record_episode(&[90, 0, 10]), Some(0));
        assert_eq!(league.record_episode(&[]), None);
        assert_eq!(league.episodes, 2);
        assert_eq!(league.episode_wins, vec![1, 1]);
    }

    #[test]
    fn wrong_agent_count() {
        assert!(matches!(
            Env::new(config(), externals(2), None),
            Err(GameError::AgentCountMismatch { agents: 2, seats: 3 })
        ));
    }

    #[test]
    fn observation_serializes() {
        let mut env = Env::new(config(), externals(3), Some(SEED)).unwrap();
        env.reset().unwrap();
        let json = serde_json::to_value(env.info().unwrap()).unwrap();
        assert!(json["legal_moves"].as_array().unwrap().len() >= 2);
        assert_eq!(json["seats"].as_array().unwrap().len(), 3);
        let json = serde_json::to_value(env.observation().unwrap()).unwrap();
        assert_eq!(json["stage"], "Preflop");
    }
}
