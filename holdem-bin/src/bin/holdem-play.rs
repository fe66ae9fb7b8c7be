use std::error::Error;
use std::fs::File;
use std::io::{stdin, stdout, BufRead, BufReader, Write};
use std::path::PathBuf;

use holdem_core::{
    action::Action,
    agent::{Agent, EquityAgent, ExternalSeat, RandomAgent},
    config::TableConfig,
    deck::DeckSeed,
    env::{Env, EpisodeRunner, League, StepResult},
    Currency, SeqNum,
};
use itertools::Itertools;
use log::info;
use structopt::StructOpt;

#[derive(StructOpt)]
struct Opt {
    #[structopt(long, help = "JSON table config. Flags below override its fields.")]
    config: Option<PathBuf>,
    #[structopt(short)]
    n_seats: Option<usize>,
    #[structopt(long)]
    start_stack: Option<Currency>,
    #[structopt(long)]
    max_hands: Option<usize>,
    #[structopt(long, help = "Makes every episode reproducible")]
    seed: Option<DeckSeed>,
    #[structopt(long, default_value = "1")]
    episodes: usize,
    #[structopt(long, help = "Seat played from this terminal")]
    human: Option<usize>,
    #[structopt(
        long,
        default_value = "random",
        possible_values = &["random", "equity"],
        help = "How the other seats play"
    )]
    agent: String,
    #[structopt(long, help = "Silence game prompts (useful for tests with set input)")]
    no_prompts: bool,
}

#[derive(Debug, Copy, Clone)]
enum Command {
    Act(Action),
    Info,
    Quit,
    Help,
}

fn print_help() {
    println!("Known commands are:");
    for (cmds, desc) in [
        ("(h)elp", "This output."),
        ("(i)nfo", "Get info on the current state of the hand."),
        ("(q)uit", "Stop playing."),
        ("(ch)eck", "Check."),
        ("(f)old", "Fold."),
        ("(c)all", "Match the biggest bet this round."),
        ("3bb", "Raise by three big blinds."),
        ("half", "Raise by half the pot."),
        ("pot", "Raise by the pot."),
        ("2pot", "Raise by twice the pot."),
        ("(a)llin", "Put in every chip."),
    ] {
        println!("  {:9}: {}", cmds, desc);
    }
}

fn try_parse_action(word: &str) -> Option<Action> {
    let a = match word {
        "fold" | "f" => Action::Fold,
        "check" | "ch" => Action::Check,
        "call" | "c" => Action::Call,
        "3bb" => Action::Raise3Bb,
        "half" => Action::RaiseHalfPot,
        "pot" => Action::RaisePot,
        "2pot" => Action::Raise2Pot,
        "allin" | "all" | "a" => Action::AllIn,
        _ => return None,
    };
    Some(a)
}

fn try_parse_command(stream: &mut dyn BufRead) -> Result<Command, Box<dyn Error>> {
    let mut s = String::new();
    let n = stream.read_line(&mut s)?;
    let words: Vec<&str> = s.split_whitespace().collect();
    if n == 0 {
        return Ok(Command::Quit);
    } else if s.starts_with('#') {
        return Err("Comment line".into());
    } else if words.len() != 1 {
        return Err("Expected one word".into());
    } else if let Some(a) = try_parse_action(words[0]) {
        return Ok(Command::Act(a));
    }
    let c = match words[0] {
        "info" | "i" => Command::Info,
        "quit" | "q" => Command::Quit,
        "help" | "h" => Command::Help,
        _ => return Err("Unable to parse as an action or command".into()),
    };
    Ok(c)
}

fn prompt(q: &str, display_prompts: bool) -> Result<Command, Box<dyn Error>> {
    if display_prompts {
        println!("{}", q);
    }
    let c = loop {
        if display_prompts {
            print!("> ");
            stdout().flush()?;
        }
        match try_parse_command(&mut stdin().lock()) {
            Ok(c) => break c,
            Err(e) => println!("{}", e),
        }
    };
    Ok(c)
}

fn load_config(opt: &Opt) -> Result<TableConfig, Box<dyn Error>> {
    let mut config = match &opt.config {
        Some(path) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
        None => TableConfig::default(),
    };
    if let Some(n) = opt.n_seats {
        config.num_seats = n;
    }
    if let Some(stack) = opt.start_stack {
        config.initial_stack = stack;
    }
    if opt.max_hands.is_some() {
        config.max_hands = opt.max_hands;
    }
    config.validate()?;
    Ok(config)
}

fn agents(opt: &Opt, config: &TableConfig) -> Vec<Box<dyn Agent>> {
    (0..config.num_seats)
        .map(|i| -> Box<dyn Agent> {
            let name = format!("seat{}", i);
            if opt.human == Some(i) {
                Box::new(ExternalSeat::new("you"))
            } else if opt.agent == "equity" {
                Box::new(EquityAgent::new(name, 0.35, 0.7))
            } else {
                Box::new(RandomAgent::new(name, None))
            }
        })
        .collect()
}

/// Print hand history the human hasn't seen yet and return the newest sequence number
fn print_changes(env: &Env, since: SeqNum, viewer: Option<usize>) -> SeqNum {
    match env.table() {
        Some(table) => {
            for (_, item) in table.changes_since(since, viewer) {
                println!("  {}", item);
            }
            table.last_seq()
        }
        None => since,
    }
}

fn print_info(last: &StepResult) {
    let obs = &last.observation;
    println!(
        "Hand #{} {} board [{}] pot {} (this round {}, to call {})",
        obs.hand_no,
        obs.stage,
        obs.board.iter().join(" "),
        obs.community_pot + obs.current_round_pot,
        obs.current_round_pot,
        obs.min_call,
    );
    for (i, seat) in last.info.seats.iter().enumerate() {
        println!(
            "  {:>2}{} {:<8} [{:>8}] in {:>6} {}",
            i,
            if last.info.dealer == Some(i) { "D" } else { " " },
            seat.name,
            seat.stack,
            seat.pot,
            seat.last_action.map(|a| a.to_string()).unwrap_or_default(),
        );
    }
}

/// Play one episode with a human seat. Returns true if the human quit.
fn human_episode(
    env: &mut Env,
    league: &mut League,
    seat: usize,
    display_prompts: bool,
) -> Result<bool, Box<dyn Error>> {
    let observation = env.reset()?;
    let mut seq = 0;
    let mut last = StepResult {
        observation,
        reward: 0.0,
        done: env.is_done(),
        info: env.info()?,
    };
    loop {
        for award in env.take_awards() {
            league.record_hand(&award);
        }
        if display_prompts {
            seq = print_changes(env, seq, Some(seat));
        }
        if last.done {
            league.record_episode(&env.stacks());
            return Ok(false);
        }
        let hole = last
            .observation
            .hole
            .map(|h| format!("{}{}", h[0], h[1]))
            .unwrap_or_default();
        let q = format!(
            "Board: {}\nYour action? {} (allowed: {})",
            last.observation.board.iter().join(" "),
            hole,
            last.info.legal_moves.iter().join(", ")
        );
        match prompt(&q, display_prompts)? {
            Command::Info => print_info(&last),
            Command::Quit => return Ok(true),
            Command::Help => print_help(),
            Command::Act(a) => {
                last = env.step(a)?;
                if display_prompts && last.reward != 0.0 {
                    println!("Reward: {}", last.reward);
                }
            }
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let opt = Opt::from_args();
    let config = load_config(&opt)?;
    if let Some(h) = opt.human {
        if h >= config.num_seats {
            return Err(format!("no seat {} at a {} seat table", h, config.num_seats).into());
        }
    }
    let mut env = Env::new(config.clone(), agents(&opt, &config), opt.seed)?;
    if let Some(seed) = opt.seed {
        info!("Seed: {}", seed);
    }
    let mut runner = EpisodeRunner::default();
    for _ in 0..opt.episodes {
        match opt.human {
            Some(seat) => {
                if human_episode(&mut env, &mut runner.league, seat, !opt.no_prompts)? {
                    break;
                }
            }
            None => {
                runner.run_episode(&mut env, |_| Action::Fold)?;
            }
        }
    }

    let league = &runner.league;
    println!("{} episodes, {} hands", league.episodes, league.funds_history.len());
    for (i, agent) in env.agents().iter().enumerate() {
        println!(
            "  {:>2} {:<8} episodes won {:>4} hands won {:>6}",
            i,
            agent.name(),
            league.episode_wins.get(i).copied().unwrap_or_default(),
            league.hand_wins.get(i).copied().unwrap_or_default(),
        );
    }
    Ok(())
}
