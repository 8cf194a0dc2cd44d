use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use nothanksbot::{
    AgentConfig, Algorithm, BincodeFileStore, GameSettings, OpponentPolicy, TableStore, Trainer,
    TrainerConfig,
};
use nothanksbot::ml::{DEFAULT_EXPLORATION, DEFAULT_LEARNING_RATE};

#[derive(Parser, Debug)]
#[command(about = "Train a take/pass policy for one seat against fixed-policy opponents")]
struct TrainArgs {
    /// Learning algorithm: monte-carlo or q-learning.
    #[arg(short = 'a', long, default_value = "monte-carlo")]
    algorithm: Algorithm,
    /// Number of episodes to play.
    #[arg(short = 'g', long = "episodes", default_value_t = 10_000)]
    episodes: usize,
    /// Exploration probability (epsilon).
    #[arg(long, default_value_t = DEFAULT_EXPLORATION)]
    exploration: f64,
    /// Step size of value updates (alpha).
    #[arg(long, default_value_t = DEFAULT_LEARNING_RATE)]
    learning_rate: f64,
    /// Seat of the learning player.
    #[arg(long, default_value_t = 0)]
    seat: usize,
    /// Master seed controlling reproducibility.
    #[arg(short = 's', long, default_value_t = 0x5EED_0A11_CE5E_ED00)]
    seed: u64,
    /// Chips each player starts with.
    #[arg(long, default_value_t = 11)]
    chips: u32,
    /// Episodes between progress reports.
    #[arg(long, default_value_t = 1_000)]
    report_every: usize,
    /// Where the learned table is written (bincode).
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
    /// Opponent policy per non-learning seat in seat order: random or
    /// threshold:<chip value>. Omitted seats play randomly.
    #[arg(long = "opponent")]
    opponents: Vec<OpponentPolicy>,
    /// Continue from the table stored at --output.
    #[arg(long)]
    resume: bool,
    /// Player names, one per seat.
    #[arg(default_values_t = [String::from("Alice"), String::from("Bob"), String::from("Claire")])]
    names: Vec<String>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = TrainArgs::parse();
    if let Err(err) = run(args) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(args: TrainArgs) -> Result<(), Box<dyn Error>> {
    if args.episodes == 0 {
        return Err("episodes must be positive".into());
    }
    if args.resume && args.output.is_none() {
        return Err("--resume needs --output to locate the stored table".into());
    }
    let mut agent = AgentConfig::new(args.exploration, args.learning_rate)?;
    if args.resume {
        agent = agent.resuming();
    }
    let settings = GameSettings {
        num_players: args.names.len(),
        starting_chips: args.chips,
        ..GameSettings::default()
    };
    let opponents = opponent_lineup(&args.opponents, args.names.len())?;
    let config = TrainerConfig::new(args.names.iter().cloned(), args.algorithm, agent)
        .with_settings(settings)
        .with_learner_seat(args.seat)
        .with_opponents(opponents)
        .with_seed(args.seed);
    let file_store = args.output.as_ref().map(|path| BincodeFileStore::new(path));
    if let Some(file_store) = &file_store {
        println!("Table store: {}", file_store.path().display());
    }
    let store = file_store.map(|store| Box::new(store) as Box<dyn TableStore>);
    let mut trainer = Trainer::new(config, store)?;
    let lineup: Vec<String> = trainer
        .config()
        .opponents
        .iter()
        .map(ToString::to_string)
        .collect();
    println!("Opponents: {}", lineup.join(", "));

    let block = args.report_every.max(1);
    let mut wins = vec![0usize; args.names.len()];
    let mut remaining = args.episodes;
    while remaining > 0 {
        let episodes = remaining.min(block);
        let report = trainer.train(episodes)?;
        for (total, block_wins) in wins.iter_mut().zip(&report.wins) {
            *total += block_wins;
        }
        remaining -= episodes;
        println!(
            "{:>8} episodes  learner win rate {:>5.1}%  mean score {:>7.2}",
            trainer.episodes(),
            report.learner_win_rate() * 100.0,
            report.mean_learner_score()
        );
    }

    println!("\nWins after {} episodes:", args.episodes);
    for (seat, (name, count)) in args.names.iter().zip(&wins).enumerate() {
        let marker = if seat == args.seat { " (learner)" } else { "" };
        println!("  {name:<12} {count}{marker}");
    }
    println!(
        "Table entries: {}  visits: {}",
        trainer.learner().table().len(),
        trainer.learner().visits().total()
    );

    if args.output.is_some() {
        trainer.save()?;
    }
    Ok(())
}

/// Pads the given opponent policies with random seats up to `players - 1`.
fn opponent_lineup(
    given: &[OpponentPolicy],
    players: usize,
) -> Result<Vec<OpponentPolicy>, Box<dyn Error>> {
    let seats = players.saturating_sub(1);
    if given.len() > seats {
        return Err(format!("{} opponent(s) given for {seats} seat(s)", given.len()).into());
    }
    let mut lineup = given.to_vec();
    lineup.resize(seats, OpponentPolicy::Random);
    Ok(lineup)
}
