use std::error::Error;
use std::process;

use clap::Parser;

use nothanksbot::{AgentConfig, Algorithm, play_episode, render_summary};

const DEFAULT_SEED: u64 = 0xDEC0_1DED_5EED_F00D;

#[derive(Parser, Debug)]
#[command(about = "Play one narrated episode: an untrained learner against two random seats")]
struct Args {
    /// Learning algorithm for the first seat: monte-carlo or q-learning.
    #[arg(short = 'a', long, default_value = "q-learning")]
    algorithm: Algorithm,
    /// Seed for shuffling and every policy.
    #[arg(short = 's', long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Exploration probability (epsilon).
    #[arg(long, default_value_t = 0.1)]
    exploration: f64,
    /// Step size of value updates (alpha).
    #[arg(long, default_value_t = 0.1)]
    learning_rate: f64,
    /// Three player names.
    #[arg(default_values_t = [String::from("Alice"), String::from("Bob"), String::from("Claire")])]
    names: Vec<String>,
}

fn main() {
    // narration is logged at debug level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let [a, b, c] = args.names.as_slice() else {
        return Err(format!("expected 3 player names, received {}", args.names.len()).into());
    };
    let config = AgentConfig::new(args.exploration, args.learning_rate)?;
    let names = [a.as_str(), b.as_str(), c.as_str()];
    let outcome = play_episode(names, args.algorithm, config, args.seed)?;
    println!("\n{}", render_summary(&outcome.players));
    println!(
        "{} has won after {} draws.",
        outcome.winner_name(),
        outcome.draws
    );
    Ok(())
}
