use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use plotters::prelude::*;

use nothanksbot::{AgentConfig, Algorithm, OpponentPolicy, Trainer, TrainerConfig};

/// Default base seed for deterministic runs.
const DEFAULT_SEED: u64 = 0xC0FFEE_u64 << 32 | 0x5EED_u64;

#[derive(Parser, Debug)]
#[command(
    name = "winrate",
    about = "Train both learners and plot their win rate per block of episodes."
)]
struct Args {
    /// Number of blocks to train
    #[arg(short = 'b', long = "blocks", default_value_t = 50)]
    blocks: usize,

    /// Episodes per block
    #[arg(short = 'g', long = "block-size", default_value_t = 200)]
    block_size: usize,

    /// Base RNG seed (deck and policy RNGs are derived deterministically)
    #[arg(short = 's', long = "seed", default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Exploration probability (epsilon)
    #[arg(long, default_value_t = 0.1)]
    exploration: f64,

    /// Step size of value updates (alpha)
    #[arg(long, default_value_t = 0.1)]
    learning_rate: f64,

    /// Policy of each of the two opponents: random or threshold:<chip value>.
    /// Omitted seats play randomly.
    #[arg(long = "opponent")]
    opponents: Vec<OpponentPolicy>,

    /// Output chart file (png)
    #[arg(short = 'o', long = "out", default_value = "winrates.png")]
    out: PathBuf,

    /// Show a textual summary only (no chart)
    #[arg(long = "no-chart")]
    no_chart: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    if args.blocks == 0 || args.block_size == 0 {
        return Err("blocks and block-size must be positive".into());
    }
    if args.opponents.len() > 2 {
        return Err("at most two opponents can be given".into());
    }
    let agent = AgentConfig::new(args.exploration, args.learning_rate)?;
    let mut opponents = args.opponents.clone();
    opponents.resize(2, OpponentPolicy::Random);
    let names = ["Learner", "Opponent 1", "Opponent 2"];

    let mut series: Vec<(Algorithm, Vec<f64>)> = Vec::new();
    for algorithm in [Algorithm::MonteCarlo, Algorithm::QLearning] {
        let config = TrainerConfig::new(names, algorithm, agent)
            .with_opponents(opponents.iter().copied())
            .with_seed(args.seed);
        let mut trainer = Trainer::new(config, None)?;
        let mut rates = Vec::with_capacity(args.blocks);
        for _ in 0..args.blocks {
            let report = trainer.train(args.block_size)?;
            rates.push(report.learner_win_rate() * 100.0);
        }
        series.push((algorithm, rates));
    }

    println!("Learner win rate per block of {} episodes:", args.block_size);
    for (algorithm, rates) in &series {
        let first = rates.first().copied().unwrap_or(0.0);
        let last = rates.last().copied().unwrap_or(0.0);
        let mean = rates.iter().sum::<f64>() / rates.len() as f64;
        println!(
            "  {algorithm:<12}  first {first:>5.1}%  last {last:>5.1}%  mean {mean:>5.1}%"
        );
    }
    let lineup: Vec<String> = opponents.iter().map(ToString::to_string).collect();
    println!("  opponents: {}", lineup.join(", "));
    println!("  (against two random seats a random learner wins about 33.3%)");

    if !args.no_chart {
        render_line_chart(&args.out, args.block_size, &series)?;
        println!("\nChart written to {}", args.out.display());
    }
    Ok(())
}

fn render_line_chart(
    out: &Path,
    block_size: usize,
    series: &[(Algorithm, Vec<f64>)],
) -> Result<(), Box<dyn Error>> {
    let blocks = series.iter().map(|(_, rates)| rates.len()).max().unwrap_or(0);

    let root = BitMapBackend::new(out, (1000, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| format!("{e}"))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Learner win rate per block", ("sans-serif", 28).into_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0..blocks, 0.0f64..100.0)
        .map_err(|e| format!("{e}"))?;

    chart
        .configure_mesh()
        .y_desc("Win rate (%)")
        .x_desc(format!("Block ({block_size} episodes)"))
        .y_label_formatter(&|v| format!("{v:.0}"))
        .draw()
        .map_err(|e| format!("{e}"))?;

    let baseline = 100.0 / 3.0;
    chart
        .draw_series(LineSeries::new(
            [(0, baseline), (blocks, baseline)],
            BLACK.mix(0.4),
        ))
        .map_err(|e| format!("{e}"))?
        .label("random baseline")
        .legend(|(x, y)| PathElement::new([(x, y), (x + 20, y)], BLACK.mix(0.4)));

    for (index, (algorithm, rates)) in series.iter().enumerate() {
        let color = Palette99::pick(index).to_rgba();
        chart
            .draw_series(LineSeries::new(
                rates.iter().enumerate().map(|(i, r)| (i, *r)),
                color.stroke_width(2),
            ))
            .map_err(|e| format!("{e}"))?
            .label(algorithm.label())
            .legend(move |(x, y)| PathElement::new([(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| format!("{e}"))?;

    root.present().map_err(|e| format!("{e}"))?;
    Ok(())
}
