mod logic;
mod util;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use mastermind_game::GameConfig;

use logic::{
    GameplayStrategy, RunRecord, SimulationConfig, SimulationSession, iteration_seed,
    parse_strategies, resolve_seed_inputs, summarize,
};
use util::split_csv;

#[derive(Debug, Parser)]
#[command(name = "mastermind-tester", version = "0.1.0")]
#[command(about = "Headless QA harness for Money Mastermind - scripted strategies over seeded games")]
struct Args {
    /// Strategies to run (comma-separated, or `all`)
    #[arg(long, default_value = "all")]
    strategies: String,

    /// List all available strategies and exit
    #[arg(long)]
    list_strategies: bool,

    /// Seeds to run (comma-separated integers or `start..end` ranges)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of games per strategy and seed
    #[arg(long, default_value_t = 10)]
    iterations: u32,

    /// Stop each game after this many days (defaults to the day limit)
    #[arg(long)]
    max_days: Option<u32>,

    /// Override the game's day limit
    #[arg(long)]
    day_limit: Option<u32>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_strategies(&args)? {
        return Ok(());
    }

    if args.report == "console" {
        announce_banner();
    }

    let start_time = Instant::now();
    let strategies = parse_strategies(&split_csv(&args.strategies))?;
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let runs = run_strategies(&args, &strategies, &seeds)?;

    write_reports(&args, &runs, start_time)?;

    if runs.iter().any(|run| !run.passed()) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_strategies(args: &Args) -> Result<bool> {
    if !args.list_strategies {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available strategies:")?;
    for strategy in GameplayStrategy::ALL {
        writeln!(
            output_target.writer(),
            "  {:10} - {}",
            strategy.key(),
            strategy.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "💵 Money Mastermind Automated Tester".bright_cyan().bold());
    println!("{}", "====================================".cyan());
}

fn run_strategies(
    args: &Args,
    strategies: &[GameplayStrategy],
    seeds: &[u64],
) -> Result<Vec<RunRecord>> {
    let mut runs = Vec::new();
    for &strategy in strategies {
        for &seed in seeds {
            for iteration in 0..args.iterations {
                let run_seed = iteration_seed(seed, iteration);
                let mut config = SimulationConfig::new(strategy, run_seed);
                if let Some(day_limit) = args.day_limit {
                    let game = GameConfig {
                        day_limit,
                        ..GameConfig::default()
                    };
                    config = config.with_game(game).with_max_days(day_limit);
                }
                if let Some(max_days) = args.max_days {
                    config = config.with_max_days(max_days);
                }
                let mut policy = strategy.create_policy(run_seed);
                let session = SimulationSession::new(config)
                    .with_context(|| format!("failed to start {} seed {run_seed}", strategy.key()))?;
                let record = session.run(policy.as_mut());
                info!(
                    "{} seed {run_seed}: {:?} on day {} with {}",
                    strategy.key(),
                    record.ending,
                    record.days_played,
                    record.final_balance
                );
                if args.verbose {
                    print_run(&record);
                }
                runs.push(record);
            }
        }
    }
    Ok(runs)
}

fn print_run(record: &RunRecord) {
    let status = if record.passed() { "✅" } else { "❌" };
    let ending = record.ending.map_or("unfinished", |ending| ending.key());
    eprintln!(
        "{status} [{} seed {}] {ending} day {} balance {}",
        record.strategy.key().green(),
        record.seed,
        record.days_played,
        record.final_balance
    );
    if let Some(failure) = &record.failure {
        eprintln!("   {}", failure.red());
    }
}

fn write_reports(args: &Args, runs: &[RunRecord], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let summaries = summarize(runs);

    match args.report.as_str() {
        "json" => {
            logic::reports::generate_json_report(&mut output_target, &summaries, runs)?;
        }
        "markdown" => {
            if summaries.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Money Mastermind Strategy Results\n\n_No strategies executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, &summaries)?;
            }
        }
        _ => {
            let duration = start_time.elapsed();
            if summaries.is_empty() {
                writeln!(&mut output_target, "No strategies executed.")?;
            } else {
                logic::reports::generate_console_report(&mut output_target, &summaries, duration)?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
