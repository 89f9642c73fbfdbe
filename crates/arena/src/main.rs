//! Episode runner for the arcade MCTS engine.
//!
//! Plays the grid chase game with one budgeted `decide` call per tick and
//! saves each episode as MessagePack for offline analysis.

mod episode;
mod settings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use episode::{play_episode, EpisodeRecord};
use rayon::prelude::*;
use settings::ArenaConfig;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

/// Arcade MCTS episode runner.
#[derive(Parser)]
#[command(name = "arcade-arena")]
#[command(about = "Play and record grid chase episodes with the MCTS agent")]
struct Cli {
    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play episodes and report outcomes.
    Play {
        /// Number of episodes to play.
        #[arg(short, long, default_value = "10")]
        episodes: usize,

        /// Wall-clock budget per decision, in milliseconds.
        #[arg(short, long, default_value = "40")]
        budget_ms: u64,

        /// Random seed for reproducibility.
        #[arg(long, default_value = "42")]
        seed: u64,

        /// TOML configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory for episode files. Nothing is written when absent.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML.
    Config {
        /// TOML configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Save each episode to a separate MessagePack file.
fn save_episodes(output: &Path, records: &[EpisodeRecord]) -> Result<()> {
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {:?}", output))?;

    for (i, record) in records.iter().enumerate() {
        let filename = output.join(format!("episode_{:06}.msgpack", i));
        let file = File::create(&filename)
            .with_context(|| format!("Failed to create file: {:?}", filename))?;
        let mut writer = BufWriter::new(file);
        // Named fields keep the files readable without the Rust types
        rmp_serde::encode::write_named(&mut writer, record)
            .with_context(|| format!("Failed to serialize episode {}", i))?;
    }

    Ok(())
}

/// Run the play command.
fn cmd_play(
    episodes: usize,
    budget_ms: u64,
    seed: u64,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = ArenaConfig::load(config.as_deref())?;
    let level = config.level.build()?;
    let budget = Duration::from_millis(budget_ms);

    info!(episodes, budget_ms, seed, "Playing episodes");
    let start = Instant::now();

    let records: Vec<EpisodeRecord> = (0..episodes)
        .into_par_iter()
        .map(|i| {
            let episode_seed = seed.wrapping_add(i as u64 * 1000);
            play_episode(&config, &level, episode_seed, budget)
        })
        .collect::<Result<_>>()?;

    if let Some(output) = &output {
        save_episodes(output, &records)?;
        println!("Files saved to: {:?}", output);
    }

    let elapsed = start.elapsed();
    let total_ticks: usize = records.iter().map(|r| r.steps.len()).sum();
    let late: usize = records.iter().map(|r| r.late_ticks(budget)).sum();
    let fallbacks: usize = records
        .iter()
        .flat_map(|r| &r.steps)
        .filter(|s| s.fallback)
        .count();
    let wins = records
        .iter()
        .filter(|r| r.outcome == arcade_core::Outcome::Win)
        .count();
    let losses = records
        .iter()
        .filter(|r| r.outcome == arcade_core::Outcome::Loss)
        .count();
    let mean_score = if records.is_empty() {
        0.0
    } else {
        records.iter().map(|r| r.score).sum::<f64>() / records.len() as f64
    };

    println!("\nCompleted in {:.2}s", elapsed.as_secs_f64());
    println!("Episodes played: {}", records.len());
    println!("Total ticks: {}", total_ticks);
    println!("Late decisions: {}", late);
    println!("Fallback decisions: {}", fallbacks);
    println!("Mean score: {:.2}", mean_score);
    println!(
        "\nOutcomes: Wins: {}, Losses: {}, Timeouts: {}",
        wins,
        losses,
        records.len() - wins - losses
    );

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Play {
            episodes,
            budget_ms,
            seed,
            config,
            output,
        } => cmd_play(episodes, budget_ms, seed, config, output),

        Commands::Config { config } => {
            let config = ArenaConfig::load(config.as_deref())?;
            let text = toml::to_string_pretty(&config).context("Failed to render config")?;
            print!("{}", text);
            Ok(())
        }
    }
}
