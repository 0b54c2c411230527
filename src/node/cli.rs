use crate::finality::tracker::FinalityTracker;
use crate::node::config::TrackerConfig;
use crate::node::simulator::{self, SimulationConfig};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

/// CLI for driving a finality tracker.
#[derive(Parser)]
#[clap(name = "quorus", version)]
pub struct Cli {
    /// Path to a TOML tracker config (genesis_id, quorum)
    #[clap(long)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Drive the tracker under concurrent vote load and print the outcome
    Simulate {
        /// concurrent proposer tasks
        #[clap(long, default_value_t = 8)]
        workers: usize,

        /// heights to finalize
        #[clap(long, default_value_t = 16)]
        heights: u64,

        /// override the configured quorum
        #[clap(long)]
        quorum: Option<u32>,

        /// print the final snapshot as JSON instead of plain text
        #[clap(long)]
        json: bool,
    },
}

pub async fn run_cli() -> Result<()> {
    crate::utils::logging::init_logging();
    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => TrackerConfig::load(path)?,
        None => TrackerConfig::default(),
    };

    match cli.cmd {
        Cmd::Simulate {
            workers,
            heights,
            quorum,
            json,
        } => {
            if let Some(q) = quorum {
                cfg.quorum = q;
                cfg.validate()?;
            }
            let tracker = Arc::new(FinalityTracker::new(cfg.genesis_id.clone(), cfg.quorum));
            let snapshot = simulator::run(
                tracker,
                SimulationConfig {
                    workers,
                    heights,
                    jitter: true,
                },
            )
            .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!("{}", snapshot);
            }
            Ok(())
        }
    }
}
