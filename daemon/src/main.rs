//! tally: replay token and governance scenarios against an in-memory chain.

mod scenario;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tally_node::{ChainConfig, LogFormat};

use crate::scenario::{Outcome, Runner, Scenario};

#[derive(Parser)]
#[command(name = "tally", about = "Community token and governance simulator")]
struct Cli {
    /// Path to a TOML chain configuration file. CLI flags and env vars
    /// override its values.
    #[arg(long, env = "TALLY_CONFIG")]
    config: Option<PathBuf>,

    /// Log format: "human" or "json".
    #[arg(long, env = "TALLY_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "TALLY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Replay a scenario file, printing one JSON line per step.
    Scenario {
        /// Scenario TOML file.
        file: PathBuf,

        /// Print Prometheus metrics to stderr when done.
        #[arg(long)]
        metrics: bool,

        /// Stop at the first rejected call.
        #[arg(long)]
        fail_fast: bool,
    },
    /// Print the effective chain configuration as TOML.
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ChainConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ChainConfig::default(),
    };
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    let format: LogFormat = config.log_format.parse()?;
    if tally_node::init_logging(format, &config.log_level).is_err() {
        tally_utils::init_tracing(&config.log_level);
    }

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Scenario {
            file,
            metrics,
            fail_fast,
        } => {
            let scenario = Scenario::from_toml_file(&file)?;
            tracing::info!(
                file = %file.display(),
                steps = scenario.steps.len(),
                chain_id = %config.chain_id,
                "replaying scenario"
            );

            let mut runner = Runner::new(config, &scenario)?;
            let mut rejected = 0usize;
            for (index, step) in scenario.steps.iter().enumerate() {
                let outcome = runner.run_step(index, step)?;
                println!("{}", serde_json::to_string(&outcome)?);
                if let Outcome::Rejected { .. } = outcome {
                    rejected += 1;
                    if fail_fast {
                        anyhow::bail!("step {index} rejected");
                    }
                }
            }

            let chain = runner.chain();
            tracing::info!(
                blocks = chain.block_height()?,
                tokens = chain.token_count()?,
                proposals = chain.proposal_count()?,
                rejected,
                "scenario complete"
            );
            if metrics {
                match chain.metrics() {
                    Some(m) => eprint!("{}", m.encode_text()?),
                    None => tracing::warn!("metrics are disabled in the chain config"),
                }
            }
        }
    }

    Ok(())
}
