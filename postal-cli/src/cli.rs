use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use postal_core::{
    Config, FailurePolicy, LookupRunner, POSTAL_CODES, PostalCode, nearby,
    provider::provider_from_config,
};
use std::{fs::File, path::PathBuf};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "postal", version, about = "Resolve Singapore postal codes through OneMap")]
pub struct Cli {
    /// Log at debug level (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `lookup`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up the built-in postal code list, one `|`-delimited line per code.
    Lookup {
        /// Log failed lookups and continue instead of stopping at the first one.
        #[arg(long)]
        keep_going: bool,
    },

    /// List known locations within a distance of a postal code.
    Nearby {
        postal: PostalCode,

        /// `|`-delimited file with `address`, `latitude` and `longitude` columns.
        #[arg(long)]
        locations: PathBuf,

        /// Radius in meters.
        #[arg(
            long,
            default_value_t = nearby::DEFAULT_DISTANCE_M,
            value_parser = clap::value_parser!(u32).range(0..=i64::from(nearby::MAX_DISTANCE_M)),
        )]
        distance: u32,
    },

    /// Persist settings to the config file.
    Configure {
        /// Search endpoint URL.
        #[arg(long)]
        endpoint: Option<String>,

        /// Make `lookup` continue past failures by default.
        #[arg(long)]
        keep_going: Option<bool>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command.unwrap_or(Command::Lookup { keep_going: false }) {
            Command::Lookup { keep_going } => {
                let policy = if keep_going { FailurePolicy::Isolate } else { config.failure_policy };
                run_lookup(&config, policy).await
            }
            Command::Nearby { postal, locations, distance } => {
                run_nearby(&config, postal, locations, distance).await
            }
            Command::Configure { endpoint, keep_going } => configure(config, endpoint, keep_going),
        }
    }
}

async fn run_lookup(config: &Config, policy: FailurePolicy) -> anyhow::Result<()> {
    let provider = provider_from_config(config);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    tracing::debug!(codes = POSTAL_CODES.len(), ?policy, "starting lookup run");

    let summary = LookupRunner::new(provider.as_ref(), policy).run(POSTAL_CODES, &mut out).await?;

    if summary.failed > 0 {
        return Err(anyhow!("{} of {} lookups failed", summary.failed, summary.total()));
    }

    Ok(())
}

async fn run_nearby(
    config: &Config,
    postal: PostalCode,
    locations: PathBuf,
    distance: u32,
) -> anyhow::Result<()> {
    let provider = provider_from_config(config);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let file = File::open(&locations)
        .with_context(|| format!("Failed to open locations file: {}", locations.display()))?;

    nearby::search_nearby(provider.as_ref(), postal, file, f64::from(distance), &mut out)
        .await
        .with_context(|| format!("Nearby search from {postal} failed ({})", locations.display()))?;

    Ok(())
}

fn configure(
    mut config: Config,
    endpoint: Option<String>,
    keep_going: Option<bool>,
) -> anyhow::Result<()> {
    if let Some(endpoint) = endpoint {
        config.endpoint = Some(endpoint);
    }

    if let Some(keep_going) = keep_going {
        config.failure_policy =
            if keep_going { FailurePolicy::Isolate } else { FailurePolicy::FailFast };
    }

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}
