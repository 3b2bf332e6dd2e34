mod renderer;

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use portal_handoff_core::scenario::{self, Script};
use portal_handoff_core::{DemoConfig, Session};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_ENV: &str = "PORTAL_HANDOFF_LOG";

/// Simulate the article/podcast portal hand-off in a terminal.
#[derive(Debug, Parser)]
#[command(name = "portal-handoff", version)]
struct Args {
    /// TOML file with demo settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Replay a TOML step script and print snapshots as JSON instead of
    /// opening the interactive view.
    #[arg(long)]
    script: Option<PathBuf>,
    /// Article URL, e.g. `http://localhost:3000/?portalpath=/ttt`.
    #[arg(long)]
    host_url: Option<String>,
    /// Where interactive mode writes its log.
    #[arg(long, default_value = "portal-handoff.log")]
    log_file: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DemoConfig::load(path)?,
        None => DemoConfig::default(),
    };
    if let Some(url) = &args.host_url {
        config = config.with_host_url(url)?;
    }

    match &args.script {
        Some(path) => {
            init_tracing(None)?;
            replay(&config, path)
        }
        None => {
            init_tracing(Some(&args.log_file))?;
            renderer::run(&config)
        }
    }
}

/// Install the subscriber. Filter comes from `PORTAL_HANDOFF_LOG`,
/// defaulting to `info`. The interactive view owns the terminal, so it
/// logs to a file; script mode logs to stderr.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()?;
        }
        None => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()?;
        }
    }
    Ok(())
}

fn replay(config: &DemoConfig, path: &Path) -> Result<()> {
    let script = Script::load(path)?;
    let mut session = Session::new(config)?;
    let snapshots = scenario::run_script(&mut session, &script)
        .with_context(|| format!("script {} failed", path.display()))?;

    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &snapshots)?;
    writeln!(out)?;
    Ok(())
}
