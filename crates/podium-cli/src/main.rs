//! Podium command-line entry point.

use std::io::Read;
use std::time::Duration;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use podium::{DrawPipeline, EngineConfig};
use podium_cli::config::{
    pipeline_config, resolve_source, resolve_state_path, DEFAULT_POLL_SECS, SOURCE_ENV,
};
use podium_cli::session::PodiumSession;
use podium_cli::types::CliError;

#[derive(Parser)]
#[command(
    name = "podium",
    about = "Poll 10-entrant race draw results and publish positional pattern recommendations",
    version
)]
struct Cli {
    /// Path to the JSON state file.
    #[arg(short, long, global = true)]
    state: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct SourceArgs {
    /// Draw source URL. Also reads from PODIUM_SOURCE.
    #[arg(long)]
    source: Option<String>,

    /// API endpoint path or URL, repeatable. Replaces the built-in endpoints.
    #[arg(long = "api")]
    api_endpoints: Vec<String>,

    /// Page fetch timeout in seconds.
    #[arg(long)]
    page_timeout: Option<u64>,
}

impl SourceArgs {
    fn pipeline(&self) -> DrawPipeline {
        DrawPipeline::new(pipeline_config(&self.api_endpoints, self.page_timeout))
    }

    fn require_source(&self) -> Result<String, CliError> {
        resolve_source(self.source.as_deref()).ok_or(CliError::MissingSource(SOURCE_ENV))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh once, run the engine and print the result as JSON.
    Refresh {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Poll the source and print one JSON line per new recommendation.
    Watch {
        #[command(flatten)]
        source: SourceArgs,

        /// Seconds between refreshes.
        #[arg(long, default_value_t = DEFAULT_POLL_SECS)]
        interval: u64,
    },

    /// Replace the history with manual `period,n1 n2 ... n10` lines.
    Seed {
        /// Read from this file instead of stdin.
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Drop all recommendations and suppress the in-flight period.
    Clear,

    /// Print history size, pending feed and statistics.
    Status,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   podium completions bash > ~/.local/share/bash-completion/completions/podium
    ///   podium completions zsh > ~/.zfunc/_podium
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },

    /// Serve the feed over HTTP.
    #[cfg(feature = "http")]
    ServeHttp {
        /// Listen address (host:port).
        #[arg(long, default_value = "127.0.0.1:3200")]
        addr: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Bearer token for authentication.
        /// Also reads from PODIUM_TOKEN env var.
        #[arg(long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let state_path = resolve_state_path(cli.state.as_deref());

    match cli.command {
        Commands::Refresh { source } => {
            let url = exit_on_error(source.require_source());
            let mut session = PodiumSession::open(&state_path, EngineConfig::default())?;
            let outcome = session.refresh(&source.pipeline(), &url).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if let Some(err) = outcome.exhausted {
                let err = CliError::from(err);
                eprintln!("Error: {err}");
                drop(session);
                std::process::exit(err.exit_code());
            }
        }

        Commands::Watch { source, interval } => {
            let url = exit_on_error(source.require_source());
            let pipeline = source.pipeline();
            let mut session = PodiumSession::open(&state_path, EngineConfig::default())?;
            let mut ticker = tokio::time::interval(Duration::from_secs(interval.max(1)));
            tracing::info!("Watching {url} every {interval}s");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let outcome = session.refresh(&pipeline, &url).await?;
                        if let Some(rec) = outcome.cycle.and_then(|c| c.generated) {
                            println!("{}", serde_json::to_string(&rec.feed_item())?);
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Interrupted, stopping watch");
                        break;
                    }
                }
            }
            session.save()?;
        }

        Commands::Seed { file } => {
            let text = match &file {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {path}"))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read stdin")?;
                    buf
                }
            };

            let mut session = PodiumSession::open(&state_path, EngineConfig::default())?;
            let cycle = exit_on_error(session.seed(&text));
            println!("{}", serde_json::to_string_pretty(&cycle)?);
        }

        Commands::Clear => {
            let mut session = PodiumSession::open(&state_path, EngineConfig::default())?;
            let suppressed = session.clear()?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "cleared": true,
                    "suppressedPeriod": suppressed,
                }))?
            );
        }

        Commands::Status => {
            let session = PodiumSession::open(&state_path, EngineConfig::default())?;
            println!("{}", serde_json::to_string_pretty(&session.status())?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "podium", &mut std::io::stdout());
        }

        #[cfg(feature = "http")]
        Commands::ServeHttp {
            addr,
            source,
            token,
        } => {
            use podium_cli::config::resolve_token;
            use podium_cli::transport::HttpFeed;

            let effective_token = resolve_token(token.as_deref());
            let url = resolve_source(source.source.as_deref());
            let session = PodiumSession::open(&state_path, EngineConfig::default())?;

            tracing::info!("Podium HTTP feed");
            tracing::info!("State: {state_path}");
            match &url {
                Some(url) => tracing::info!("Source: {url}"),
                None => tracing::warn!("No source configured, POST /refresh is disabled"),
            }
            if effective_token.is_some() {
                tracing::info!("Auth: bearer token required");
            }

            let feed = HttpFeed::new(session, source.pipeline(), url, effective_token);
            feed.run(&addr).await?;
        }
    }

    Ok(())
}

/// Print a front-end error and exit with its code.
fn exit_on_error<T>(result: Result<T, CliError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
