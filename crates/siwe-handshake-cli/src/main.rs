/*
[INPUT]:  CLI arguments, YAML configuration file, OS shutdown signals
[OUTPUT]: One sign-in attempt against the configured relying party
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

use anyhow::{Context, Result, anyhow};
use chrono::{Duration, Utc};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use siwe_handshake::{
    AuthSubmitter, HandshakeStateMachine, HttpNonceSource, LocalKeyAgent, MessageBuilder, Nonce,
    RelyingPartyClient, SigningAgent, initialize,
};
use siwe_handshake_cli::CliConfig;

const DRY_RUN_NONCE_TTL_MINUTES: i64 = 10;

#[derive(Parser, Debug)]
#[command(name = "siwe-handshake-cli", version, about = "Sign in to a relying party with an Ethereum account")]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: PathBuf,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    /// Render the statement with a local nonce; no signing, no network
    #[arg(long = "dry-run")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    info!(
        config_path = %args.config_path.display(),
        dry_run = args.dry_run,
        "starting siwe-handshake-cli"
    );

    let config = load_config(&args.config_path)?;
    info!(
        base_url = %config.relying_party.base_url,
        domain = %config.handshake.domain,
        "configuration loaded"
    );

    let agent = build_agent(&config)?;

    if args.dry_run {
        return render_only(config, agent).await;
    }

    let client = RelyingPartyClient::with_config(
        config.relying_party.client_config(),
        &config.relying_party.base_url,
        config.relying_party.endpoints.clone(),
    )
    .context("build relying party client")?;

    let shutdown = CancellationToken::new();
    setup_signal_handlers(shutdown.clone());

    let mut machine = HandshakeStateMachine::new(
        config.handshake,
        agent,
        Arc::new(HttpNonceSource::new(client.clone())),
        AuthSubmitter::new(client),
    )
    .with_cancellation(shutdown);

    match machine.run().await {
        Ok(authenticated) => {
            println!("Signed in as {}", authenticated.account);
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", err.user_message());
            Err(anyhow::Error::new(err).context("sign-in failed"))
        }
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn load_config(path: &PathBuf) -> Result<CliConfig> {
    let path_str = path
        .to_str()
        .context("config path must be valid utf-8")?;
    CliConfig::from_file(path_str).context("load config")
}

/// A missing key is not an error here; the handshake reports it as an
/// unavailable agent.
fn build_agent(config: &CliConfig) -> Result<Option<Arc<dyn SigningAgent>>> {
    match config.agent.private_key.as_deref() {
        Some(key) => {
            let agent = LocalKeyAgent::new(key).context("load signing key")?;
            info!(address = %agent.account(), "local signing agent ready");
            Ok(Some(Arc::new(agent)))
        }
        None => {
            warn!("no signing key configured");
            Ok(None)
        }
    }
}

async fn render_only(config: CliConfig, agent: Option<Arc<dyn SigningAgent>>) -> Result<()> {
    let resolver = initialize(agent).await.context("resolve account")?;
    let account = resolver.account().context("no account resolved")?;

    let nonce = Nonce::generate(Duration::minutes(DRY_RUN_NONCE_TTL_MINUTES));
    let statement = MessageBuilder::new(config.handshake)
        .build(account, &nonce, Utc::now())
        .context("build statement")?;
    let message = statement.render().context("render statement")?;

    info!("dry-run requested; statement rendered, nothing signed or submitted");
    println!("{message}");
    Ok(())
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
