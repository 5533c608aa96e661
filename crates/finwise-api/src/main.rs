//! finwise-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! in-memory record store, optionally launches the AI insight sidecar, and
//! serves the FinWise API over HTTP.
//!
//! # Password hash generation
//!
//! To print the argon2 PHC string for a password entered on stdin:
//!
//! ```
//! cargo run -p finwise-api --bin finwise-server -- --hash-password
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use finwise_api::{AppState, ServerConfig, auth::Sessions};
use finwise_bridge::{SidecarClient, SidecarProcess};
use finwise_store_memory::MemoryStore;
use rand_core::{OsRng, RngCore as _};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "FinWise personal-finance server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password_from_stdin()?;
    let hash = finwise_api::auth::hash_password(&password)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    println!("{hash}");
    return Ok(());
  }

  // Load configuration. Nested sidecar keys come in as e.g.
  // FINWISE_SIDECAR__COMMAND.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("FINWISE").separator("__"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Session secret: configured, or random per process.
  let secret = match &server_cfg.session_secret {
    Some(secret) => secret.clone(),
    None => {
      tracing::warn!(
        "session_secret not configured; sessions will not survive a restart"
      );
      let mut bytes = [0u8; 32];
      OsRng.fill_bytes(&mut bytes);
      hex::encode(bytes)
    }
  };

  // Launch the sidecar if one is configured.
  let mut sidecar = None;
  if !server_cfg.sidecar.command.is_empty() {
    let mut process = SidecarProcess::new(server_cfg.sidecar.clone())
      .context("failed to build sidecar process")?;
    match process.start().await {
      Ok(()) => tracing::info!("insight sidecar ready"),
      // The API degrades to 502s on insight routes; still serve.
      Err(error) => tracing::error!(%error, "insight sidecar failed to start"),
    }
    sidecar = Some(process);
  }

  let state = AppState {
    store:    Arc::new(MemoryStore::default()),
    bridge:   Arc::new(
      SidecarClient::new(&server_cfg.sidecar)
        .context("failed to build sidecar client")?,
    ),
    sessions: Arc::new(Sessions::new(secret)),
  };

  let app = finwise_api::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  if let Some(mut process) = sidecar {
    process.stop().await;
  }

  Ok(())
}

/// Resolve on ctrl-c or SIGTERM.
async fn shutdown_signal() {
  let ctrl_c = async {
    tokio::signal::ctrl_c().await.ok();
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut signal) => {
        signal.recv().await;
      }
      Err(_) => std::future::pending().await,
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    () = ctrl_c => {},
    () = terminate => {},
  }
}

/// Read a password from stdin.
fn read_password_from_stdin() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}
