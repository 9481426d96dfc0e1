//! wlb-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `WLB_*`
//! environment variables, opens the SQLite store and serves the JSON API.
//!
//! # Bootstrapping an admin
//!
//! ```sh
//! printf 'me@example.com\nsecret\n' | wlb-server --create-admin
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use wlb_core::accounts::AccountService;
use wlb_server::{ServerConfig, app_state, router};
use wlb_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "WLB activity tracker server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Read an email and password from stdin, make that account an admin and
  /// exit.
  #[arg(long)]
  create_admin: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8080)?
    .set_default("store_path", "~/.local/share/wlb/wlb.sqlite")?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("WLB"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if cli.create_admin {
    let email = prompt("Email: ")?;
    let password = prompt("Password: ")?;
    let hash = wlb_api::auth::hash_password(&password)?;
    let user = AccountService::new(&store)
      .ensure_admin(&email, hash)
      .await
      .context("failed to create admin")?;
    println!("{} is now an admin ({})", user.email, user.user_id);
    return Ok(());
  }

  let state = app_state(store, &server_cfg)?;
  let app = router(state);
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Print `label` and read one line from stdin.
fn prompt(label: &str) -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("{label}");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
