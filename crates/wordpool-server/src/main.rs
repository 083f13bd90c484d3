//! wordpool server binary and maintenance tool.
//!
//! Reads `wordpool.toml` (or the path given with `--config`) plus
//! `WORDPOOL_*` environment variables, opens the SQLite store and either
//! serves HTTP or runs a one-off maintenance command.
//!
//! # Admin password
//!
//! To generate the argon2 PHC string for `admin_password_hash`:
//!
//! ```text
//! wordpool hash-password
//! ```

use std::{
  fs::File,
  io::{self, BufRead, Write},
  net::SocketAddr,
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::{Parser, Subcommand};
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use wordpool_core::{
  hash::{DEFAULT_ITERATIONS, sha256_iterate},
  store::WordStore,
};
use wordpool_server::{AppState, ServerConfig, render, words};
use wordpool_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "Rate-limited word pool server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "wordpool.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve HTTP (the default).
  Serve,
  /// Print the argon2 hash for a password entered on stdin and exit.
  HashPassword,
  /// Add every word of a CSV file to the pool.
  Import {
    file: PathBuf,
  },
  /// Mark every word unused (or used) and forget every recorded draw.
  Reset {
    /// Mark every word used instead of unused.
    #[arg(long)]
    used: bool,
    /// Skip the confirmation prompts.
    #[arg(long)]
    yes:  bool,
  },
  /// Show the longest words in the pool.
  Longest {
    #[arg(short = 'n', long, default_value_t = 10)]
    limit: usize,
  },
  /// Show the most recent visitors and what they were issued.
  Recent {
    #[arg(short = 'n', long, default_value_t = 10)]
    limit: usize,
  },
  /// Print the iterated SHA-256 of the first field of each CSV record.
  HashIps {
    file: PathBuf,
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: u32,
  },
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

  match cli.command.unwrap_or(Command::Serve) {
    Command::HashPassword => hash_password(),
    Command::HashIps { file, iterations } => hash_ips(&file, iterations),
    Command::Serve => {
      let config = load_config(&cli.config)?;
      let store  = open_store(&config).await?;
      serve(store, config).await
    }
    Command::Import { file } => {
      let store = open_store(&load_config(&cli.config)?).await?;
      let input = File::open(&file)
        .with_context(|| format!("failed to open {}", file.display()))?;
      let list = words::read_words(input)
        .with_context(|| format!("failed to read {}", file.display()))?;
      let read = list.len();
      let added = store.import_words(list).await?;
      tracing::info!(read, added, "imported word list");
      println!("Read {read} words, added {added} new.");
      Ok(())
    }
    Command::Reset { used, yes } => {
      let store = open_store(&load_config(&cli.config)?).await?;
      let state = if used { "used" } else { "unused" };
      if !yes
        && !(confirm(&format!("Are you sure you want to reset all words to {state}?"))?
          && confirm("ARE YOU SURE?")?)
      {
        println!("Aborted.");
        return Ok(());
      }
      let touched = store.reset_progress(used).await?;
      tracing::warn!(touched, used, "pool progress reset");
      println!("Marked {touched} words {state}.");
      Ok(())
    }
    Command::Longest { limit } => {
      let store = open_store(&load_config(&cli.config)?).await?;
      for entry in store.longest_words(limit).await? {
        println!("{} long: {}", entry.word.chars().count(), entry.word);
      }
      Ok(())
    }
    Command::Recent { limit } => {
      let store = open_store(&load_config(&cli.config)?).await?;
      for visitor in store.recent_visitors(limit).await? {
        println!("{}", render::recent_visitor(&visitor));
      }
      Ok(())
    }
  }
}

fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  ServerConfig::load(path).context("failed to load configuration")
}

async fn open_store(config: &ServerConfig) -> anyhow::Result<SqliteStore> {
  let store_path = expand_tilde(&config.store_path);
  SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))
}

async fn serve(store: SqliteStore, config: ServerConfig) -> anyhow::Result<()> {
  let address = format!("{}:{}", config.host, config.port);

  if config.admin_password_hash.is_empty() {
    tracing::warn!("admin_password_hash is empty; admin routes will reject every request");
  }

  let state = AppState::new(store, &config).context("invalid configuration")?;
  tracing::info!(
    interval_secs = state.policy.interval.num_seconds(),
    char_budget = state.policy.char_budget,
    hashed_ids = state.identity.hash_iterations.is_some(),
    "draw policy loaded"
  );

  let app = wordpool_server::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
    .await
    .context("server error")?;

  Ok(())
}

fn hash_password() -> anyhow::Result<()> {
  let password = prompt("Password: ")?;
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
    .to_string();
  println!("{hash}");
  Ok(())
}

fn hash_ips(file: &Path, iterations: u32) -> anyhow::Result<()> {
  let input = File::open(file)
    .with_context(|| format!("failed to open {}", file.display()))?;
  for address in words::read_first_fields(input)? {
    println!("{}", sha256_iterate(address.as_bytes(), iterations)?);
  }
  Ok(())
}

/// Print `label` and read one line from stdin.
fn prompt(label: &str) -> anyhow::Result<String> {
  let stdin = io::stdin();
  print!("{label}");
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

fn confirm(question: &str) -> anyhow::Result<bool> {
  let answer = prompt(&format!("{question} y/n\n"))?;
  Ok(answer.trim().eq_ignore_ascii_case("y"))
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
