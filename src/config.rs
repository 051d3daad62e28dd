// ===============================
// src/config.rs
// ===============================
use std::env;

use clap::Parser;
use dotenvy::dotenv;

/// Command-line flags. Every flag overrides the matching env var.
#[derive(Debug, Parser)]
#[command(name = "rentquest", about = "Guess the rent of real NYC listings from your terminal")]
pub struct Cli {
    /// Backend origin, e.g. http://localhost:8000
    #[arg(long)]
    pub api_url: Option<String>,

    /// Rounds per session
    #[arg(long)]
    pub rounds: Option<u32>,

    /// Player name for the leaderboard
    #[arg(long)]
    pub player: Option<String>,

    /// JSONL event log path (off when unset)
    #[arg(long)]
    pub record_file: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Args {
    pub api_url: String,
    pub total_rounds: u32,
    pub player_name: Option<String>,
    pub record_file: Option<String>,
    pub http_timeout_secs: u64,
}

pub fn load(cli: Cli) -> Args {
    // Read .env first so RENTQUEST_API_URL, RECORD_FILE etc. are visible
    let _ = dotenv();

    let api_url = cli
        .api_url
        .or_else(|| env::var("RENTQUEST_API_URL").ok())
        .unwrap_or_else(|| "http://localhost:8000".to_string());

    let total_rounds = cli
        .rounds
        .or_else(|| env::var("TOTAL_ROUNDS").ok().and_then(|s| s.parse().ok()))
        .unwrap_or(5)
        .max(1);

    let player_name = cli
        .player
        .or_else(|| env::var("PLAYER_NAME").ok())
        .filter(|s| !s.trim().is_empty());

    let record_file = cli.record_file.or_else(|| env::var("RECORD_FILE").ok());

    let http_timeout_secs = env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(10);

    Args {
        api_url,
        total_rounds,
        player_name,
        record_file,
        http_timeout_secs,
    }
}
