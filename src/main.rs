// ===============================
// src/main.rs
// ===============================
mod api;
mod config;
mod domain;
mod play;
mod recorder;
mod render;
mod slider;
mod store;

use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::api::ApiClient;
use crate::store::GameStore;

#[tokio::main]
async fn main() {
    // ---- Logging ----
    // Logs go to stderr so they do not mix with the game screen.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rentquest=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // ---- Load config ----
    let args = config::load(config::Cli::parse());
    info!(
        api_url = %args.api_url,
        rounds = args.total_rounds,
        player = ?args.player_name,
        record_file = ?args.record_file,
        "startup config"
    );

    // ---- API client ----
    let client = match ApiClient::new(&args.api_url, Duration::from_secs(args.http_timeout_secs)) {
        Ok(c) => c,
        Err(e) => {
            error!(%e, api_url = %args.api_url, "bad backend configuration");
            std::process::exit(2);
        }
    };

    // ---- Recorder (optional) ----
    let events = args.record_file.clone().map(|path| {
        let (tx, rx) = mpsc::channel::<domain::GameEvent>(256);
        tokio::spawn(recorder::run(rx, path));
        tx
    });

    // ---- Session ----
    let store = GameStore::new(client.clone(), args.total_rounds);
    if let Err(e) = play::run(&store, &client, &args, events).await {
        error!(%e, "session aborted");
        std::process::exit(1);
    }
}
