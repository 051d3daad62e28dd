// ===============================
// src/recorder.rs
// ===============================
//
// Optional JSONL session log:
// - One line per GameEvent, timestamped, appended to RECORD_FILE.
// - BufWriter to keep syscalls down; flush every second or every few events.
// - Parent directory is created when missing.
// - On a write error, reopen the file once and keep going.
use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use tokio::{
    fs::{self, OpenOptions},
    io::{AsyncWriteExt, BufWriter},
    sync::mpsc,
    time::{interval, Duration, MissedTickBehavior},
};
use tracing::{error, info};

use crate::domain::GameEvent;

const FLUSH_EVERY: u32 = 16;

#[derive(Serialize)]
struct Recorded<'a> {
    ts_ms: i64,
    #[serde(flatten)]
    event: &'a GameEvent,
}

async fn open_writer(path: &str) -> std::io::Result<BufWriter<tokio::fs::File>> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(path).await?;
    Ok(BufWriter::new(file))
}

async fn write_line(
    writer: &mut BufWriter<tokio::fs::File>,
    event: &GameEvent,
) -> std::io::Result<()> {
    let line = serde_json::to_string(&Recorded {
        ts_ms: Utc::now().timestamp_millis(),
        event,
    })?;
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await
}

pub async fn run(mut rx: mpsc::Receiver<GameEvent>, path: String) {
    let mut writer = match open_writer(&path).await {
        Ok(w) => w,
        Err(e) => {
            error!(?e, %path, "recorder: open failed, session log disabled");
            return;
        }
    };
    info!(%path, "recorder: started");

    let mut tick = interval(Duration::from_secs(1));
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut pending: u32 = 0;

    loop {
        tokio::select! {
            maybe = rx.recv() => {
                let Some(event) = maybe else { break };
                if let Err(e) = write_line(&mut writer, &event).await {
                    error!(?e, %path, "recorder: write failed, reopening");
                    match open_writer(&path).await {
                        Ok(w) => {
                            writer = w;
                            if let Err(e) = write_line(&mut writer, &event).await {
                                error!(?e, "recorder: retry failed, event lost");
                            }
                        }
                        Err(e) => {
                            error!(?e, %path, "recorder: reopen failed, stopping");
                            return;
                        }
                    }
                }
                pending += 1;
                if pending >= FLUSH_EVERY {
                    let _ = writer.flush().await;
                    pending = 0;
                }
            }
            _ = tick.tick() => {
                if pending > 0 {
                    let _ = writer.flush().await;
                    pending = 0;
                }
            }
        }
    }

    let _ = writer.flush().await;
    info!(%path, "recorder: stopped");
}
