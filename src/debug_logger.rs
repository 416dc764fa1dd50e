// Debug logging module for per-frame decision logging
//
// Each committed frame is written to a JSONL file so a game can be replayed
// or diffed offline. The game loop is synchronous, so writes happen inline.

use log::error;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;

use crate::types::{Coord, Direction};

/// Represents a single debug log entry
#[derive(Debug, Serialize)]
struct DebugLogEntry {
    frame: u64,
    mode: String,
    chosen_move: Option<String>,
    ai_head: Coord,
    opponent_head: Option<Coord>,
    fruit: Coord,
    score: u32,
    timestamp: String,
}

pub struct DebugLogger {
    file: Option<File>,
    enabled: bool,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
        {
            Ok(file) => {
                log::info!("Debug logging enabled: {}", log_file_path);
                DebugLogger {
                    file: Some(file),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create debug log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger {
            file: None,
            enabled: false,
        }
    }

    /// Writes one frame's decision as a JSON line
    #[allow(clippy::too_many_arguments)]
    pub fn log_frame(
        &mut self,
        frame: u64,
        mode: &str,
        chosen_move: Option<Direction>,
        ai_head: Coord,
        opponent_head: Option<Coord>,
        fruit: Coord,
        score: u32,
    ) {
        if !self.enabled {
            return;
        }

        let entry = DebugLogEntry {
            frame,
            mode: mode.to_string(),
            chosen_move: chosen_move.map(|d| d.as_str().to_string()),
            ai_head,
            opponent_head,
            fruit,
            score,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        if let Some(file) = self.file.as_mut() {
            match serde_json::to_string(&entry) {
                Ok(json_line) => {
                    let line_with_newline = format!("{}\n", json_line);
                    if let Err(e) = file.write_all(line_with_newline.as_bytes()) {
                        error!("Failed to write debug log entry: {}", e);
                    } else if let Err(e) = file.flush() {
                        error!("Failed to flush debug log: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize debug log entry: {}", e);
                }
            }
        }
    }
}
