mod auth;
mod config;
mod db;
mod ipc;
mod model;
mod render;
mod repo;
mod telemetry;
mod templates;
mod translit;

use std::io::{self, BufRead, Write};

fn main() {
    let settings = config::Settings::from_env();
    if let Err(e) = telemetry::init_tracing(&settings) {
        eprintln!("examdeskd: logging disabled: {e}");
    }
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "examdeskd started");

    let mut state = ipc::AppState::new(settings);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "stdin closed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // No id to echo back.
                let resp = ipc::err("", "bad_json", e.to_string(), None);
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
    tracing::info!("examdeskd exiting");
}
