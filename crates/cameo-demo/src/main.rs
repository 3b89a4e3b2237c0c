//! Cameo: live capture with edge stroking and film-curve grading.
//!
//! Plays an image sequence (or a generated test pattern) through the filter
//! pipeline into a headless preview window. Keys are scripted with
//! `CAMEO_KEYS`: space snapshots, tab toggles recording, escape quits.

mod app;
mod config;
mod error;

use std::process::ExitCode;

use cameo_capture::SystemClock;
use tracing::{error, info};

use crate::app::{Cameo, open_source};
use crate::config::AppConfig;
use crate::error::DemoError;

fn main() -> ExitCode {
    let config = AppConfig::default();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.parse().unwrap_or_default()),
        )
        .init();

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "cameo failed");
            ExitCode::FAILURE
        }
    }
}

fn run(config: AppConfig) -> Result<(), DemoError> {
    info!(
        input = ?config.input,
        fps = config.fps,
        max_frames = config.max_frames,
        mirror = config.mirror,
        "starting cameo"
    );
    let source = open_source(&config)?;
    let mut app = Cameo::new(config, source, Box::new(SystemClock))?;
    let summary = app.run()?;
    info!(
        frames = summary.frames,
        shown = app.window().shown_count(),
        fps = ?app.session().fps_estimate(),
        window_closed = summary.window_closed,
        "done"
    );
    Ok(())
}
