//! Gesture-control headless entry point.
//!
//! Runs the full pipeline (capture session, gesture tracking, host
//! callbacks) against a synthetic camera and either the scripted demo hand or
//! a recorded detector log.  Useful for trying thresholds and watching the
//! event stream without a browser.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config_from()          -- TOML settings (+ CLI overrides)
//!  └─ GestureController::new()    -- DemoBackend, TracingEventSink, NoTargets
//!  └─ AppState::new()             -- shared with the ui_bridge commands
//!  └─ set_hand_control(true)      -- starts the capture session task
//!  └─ event pump                  -- logs every GestureEvent as JSON
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use gesture_control::application::controller::{CaptureBackend, GestureController};
use gesture_control::application::track_gestures::{EventSink, TargetLocator};
use gesture_control::infrastructure::headless::{DemoBackend, NoTargets, TracingEventSink};
use gesture_control::infrastructure::storage::config::{
    config_file_path, load_config_from, AppConfig,
};
use gesture_control::infrastructure::ui_bridge::{
    get_status, resize_viewport, set_hand_control, AppState,
};
use gesture_core::protocol::encode_event;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Headless hand-gesture pointer control.
#[derive(Debug, Parser)]
#[command(
    name = "gesture-control",
    about = "Drives the hand-gesture pointer pipeline with a synthetic camera",
    version
)]
struct Cli {
    /// Path to the TOML config file.  Defaults to the platform config directory.
    #[arg(long, env = "GESTURE_CONFIG")]
    config: Option<PathBuf>,

    /// Viewport width in pixels (overrides `[viewport] width`).
    #[arg(long)]
    width: Option<f64>,

    /// Viewport height in pixels (overrides `[viewport] height`).
    #[arg(long)]
    height: Option<f64>,

    /// Replay a JSON-lines detector recording instead of the scripted hand.
    #[arg(long, env = "GESTURE_REPLAY")]
    replay: Option<PathBuf>,

    /// Stop after this many seconds.  Runs until Ctrl-C when absent.
    #[arg(long, env = "GESTURE_DURATION_SECS")]
    duration_secs: Option<u64>,

    /// Print every gesture event as a JSON line on stdout.
    #[arg(long)]
    events: bool,
}

impl Cli {
    /// Resolves the config path: the `--config` flag, else the platform default.
    fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => config_file_path().context("no --config given and no platform config dir"),
        }
    }

    /// Applies viewport overrides to `config`.
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(width) = self.width {
            config.viewport.width = width;
        }
        if let Some(height) = self.height {
            config.viewport.height = height;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Configuration ─────────────────────────────────────────────────────────
    let config_path = cli.config_path()?;
    let mut config = load_config_from(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    cli.apply_overrides(&mut config);
    config.validate().context("invalid viewport override")?;

    // ── Logging setup ─────────────────────────────────────────────────────────
    //
    // `RUST_LOG` wins; otherwise the configured level applies.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.app.log_level)),
        )
        .init();

    info!("gesture-control starting (config {})", config_path.display());

    // ── Controller wiring ─────────────────────────────────────────────────────
    let backend = DemoBackend {
        recording: cli.replay.clone(),
        ..DemoBackend::default()
    };
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let controller = GestureController::new(
        Arc::new(backend) as Arc<dyn CaptureBackend>,
        config.session_config(),
        Arc::new(TracingEventSink) as Arc<dyn EventSink>,
        Arc::new(NoTargets) as Arc<dyn TargetLocator>,
    )
    .with_event_tap(event_tx);

    let enabled = config.app.hand_control_enabled;
    let viewport = config.viewport();
    let state = AppState::new(config, controller, Some(config_path));
    resize_viewport(Arc::clone(&state), viewport.width, viewport.height).await;

    // ── Event pump ────────────────────────────────────────────────────────────
    let print_events = cli.events;
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match encode_event(&event) {
                Ok(json) if print_events => println!("{json}"),
                Ok(json) => debug!("event {json}"),
                Err(e) => warn!("failed to encode gesture event: {e}"),
            }
        }
    });

    if enabled {
        let status = set_hand_control(Arc::clone(&state), true).await;
        if let Some(dto) = status.data {
            info!("hand control on (session {:?})", dto.session_id);
        }
    } else {
        info!("hand control disabled in config; nothing to do");
    }

    // ── Wait for Ctrl-C or the demo timeout ──────────────────────────────────
    let timeout = async {
        match cli.duration_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::select! {
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => info!("shutdown signal received"),
            Err(e) => warn!("failed to listen for Ctrl-C: {e}"),
        },
        _ = timeout => info!("demo duration elapsed"),
    }

    set_hand_control(Arc::clone(&state), false).await;
    if let Some(dto) = get_status(state).await.data {
        info!("final status: {} ({})", dto.message, dto.session_state);
    }
    info!("gesture-control stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_have_no_overrides() {
        // Arrange: parse with no arguments (all defaults apply)
        let cli = Cli::parse_from(["gesture-control"]);

        // Assert
        assert!(cli.width.is_none());
        assert!(cli.duration_secs.is_none());
        assert!(!cli.events);
    }

    #[test]
    fn test_cli_viewport_overrides_apply_to_config() {
        // Arrange
        let cli = Cli::parse_from(["gesture-control", "--width", "1000", "--height", "800"]);
        let mut config = AppConfig::default();

        // Act
        cli.apply_overrides(&mut config);

        // Assert
        assert_eq!(config.viewport.width, 1000.0);
        assert_eq!(config.viewport.height, 800.0);
    }

    #[test]
    fn test_cli_explicit_config_path_is_used() {
        let cli = Cli::parse_from(["gesture-control", "--config", "/tmp/gesture.toml"]);
        assert_eq!(
            cli.config_path().unwrap(),
            PathBuf::from("/tmp/gesture.toml")
        );
    }
}
