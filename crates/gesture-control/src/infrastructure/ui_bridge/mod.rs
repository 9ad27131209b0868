//! Command bridge: exposes controller operations to the host UI.
//!
//! Every command is a plain `async fn` that receives the shared [`AppState`]
//! and returns a [`CommandResult`].  A desktop shell or a web bridge can wire
//! them to its own invoke mechanism; the Application and Domain layers never
//! import this module.
//!
//! # Data Transfer Objects (DTOs)
//!
//! Internal types (`SessionState`, `ScreenPoint`, `Uuid`) are flattened into
//! JSON-friendly DTOs (`StatusDto`, `GestureSettingsDto`) before they cross the
//! bridge.  Any change to a DTO here must be mirrored in the UI's type
//! definitions.
//!
//! # `CommandResult<T>` wrapper
//!
//! All commands return `CommandResult<T>` rather than `Result<T, E>`, so every
//! response has the same shape:
//! `{ success: bool, data: T | null, error: string | null }`.

use std::path::PathBuf;
use std::sync::Arc;

use gesture_core::Viewport;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use crate::application::capture_session::SessionState;
use crate::application::controller::GestureController;
use crate::infrastructure::storage::config::{save_config_to, AppConfig};

// ── Shared application state ──────────────────────────────────────────────────

/// State shared between command handlers.
///
/// Both fields use the async Tokio mutex because `GestureController`
/// methods await session teardown while the lock is held.  When both locks
/// are needed, `config` is taken first.
pub struct AppState {
    pub config: Mutex<AppConfig>,
    pub controller: Mutex<GestureController>,
    /// Where settings changes are persisted; `None` keeps them in memory.
    pub config_path: Option<PathBuf>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        controller: GestureController,
        config_path: Option<PathBuf>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config: Mutex::new(config),
            controller: Mutex::new(controller),
            config_path,
        })
    }
}

// ── Data Transfer Objects ─────────────────────────────────────────────────────

/// Everything the pointer overlay needs to render.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusDto {
    pub enabled: bool,
    pub session_id: Option<String>,
    /// One of `"none"`, `"idle"`, `"initializing"`, `"ready"`, `"error"`, `"stopped"`.
    pub session_state: String,
    pub model_loaded: bool,
    pub hand_visible: bool,
    pub pinching: bool,
    pub grabbing: bool,
    pub cursor_x: Option<f64>,
    pub cursor_y: Option<f64>,
    /// Human-readable status line.
    pub message: String,
}

/// Tunable gesture settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GestureSettingsDto {
    pub pinch_threshold: f32,
    pub grab_threshold: f32,
    pub edge_low: f32,
    pub edge_high: f32,
    pub scroll_step: f64,
}

/// Unified response wrapper used by all commands.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

fn state_label(state: Option<&SessionState>) -> &'static str {
    match state {
        None => "none",
        Some(SessionState::Idle) => "idle",
        Some(SessionState::Initializing) => "initializing",
        Some(SessionState::Ready) => "ready",
        Some(SessionState::Error(_)) => "error",
        Some(SessionState::Stopped) => "stopped",
    }
}

/// Builds the overlay snapshot.  While hand control is off the last session's
/// gesture readings are not reported.
fn status_dto(controller: &GestureController) -> StatusDto {
    let enabled = controller.is_enabled();
    let status = controller.status();
    let session_state = controller.session_state();
    let message = if enabled {
        status.line().to_string()
    } else {
        "Hand control off".to_string()
    };
    let cursor = status.cursor.filter(|_| enabled);
    StatusDto {
        enabled,
        session_id: controller.session_id().map(|id| id.to_string()),
        session_state: state_label(session_state.as_ref()).to_string(),
        model_loaded: status.model_loaded,
        hand_visible: enabled && status.hand_visible,
        pinching: enabled && status.pinching,
        grabbing: enabled && status.grabbing,
        cursor_x: cursor.map(|c| c.x),
        cursor_y: cursor.map(|c| c.y),
        message,
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Returns the current tracking status.
///
/// # Example (frontend)
/// ```ts
/// const status = await invoke<CommandResult<StatusDto>>('get_status');
/// ```
pub async fn get_status(state: Arc<AppState>) -> CommandResult<StatusDto> {
    let controller = state.controller.lock().await;
    CommandResult::ok(status_dto(&controller))
}

/// Turns hand control on or off and returns the resulting status.
pub async fn set_hand_control(state: Arc<AppState>, enabled: bool) -> CommandResult<StatusDto> {
    let mut controller = state.controller.lock().await;
    controller.set_enabled(enabled).await;
    CommandResult::ok(status_dto(&controller))
}

/// Informs the controller of a new viewport size.
pub async fn resize_viewport(state: Arc<AppState>, width: f64, height: f64) -> CommandResult<()> {
    if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
        return CommandResult::err(format!("invalid viewport {width}x{height}"));
    }
    let controller = state.controller.lock().await;
    controller.resize(Viewport::new(width, height));
    CommandResult::ok(())
}

/// Returns the gesture settings currently in effect.
pub async fn get_gesture_settings(state: Arc<AppState>) -> CommandResult<GestureSettingsDto> {
    let cfg = state.config.lock().await;
    CommandResult::ok(GestureSettingsDto {
        pinch_threshold: cfg.gesture.pinch_threshold,
        grab_threshold: cfg.gesture.grab_threshold,
        edge_low: cfg.gesture.edge_low,
        edge_high: cfg.gesture.edge_high,
        scroll_step: cfg.gesture.scroll_step,
    })
}

/// Validates, persists, and applies new gesture settings.
///
/// A running session is restarted so the new settings take effect.
pub async fn update_gesture_settings(
    state: Arc<AppState>,
    settings: GestureSettingsDto,
) -> CommandResult<()> {
    let mut cfg = state.config.lock().await;
    let mut updated = cfg.clone();
    updated.gesture.pinch_threshold = settings.pinch_threshold;
    updated.gesture.grab_threshold = settings.grab_threshold;
    updated.gesture.edge_low = settings.edge_low;
    updated.gesture.edge_high = settings.edge_high;
    updated.gesture.scroll_step = settings.scroll_step;

    if let Err(e) = updated.validate() {
        return CommandResult::err(e.to_string());
    }
    if let Some(path) = &state.config_path {
        if let Err(e) = save_config_to(path, &updated) {
            return CommandResult::err(format!("failed to save config: {e}"));
        }
    }

    let mut controller = state.controller.lock().await;
    let mut session_config = updated.session_config();
    session_config.step.viewport = controller.viewport();
    controller.set_session_config(session_config);
    if controller.is_enabled() {
        info!("gesture settings changed; restarting capture session");
        controller.activate().await;
    }
    *cfg = updated;
    CommandResult::ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::controller::CaptureBackend;
    use crate::application::track_gestures::{EventSink, TargetLocator};
    use crate::infrastructure::headless::{DemoBackend, NoTargets, TracingEventSink};
    use std::time::Duration;
    use uuid::Uuid;

    /// Creates a test-isolated AppState that never touches the real config file.
    fn make_state(config_path: Option<PathBuf>) -> Arc<AppState> {
        let config = AppConfig::default();
        let mut session_config = config.session_config();
        session_config.frame_interval = Duration::from_millis(5);
        let controller = GestureController::new(
            Arc::new(DemoBackend::default()) as Arc<dyn CaptureBackend>,
            session_config,
            Arc::new(TracingEventSink) as Arc<dyn EventSink>,
            Arc::new(NoTargets) as Arc<dyn TargetLocator>,
        );
        AppState::new(config, controller, config_path)
    }

    #[tokio::test]
    async fn test_get_status_before_activation() {
        // Arrange
        let state = make_state(None);

        // Act
        let result = get_status(state).await;

        // Assert
        assert!(result.success);
        let dto = result.data.unwrap();
        assert!(!dto.enabled);
        assert_eq!(dto.session_state, "none");
        assert_eq!(dto.message, "Hand control off");
        assert_eq!(dto.cursor_x, None);
    }

    #[tokio::test]
    async fn test_set_hand_control_toggles_session() {
        // Arrange
        let state = make_state(None);

        // Act
        let on = set_hand_control(Arc::clone(&state), true).await.data.unwrap();
        let off = set_hand_control(Arc::clone(&state), false).await.data.unwrap();

        // Assert
        assert!(on.enabled);
        assert!(on.session_id.is_some());
        assert!(!off.enabled);
        assert_eq!(off.session_state, "stopped");
        assert_eq!(on.session_id, off.session_id);
    }

    #[tokio::test]
    async fn test_status_after_switch_off_reports_no_tracking() {
        // Arrange: run the scripted hand until it is visible.
        let state = make_state(None);
        set_hand_control(Arc::clone(&state), true).await;
        let seen = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let dto = get_status(Arc::clone(&state)).await.data.unwrap();
                if dto.hand_visible {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(seen.is_ok(), "scripted hand never became visible");

        // Act
        let off = set_hand_control(Arc::clone(&state), false).await.data.unwrap();

        // Assert
        assert!(!off.enabled);
        assert!(!off.hand_visible);
        assert!(!off.pinching);
        assert!(!off.grabbing);
        assert_eq!(off.cursor_x, None);
        assert_eq!(off.cursor_y, None);
        assert_eq!(off.message, "Hand control off");
    }

    #[tokio::test]
    async fn test_resize_viewport_rejects_non_positive_size() {
        let state = make_state(None);
        let result = resize_viewport(Arc::clone(&state), 0.0, 600.0).await;
        assert!(!result.success);
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn test_resize_viewport_updates_controller() {
        let state = make_state(None);
        let result = resize_viewport(Arc::clone(&state), 1280.0, 720.0).await;
        assert!(result.success);
        assert_eq!(
            state.controller.lock().await.viewport(),
            Viewport::new(1280.0, 720.0)
        );
    }

    #[tokio::test]
    async fn test_get_gesture_settings_returns_defaults() {
        let state = make_state(None);
        let dto = get_gesture_settings(state).await.data.unwrap();
        assert_eq!(dto.pinch_threshold, 0.08);
        assert_eq!(dto.grab_threshold, 0.4);
        assert_eq!(dto.scroll_step, 15.0);
    }

    #[tokio::test]
    async fn test_update_gesture_settings_rejects_invalid_bands() {
        // Arrange
        let state = make_state(None);
        let settings = GestureSettingsDto {
            pinch_threshold: 0.08,
            grab_threshold: 0.4,
            edge_low: 0.7,
            edge_high: 0.3,
            scroll_step: 15.0,
        };

        // Act
        let result = update_gesture_settings(Arc::clone(&state), settings).await;

        // Assert
        assert!(!result.success);
        assert_eq!(state.config.lock().await.gesture.edge_low, 0.15, "config unchanged");
    }

    #[tokio::test]
    async fn test_update_gesture_settings_persists_and_restarts() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("gesture_bridge_{}", Uuid::new_v4()));
        let path = dir.join("config.toml");
        let state = make_state(Some(path.clone()));
        let before = set_hand_control(Arc::clone(&state), true).await.data.unwrap();
        let settings = GestureSettingsDto {
            pinch_threshold: 0.06,
            grab_threshold: 0.35,
            edge_low: 0.1,
            edge_high: 0.9,
            scroll_step: 25.0,
        };

        // Act
        let result = update_gesture_settings(Arc::clone(&state), settings).await;

        // Assert
        assert!(result.success, "got error: {:?}", result.error);
        let saved = std::fs::read_to_string(&path).expect("config written");
        assert!(saved.contains("scroll_step = 25.0"));
        let after = get_status(Arc::clone(&state)).await.data.unwrap();
        assert_ne!(before.session_id, after.session_id, "session restarted");

        // Cleanup
        set_hand_control(Arc::clone(&state), false).await;
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_command_result_ok_sets_success_true() {
        let r: CommandResult<i32> = CommandResult::ok(42);
        assert!(r.success);
        assert_eq!(r.data.unwrap(), 42);
        assert!(r.error.is_none());
    }

    #[test]
    fn test_command_result_err_sets_success_false() {
        let r: CommandResult<i32> = CommandResult::err("something went wrong");
        assert!(!r.success);
        assert!(r.data.is_none());
        assert_eq!(r.error.unwrap(), "something went wrong");
    }
}
