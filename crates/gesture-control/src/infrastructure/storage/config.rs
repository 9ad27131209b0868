//! TOML-based configuration persistence for the gesture controller.
//!
//! Reads and writes `AppConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\GestureControl\config.toml`
//! - Linux:    `~/.config/gesture-control/config.toml`
//! - macOS:    `~/Library/Application Support/GestureControl/config.toml`
//!
//! # What is TOML? (for beginners)
//!
//! TOML (Tom's Obvious Minimal Language) is a configuration file format designed
//! to be easy to read and write.  It looks similar to INI files but with more
//! data types.  Example:
//!
//! ```toml
//! [gesture]
//! pinch_threshold = 0.08
//! edge_low = 0.15
//!
//! [capture]
//! frame_rate = 30
//! delegate = "GPU"
//! ```
//!
//! # Serde default values
//!
//! Every field carries `#[serde(default = "some_fn")]`, and every section is
//! `#[serde(default)]`, so an empty file (or no file at all) yields the same
//! configuration as `AppConfig::default()`.  Older files that lack newer
//! fields keep working.

use std::path::{Path, PathBuf};
use std::time::Duration;

use gesture_core::domain::gesture::{DEFAULT_GRAB_THRESHOLD, DEFAULT_PINCH_THRESHOLD};
use gesture_core::domain::intent::{DEFAULT_EDGE_HIGH, DEFAULT_EDGE_LOW, DEFAULT_SCROLL_STEP};
use gesture_core::{EdgeScrollConfig, GestureThresholds, StepConfig, Viewport};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::capture_session::SessionConfig;
use crate::infrastructure::landmark_source::{
    Delegate, DetectorOptions, RunningMode, DEFAULT_MODEL_ASSET_PATH, DEFAULT_RUNTIME_BASE_PATH,
};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value parsed fine but is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level application configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub gesture: GestureSection,
    #[serde(default)]
    pub capture: CaptureSection,
    #[serde(default)]
    pub viewport: ViewportSection,
}

/// General application behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppSection {
    /// Schema version string – bump when breaking changes are introduced.
    #[serde(default = "default_version")]
    pub version: String,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Whether hand control starts switched on.
    #[serde(default = "default_true")]
    pub hand_control_enabled: bool,
}

/// Gesture thresholds and edge-scroll bands, in normalised camera units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GestureSection {
    /// Thumb-to-index distance below which the hand is pinching.
    #[serde(default = "default_pinch_threshold")]
    pub pinch_threshold: f32,
    /// Mean fingertip-to-wrist distance below which the hand is a fist.
    #[serde(default = "default_grab_threshold")]
    pub grab_threshold: f32,
    /// Raw index-tip `x` below which the gallery scrolls forward.
    #[serde(default = "default_edge_low")]
    pub edge_low: f32,
    /// Raw index-tip `x` above which the gallery scrolls back.
    #[serde(default = "default_edge_high")]
    pub edge_high: f32,
    /// Scroll amount per frame while parked in an edge band.
    #[serde(default = "default_scroll_step")]
    pub scroll_step: f64,
}

/// Camera and detector settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureSection {
    /// Frames processed per second.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    #[serde(default = "default_model_asset_path")]
    pub model_asset_path: String,
    #[serde(default = "default_runtime_base_path")]
    pub runtime_base_path: String,
    #[serde(default)]
    pub delegate: Delegate,
    /// Hands the detector looks for.  Only the first is used.
    #[serde(default = "default_num_hands")]
    pub num_hands: u8,
}

/// Initial viewport size in pixels.  Hosts update it on resize.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewportSection {
    #[serde(default = "default_viewport_width")]
    pub width: f64,
    #[serde(default = "default_viewport_height")]
    pub height: f64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_version() -> String {
    "1.0".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_pinch_threshold() -> f32 {
    DEFAULT_PINCH_THRESHOLD
}
fn default_grab_threshold() -> f32 {
    DEFAULT_GRAB_THRESHOLD
}
fn default_edge_low() -> f32 {
    DEFAULT_EDGE_LOW
}
fn default_edge_high() -> f32 {
    DEFAULT_EDGE_HIGH
}
fn default_scroll_step() -> f64 {
    DEFAULT_SCROLL_STEP
}
fn default_frame_rate() -> u32 {
    30
}
fn default_model_asset_path() -> String {
    DEFAULT_MODEL_ASSET_PATH.to_string()
}
fn default_runtime_base_path() -> String {
    DEFAULT_RUNTIME_BASE_PATH.to_string()
}
fn default_num_hands() -> u8 {
    1
}
fn default_viewport_width() -> f64 {
    1920.0
}
fn default_viewport_height() -> f64 {
    1080.0
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            version: default_version(),
            log_level: default_log_level(),
            hand_control_enabled: default_true(),
        }
    }
}

impl Default for GestureSection {
    fn default() -> Self {
        Self {
            pinch_threshold: default_pinch_threshold(),
            grab_threshold: default_grab_threshold(),
            edge_low: default_edge_low(),
            edge_high: default_edge_high(),
            scroll_step: default_scroll_step(),
        }
    }
}

impl Default for CaptureSection {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            model_asset_path: default_model_asset_path(),
            runtime_base_path: default_runtime_base_path(),
            delegate: Delegate::default(),
            num_hands: default_num_hands(),
        }
    }
}

impl Default for ViewportSection {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

// ── Derived runtime settings ──────────────────────────────────────────────────

impl AppConfig {
    /// Checks value ranges that TOML parsing alone cannot enforce.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.gesture;
        if !(g.pinch_threshold.is_finite() && g.pinch_threshold > 0.0) {
            return Err(invalid("gesture.pinch_threshold must be a positive number"));
        }
        if !(g.grab_threshold.is_finite() && g.grab_threshold > 0.0) {
            return Err(invalid("gesture.grab_threshold must be a positive number"));
        }
        if !(0.0..=1.0).contains(&g.edge_low)
            || !(0.0..=1.0).contains(&g.edge_high)
            || g.edge_low >= g.edge_high
        {
            return Err(invalid(
                "gesture.edge_low and gesture.edge_high must satisfy 0 <= low < high <= 1",
            ));
        }
        if !(g.scroll_step.is_finite() && g.scroll_step > 0.0) {
            return Err(invalid("gesture.scroll_step must be a positive number"));
        }
        if !(1..=240).contains(&self.capture.frame_rate) {
            return Err(invalid("capture.frame_rate must be between 1 and 240"));
        }
        if self.capture.num_hands == 0 {
            return Err(invalid("capture.num_hands must be at least 1"));
        }
        let v = &self.viewport;
        if !(v.width.is_finite() && v.width > 0.0 && v.height.is_finite() && v.height > 0.0) {
            return Err(invalid("viewport width and height must be positive"));
        }
        Ok(())
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport.width, self.viewport.height)
    }

    /// Settings for the pure per-frame step function.
    pub fn step_config(&self) -> StepConfig {
        StepConfig {
            thresholds: GestureThresholds {
                pinch: self.gesture.pinch_threshold,
                grab: self.gesture.grab_threshold,
            },
            edge: EdgeScrollConfig {
                low: self.gesture.edge_low,
                high: self.gesture.edge_high,
                step: self.gesture.scroll_step,
            },
            viewport: self.viewport(),
        }
    }

    /// Settings for one capture session.
    pub fn session_config(&self) -> SessionConfig {
        let rate = self.capture.frame_rate.max(1);
        SessionConfig {
            frame_interval: Duration::from_micros(1_000_000 / u64::from(rate)),
            detector: DetectorOptions {
                model_asset_path: self.capture.model_asset_path.clone(),
                runtime_base_path: self.capture.runtime_base_path.clone(),
                delegate: self.capture.delegate,
                running_mode: RunningMode::Video,
                num_hands: self.capture.num_hands,
            },
            step: self.step_config(),
        }
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_string())
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the platform config file.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads and validates `AppConfig` from `path`, returning
/// `AppConfig::default()` if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// [`ConfigError::Parse`] if the TOML is malformed, and
/// [`ConfigError::Invalid`] for out-of-range values.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let cfg = match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str::<AppConfig>(&content)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
        Err(e) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Persists `config` to the platform config file.
///
/// # Errors
///
/// See [`save_config_to`].
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(&config_file_path()?, config)
}

/// Persists `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Resolves the platform config base directory plus the app subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("GestureControl"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("gesture-control"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("GestureControl")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
