//! Configuration loading and typed config structures for the Tally chart.
//!
//! The canonical configuration lives in `tally-config.yaml` at the project
//! root. Every field has a default, so a partial (or empty) file is valid and
//! a missing file yields [`TallyConfig::default`].

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::interpolate::Easing;
use crate::palette::SCHEME_SET3;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level chart configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TallyConfig {
    /// Chart dimensions and styling.
    #[serde(default)]
    pub chart: ChartConfig,

    /// Transition timing.
    #[serde(default)]
    pub animation: AnimationConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TallyConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `TALLY_HOST` overrides `server.host`
    /// - `TALLY_PORT` overrides `server.port` (ignored if not a valid port)
    /// - `TALLY_LOG` overrides `logging.level`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise start from defaults.
    ///
    /// Environment overrides are applied in both cases.
    ///
    /// # Errors
    ///
    /// Same as [`TallyConfig::from_file`] when the file exists.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// An empty document yields the defaults. No environment overrides are
    /// applied here so that parsing stays deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Override settings with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("TALLY_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("TALLY_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(level) = lookup("TALLY_LOG") {
            self.logging.level = level;
        }
    }
}

/// Chart dimensions and styling.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChartConfig {
    /// Chart area width in pixels.
    #[serde(default = "default_width")]
    pub width: f64,

    /// Chart area height in pixels.
    #[serde(default = "default_height")]
    pub height: f64,

    /// Outer radius of the ring.
    #[serde(default = "default_radius")]
    pub radius: f64,

    /// Inner radius of the ring; 0 draws a plain pie.
    #[serde(default = "default_inner_radius")]
    pub inner_radius: f64,

    /// Stroke colour drawn between slices.
    #[serde(default = "default_stroke")]
    pub stroke: String,

    /// Stroke width in pixels.
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,

    /// Fill used while a slice is hovered.
    #[serde(default = "default_highlight_fill")]
    pub highlight_fill: String,

    /// Colour range of the ordinal scale over record names.
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
}

impl ChartConfig {
    /// Centre of the ring inside the SVG canvas.
    pub fn centre(&self) -> (f64, f64) {
        (self.width / 2.0 + 5.0, self.height / 2.0 + 5.0)
    }

    /// SVG canvas size, leaving a margin around the chart area.
    pub fn canvas_size(&self) -> (f64, f64) {
        (self.width + 150.0, self.height + 150.0)
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            radius: default_radius(),
            inner_radius: default_inner_radius(),
            stroke: default_stroke(),
            stroke_width: default_stroke_width(),
            highlight_fill: default_highlight_fill(),
            palette: default_palette(),
        }
    }
}

/// Transition timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnimationConfig {
    /// Length of every enter, persist and exit transition.
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,

    /// Interval between animation frames while transitions are in flight.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Time-to-progress curve.
    #[serde(default)]
    pub easing: Easing,
}

impl AnimationConfig {
    /// Transition length.
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Frame interval, never shorter than one millisecond.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_duration_ms(),
            frame_interval_ms: default_frame_interval_ms(),
            easing: Easing::default(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSettings {
    /// `host:port` string suitable for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_width() -> f64 {
    300.0
}

const fn default_height() -> f64 {
    300.0
}

const fn default_radius() -> f64 {
    150.0
}

const fn default_inner_radius() -> f64 {
    75.0
}

fn default_stroke() -> String {
    "#fff".to_owned()
}

const fn default_stroke_width() -> f64 {
    3.0
}

fn default_highlight_fill() -> String {
    "#fff".to_owned()
}

fn default_palette() -> Vec<String> {
    SCHEME_SET3.iter().map(|&c| c.to_owned()).collect()
}

const fn default_duration_ms() -> u64 {
    750
}

const fn default_frame_interval_ms() -> u64 {
    16
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}
