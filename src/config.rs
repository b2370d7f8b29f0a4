//! Configuration System
//!
//! Every threshold and window size the analyzers use lives here, so they can
//! be tuned from a TOML file or the environment without touching control
//! flow. Environment variables override file values.

use crate::analysis::MIN_PATTERN_SAMPLES;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Thresholds for all analyzers, one section per analyzer
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub weekday: WeekdayConfig,

    #[serde(default)]
    pub trajectory: TrajectoryConfig,

    #[serde(default)]
    pub intervention: InterventionConfig,

    #[serde(default)]
    pub forecast: ForecastConfig,

    #[serde(default)]
    pub emotions: EmotionConfig,
}

/// Day-of-week aggregation thresholds
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WeekdayConfig {
    /// Samples a weekday needs before it gets a DayStat
    #[serde(default = "default_min_samples_per_day")]
    pub min_samples_per_day: usize,

    /// A weekday whose mean is below this is challenging
    #[serde(default = "default_challenging_mean_below")]
    pub challenging_mean_below: f64,

    /// Sample count at which confidence reaches 1.0
    #[serde(default = "default_confidence_saturation")]
    pub confidence_saturation_samples: f64,
}

fn default_min_samples_per_day() -> usize {
    MIN_PATTERN_SAMPLES
}

fn default_challenging_mean_below() -> f64 {
    -0.1
}

fn default_confidence_saturation() -> f64 {
    5.0
}

impl Default for WeekdayConfig {
    fn default() -> Self {
        Self {
            min_samples_per_day: default_min_samples_per_day(),
            challenging_mean_below: default_challenging_mean_below(),
            confidence_saturation_samples: default_confidence_saturation(),
        }
    }
}

/// Trajectory estimation windows
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TrajectoryConfig {
    /// Records in the recent window (and the consistency denominator)
    #[serde(default = "default_trajectory_window")]
    pub recent_window: usize,

    /// Records in the older comparison window
    #[serde(default = "default_trajectory_window")]
    pub older_window: usize,

    /// Noise floor a mean shift must exceed to count as a trend
    #[serde(default = "default_trend_margin")]
    pub trend_margin: f64,

    /// Trailing days counted for activity frequency
    #[serde(default = "default_activity_window_days")]
    pub activity_window_days: i64,

    /// Most recent echoes fetched for a trajectory request
    #[serde(default = "default_trajectory_history")]
    pub history_limit: usize,
}

fn default_trajectory_window() -> usize {
    14
}

fn default_trend_margin() -> f64 {
    0.1
}

fn default_activity_window_days() -> i64 {
    7
}

fn default_trajectory_history() -> usize {
    30
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            recent_window: default_trajectory_window(),
            older_window: default_trajectory_window(),
            trend_margin: default_trend_margin(),
            activity_window_days: default_activity_window_days(),
            history_limit: default_trajectory_history(),
        }
    }
}

/// Intervention rule thresholds
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct InterventionConfig {
    /// Most recent records the detector looks at
    #[serde(default = "default_intervention_window")]
    pub window_records: usize,

    /// Days of echoes the service fetches for the detector
    #[serde(default = "default_intervention_lookback")]
    pub lookback_days: i64,

    /// Fewer records than this is insufficient data
    #[serde(default = "default_min_records")]
    pub min_records: usize,

    /// A record below this counts as a low-mood day
    #[serde(default = "default_low_mood_below")]
    pub low_mood_below: f64,

    /// Low-mood days that trigger the declining-trend rule
    #[serde(default = "default_declining_min_low_days")]
    pub declining_min_low_days: usize,

    /// Window mean below this triggers the persistent-low rule
    #[serde(default = "default_persistent_low_below")]
    pub persistent_low_below: f64,

    /// Records averaged for the sudden-drop rule
    #[serde(default = "default_sudden_drop_records")]
    pub sudden_drop_records: usize,

    /// The recent mean must be below this for a sudden drop
    #[serde(default = "default_sudden_drop_below")]
    pub sudden_drop_below: f64,

    /// The recent mean must sit this far under the window mean
    #[serde(default = "default_sudden_drop_margin")]
    pub sudden_drop_margin: f64,

    /// Highest severity the detector reports
    #[serde(default = "default_max_severity")]
    pub max_severity: u8,

    #[serde(default = "default_persistent_low_severity")]
    pub persistent_low_severity: u8,

    #[serde(default = "default_sudden_drop_severity")]
    pub sudden_drop_severity: u8,
}

fn default_intervention_window() -> usize {
    7
}

fn default_intervention_lookback() -> i64 {
    7
}

fn default_min_records() -> usize {
    3
}

fn default_low_mood_below() -> f64 {
    -0.2
}

fn default_declining_min_low_days() -> usize {
    3
}

fn default_persistent_low_below() -> f64 {
    -0.3
}

fn default_sudden_drop_records() -> usize {
    3
}

fn default_sudden_drop_below() -> f64 {
    -0.2
}

fn default_sudden_drop_margin() -> f64 {
    0.3
}

fn default_max_severity() -> u8 {
    5
}

fn default_persistent_low_severity() -> u8 {
    3
}

fn default_sudden_drop_severity() -> u8 {
    4
}

impl Default for InterventionConfig {
    fn default() -> Self {
        Self {
            window_records: default_intervention_window(),
            lookback_days: default_intervention_lookback(),
            min_records: default_min_records(),
            low_mood_below: default_low_mood_below(),
            declining_min_low_days: default_declining_min_low_days(),
            persistent_low_below: default_persistent_low_below(),
            sudden_drop_records: default_sudden_drop_records(),
            sudden_drop_below: default_sudden_drop_below(),
            sudden_drop_margin: default_sudden_drop_margin(),
            max_severity: default_max_severity(),
            persistent_low_severity: default_persistent_low_severity(),
            sudden_drop_severity: default_sudden_drop_severity(),
        }
    }
}

/// Forecasting gate and alert settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ForecastConfig {
    /// Echoes required in the lookback before forecasting runs
    #[serde(default = "default_min_echoes")]
    pub min_echoes: usize,

    /// Days of history fetched for forecasting
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,

    /// Ranked challenging days turned into forecasts
    #[serde(default = "default_max_forecasts")]
    pub max_forecasts: usize,

    /// Forecasts this many days away or fewer become upcoming alerts
    #[serde(default = "default_alert_horizon_days")]
    pub alert_horizon_days: i64,

    /// Alerts this many days away or fewer are urgent
    #[serde(default = "default_urgent_within_days")]
    pub urgent_within_days: i64,
}

fn default_min_echoes() -> usize {
    14
}

fn default_lookback_days() -> i64 {
    60
}

fn default_max_forecasts() -> usize {
    2
}

fn default_alert_horizon_days() -> i64 {
    7
}

fn default_urgent_within_days() -> i64 {
    1
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            min_echoes: default_min_echoes(),
            lookback_days: default_lookback_days(),
            max_forecasts: default_max_forecasts(),
            alert_horizon_days: default_alert_horizon_days(),
            urgent_within_days: default_urgent_within_days(),
        }
    }
}

/// Emotion profile settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EmotionConfig {
    /// Most recent records profiled
    #[serde(default = "default_emotion_window")]
    pub window_records: usize,

    /// Dominant tags reported
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_emotion_window() -> usize {
    10
}

fn default_top_n() -> usize {
    3
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            window_records: default_emotion_window(),
            top_n: default_top_n(),
        }
    }
}

/// Orchestration settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServiceConfig {
    /// Upper bound on one narrative-generation call
    #[serde(default = "default_narrative_timeout")]
    pub narrative_timeout_secs: u64,
}

fn default_narrative_timeout() -> u64 {
    20
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            narrative_timeout_secs: default_narrative_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("echo-patterns").join("config.toml")),
            Some(PathBuf::from("/etc/echo-patterns/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Check that thresholds and windows are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.analysis;

        if a.weekday.min_samples_per_day < MIN_PATTERN_SAMPLES {
            return Err(ConfigError::Invalid(format!(
                "weekday.min_samples_per_day must be at least {}",
                MIN_PATTERN_SAMPLES
            )));
        }
        let saturation = a.weekday.confidence_saturation_samples;
        if !saturation.is_finite() || saturation <= 0.0 {
            return Err(ConfigError::Invalid(
                "weekday.confidence_saturation_samples must be positive".to_string(),
            ));
        }
        if a.trajectory.recent_window == 0 {
            return Err(ConfigError::Invalid(
                "trajectory.recent_window must be positive".to_string(),
            ));
        }
        if a.trajectory.history_limit < a.trajectory.recent_window + a.trajectory.older_window {
            return Err(ConfigError::Invalid(
                "trajectory.history_limit must cover both comparison windows".to_string(),
            ));
        }
        if a.trajectory.activity_window_days <= 0 {
            return Err(ConfigError::Invalid(
                "trajectory.activity_window_days must be positive".to_string(),
            ));
        }
        if a.intervention.window_records == 0 || a.intervention.min_records == 0 {
            return Err(ConfigError::Invalid(
                "intervention windows must be positive".to_string(),
            ));
        }
        if a.intervention.min_records > a.intervention.window_records {
            return Err(ConfigError::Invalid(
                "intervention.min_records cannot exceed intervention.window_records".to_string(),
            ));
        }
        if a.intervention.sudden_drop_records == 0
            || a.intervention.sudden_drop_records > a.intervention.window_records
        {
            return Err(ConfigError::Invalid(
                "intervention.sudden_drop_records must be within the window".to_string(),
            ));
        }
        let severities = [
            a.intervention.persistent_low_severity,
            a.intervention.sudden_drop_severity,
        ];
        if severities.iter().any(|s| *s > a.intervention.max_severity) {
            return Err(ConfigError::Invalid(
                "intervention severities cannot exceed max_severity".to_string(),
            ));
        }
        if a.forecast.lookback_days <= 0 || a.forecast.alert_horizon_days < 0 {
            return Err(ConfigError::Invalid(
                "forecast windows must be positive".to_string(),
            ));
        }

        let thresholds = [
            ("weekday.challenging_mean_below", a.weekday.challenging_mean_below),
            ("trajectory.trend_margin", a.trajectory.trend_margin),
            ("intervention.low_mood_below", a.intervention.low_mood_below),
            ("intervention.persistent_low_below", a.intervention.persistent_low_below),
            ("intervention.sudden_drop_below", a.intervention.sudden_drop_below),
            ("intervention.sudden_drop_margin", a.intervention.sudden_drop_margin),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{} must be finite", name)));
            }
        }

        Ok(())
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("ECHO_PATTERNS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("ECHO_PATTERNS_LOG_FORMAT") {
            self.logging.format = format;
        }

        if let Ok(timeout) = std::env::var("ECHO_PATTERNS_NARRATIVE_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                self.service.narrative_timeout_secs = t;
            }
        }

        if let Ok(min) = std::env::var("ECHO_PATTERNS_FORECAST_MIN_ECHOES") {
            if let Ok(m) = min.parse() {
                self.analysis.forecast.min_echoes = m;
            }
        }
        if let Ok(days) = std::env::var("ECHO_PATTERNS_FORECAST_LOOKBACK_DAYS") {
            if let Ok(d) = days.parse() {
                self.analysis.forecast.lookback_days = d;
            }
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# echo-patterns configuration
#
# Environment variables override these settings:
# - ECHO_PATTERNS_LOG_LEVEL
# - ECHO_PATTERNS_LOG_FORMAT
# - ECHO_PATTERNS_NARRATIVE_TIMEOUT_SECS
# - ECHO_PATTERNS_FORECAST_MIN_ECHOES
# - ECHO_PATTERNS_FORECAST_LOOKBACK_DAYS

[analysis.weekday]
# A weekday needs this many echoes before it is summarized
min_samples_per_day = 2

# Weekdays averaging below this are challenging
challenging_mean_below = -0.1

# Confidence reaches 1.0 at this many samples
confidence_saturation_samples = 5.0

[analysis.trajectory]
# Records compared: recent window vs the older window right behind it
recent_window = 14
older_window = 14

# Mean shift needed before a trend is reported
trend_margin = 0.1

# Trailing days counted for activity frequency
activity_window_days = 7

# Most recent echoes fetched per trajectory request
history_limit = 30

[analysis.intervention]
# Most recent echoes considered, and days fetched for them
window_records = 7
lookback_days = 7

# Below this many echoes the result is insufficient_data
min_records = 3

# Declining trend: this many echoes below low_mood_below
low_mood_below = -0.2
declining_min_low_days = 3

# Persistent low: window mean below this
persistent_low_below = -0.3

# Sudden drop: mean of the newest records below sudden_drop_below
# and more than sudden_drop_margin under the window mean
sudden_drop_records = 3
sudden_drop_below = -0.2
sudden_drop_margin = 0.3

max_severity = 5
persistent_low_severity = 3
sudden_drop_severity = 4

[analysis.forecast]
# Forecasting is skipped with fewer echoes than this in the lookback
min_echoes = 14
lookback_days = 60

# Top challenging days forecast
max_forecasts = 2

# Upcoming alert horizon and urgency cutoff (days)
alert_horizon_days = 7
urgent_within_days = 1

[analysis.emotions]
window_records = 10
top_n = 3

[service]
# Seconds to wait for the narrative generator before falling back
narrative_timeout_secs = 20

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
