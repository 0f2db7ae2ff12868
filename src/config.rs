use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub gesture: GestureSettings,
    #[serde(default)]
    pub deck: DeckSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub chat: ChatSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Swipe gesture thresholds
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GestureSettings {
    /// Horizontal displacement (in card-space units) a drag must exceed
    /// to commit a decision
    #[serde(default = "default_distance_threshold")]
    pub distance_threshold: f64,
    /// Release velocity (units/sec) that commits a fling even under the
    /// distance threshold
    #[serde(default = "default_velocity_threshold")]
    pub velocity_threshold: f64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            distance_threshold: default_distance_threshold(),
            velocity_threshold: default_velocity_threshold(),
        }
    }
}

fn default_distance_threshold() -> f64 { 110.0 }
fn default_velocity_threshold() -> f64 { 500.0 }

/// Deck fill sizes and pacing
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DeckSettings {
    #[serde(default = "default_initial_fill")]
    pub initial_fill: usize,
    #[serde(default = "default_refill_batch")]
    pub refill_batch: usize,
    /// Not-yet-decided depth that triggers a background refill
    #[serde(default = "default_low_water_mark")]
    pub low_water_mark: usize,
    /// Pause between a recorded decision and the queue advance, reserved
    /// for the exit animation
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl DeckSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Default for DeckSettings {
    fn default() -> Self {
        Self {
            initial_fill: default_initial_fill(),
            refill_batch: default_refill_batch(),
            low_water_mark: default_low_water_mark(),
            settle_ms: default_settle_ms(),
        }
    }
}

fn default_initial_fill() -> usize { 5 }
fn default_refill_batch() -> usize { 3 }
fn default_low_water_mark() -> usize { 3 }
fn default_settle_ms() -> u64 { 200 }

/// Match policy settings
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MatchingSettings {
    /// Probability of a mutual match per accepted candidate, used by the
    /// stand-in random policy
    #[serde(default = "default_match_probability")]
    pub match_probability: f64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            match_probability: default_match_probability(),
        }
    }
}

fn default_match_probability() -> f64 { 0.4 }

/// Conversation settings
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ChatSettings {
    /// Delay before the simulated counterpart reply is delivered
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
}

impl ChatSettings {
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            reply_delay_ms: default_reply_delay_ms(),
        }
    }
}

fn default_reply_delay_ms() -> u64 { 2000 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with VIBE_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with VIBE_)
            // e.g., VIBE_DECK__SETTLE_MS -> deck.settle_ms
            .add_source(
                Environment::with_prefix("VIBE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("VIBE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_gesture_thresholds() {
        let gesture = GestureSettings::default();
        assert_eq!(gesture.distance_threshold, 110.0);
        assert_eq!(gesture.velocity_threshold, 500.0);
    }

    #[test]
    fn test_default_deck_settings() {
        let deck = DeckSettings::default();
        assert_eq!(deck.initial_fill, 5);
        assert_eq!(deck.refill_batch, 3);
        assert_eq!(deck.low_water_mark, 3);
        assert_eq!(deck.settle_delay(), Duration::from_millis(200));
    }

    #[test]
    fn test_default_matching_and_chat() {
        let settings = Settings::default();
        assert_eq!(settings.matching.match_probability, 0.4);
        assert_eq!(settings.chat.reply_delay(), Duration::from_millis(2000));
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }
}
