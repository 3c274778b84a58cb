//! Game configuration
//!
//! Every tuning knob that used to differ between copies of the game lives
//! here. All sections use `#[serde(default)]` so a config file only needs
//! the fields it changes. Persisted to LocalStorage in the browser.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::millis;
use crate::sim::quiz::AnswerPolicy;
use crate::sim::timers::HoldPolicy;

/// Named bundles of rule strictness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Preset {
    Relaxed,
    #[default]
    Standard,
    Strict,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Relaxed => "Relaxed",
            Preset::Standard => "Standard",
            Preset::Strict => "Strict",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relaxed" | "easy" => Some(Preset::Relaxed),
            "standard" | "std" => Some(Preset::Standard),
            "strict" | "hard" => Some(Preset::Strict),
            _ => None,
        }
    }
}

/// Side-scrolling quiz platformer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformerConfig {
    /// Added to vertical velocity every tick
    pub gravity: f32,
    /// Vertical velocity set by a jump (negative = up)
    pub jump_velocity: f32,
    /// Horizontal speed while a direction key is held
    pub run_speed: f32,
    /// Block all movement while a question is open (jumping is always blocked)
    pub freeze_controls_during_quiz: bool,
    /// Camera keeps the player this fraction of the screen from the left
    pub camera_lead: f32,
    /// Fraction of the remaining distance the camera closes each tick
    pub camera_smoothing: f32,
    /// How far below the screen the player may fall before being rescued
    pub fall_limit: f32,
}

impl Default for PlatformerConfig {
    fn default() -> Self {
        Self {
            gravity: 0.6,
            jump_velocity: -10.5,
            run_speed: 3.4,
            freeze_controls_during_quiz: true,
            camera_lead: 0.35,
            camera_smoothing: 0.12,
            fall_limit: 600.0,
        }
    }
}

/// Question scoring and bank
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    pub correct_points: u32,
    pub wrong_penalty: u32,
    /// Delay before an answered platform turns neutral again
    pub revert_delay_ms: u64,
    pub answer_policy: AnswerPolicy,
    /// Bank is grown with variants up to this many questions
    pub bank_size: usize,
    /// Replace the bundled bank (native only)
    pub bank_path: Option<String>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            correct_points: 10,
            wrong_penalty: 5,
            revert_delay_ms: 9000,
            answer_policy: AnswerPolicy::RetryWrong,
            bank_size: 400,
            bank_path: None,
        }
    }
}

impl QuizConfig {
    pub fn revert_delay(&self) -> Duration {
        millis(self.revert_delay_ms)
    }
}

/// Driving course
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    pub accel: f32,
    pub brake: f32,
    /// Speed multiplier per tick with no throttle input
    pub friction: f32,
    pub max_speed: f32,
    pub max_reverse: f32,
    /// Speeds below this snap to zero and count as stationary
    pub stop_epsilon: f32,
    /// Heading change per tick at full speed (radians)
    pub steer_rate: f32,
    pub max_heading: f32,
    /// Minimum stop-hold before entering an intersection
    pub stop_hold_ms: u64,
    pub hold_policy: HoldPolicy,
    pub speed_limit: f32,
    pub school_speed_limit: f32,
    pub light_red_ticks: u32,
    pub light_green_ticks: u32,
    /// Priority traffic closer than this to the conflict zone must be yielded to
    pub yield_window: f32,
    /// Violation notice auto-dismisses after this long
    pub notice_timeout_ms: u64,
    pub level_reward: u32,
    pub start_lives: u8,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            accel: 0.12,
            brake: 0.25,
            friction: 0.97,
            max_speed: 6.0,
            max_reverse: 2.0,
            stop_epsilon: 0.05,
            steer_rate: 0.04,
            max_heading: 0.35,
            stop_hold_ms: 2000,
            hold_policy: HoldPolicy::Latch,
            speed_limit: 4.5,
            school_speed_limit: 3.0,
            light_red_ticks: 240,
            light_green_ticks: 180,
            yield_window: 220.0,
            notice_timeout_ms: 2500,
            level_reward: crate::consts::LEVEL_REWARD,
            start_lives: crate::consts::START_LIVES,
        }
    }
}

impl DriveConfig {
    pub fn stop_hold(&self) -> Duration {
        millis(self.stop_hold_ms)
    }

    pub fn notice_timeout(&self) -> Duration {
        millis(self.notice_timeout_ms)
    }
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GameConfig {
    pub preset: Preset,
    pub platformer: PlatformerConfig,
    pub quiz: QuizConfig,
    pub drive: DriveConfig,
}

impl GameConfig {
    /// Create config from a preset (applies preset defaults)
    pub fn from_preset(preset: Preset) -> Self {
        let mut config = Self::default();
        config.apply_preset(preset);
        config
    }

    /// Apply a preset on top of the current values
    pub fn apply_preset(&mut self, preset: Preset) {
        self.preset = preset;
        match preset {
            Preset::Relaxed => {
                self.drive.stop_hold_ms = 900;
                self.drive.speed_limit = 5.0;
                self.drive.hold_policy = HoldPolicy::Latch;
                self.quiz.revert_delay_ms = 5000;
                self.quiz.answer_policy = AnswerPolicy::RetryWrong;
                self.platformer.freeze_controls_during_quiz = false;
            }
            Preset::Standard => {
                self.drive.stop_hold_ms = 2000;
                self.drive.speed_limit = 4.5;
                self.drive.hold_policy = HoldPolicy::Latch;
                self.quiz.revert_delay_ms = 9000;
            }
            Preset::Strict => {
                self.drive.stop_hold_ms = 2000;
                self.drive.speed_limit = 4.0;
                self.drive.hold_policy = HoldPolicy::Rearm;
                self.quiz.revert_delay_ms = 10_000;
                self.quiz.answer_policy = AnswerPolicy::SingleAttempt;
                self.platformer.freeze_controls_during_quiz = true;
            }
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would make the game unplayable
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: &str) -> ConfigError {
            ConfigError::InvalidValue {
                field,
                reason: reason.to_string(),
            }
        }

        let p = &self.platformer;
        if p.gravity <= 0.0 {
            return Err(invalid("platformer.gravity", "must be positive"));
        }
        if p.jump_velocity >= 0.0 {
            return Err(invalid("platformer.jump_velocity", "must be negative (upward)"));
        }
        if !(0.0..=1.0).contains(&p.camera_smoothing) {
            return Err(invalid("platformer.camera_smoothing", "must be within 0..=1"));
        }

        let d = &self.drive;
        if d.max_speed <= 0.0 {
            return Err(invalid("drive.max_speed", "must be positive"));
        }
        if d.max_reverse < 0.0 {
            return Err(invalid("drive.max_reverse", "must not be negative"));
        }
        if !(d.friction > 0.0 && d.friction <= 1.0) {
            return Err(invalid("drive.friction", "must be within (0, 1]"));
        }
        if !(d.max_heading >= 0.0) {
            return Err(invalid("drive.max_heading", "must not be negative"));
        }
        if d.stop_epsilon <= 0.0 {
            return Err(invalid("drive.stop_epsilon", "must be positive"));
        }
        if d.speed_limit <= 0.0 || d.school_speed_limit <= 0.0 {
            return Err(invalid("drive.speed_limit", "must be positive"));
        }
        if d.light_red_ticks == 0 || d.light_green_ticks == 0 {
            return Err(invalid("drive.light_ticks", "phases must last at least one tick"));
        }
        if d.start_lives == 0 {
            return Err(invalid("drive.start_lives", "must be at least 1"));
        }

        if self.quiz.revert_delay_ms == 0 {
            return Err(invalid("quiz.revert_delay_ms", "must be positive"));
        }
        Ok(())
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "roadwise_config";

    /// Load config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded config from LocalStorage ({})", config.preset.as_str());
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring stored config: {}", e),
                }
            }
        }

        log::info!("Using default config");
        Self::default()
    }

    /// Save config to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Config saved");
            }
        }
    }

    /// Native: read the path if given, otherwise defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_or_default(path: Option<&str>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::from_json_file(path) {
            Ok(config) => {
                log::info!("Loaded config from {} ({})", path, config.preset.as_str());
                config
            }
            Err(e) => {
                log::warn!("Could not load {}: {}; using defaults", path, e);
                Self::default()
            }
        }
    }
}
