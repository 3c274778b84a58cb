//! Roadwise - a traffic-rules trainer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, collisions, level rules, quiz)
//! - `config`: Injected tuning for every game variant
//! - `questions`: Bundled traffic-law question bank
//! - `platform`: Browser/native input and UI collaborator seams

pub mod config;
pub mod error;
pub mod platform;
pub mod questions;
pub mod sim;

pub use config::{DriveConfig, GameConfig, PlatformerConfig, Preset, QuizConfig};
pub use error::ConfigError;

use std::time::Duration;

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Fixed simulation rate (ticks per second)
    pub const SIM_HZ: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: Duration = Duration::from_nanos(16_666_667);
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Visible world dimensions (canvas size)
    pub const WORLD_WIDTH: f32 = 1000.0;
    pub const WORLD_HEIGHT: f32 = 560.0;

    /// Platformer avatar defaults
    pub const AVATAR_WIDTH: f32 = 40.0;
    pub const AVATAR_HEIGHT: f32 = 48.0;
    pub const AVATAR_START_X: f32 = 120.0;
    pub const AVATAR_START_Y: f32 = WORLD_HEIGHT - 160.0;

    /// Platform slab thickness
    pub const PLATFORM_THICKNESS: f32 = 14.0;
    /// Hard cap on live platforms
    pub const MAX_PLATFORMS: usize = 1200;

    /// Vehicle box (driving mode)
    pub const VEHICLE_LENGTH: f32 = 60.0;
    pub const VEHICLE_WIDTH: f32 = 30.0;

    /// Road band the vehicle is kept inside (driving mode)
    pub const ROAD_TOP: f32 = 220.0;
    pub const ROAD_BOTTOM: f32 = 340.0;

    /// Score awarded for clearing a driving level
    pub const LEVEL_REWARD: u32 = 100;
    /// Lives at the start of a driving session
    pub const START_LIVES: u8 = 3;
}

/// Milliseconds as a `Duration` (config files store plain integers)
#[inline]
pub fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Move `current` a fraction of the way toward `target`
#[inline]
pub fn approach(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}
