//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only, timers accumulate the tick `dt`
//! - Seeded RNG only
//! - Stable iteration order (spawn order / level table order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod drive;
pub mod kinematics;
pub mod levels;
pub mod quiz;
pub mod state;
pub mod tick;
pub mod timers;

pub use collision::{Rect, landing_from_above, topmost_landing};
pub use drive::{DriveEvent, DriveInput, DrivePhase, DriveSession, drive_tick};
pub use kinematics::{Avatar, DriveControls, Vehicle};
pub use levels::{
    DriveWorld, LEVELS, LevelId, LevelInfo, LevelKind, Npc, NpcKind, NpcPath, Outcome,
    RuleViolationKind, level_info,
};
pub use quiz::{ActiveQuestion, AnswerPolicy, AnswerResult, Question, QuestionBank, QuizPicker};
pub use state::{GameEvent, GamePhase, GameState, OpenQuestion, Platform, PlatformState};
pub use tick::{TickInput, generate_initial_platforms, tick};
pub use timers::{HoldPolicy, LightPhase, StopHold, TrafficLight};
