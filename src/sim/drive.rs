//! Driving course session
//!
//! Owns lives, score and level progression around a `DriveWorld`. The front
//! end calls `drive_tick` once per fixed step and drains `events`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::kinematics::DriveControls;
use super::levels::{level_info, DriveWorld, LevelId, Outcome, RuleViolationKind, LEVELS};
use crate::config::DriveConfig;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrivePhase {
    Running,
    /// A rule was broken; the level restarts on acknowledgment or timeout
    Notice {
        kind: RuleViolationKind,
        remaining: Duration,
    },
    /// All levels cleared
    Won,
    /// Out of lives
    Lost,
}

/// Input for one driving tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveInput {
    pub controls: DriveControls,
    /// Dismiss the violation notice
    pub acknowledge: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriveEvent {
    LevelStarted { level: LevelId },
    RuleViolation { level: LevelId, kind: RuleViolationKind },
    LevelCleared { level: LevelId, score: u32 },
    Won { score: u32 },
    Lost { score: u32 },
}

#[derive(Debug, Clone)]
pub struct DriveSession {
    pub level: LevelId,
    pub world: DriveWorld,
    pub phase: DrivePhase,
    pub score: u32,
    pub lives: u8,
    pub config: DriveConfig,
    /// Pending events for the front end
    pub events: Vec<DriveEvent>,
}

impl DriveSession {
    /// Fresh session at level 1
    pub fn new(config: &DriveConfig) -> Self {
        let first = &LEVELS[0];
        let mut session = Self {
            level: first.id,
            world: first.kind.setup(config),
            phase: DrivePhase::Running,
            score: 0,
            lives: config.start_lives,
            config: config.clone(),
            events: Vec::new(),
        };
        session.events.push(DriveEvent::LevelStarted { level: first.id });
        log::info!("Driving session started ({} lives)", session.lives);
        session
    }

    /// Fresh session starting at an arbitrary level (practice mode)
    pub fn start_at(config: &DriveConfig, level: LevelId) -> Option<Self> {
        level_info(level)?;
        let mut session = Self::new(config);
        session.events.clear();
        session.load_level(level);
        Some(session)
    }

    pub fn current_level(&self) -> LevelId {
        self.level
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, DrivePhase::Won | DrivePhase::Lost)
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<DriveEvent> {
        std::mem::take(&mut self.events)
    }

    /// Set up `level` from scratch and resume running
    fn load_level(&mut self, level: LevelId) {
        let Some(info) = level_info(level) else {
            log::error!("No level with id {}", level);
            return;
        };
        self.level = level;
        self.world = info.kind.setup(&self.config);
        self.phase = DrivePhase::Running;
        self.events.push(DriveEvent::LevelStarted { level });
        log::info!("Level {}: {}", level, info.name);
    }

    fn fail(&mut self, kind: RuleViolationKind) {
        self.lives = self.lives.saturating_sub(1);
        self.events.push(DriveEvent::RuleViolation {
            level: self.level,
            kind,
        });
        log::warn!(
            "Level {} failed: {} ({} lives left)",
            self.level,
            kind.message(),
            self.lives
        );

        if self.lives == 0 {
            self.phase = DrivePhase::Lost;
            self.events.push(DriveEvent::Lost { score: self.score });
            log::info!("Game over with score {}", self.score);
        } else {
            self.phase = DrivePhase::Notice {
                kind,
                remaining: self.config.notice_timeout(),
            };
        }
    }

    fn clear_level(&mut self) {
        self.score += self.config.level_reward;
        self.events.push(DriveEvent::LevelCleared {
            level: self.level,
            score: self.score,
        });
        log::info!("Level {} cleared, score {}", self.level, self.score);

        let next = self.level + 1;
        if level_info(next).is_some() {
            self.load_level(next);
        } else {
            self.phase = DrivePhase::Won;
            self.events.push(DriveEvent::Won { score: self.score });
            log::info!("Course complete with score {}", self.score);
        }
    }
}

/// Advance the driving session by one fixed step
pub fn drive_tick(session: &mut DriveSession, input: &DriveInput, dt: Duration) {
    match session.phase {
        DrivePhase::Won | DrivePhase::Lost => return,
        DrivePhase::Notice { kind, remaining } => {
            let remaining = remaining.saturating_sub(dt);
            if input.acknowledge || remaining.is_zero() {
                session.load_level(session.level);
            } else {
                session.phase = DrivePhase::Notice { kind, remaining };
            }
            return;
        }
        DrivePhase::Running => {}
    }

    session.world.vehicle.step(&input.controls, &session.config);
    session.world.update(&session.config, dt);

    match session.world.check() {
        Outcome::Continue => {}
        Outcome::Success => session.clear_level(),
        Outcome::Fail(kind) => session.fail(kind),
    }
}
