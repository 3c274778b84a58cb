//! Platformer game state and core simulation types
//!
//! Everything the quiz platformer mutates per tick lives in `GameState`,
//! which is passed explicitly to `tick`.

use std::time::Duration;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::kinematics::Avatar;
use super::quiz::{ActiveQuestion, QuestionBank, QuizPicker};
use crate::config::{GameConfig, PlatformerConfig, QuizConfig};
use crate::error::ConfigError;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Running and jumping
    Playing,
    /// A question modal is open
    Question,
    /// Game is paused
    Paused,
}

/// Answer feedback shown on a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlatformState {
    /// Has a question waiting
    #[default]
    Neutral,
    Correct,
    Wrong,
}

/// A platform slab
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    pub rect: Rect,
    pub state: PlatformState,
    /// Session clock time at which the platform turns neutral again
    pub revert_at: Option<Duration>,
}

impl Platform {
    pub fn new(id: u32, rect: Rect) -> Self {
        Self {
            id,
            rect,
            state: PlatformState::Neutral,
            revert_at: None,
        }
    }

    /// Mark answered and schedule the reversion
    pub fn mark(&mut self, state: PlatformState, revert_at: Duration) {
        self.state = state;
        self.revert_at = Some(revert_at);
    }

    /// Back to neutral if the deadline passed. Returns true if it reverted.
    pub fn revert_if_due(&mut self, clock: Duration) -> bool {
        if self.state == PlatformState::Neutral {
            return false;
        }
        if super::timers::deadline_reached(self.revert_at, clock) {
            self.state = PlatformState::Neutral;
            self.revert_at = None;
            return true;
        }
        false
    }
}

/// The question currently on screen and the platform it belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenQuestion {
    pub platform_id: u32,
    pub question: ActiveQuestion,
}

/// Things the front end reacts to (drained each frame)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    QuestionOpened { platform_id: u32 },
    /// A wrong option was disabled but the question stays open
    OptionDisabled { option: usize },
    Answered { platform_id: u32, correct: bool, score: u32 },
    QuestionClosed,
    PlatformReverted { platform_id: u32 },
    /// Fell off the world and got put back on a platform
    Rescued,
}

/// Complete platformer state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Session clock (sum of tick dt)
    pub clock: Duration,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub player: Avatar,
    /// Platforms in spawn order (ascending x)
    pub platforms: Vec<Platform>,
    /// World x at the left edge of the screen
    pub camera_x: f32,
    pub score: u32,
    pub quiz: Option<OpenQuestion>,
    /// Platform the player stood on last tick
    pub standing_on: Option<u32>,
    pub bank: QuestionBank,
    pub picker: QuizPicker,
    pub tuning: PlatformerConfig,
    pub quiz_rules: QuizConfig,
    /// Pending events for the front end
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new game with the given seed, config and question bank
    pub fn new(seed: u64, config: &GameConfig, bank: QuestionBank) -> Self {
        let picker = QuizPicker::new(bank.len());
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            clock: Duration::ZERO,
            time_ticks: 0,
            phase: GamePhase::Playing,
            player: Avatar::default(),
            platforms: Vec::new(),
            camera_x: 0.0,
            score: 0,
            quiz: None,
            standing_on: None,
            bank,
            picker,
            tuning: config.platformer.clone(),
            quiz_rules: config.quiz.clone(),
            events: Vec::new(),
            next_id: 1,
        };

        super::tick::generate_initial_platforms(&mut state);
        log::info!(
            "Platformer started (seed {}, {} questions, {} platforms)",
            seed,
            state.bank.len(),
            state.platforms.len()
        );
        state
    }

    /// New game using the configured question bank grown to the configured size
    pub fn with_default_bank(seed: u64, config: &GameConfig) -> Result<Self, ConfigError> {
        let mut rng = Pcg32::seed_from_u64(seed ^ 0x5eed_0f_ba2c);
        let bank = crate::questions::configured_bank(&config.quiz, &mut rng)?;
        Ok(Self::new(seed, config, bank))
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn platform(&self, id: u32) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.id == id)
    }

    pub fn platform_mut(&mut self, id: u32) -> Option<&mut Platform> {
        self.platforms.iter_mut().find(|p| p.id == id)
    }

    /// Right edge of the furthest platform
    pub fn furthest_x(&self) -> f32 {
        self.platforms
            .iter()
            .map(|p| p.rect.right())
            .fold(f32::MIN, f32::max)
    }

    pub fn question_open(&self) -> bool {
        self.quiz.is_some()
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
