//! Fixed timestep platformer tick
//!
//! Order per tick: quiz input -> movement -> landing -> camera -> platform
//! stream -> reversion -> fall rescue.

use std::time::Duration;

use rand::Rng;

use super::collision::{Rect, topmost_landing};
use super::quiz::{ActiveQuestion, AnswerResult};
use super::state::{GameEvent, GamePhase, GameState, OpenQuestion, Platform, PlatformState};
use crate::approach;
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Option pressed in the question modal (display order)
    pub answer: Option<usize>,
    /// Close the question without answering
    pub dismiss: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: Duration) {
    // Handle pause toggle
    if input.pause {
        state.phase = match state.phase {
            GamePhase::Paused if state.question_open() => GamePhase::Question,
            GamePhase::Paused => GamePhase::Playing,
            _ => GamePhase::Paused,
        };
    }
    if state.phase == GamePhase::Paused {
        return;
    }

    state.time_ticks += 1;
    state.clock += dt;

    if state.question_open() {
        if let Some(option) = input.answer {
            handle_answer(state, option);
        } else if input.dismiss {
            close_question(state);
        }
    }

    update_player(state, input);
    update_camera(state);
    spawn_ahead(state);
    cull_behind(state);
    revert_platforms(state);
    rescue_if_fallen(state);

    // Never let the player walk back off screen
    let min_x = state.camera_x + 10.0;
    if state.player.pos.x < min_x {
        state.player.pos.x = min_x;
    }
}

/// Movement, gravity and landing
fn update_player(state: &mut GameState, input: &TickInput) {
    let open = state.question_open();
    let frozen = open && state.tuning.freeze_controls_during_quiz;

    if frozen {
        state.player.steer(false, false, state.tuning.run_speed);
    } else {
        state.player.steer(input.left, input.right, state.tuning.run_speed);
    }
    if input.jump && !open {
        state.player.try_jump(state.tuning.jump_velocity);
    }

    let prev_bottom = state.player.bottom();
    state.player.integrate(&state.tuning);

    state.player.on_ground = false;
    let body = state.player.rect();
    let vel_y = state.player.vel.y;
    let landed = topmost_landing(prev_bottom, &body, vel_y, state.platforms.iter().map(|p| &p.rect));

    let Some(index) = landed else {
        state.standing_on = None;
        return;
    };

    let platform_rect = state.platforms[index].rect;
    let platform_id = state.platforms[index].id;
    let neutral = state.platforms[index].state == PlatformState::Neutral;
    state.player.land_on(&platform_rect);

    // Only a fresh landing asks a question
    let fresh = state.standing_on != Some(platform_id);
    state.standing_on = Some(platform_id);
    if fresh && neutral && !state.question_open() {
        open_question(state, platform_id);
    }
}

/// Pick a question and show it for the platform
fn open_question(state: &mut GameState, platform_id: u32) {
    let index = state.picker.pick(&mut state.rng);
    let Some(question) = state.bank.get(index) else {
        return;
    };
    let question = ActiveQuestion::present(index, question, &mut state.rng);
    log::debug!("Question {} opened on platform {}", index, platform_id);

    state.quiz = Some(OpenQuestion {
        platform_id,
        question,
    });
    state.phase = GamePhase::Question;
    state.events.push(GameEvent::QuestionOpened { platform_id });
}

fn close_question(state: &mut GameState) {
    state.quiz = None;
    state.phase = GamePhase::Playing;
    state.events.push(GameEvent::QuestionClosed);
}

/// Score an answer and colour the platform
fn handle_answer(state: &mut GameState, option: usize) {
    let Some(open) = state.quiz.as_mut() else {
        return;
    };
    let platform_id = open.platform_id;
    let result = open.question.answer(option, state.quiz_rules.answer_policy);

    let (correct, closes) = match result {
        AnswerResult::Ignored => return,
        AnswerResult::Correct => (true, true),
        AnswerResult::Wrong { closes } => (false, closes),
    };

    if correct {
        state.score += state.quiz_rules.correct_points;
    } else {
        state.score = state.score.saturating_sub(state.quiz_rules.wrong_penalty);
    }

    let revert_at = state.clock + state.quiz_rules.revert_delay();
    let mark = if correct {
        PlatformState::Correct
    } else {
        PlatformState::Wrong
    };
    if let Some(platform) = state.platform_mut(platform_id) {
        platform.mark(mark, revert_at);
    }

    log::debug!(
        "Platform {} answered {} (score {})",
        platform_id,
        if correct { "correctly" } else { "wrong" },
        state.score
    );
    state.events.push(GameEvent::Answered {
        platform_id,
        correct,
        score: state.score,
    });

    if closes {
        close_question(state);
    } else {
        state.events.push(GameEvent::OptionDisabled { option });
    }
}

/// Smooth follow; the camera only ever scrolls right
fn update_camera(state: &mut GameState) {
    let follow_x = state.player.pos.x - WORLD_WIDTH * state.tuning.camera_lead;
    if follow_x > state.camera_x {
        state.camera_x = approach(state.camera_x, follow_x, state.tuning.camera_smoothing);
    }
}

fn push_platform(state: &mut GameState, x: f32, y: f32, w: f32) {
    let id = state.next_entity_id();
    state
        .platforms
        .push(Platform::new(id, Rect::new(x, y, w, PLATFORM_THICKNESS)));
}

fn rand_between(state: &mut GameState, low: i32, high: i32) -> f32 {
    state.rng.random_range(low..high) as f32
}

/// Starting floor plus a first run of platforms
pub fn generate_initial_platforms(state: &mut GameState) {
    state.platforms.clear();
    push_platform(state, 50.0, WORLD_HEIGHT - 80.0, 220.0);

    let mut x = 300.0;
    for _ in 0..12 {
        let w = rand_between(state, 100, 180);
        let y = WORLD_HEIGHT - rand_between(state, 120, 300);
        push_platform(state, x, y, w);
        x += rand_between(state, 180, 320);
    }
}

/// Add one platform when the stream runs short of two screens ahead
fn spawn_ahead(state: &mut GameState) {
    if state.platforms.len() >= MAX_PLATFORMS {
        return;
    }
    let furthest = state.furthest_x();
    if furthest >= state.camera_x + WORLD_WIDTH * 2.0 {
        return;
    }

    let x = furthest + rand_between(state, 120, 300);
    let w = rand_between(state, 90, 170);
    let y = WORLD_HEIGHT - rand_between(state, 100, 320);
    push_platform(state, x, y, w);
    log::trace!("Spawned platform at x={} ({} live)", x, state.platforms.len());
}

/// Drop platforms a full screen behind the camera
fn cull_behind(state: &mut GameState) {
    let limit = state.camera_x - WORLD_WIDTH;
    let keep_id = state.quiz.as_ref().map(|q| q.platform_id);
    state
        .platforms
        .retain(|p| p.rect.right() > limit || Some(p.id) == keep_id);
}

fn revert_platforms(state: &mut GameState) {
    let clock = state.clock;
    for platform in state.platforms.iter_mut() {
        if platform.revert_if_due(clock) {
            state.events.push(GameEvent::PlatformReverted {
                platform_id: platform.id,
            });
        }
    }
}

/// Put the player back on a visible platform after a long fall
fn rescue_if_fallen(state: &mut GameState) {
    if state.player.pos.y <= WORLD_HEIGHT + state.tuning.fall_limit {
        return;
    }

    let window_end = state.camera_x + WORLD_WIDTH * 0.8;
    let safe = state
        .platforms
        .iter()
        .find(|p| p.rect.left() > state.camera_x && p.rect.left() < window_end)
        .map(|p| p.rect);

    let player = &mut state.player;
    match safe {
        Some(rect) => {
            player.pos.x = rect.left() + 10.0;
            player.pos.y = rect.top() - player.size.y - 2.0;
        }
        None => {
            player.pos.x = state.camera_x + 120.0;
            player.pos.y = AVATAR_START_Y;
        }
    }
    player.vel.y = 0.0;
    state.standing_on = None;
    log::info!("Player fell off the world, rescued at x={:.0}", player.pos.x);
    state.events.push(GameEvent::Rescued);
}
