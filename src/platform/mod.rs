//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (`input::KeyLatch`)
//! - The question modal (`QuizView`)

pub mod input;

pub use input::KeyLatch;

use crate::sim::{GameEvent, GameState};

/// Whatever shows the question modal
///
/// The DOM front end implements it on wasm; tests use a recorder.
pub trait QuizView {
    fn show_question(&mut self, prompt: &str, options: &[String]);
    fn disable_option(&mut self, index: usize);
    fn hide_question(&mut self);
}

/// Forward drained platformer events to the modal
pub fn present_quiz_events<V: QuizView + ?Sized>(view: &mut V, state: &GameState, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::QuestionOpened { .. } => {
                if let Some(open) = &state.quiz {
                    view.show_question(&open.question.prompt, &open.question.options);
                }
            }
            GameEvent::OptionDisabled { option } => view.disable_option(*option),
            GameEvent::QuestionClosed => view.hide_question(),
            _ => {}
        }
    }
}
