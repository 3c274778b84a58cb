//! Keyboard latch
//!
//! Browser key events arrive between frames; the latch keeps the held state
//! of each key (by `KeyboardEvent.key` name) and queues one-shot presses until
//! a tick consumes them.

use std::collections::HashMap;

use crate::sim::{DriveControls, DriveInput, TickInput};

#[derive(Debug, Clone, Default)]
pub struct KeyLatch {
    held: HashMap<String, bool>,
    answer: Option<usize>,
    acknowledge: bool,
    dismiss: bool,
    pause: bool,
}

impl KeyLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// `keydown`. Auto-repeat events are ignored.
    pub fn key_down(&mut self, key: &str, repeat: bool) {
        if repeat {
            return;
        }
        self.held.insert(key.to_string(), true);

        match key {
            "1" | "2" | "3" | "4" => {
                self.answer = key.parse::<usize>().ok().map(|n| n - 1);
            }
            "Enter" => self.acknowledge = true,
            "Escape" => self.dismiss = true,
            "p" | "P" => self.pause = true,
            _ => {}
        }
    }

    /// `keyup`
    pub fn key_up(&mut self, key: &str) {
        self.held.insert(key.to_string(), false);
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.get(key).copied().unwrap_or(false)
    }

    /// Release everything (window lost focus)
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    /// Queue an answer from a clicked modal button
    pub fn press_answer(&mut self, option: usize) {
        self.answer = Some(option);
    }

    /// Close button on the question modal
    pub fn press_dismiss(&mut self) {
        self.dismiss = true;
    }

    pub fn press_pause(&mut self) {
        self.pause = true;
    }

    /// Platformer input for the next tick
    pub fn tick_input(&self) -> TickInput {
        TickInput {
            left: self.is_held("ArrowLeft"),
            right: self.is_held("ArrowRight"),
            jump: self.is_held(" ") || self.is_held("ArrowUp"),
            answer: self.answer,
            dismiss: self.dismiss,
            pause: self.pause,
        }
    }

    /// Driving input for the next tick
    ///
    /// The road runs left to right: right accelerates, left brakes and up/down
    /// change lane.
    pub fn drive_input(&self) -> DriveInput {
        DriveInput {
            controls: DriveControls {
                accelerate: self.is_held("ArrowRight"),
                brake: self.is_held("ArrowLeft") || self.is_held(" "),
                steer_left: self.is_held("ArrowUp"),
                steer_right: self.is_held("ArrowDown"),
            },
            acknowledge: self.acknowledge,
        }
    }

    /// Drop one-shot presses after the first tick has seen them
    pub fn clear_one_shots(&mut self) {
        self.answer = None;
        self.acknowledge = false;
        self.dismiss = false;
        self.pause = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_keys_map_to_movement() {
        let mut keys = KeyLatch::new();
        keys.key_down("ArrowRight", false);
        keys.key_down(" ", false);
        let input = keys.tick_input();
        assert!(input.right && input.jump && !input.left);

        keys.key_up(" ");
        assert!(!keys.tick_input().jump);
        assert!(keys.tick_input().right);
    }

    #[test]
    fn test_repeat_is_ignored() {
        let mut keys = KeyLatch::new();
        keys.key_down("2", true);
        assert_eq!(keys.tick_input().answer, None);
        assert!(!keys.is_held("2"));
    }

    #[test]
    fn test_digits_select_answers_once() {
        let mut keys = KeyLatch::new();
        keys.key_down("3", false);
        assert_eq!(keys.tick_input().answer, Some(2));
        keys.clear_one_shots();
        assert_eq!(keys.tick_input().answer, None);
    }

    #[test]
    fn test_close_button_dismisses_once() {
        let mut keys = KeyLatch::new();
        keys.press_dismiss();
        assert!(keys.tick_input().dismiss);
        keys.clear_one_shots();
        assert!(!keys.tick_input().dismiss);

        keys.key_down("Escape", false);
        assert!(keys.tick_input().dismiss);
    }

    #[test]
    fn test_drive_mapping() {
        let mut keys = KeyLatch::new();
        keys.key_down("ArrowRight", false);
        keys.key_down("ArrowUp", false);
        keys.key_down("Enter", false);
        let input = keys.drive_input();
        assert!(input.controls.accelerate);
        assert!(input.controls.steer_left);
        assert!(!input.controls.brake);
        assert!(input.acknowledge);

        keys.clear_one_shots();
        keys.release_all();
        assert_eq!(keys.drive_input(), DriveInput::default());
    }
}
