//! Per-tick kinematics for the two controllable bodies
//!
//! Both integrate once per fixed tick in world units per tick, so tuning
//! values match the frame-based numbers the game was balanced with.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::config::{DriveConfig, PlatformerConfig};
use crate::consts::*;

/// Platformer avatar: direct horizontal control, gravity and a jump impulse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Avatar {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub on_ground: bool,
}

impl Default for Avatar {
    fn default() -> Self {
        Self {
            pos: Vec2::new(AVATAR_START_X, AVATAR_START_Y),
            vel: Vec2::ZERO,
            size: Vec2::new(AVATAR_WIDTH, AVATAR_HEIGHT),
            on_ground: false,
        }
    }
}

impl Avatar {
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Set horizontal velocity from the held direction keys
    ///
    /// Left wins when both are held.
    pub fn steer(&mut self, left: bool, right: bool, run_speed: f32) {
        self.vel.x = if left {
            -run_speed
        } else if right {
            run_speed
        } else {
            0.0
        };
    }

    /// Jump if standing on something. Returns true if the jump happened.
    pub fn try_jump(&mut self, jump_velocity: f32) -> bool {
        if !self.on_ground {
            return false;
        }
        self.vel.y = jump_velocity;
        self.on_ground = false;
        true
    }

    /// Apply gravity and integrate position
    pub fn integrate(&mut self, cfg: &PlatformerConfig) {
        self.vel.y += cfg.gravity;
        self.pos += self.vel;
    }

    /// Snap onto a platform top
    pub fn land_on(&mut self, platform: &Rect) {
        self.pos.y = platform.top() - self.size.y;
        self.vel.y = 0.0;
        self.on_ground = true;
    }
}

/// Throttle/steering inputs for one driving tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveControls {
    pub accelerate: bool,
    pub brake: bool,
    pub steer_left: bool,
    pub steer_right: bool,
}

/// Driving vehicle: scalar speed along a heading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Top-left of the bounding box
    pub pos: Vec2,
    pub size: Vec2,
    /// Signed speed (negative = reversing), world units per tick
    pub speed: f32,
    /// Heading in radians, 0 = +x (down the road)
    pub heading: f32,
}

impl Vehicle {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            size: Vec2::new(VEHICLE_LENGTH, VEHICLE_WIDTH),
            speed: 0.0,
            heading: 0.0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    /// Reference point used for line crossings (front bumper)
    #[inline]
    pub fn front_x(&self) -> f32 {
        self.pos.x + self.size.x
    }

    pub fn is_stationary(&self, epsilon: f32) -> bool {
        self.speed.abs() < epsilon
    }

    /// Update speed from throttle input
    ///
    /// Accelerate and brake are additive when both are held; with neither,
    /// friction decays the speed. The result is clamped and tiny speeds snap
    /// to zero.
    pub fn apply_throttle(&mut self, controls: &DriveControls, cfg: &DriveConfig) {
        if controls.accelerate {
            self.speed += cfg.accel;
        }
        if controls.brake {
            self.speed -= cfg.brake;
        }
        if !controls.accelerate && !controls.brake {
            self.speed *= cfg.friction;
        }

        self.speed = self.speed.clamp(-cfg.max_reverse, cfg.max_speed);
        if self.speed.abs() < cfg.stop_epsilon {
            self.speed = 0.0;
        }
    }

    /// Rotate heading, scaled by how fast the car is moving
    pub fn apply_steering(&mut self, controls: &DriveControls, cfg: &DriveConfig) {
        let speed_fraction = if cfg.max_speed > 0.0 {
            self.speed / cfg.max_speed
        } else {
            0.0
        };
        let mut dir = 0.0;
        if controls.steer_left {
            dir -= 1.0;
        }
        if controls.steer_right {
            dir += 1.0;
        }
        self.heading += cfg.steer_rate * speed_fraction * dir;
        self.heading = self.heading.clamp(-cfg.max_heading, cfg.max_heading);
    }

    /// Move along the heading and keep the car on the road band
    pub fn integrate(&mut self) {
        self.pos += Vec2::new(self.heading.cos(), self.heading.sin()) * self.speed;
        let max_y = ROAD_BOTTOM - self.size.y;
        if self.pos.y < ROAD_TOP {
            self.pos.y = ROAD_TOP;
            self.heading = 0.0;
        } else if self.pos.y > max_y {
            self.pos.y = max_y;
            self.heading = 0.0;
        }
    }

    /// Full kinematics step
    pub fn step(&mut self, controls: &DriveControls, cfg: &DriveConfig) {
        self.apply_throttle(controls, cfg);
        self.apply_steering(controls, cfg);
        self.integrate();
    }
}
