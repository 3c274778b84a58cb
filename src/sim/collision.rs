//! Axis-aligned collision and landing detection
//!
//! Everything in the world is a box: avatar, vehicle, platforms, pedestrians,
//! zones. Overlap is strict (boxes that only touch along an edge do not
//! collide) and there is no resolution beyond snapping onto a platform top.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Horizontal ranges overlap (strict)
    #[inline]
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.right() > other.left() && self.left() < other.right()
    }

    /// Vertical ranges overlap (strict)
    #[inline]
    pub fn overlaps_y(&self, other: &Rect) -> bool {
        self.bottom() > other.top() && self.top() < other.bottom()
    }

    /// Full AABB overlap test
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.overlaps_x(other) && self.overlaps_y(other)
    }
}

/// Directional landing test
///
/// `prev_bottom` is the body's bottom edge on the previous tick. The body
/// lands only when it comes down onto the platform's top edge while falling
/// or resting, which rules out catching a platform from the side or below.
pub fn landing_from_above(prev_bottom: f32, body: &Rect, vel_y: f32, platform: &Rect) -> bool {
    body.overlaps_x(platform)
        && prev_bottom <= platform.top()
        && body.bottom() >= platform.top()
        && vel_y >= 0.0
}

/// Pick the platform to land on when several qualify
///
/// Returns the index of the highest qualifying platform (smallest `y`);
/// ties keep the earliest index so the result never depends on spawn order
/// beyond that.
pub fn topmost_landing<'a, I>(prev_bottom: f32, body: &Rect, vel_y: f32, platforms: I) -> Option<usize>
where
    I: IntoIterator<Item = &'a Rect>,
{
    let mut best: Option<(usize, f32)> = None;
    for (i, platform) in platforms.into_iter().enumerate() {
        if !landing_from_above(prev_bottom, body, vel_y, platform) {
            continue;
        }
        match best {
            Some((_, top)) if platform.top() >= top => {}
            _ => best = Some((i, platform.top())),
        }
    }
    best.map(|(i, _)| i)
}
