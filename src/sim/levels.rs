//! Driving course levels
//!
//! Each level is a `LevelKind` looked up by id in `LEVELS`. A level builds a
//! fresh `DriveWorld` in `setup`, advances NPCs and timers in
//! `DriveWorld::update`, and is judged by `DriveWorld::check`.
//!
//! Line crossings are judged once, on the tick the vehicle's front bumper
//! passes the line, and the verdict is kept until the level is set up again.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::kinematics::Vehicle;
use super::timers::{StopHold, TrafficLight};
use crate::config::DriveConfig;
use crate::consts::*;

/// Level number, 1-based
pub type LevelId = u8;

/// The rules a level tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelKind {
    StopSign,
    SpeedLimit,
    PedestrianCrossing,
    TrafficLight,
    Cyclist,
    GiveWay,
    Roundabout,
    SchoolZone,
    FinalExam,
}

/// Static descriptor shown in the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    pub id: LevelId,
    pub name: &'static str,
    pub description: &'static str,
    pub kind: LevelKind,
}

pub const LEVELS: [LevelInfo; 9] = [
    LevelInfo {
        id: 1,
        name: "Stop sign",
        description: "Stop completely at the line and wait before entering the intersection.",
        kind: LevelKind::StopSign,
    },
    LevelInfo {
        id: 2,
        name: "Speed limit",
        description: "Stay under the posted limit all the way to the finish.",
        kind: LevelKind::SpeedLimit,
    },
    LevelInfo {
        id: 3,
        name: "Pedestrian crossing",
        description: "Let the pedestrian cross before you drive over the zebra crossing.",
        kind: LevelKind::PedestrianCrossing,
    },
    LevelInfo {
        id: 4,
        name: "Traffic light",
        description: "Only cross the stop line on green.",
        kind: LevelKind::TrafficLight,
    },
    LevelInfo {
        id: 5,
        name: "Cyclist",
        description: "Give the cyclist room to cross the road.",
        kind: LevelKind::Cyclist,
    },
    LevelInfo {
        id: 6,
        name: "Give way",
        description: "Yield to cross traffic before entering the junction.",
        kind: LevelKind::GiveWay,
    },
    LevelInfo {
        id: 7,
        name: "Roundabout",
        description: "Traffic on the roundabout has priority. Wait for a gap.",
        kind: LevelKind::Roundabout,
    },
    LevelInfo {
        id: 8,
        name: "School zone",
        description: "Low speed limit and children crossing.",
        kind: LevelKind::SchoolZone,
    },
    LevelInfo {
        id: 9,
        name: "Final exam",
        description: "Stop sign, pedestrian and speed limit in one drive.",
        kind: LevelKind::FinalExam,
    },
];

/// Look up a level by id
pub fn level_info(id: LevelId) -> Option<&'static LevelInfo> {
    LEVELS.iter().find(|l| l.id == id)
}

/// Which rule was broken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleViolationKind {
    StopViolation,
    SpeedViolation,
    Collision,
    SignalViolation,
    YieldViolation,
}

impl RuleViolationKind {
    /// Player-facing explanation
    pub fn message(&self) -> &'static str {
        match self {
            RuleViolationKind::StopViolation => "You did not stop long enough at the stop line.",
            RuleViolationKind::SpeedViolation => "You exceeded the speed limit.",
            RuleViolationKind::Collision => "You hit another road user.",
            RuleViolationKind::SignalViolation => "You crossed the stop line on red.",
            RuleViolationKind::YieldViolation => "You failed to give way to traffic with priority.",
        }
    }
}

/// Result of a level check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Continue,
    Success,
    Fail(RuleViolationKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NpcKind {
    Pedestrian,
    Cyclist,
    Car,
}

/// How an NPC moves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NpcPath {
    /// Back and forth vertically between two y bounds
    Patrol { min_y: f32, max_y: f32 },
    /// Downward, wrapping from `to_y` back to `from_y`
    Sweep { from_y: f32, to_y: f32 },
    /// Around a circle (radians per tick)
    Orbit {
        center: Vec2,
        radius: f32,
        angle: f32,
        angular_speed: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub kind: NpcKind,
    pub rect: Rect,
    /// Displacement last tick
    pub vel: Vec2,
    pub path: NpcPath,
    /// Has right of way over the player at the conflict zone
    pub priority: bool,
}

impl Npc {
    fn patrol(kind: NpcKind, x: f32, size: Vec2, min_y: f32, max_y: f32, speed: f32) -> Self {
        Self {
            kind,
            rect: Rect::from_pos_size(Vec2::new(x, min_y), size),
            vel: Vec2::new(0.0, speed),
            path: NpcPath::Patrol { min_y, max_y },
            priority: false,
        }
    }

    fn sweep(kind: NpcKind, x: f32, size: Vec2, from_y: f32, to_y: f32, speed: f32) -> Self {
        Self {
            kind,
            rect: Rect::from_pos_size(Vec2::new(x, from_y), size),
            vel: Vec2::new(0.0, speed),
            path: NpcPath::Sweep { from_y, to_y },
            priority: kind == NpcKind::Car,
        }
    }

    fn orbit(center: Vec2, radius: f32, angle: f32, angular_speed: f32) -> Self {
        let size = Vec2::new(36.0, 36.0);
        let pos = center + Vec2::new(angle.cos(), angle.sin()) * radius - size * 0.5;
        Self {
            kind: NpcKind::Car,
            rect: Rect::from_pos_size(pos, size),
            vel: Vec2::ZERO,
            path: NpcPath::Orbit {
                center,
                radius,
                angle,
                angular_speed,
            },
            priority: true,
        }
    }

    /// Advance one tick along the path
    pub fn step(&mut self) {
        match &mut self.path {
            NpcPath::Patrol { min_y, max_y } => {
                self.rect.pos += self.vel;
                if self.rect.top() <= *min_y {
                    self.rect.pos.y = *min_y;
                    self.vel.y = self.vel.y.abs();
                } else if self.rect.bottom() >= *max_y {
                    self.rect.pos.y = *max_y - self.rect.size.y;
                    self.vel.y = -self.vel.y.abs();
                }
            }
            NpcPath::Sweep { from_y, to_y } => {
                self.rect.pos += self.vel;
                if self.rect.top() > *to_y {
                    self.rect.pos.y = *from_y;
                }
            }
            NpcPath::Orbit {
                center,
                radius,
                angle,
                angular_speed,
            } => {
                let old = self.rect.center();
                *angle = (*angle + *angular_speed) % std::f32::consts::TAU;
                let new = *center + Vec2::new(angle.cos(), angle.sin()) * *radius;
                self.rect.pos = new - self.rect.size * 0.5;
                self.vel = new - old;
            }
        }
    }

    /// Inside the zone, or close to it and still heading toward it
    pub fn threatens(&self, zone: &Rect, window: f32) -> bool {
        if self.rect.overlaps(zone) {
            return true;
        }
        let to_zone = zone.center() - self.rect.center();
        to_zone.length() < window && to_zone.dot(self.vel) > 0.0
    }
}

/// Everything a level mutates. Rebuilt from scratch by `setup`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveWorld {
    pub kind: LevelKind,
    pub vehicle: Vehicle,
    pub npcs: Vec<Npc>,
    /// Where the vehicle must come to rest (stop sign levels)
    pub stop_zone: Option<Rect>,
    /// Entering this without a qualifying stop is a stop violation
    pub intersection: Option<Rect>,
    pub light: Option<TrafficLight>,
    /// Crossing this x on red is a signal violation
    pub stop_line_x: Option<f32>,
    /// Entering this while priority traffic approaches is a yield violation
    pub conflict_zone: Option<Rect>,
    pub speed_limit: Option<f32>,
    pub finish_x: f32,
    pub stop_hold: StopHold,
    pub speed_violated: bool,
    /// Set once, when the front bumper enters the intersection
    pub stop_verdict: Option<bool>,
    /// Set once, when the front bumper crosses the stop line
    pub signal_verdict: Option<bool>,
    /// Set once, when the vehicle first overlaps the conflict zone
    pub yield_verdict: Option<bool>,
    pub ticks: u64,
    pub elapsed: Duration,
}

/// Vehicle start (top-left), in the right-hand lane
const VEHICLE_START: Vec2 = Vec2::new(40.0, 285.0);
const COURSE_END: f32 = 1400.0;

impl LevelKind {
    /// Build the level's initial world
    ///
    /// Always constructs every field from scratch, so calling it again is a
    /// full reset of level-scoped state.
    pub fn setup(&self, cfg: &DriveConfig) -> DriveWorld {
        let mut world = DriveWorld::empty(*self);
        let pedestrian = Vec2::new(16.0, 16.0);

        match self {
            LevelKind::StopSign => {
                world.stop_zone = Some(Rect::new(500.0, ROAD_TOP, 80.0, ROAD_BOTTOM - ROAD_TOP));
                world.intersection = Some(Rect::new(600.0, ROAD_TOP - 120.0, 160.0, 360.0));
            }
            LevelKind::SpeedLimit => {
                world.speed_limit = Some(cfg.speed_limit);
            }
            LevelKind::PedestrianCrossing => {
                world
                    .npcs
                    .push(Npc::patrol(NpcKind::Pedestrian, 712.0, pedestrian, 150.0, 410.0, 1.2));
            }
            LevelKind::TrafficLight => {
                world.light = Some(TrafficLight::new(cfg.light_red_ticks, cfg.light_green_ticks));
                world.stop_line_x = Some(700.0);
            }
            LevelKind::Cyclist => {
                world.npcs.push(Npc::sweep(
                    NpcKind::Cyclist,
                    760.0,
                    Vec2::new(14.0, 30.0),
                    100.0,
                    460.0,
                    2.0,
                ));
            }
            LevelKind::GiveWay => {
                world.npcs.push(Npc::sweep(
                    NpcKind::Car,
                    800.0,
                    Vec2::new(30.0, 56.0),
                    -60.0,
                    620.0,
                    3.0,
                ));
                world.conflict_zone = Some(Rect::new(780.0, ROAD_TOP, 70.0, ROAD_BOTTOM - ROAD_TOP));
            }
            LevelKind::Roundabout => {
                let center = Vec2::new(920.0, (ROAD_TOP + ROAD_BOTTOM) * 0.5);
                world.npcs.push(Npc::orbit(center, 110.0, 0.0, 0.02));
                world.conflict_zone = Some(Rect::new(780.0, ROAD_TOP, 60.0, ROAD_BOTTOM - ROAD_TOP));
            }
            LevelKind::SchoolZone => {
                world.speed_limit = Some(cfg.school_speed_limit);
                world
                    .npcs
                    .push(Npc::patrol(NpcKind::Pedestrian, 900.0, pedestrian, 160.0, 400.0, 0.9));
            }
            LevelKind::FinalExam => {
                world.speed_limit = Some(cfg.speed_limit);
                world.stop_zone = Some(Rect::new(400.0, ROAD_TOP, 80.0, ROAD_BOTTOM - ROAD_TOP));
                world.intersection = Some(Rect::new(500.0, ROAD_TOP - 120.0, 140.0, 360.0));
                world
                    .npcs
                    .push(Npc::patrol(NpcKind::Pedestrian, 1000.0, pedestrian, 150.0, 410.0, 1.0));
                world.finish_x = COURSE_END + 100.0;
            }
        }
        world
    }
}

impl DriveWorld {
    fn empty(kind: LevelKind) -> Self {
        Self {
            kind,
            vehicle: Vehicle::new(VEHICLE_START),
            npcs: Vec::new(),
            stop_zone: None,
            intersection: None,
            light: None,
            stop_line_x: None,
            conflict_zone: None,
            speed_limit: None,
            finish_x: COURSE_END,
            stop_hold: StopHold::new(),
            speed_violated: false,
            stop_verdict: None,
            signal_verdict: None,
            yield_verdict: None,
            ticks: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Rebuild this level from scratch
    pub fn reset(&mut self, cfg: &DriveConfig) {
        *self = self.kind.setup(cfg);
    }

    /// Per-tick level update (the vehicle has already moved this tick)
    pub fn update(&mut self, cfg: &DriveConfig, dt: Duration) {
        self.ticks += 1;
        self.elapsed += dt;

        if let Some(light) = self.light.as_mut() {
            light.advance();
        }
        for npc in self.npcs.iter_mut() {
            npc.step();
        }

        let car = self.vehicle.rect();
        let front = self.vehicle.front_x();

        if let Some(limit) = self.speed_limit {
            if self.vehicle.speed.abs() > limit && !self.speed_violated {
                log::debug!("Speed {:.2} over limit {:.2}", self.vehicle.speed, limit);
                self.speed_violated = true;
            }
        }

        if let Some(zone) = self.stop_zone {
            let qualifying = self.vehicle.is_stationary(cfg.stop_epsilon) && car.overlaps(&zone);
            self.stop_hold
                .update(qualifying, dt, cfg.stop_hold(), cfg.hold_policy);
        }

        if let Some(intersection) = self.intersection {
            if self.stop_verdict.is_none() && front > intersection.left() {
                let ok = self.stop_hold.satisfied(cfg.stop_hold());
                log::debug!(
                    "Entered intersection after {:?} stop ({})",
                    self.stop_hold.recorded(),
                    if ok { "ok" } else { "too short" }
                );
                self.stop_verdict = Some(ok);
            }
        }

        if let (Some(line), Some(light)) = (self.stop_line_x, self.light.as_ref()) {
            if self.signal_verdict.is_none() && front > line {
                self.signal_verdict = Some(!light.is_red());
            }
        }

        if let Some(zone) = self.conflict_zone {
            if self.yield_verdict.is_none() && car.overlaps(&zone) {
                let blocked = self
                    .npcs
                    .iter()
                    .filter(|n| n.priority)
                    .any(|n| n.threatens(&zone, cfg.yield_window));
                self.yield_verdict = Some(!blocked);
            }
        }
    }

    /// Judge the current tick
    ///
    /// First broken rule wins, in the order collision, speed, stop, signal,
    /// yield. Reaching the finish only counts when nothing was broken.
    pub fn check(&self) -> Outcome {
        let car = self.vehicle.rect();
        if self.npcs.iter().any(|n| n.rect.overlaps(&car)) {
            return Outcome::Fail(RuleViolationKind::Collision);
        }
        if self.speed_violated {
            return Outcome::Fail(RuleViolationKind::SpeedViolation);
        }
        if self.stop_verdict == Some(false) {
            return Outcome::Fail(RuleViolationKind::StopViolation);
        }
        if self.signal_verdict == Some(false) {
            return Outcome::Fail(RuleViolationKind::SignalViolation);
        }
        if self.yield_verdict == Some(false) {
            return Outcome::Fail(RuleViolationKind::YieldViolation);
        }
        if self.vehicle.front_x() > self.finish_x {
            return Outcome::Success;
        }
        Outcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, Preset};

    const DT: Duration = Duration::from_millis(10);

    fn cfg() -> DriveConfig {
        DriveConfig::default()
    }

    /// Park the car with its front bumper at `front_x`
    fn park(world: &mut DriveWorld, front_x: f32) {
        world.vehicle.pos.x = front_x - world.vehicle.size.x;
        world.vehicle.speed = 0.0;
    }

    /// Teleport forward by `dx` at `speed` and run one update
    fn nudge(world: &mut DriveWorld, cfg: &DriveConfig, dx: f32, speed: f32) {
        world.vehicle.speed = speed;
        world.vehicle.pos.x += dx;
        world.update(cfg, DT);
    }

    #[test]
    fn test_level_table_is_complete() {
        let cfg = cfg();
        for id in 1..=9 {
            let info = level_info(id).expect("level missing");
            assert_eq!(info.id, id);
            assert!(!info.name.is_empty());
            let world = info.kind.setup(&cfg);
            assert_eq!(world.kind, info.kind);
            assert_eq!(world.check(), Outcome::Continue);
        }
        assert!(level_info(0).is_none());
        assert!(level_info(10).is_none());
    }

    #[test]
    fn test_levels_have_their_rules() {
        let cfg = cfg();
        let stop = LevelKind::StopSign.setup(&cfg);
        assert!(stop.stop_zone.is_some() && stop.intersection.is_some());
        let light = LevelKind::TrafficLight.setup(&cfg);
        assert!(light.light.is_some() && light.stop_line_x.is_some());
        let school = LevelKind::SchoolZone.setup(&cfg);
        assert_eq!(school.speed_limit, Some(cfg.school_speed_limit));
        let round = LevelKind::Roundabout.setup(&cfg);
        assert!(round.conflict_zone.is_some());
        assert!(round.npcs.iter().any(|n| n.priority));
    }

    #[test]
    fn test_setup_is_idempotent() {
        let cfg = cfg();
        for info in LEVELS.iter() {
            let fresh = info.kind.setup(&cfg);
            let mut world = fresh.clone();
            for _ in 0..50 {
                world.vehicle.speed = 2.0;
                world.vehicle.pos.x += 2.0;
                world.update(&cfg, DT);
            }
            world.speed_violated = true;
            world.reset(&cfg);
            assert_eq!(world, fresh);
        }
    }

    fn stop_then_cross(hold: Duration) -> Outcome {
        let cfg = cfg();
        let mut world = LevelKind::StopSign.setup(&cfg);
        park(&mut world, 560.0);
        world.update(&cfg, DT);
        world.update(&cfg, hold);
        // Roll through the intersection boundary
        while world.vehicle.front_x() <= 620.0 {
            nudge(&mut world, &cfg, 2.0, 2.0);
        }
        world.check()
    }

    #[test]
    fn test_stop_threshold_boundary() {
        assert_eq!(
            stop_then_cross(Duration::from_millis(1999)),
            Outcome::Fail(RuleViolationKind::StopViolation)
        );
        assert_eq!(stop_then_cross(Duration::from_millis(2000)), Outcome::Continue);
    }

    #[test]
    fn test_rolling_stop_does_not_count() {
        let cfg = cfg();
        let mut world = LevelKind::StopSign.setup(&cfg);
        park(&mut world, 540.0);
        // Creeping at 1.0 is never stationary
        for _ in 0..300 {
            world.vehicle.speed = 1.0;
            world.update(&cfg, DT);
        }
        while world.vehicle.front_x() <= 620.0 {
            nudge(&mut world, &cfg, 2.0, 2.0);
        }
        assert_eq!(world.check(), Outcome::Fail(RuleViolationKind::StopViolation));
    }

    #[test]
    fn test_stop_outside_zone_does_not_count() {
        let cfg = cfg();
        let mut world = LevelKind::StopSign.setup(&cfg);
        park(&mut world, 300.0);
        for _ in 0..300 {
            world.update(&cfg, DT);
        }
        assert!(!world.stop_hold.satisfied(cfg.stop_hold()));
    }

    #[test]
    fn test_speeding_fails_even_after_slowing() {
        let cfg = cfg();
        let mut world = LevelKind::SpeedLimit.setup(&cfg);
        nudge(&mut world, &cfg, 4.6, 4.6);
        assert_eq!(world.check(), Outcome::Fail(RuleViolationKind::SpeedViolation));
        nudge(&mut world, &cfg, 2.0, 2.0);
        assert_eq!(world.check(), Outcome::Fail(RuleViolationKind::SpeedViolation));
    }

    #[test]
    fn test_at_limit_is_legal() {
        let cfg = cfg();
        let mut world = LevelKind::SpeedLimit.setup(&cfg);
        nudge(&mut world, &cfg, 4.5, 4.5);
        assert_eq!(world.check(), Outcome::Continue);
        park(&mut world, COURSE_END + 1.0);
        world.update(&cfg, DT);
        assert_eq!(world.check(), Outcome::Success);
    }

    #[test]
    fn test_pedestrian_collision() {
        let cfg = cfg();
        let mut world = LevelKind::PedestrianCrossing.setup(&cfg);
        let ped = world.npcs[0].rect;
        world.vehicle.pos = ped.pos - Vec2::new(10.0, 5.0);
        assert_eq!(world.check(), Outcome::Fail(RuleViolationKind::Collision));
    }

    #[test]
    fn test_pedestrian_patrols_between_bounds() {
        let cfg = cfg();
        let mut world = LevelKind::PedestrianCrossing.setup(&cfg);
        let mut went_down = false;
        let mut came_back = false;
        for _ in 0..1000 {
            world.update(&cfg, DT);
            let ped = &world.npcs[0];
            assert!(ped.rect.top() >= 150.0 && ped.rect.bottom() <= 410.0);
            if ped.vel.y > 0.0 {
                went_down = true;
            } else if went_down {
                came_back = true;
            }
        }
        assert!(went_down && came_back);
    }

    #[test]
    fn test_cyclist_collision() {
        let cfg = cfg();
        let mut world = LevelKind::Cyclist.setup(&cfg);
        // Waiting right on the cyclist's path
        park(&mut world, 765.0);
        let mut outcome = Outcome::Continue;
        for _ in 0..300 {
            world.update(&cfg, DT);
            outcome = world.check();
            if outcome != Outcome::Continue {
                break;
            }
        }
        assert_eq!(outcome, Outcome::Fail(RuleViolationKind::Collision));
    }

    #[test]
    fn test_school_zone_has_lower_limit() {
        let cfg = cfg();
        let mut school = LevelKind::SchoolZone.setup(&cfg);
        nudge(&mut school, &cfg, 3.1, 3.1);
        assert_eq!(school.check(), Outcome::Fail(RuleViolationKind::SpeedViolation));

        let mut school = LevelKind::SchoolZone.setup(&cfg);
        nudge(&mut school, &cfg, 3.0, 3.0);
        assert_eq!(school.check(), Outcome::Continue);

        // The same speed is fine under the ordinary limit
        let mut open_road = LevelKind::SpeedLimit.setup(&cfg);
        nudge(&mut open_road, &cfg, 4.0, 4.0);
        assert_eq!(open_road.check(), Outcome::Continue);
    }

    #[test]
    fn test_final_exam_requires_stop() {
        let cfg = cfg();
        let mut world = LevelKind::FinalExam.setup(&cfg);
        park(&mut world, 380.0);
        while world.vehicle.front_x() <= 520.0 {
            nudge(&mut world, &cfg, 2.0, 2.0);
        }
        assert_eq!(world.check(), Outcome::Fail(RuleViolationKind::StopViolation));

        let mut world = LevelKind::FinalExam.setup(&cfg);
        park(&mut world, 460.0);
        world.update(&cfg, DT);
        world.update(&cfg, cfg.stop_hold());
        while world.vehicle.front_x() <= 520.0 {
            nudge(&mut world, &cfg, 2.0, 2.0);
        }
        assert_eq!(world.stop_verdict, Some(true));
        assert_eq!(world.check(), Outcome::Continue);
    }

    /// Full stop, roll forward, short second stop, then cross
    fn stop_roll_restop(cfg: &DriveConfig) -> Outcome {
        let mut world = LevelKind::StopSign.setup(cfg);
        park(&mut world, 530.0);
        world.update(cfg, DT);
        world.update(cfg, cfg.stop_hold());
        assert!(world.stop_hold.is_done());

        for _ in 0..10 {
            nudge(&mut world, cfg, 2.0, 2.0);
        }
        world.vehicle.speed = 0.0;
        world.update(cfg, DT);
        world.update(cfg, Duration::from_millis(300));

        while world.vehicle.front_x() <= 620.0 {
            nudge(&mut world, cfg, 2.0, 2.0);
        }
        world.check()
    }

    #[test]
    fn test_strict_preset_rearms_stop() {
        let strict = GameConfig::from_preset(Preset::Strict).drive;
        assert_eq!(
            stop_roll_restop(&strict),
            Outcome::Fail(RuleViolationKind::StopViolation)
        );
        assert_eq!(stop_roll_restop(&cfg()), Outcome::Continue);
    }

    #[test]
    fn test_red_light_violation() {
        let cfg = cfg();
        let mut world = LevelKind::TrafficLight.setup(&cfg);
        park(&mut world, 695.0);
        nudge(&mut world, &cfg, 10.0, 3.0);
        assert_eq!(world.check(), Outcome::Fail(RuleViolationKind::SignalViolation));
    }

    #[test]
    fn test_green_light_crossing() {
        let cfg = cfg();
        let mut world = LevelKind::TrafficLight.setup(&cfg);
        park(&mut world, 695.0);
        while world.light.as_ref().unwrap().is_red() {
            world.update(&cfg, DT);
        }
        nudge(&mut world, &cfg, 10.0, 3.0);
        assert_eq!(world.signal_verdict, Some(true));
        assert_eq!(world.check(), Outcome::Continue);
    }

    #[test]
    fn test_give_way_violation_and_gap() {
        let cfg = cfg();
        let mut world = LevelKind::GiveWay.setup(&cfg);
        // Cross car heading into the junction, just above it
        world.npcs[0].rect.pos.y = ROAD_TOP - 120.0;
        park(&mut world, 775.0);
        nudge(&mut world, &cfg, 10.0, 3.0);
        assert_eq!(world.check(), Outcome::Fail(RuleViolationKind::YieldViolation));

        let mut world = LevelKind::GiveWay.setup(&cfg);
        // Cross car already past the junction
        world.npcs[0].rect.pos.y = ROAD_BOTTOM + 20.0;
        park(&mut world, 775.0);
        nudge(&mut world, &cfg, 10.0, 3.0);
        assert_eq!(world.yield_verdict, Some(true));
        assert_eq!(world.check(), Outcome::Continue);
    }

    #[test]
    fn test_roundabout_car_orbits() {
        let cfg = cfg();
        let mut world = LevelKind::Roundabout.setup(&cfg);
        let start = world.npcs[0].rect.center();
        for _ in 0..100 {
            world.update(&cfg, DT);
        }
        let car = &world.npcs[0];
        assert!(car.rect.center().distance(start) > 10.0);
        if let NpcPath::Orbit { center, radius, .. } = car.path {
            assert!((car.rect.center().distance(center) - radius).abs() < 0.01);
        } else {
            panic!("roundabout car should orbit");
        }
    }

    #[test]
    fn test_threatens() {
        let zone = Rect::new(100.0, 100.0, 50.0, 50.0);
        let mut npc = Npc::sweep(NpcKind::Car, 110.0, Vec2::new(30.0, 56.0), 0.0, 600.0, 3.0);
        npc.rect.pos.y = 0.0;
        assert!(npc.threatens(&zone, 220.0));
        npc.rect.pos.y = 200.0;
        assert!(!npc.threatens(&zone, 220.0));
    }
}
