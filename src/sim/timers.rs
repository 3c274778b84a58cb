//! Polled timers
//!
//! Nothing here reads a clock. Hold and revert timers accumulate the
//! simulation `dt`; the traffic light counts ticks.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What happens to a stop-hold after it has qualified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HoldPolicy {
    /// Once the threshold is reached the stop counts until the level resets
    #[default]
    Latch,
    /// Each new stop starts from zero and replaces any earlier qualification
    Rearm,
}

impl HoldPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            HoldPolicy::Latch => "latch",
            HoldPolicy::Rearm => "rearm",
        }
    }
}

/// "Stay stationary over the zone for at least N ms" tracker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StopHold {
    /// Running hold, `None` while the precondition is not met
    current: Option<Duration>,
    /// Length of the most recent hold (running or finished)
    recorded: Duration,
    /// Threshold reached and latched
    done: bool,
}

impl StopHold {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one tick
    ///
    /// `qualifying` is true when the vehicle is both near-stationary and
    /// overlapping the stop zone this tick. The first qualifying tick starts
    /// the hold at zero; each later one adds its `dt`.
    pub fn update(&mut self, qualifying: bool, dt: Duration, threshold: Duration, policy: HoldPolicy) {
        if self.done && policy == HoldPolicy::Latch {
            return;
        }

        if !qualifying {
            self.current = None;
            return;
        }

        let held = match self.current {
            Some(held) => held + dt,
            None => {
                // New hold, measured from this tick
                if policy == HoldPolicy::Rearm {
                    self.done = false;
                }
                Duration::ZERO
            }
        };
        self.current = Some(held);
        self.recorded = held;

        if held >= threshold {
            self.done = true;
        }
    }

    pub fn is_holding(&self) -> bool {
        self.current.is_some()
    }

    /// Length of the most recent hold
    pub fn recorded(&self) -> Duration {
        self.recorded
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Whether a crossing right now is legal (inclusive threshold)
    pub fn satisfied(&self, threshold: Duration) -> bool {
        self.done || self.recorded >= threshold
    }
}

/// Light colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightPhase {
    Red,
    Green,
}

/// Traffic light cycling red -> green -> red on a fixed tick period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficLight {
    pub red_ticks: u32,
    pub green_ticks: u32,
    counter: u64,
}

impl TrafficLight {
    /// Starts at the beginning of the red phase
    pub fn new(red_ticks: u32, green_ticks: u32) -> Self {
        Self {
            red_ticks: red_ticks.max(1),
            green_ticks: green_ticks.max(1),
            counter: 0,
        }
    }

    pub fn advance(&mut self) {
        self.counter += 1;
    }

    fn period(&self) -> u64 {
        u64::from(self.red_ticks) + u64::from(self.green_ticks)
    }

    pub fn phase(&self) -> LightPhase {
        if self.counter % self.period() < u64::from(self.red_ticks) {
            LightPhase::Red
        } else {
            LightPhase::Green
        }
    }

    pub fn is_red(&self) -> bool {
        self.phase() == LightPhase::Red
    }

    /// Ticks left in the current phase (for the HUD countdown)
    pub fn ticks_remaining(&self) -> u64 {
        let red = u64::from(self.red_ticks);
        let pos = self.counter % self.period();
        if pos < red { red - pos } else { self.period() - pos }
    }
}

/// Returns true once `clock` has reached `deadline`
#[inline]
pub fn deadline_reached(deadline: Option<Duration>, clock: Duration) -> bool {
    matches!(deadline, Some(at) if at <= clock)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(10);

    /// Start a hold and keep it for `ms`
    fn hold_for(hold: &mut StopHold, ms: u64, threshold: Duration, policy: HoldPolicy) {
        for _ in 0..=ms / 10 {
            hold.update(true, TICK, threshold, policy);
        }
    }

    #[test]
    fn test_hold_accumulates_and_latches() {
        let threshold = Duration::from_millis(2000);
        let mut hold = StopHold::new();
        hold_for(&mut hold, 2000, threshold, HoldPolicy::Latch);
        assert!(hold.is_done());

        // Moving off does not undo a latched stop
        hold.update(false, TICK, threshold, HoldPolicy::Latch);
        assert!(hold.satisfied(threshold));
        assert_eq!(hold.recorded(), threshold);
    }

    #[test]
    fn test_hold_resets_when_interrupted() {
        let threshold = Duration::from_millis(2000);
        let mut hold = StopHold::new();
        hold_for(&mut hold, 1500, threshold, HoldPolicy::Latch);
        hold.update(false, TICK, threshold, HoldPolicy::Latch);
        assert!(!hold.is_holding());

        // A fresh stop starts from zero
        hold_for(&mut hold, 1000, threshold, HoldPolicy::Latch);
        assert_eq!(hold.recorded(), Duration::from_millis(1000));
        assert!(!hold.satisfied(threshold));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let threshold = Duration::from_millis(2000);

        let mut short = StopHold::new();
        short.update(true, TICK, threshold, HoldPolicy::Latch);
        short.update(true, Duration::from_millis(1999), threshold, HoldPolicy::Latch);
        assert!(!short.satisfied(threshold));

        let mut exact = StopHold::new();
        exact.update(true, TICK, threshold, HoldPolicy::Latch);
        exact.update(true, Duration::from_millis(2000), threshold, HoldPolicy::Latch);
        assert!(exact.satisfied(threshold));
    }

    #[test]
    fn test_rearm_discards_earlier_stop() {
        let threshold = Duration::from_millis(1000);
        let mut hold = StopHold::new();
        hold_for(&mut hold, 1000, threshold, HoldPolicy::Rearm);
        assert!(hold.is_done());
        hold.update(false, TICK, threshold, HoldPolicy::Rearm);

        // Second, shorter stop replaces the first
        hold_for(&mut hold, 300, threshold, HoldPolicy::Rearm);
        assert!(!hold.is_done());
        assert!(!hold.satisfied(threshold));
    }

    #[test]
    fn test_latch_ignores_later_stops() {
        let threshold = Duration::from_millis(1000);
        let mut hold = StopHold::new();
        hold_for(&mut hold, 1000, threshold, HoldPolicy::Latch);
        hold.update(false, TICK, threshold, HoldPolicy::Latch);
        hold_for(&mut hold, 300, threshold, HoldPolicy::Latch);
        assert!(hold.satisfied(threshold));
    }

    #[test]
    fn test_first_qualifying_tick_counts_zero() {
        let threshold = Duration::from_millis(2000);
        let mut hold = StopHold::new();
        hold.update(true, Duration::from_millis(500), threshold, HoldPolicy::Latch);
        assert!(hold.is_holding());
        assert_eq!(hold.recorded(), Duration::ZERO);
        hold.update(true, TICK, threshold, HoldPolicy::Latch);
        assert_eq!(hold.recorded(), TICK);
    }

    #[test]
    fn test_light_cycle() {
        let mut light = TrafficLight::new(3, 2);
        let mut phases = Vec::new();
        for _ in 0..10 {
            phases.push(light.phase());
            light.advance();
        }
        use LightPhase::*;
        assert_eq!(
            phases,
            vec![Red, Red, Red, Green, Green, Red, Red, Red, Green, Green]
        );
    }

    #[test]
    fn test_light_ticks_remaining() {
        let mut light = TrafficLight::new(3, 2);
        assert_eq!(light.ticks_remaining(), 3);
        for _ in 0..3 {
            light.advance();
        }
        assert_eq!(light.phase(), LightPhase::Green);
        assert_eq!(light.ticks_remaining(), 2);
    }

    #[test]
    fn test_light_with_huge_phases() {
        let mut light = TrafficLight::new(u32::MAX, u32::MAX);
        assert!(light.is_red());
        assert_eq!(light.ticks_remaining(), u64::from(u32::MAX));
        light.advance();
        assert!(light.is_red());
        assert_eq!(light.ticks_remaining(), u64::from(u32::MAX) - 1);
    }

    #[test]
    fn test_deadline() {
        let at = Some(Duration::from_millis(9000));
        assert!(!deadline_reached(at, Duration::from_millis(8999)));
        assert!(deadline_reached(at, Duration::from_millis(9000)));
        assert!(!deadline_reached(None, Duration::from_secs(100)));
    }
}
