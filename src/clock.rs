//! Chess clocks: two countdowns, one running at a time.
//!
//! Nothing here reads the wall clock; the owner calls [`Clock::tick`] with
//! the elapsed time since its previous call. Timeout is a polled predicate.

use cozy_chess::Color;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeControl {
    pub initial: Duration,
    pub increment: Duration,
}

impl TimeControl {
    pub const fn new(initial_secs: u64, increment_secs: u64) -> Self {
        Self { initial: Duration::from_secs(initial_secs), increment: Duration::from_secs(increment_secs) }
    }

    pub const fn unlimited() -> Self { Self::new(0, 0) }

    /// Zero initial time means no clock at all.
    pub fn is_unlimited(&self) -> bool { self.initial.is_zero() }

    pub fn preset(name: &str) -> Option<Self> {
        PRESETS.iter().find(|(n, _)| *n == name).map(|(_, tc)| *tc)
    }
}

impl Default for TimeControl {
    fn default() -> Self { Self::unlimited() }
}

pub const PRESETS: [(&str, TimeControl); 11] = [
    ("bullet1", TimeControl::new(60, 0)),
    ("bullet2", TimeControl::new(120, 1)),
    ("blitz3", TimeControl::new(180, 0)),
    ("blitz3_2", TimeControl::new(180, 2)),
    ("blitz5", TimeControl::new(300, 0)),
    ("blitz5_3", TimeControl::new(300, 3)),
    ("rapid10", TimeControl::new(600, 0)),
    ("rapid10_5", TimeControl::new(600, 5)),
    ("rapid15_10", TimeControl::new(900, 10)),
    ("classical30", TimeControl::new(1800, 0)),
    ("unlimited", TimeControl::unlimited()),
];

#[derive(Debug, Clone)]
pub struct Clock {
    control: TimeControl,
    white: Duration,
    black: Duration,
    active: Option<Color>,
    paused: bool,
}

impl Clock {
    pub fn new(control: TimeControl) -> Self {
        Self { control, white: control.initial, black: control.initial, active: None, paused: false }
    }

    pub fn control(&self) -> TimeControl { self.control }
    pub fn is_unlimited(&self) -> bool { self.control.is_unlimited() }
    pub fn active(&self) -> Option<Color> { self.active }
    pub fn is_paused(&self) -> bool { self.paused }

    pub fn remaining(&self, color: Color) -> Duration {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    fn slot(&mut self, color: Color) -> &mut Duration {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    /// Whether `color`'s time is currently draining.
    pub fn is_running(&self, color: Color) -> bool {
        self.active == Some(color) && !self.paused && !self.is_unlimited()
    }

    pub fn start(&mut self, color: Color) {
        self.active = Some(color);
        self.paused = false;
    }

    /// Credits the side that just moved with the increment and hands the
    /// move to the other side. No-op before [`Clock::start`].
    pub fn switch_player(&mut self) {
        let Some(mover) = self.active else { return };
        let inc = self.control.increment;
        if !self.is_unlimited() && !inc.is_zero() {
            let t = self.slot(mover);
            *t += inc;
        }
        self.active = Some(!mover);
    }

    pub fn pause(&mut self) { self.paused = true; }
    pub fn resume(&mut self) { self.paused = false; }

    pub fn reset(&mut self) {
        self.white = self.control.initial;
        self.black = self.control.initial;
        self.active = None;
        self.paused = false;
    }

    /// Starts over with a different time control.
    pub fn set_control(&mut self, control: TimeControl) {
        self.control = control;
        self.reset();
    }

    /// Drains `elapsed` from the running side, stopping at zero.
    pub fn tick(&mut self, elapsed: Duration) {
        let Some(color) = self.active else { return };
        if !self.is_running(color) { return; }
        let t = self.slot(color);
        *t = t.saturating_sub(elapsed);
    }

    pub fn is_timeout(&self, color: Color) -> bool {
        !self.is_unlimited() && self.remaining(color).is_zero()
    }

    /// The first side found out of time, if any.
    pub fn flagged(&self) -> Option<Color> {
        [Color::White, Color::Black].into_iter().find(|&c| self.is_timeout(c))
    }
}

/// `m:ss`, or `h:mm:ss` from one hour up; `0:00` once time is gone.
pub fn format_time(t: Duration) -> String {
    let secs = t.as_secs();
    if secs == 0 { return "0:00".to_string(); }
    let (h, m, s) = (secs / 3600, (secs / 60) % 60, secs % 60);
    if h > 0 { format!("{h}:{m:02}:{s:02}") } else { format!("{m}:{s:02}") }
}

pub fn is_low_time(t: Duration) -> bool { !t.is_zero() && t < Duration::from_secs(30) }

pub fn is_critical_time(t: Duration) -> bool { !t.is_zero() && t < Duration::from_secs(10) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_like_a_chess_clock() {
        assert_eq!(format_time(Duration::ZERO), "0:00");
        assert_eq!(format_time(Duration::from_millis(59_900)), "0:59");
        assert_eq!(format_time(Duration::from_secs(600)), "10:00");
        assert_eq!(format_time(Duration::from_secs(3725)), "1:02:05");
    }

    #[test]
    fn low_and_critical_thresholds() {
        assert!(is_low_time(Duration::from_secs(29)));
        assert!(!is_low_time(Duration::from_secs(30)));
        assert!(is_critical_time(Duration::from_secs(9)));
        assert!(!is_critical_time(Duration::ZERO));
    }

    #[test]
    fn presets_resolve_by_name() {
        assert_eq!(TimeControl::preset("blitz3_2"), Some(TimeControl::new(180, 2)));
        assert!(TimeControl::preset("unlimited").unwrap().is_unlimited());
        assert_eq!(TimeControl::preset("nope"), None);
    }
}
