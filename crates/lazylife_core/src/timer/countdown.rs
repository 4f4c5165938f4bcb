use std::time::Duration;

pub const DEFAULT_COUNTDOWN_MINUTES: u32 = 25;

/// Minute-based countdown with pause/resume.
///
/// # Invariants
/// - `remaining_secs <= total_secs`.
/// - The countdown stops itself when it reaches zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    minutes: u32,
    total_secs: u64,
    remaining_secs: u64,
    active: bool,
    /// Sub-second remainder carried between ticks.
    carry: Duration,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTDOWN_MINUTES)
    }
}

impl Countdown {
    pub fn new(minutes: u32) -> Self {
        let total_secs = u64::from(minutes) * 60;
        Self {
            minutes,
            total_secs,
            remaining_secs: total_secs,
            active: false,
            carry: Duration::ZERO,
        }
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_finished(&self) -> bool {
        self.remaining_secs == 0
    }

    /// Changes the configured length. While paused the countdown restarts
    /// from the new length; while running only the setting is stored and
    /// applies on the next `reset`.
    pub fn set_minutes(&mut self, minutes: u32) {
        self.minutes = minutes;
        if !self.active {
            self.restart();
        }
    }

    /// Starts or pauses. Does nothing once the countdown reached zero.
    pub fn toggle(&mut self) {
        if self.remaining_secs > 0 {
            self.active = !self.active;
        }
    }

    /// Stops and rewinds to the configured length.
    pub fn reset(&mut self) {
        self.active = false;
        self.restart();
    }

    /// Advances by `elapsed` while running. Returns `true` on the tick that
    /// reaches zero.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        if !self.active {
            return false;
        }
        self.carry += elapsed;
        let whole_secs = self.carry.as_secs();
        self.carry -= Duration::from_secs(whole_secs);
        self.remaining_secs = self.remaining_secs.saturating_sub(whole_secs);
        if self.remaining_secs == 0 {
            self.active = false;
            self.carry = Duration::ZERO;
            return true;
        }
        false
    }

    /// Elapsed share of the countdown in percent, `0.0` for a zero length.
    pub fn progress_percent(&self) -> f64 {
        if self.total_secs == 0 {
            return 0.0;
        }
        (self.total_secs - self.remaining_secs) as f64 / self.total_secs as f64 * 100.0
    }

    /// Remaining time as `MM:SS`.
    pub fn display(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_secs / 60,
            self.remaining_secs % 60
        )
    }

    fn restart(&mut self) {
        self.total_secs = u64::from(self.minutes) * 60;
        self.remaining_secs = self.total_secs;
        self.carry = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::Countdown;
    use std::time::Duration;

    #[test]
    fn default_is_a_paused_pomodoro() {
        let countdown = Countdown::default();
        assert_eq!(countdown.display(), "25:00");
        assert!(!countdown.is_active());
    }

    #[test]
    fn ticks_only_count_while_running_and_stop_at_zero() {
        let mut countdown = Countdown::new(1);
        assert!(!countdown.tick(Duration::from_secs(10)));
        assert_eq!(countdown.remaining_secs(), 60);

        countdown.toggle();
        countdown.tick(Duration::from_millis(1500));
        countdown.tick(Duration::from_millis(600));
        assert_eq!(countdown.display(), "00:58");

        assert!(countdown.tick(Duration::from_secs(120)));
        assert!(countdown.is_finished());
        assert!(!countdown.is_active());
        assert_eq!(countdown.progress_percent(), 100.0);

        countdown.toggle();
        assert!(!countdown.is_active(), "finished countdown cannot restart without reset");
    }

    #[test]
    fn set_minutes_while_running_applies_on_reset() {
        let mut countdown = Countdown::new(25);
        countdown.toggle();
        countdown.tick(Duration::from_secs(60));
        countdown.set_minutes(5);
        assert_eq!(countdown.display(), "24:00");

        countdown.reset();
        assert_eq!(countdown.display(), "05:00");
        assert_eq!(countdown.progress_percent(), 0.0);
    }

    #[test]
    fn zero_minutes_has_zero_progress() {
        let countdown = Countdown::new(0);
        assert_eq!(countdown.progress_percent(), 0.0);
        assert!(countdown.is_finished());
    }
}
