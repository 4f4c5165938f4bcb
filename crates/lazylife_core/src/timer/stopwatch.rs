use std::time::Duration;

/// Start/stop stopwatch accumulating elapsed time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stopwatch {
    elapsed: Duration,
    active: bool,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn toggle(&mut self) {
        self.active = !self.active;
    }

    pub fn reset(&mut self) {
        self.active = false;
        self.elapsed = Duration::ZERO;
    }

    pub fn tick(&mut self, elapsed: Duration) {
        if self.active {
            self.elapsed += elapsed;
        }
    }

    /// `MM:SS.cc`; minutes wrap at one hour.
    pub fn display(&self) -> String {
        let millis = self.elapsed.as_millis();
        format!(
            "{:02}:{:02}.{:02}",
            (millis / 60_000) % 60,
            (millis / 1000) % 60,
            (millis % 1000) / 10
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Stopwatch;
    use std::time::Duration;

    #[test]
    fn accumulates_only_while_running() {
        let mut stopwatch = Stopwatch::new();
        stopwatch.tick(Duration::from_secs(5));
        assert_eq!(stopwatch.display(), "00:00.00");

        stopwatch.toggle();
        stopwatch.tick(Duration::from_millis(61_230));
        stopwatch.toggle();
        stopwatch.tick(Duration::from_secs(5));
        assert_eq!(stopwatch.display(), "01:01.23");

        stopwatch.reset();
        assert_eq!(stopwatch.elapsed(), Duration::ZERO);
    }

    #[test]
    fn minutes_wrap_after_an_hour() {
        let mut stopwatch = Stopwatch::new();
        stopwatch.toggle();
        stopwatch.tick(Duration::from_secs(3_600 + 75));
        assert_eq!(stopwatch.display(), "01:15.00");
    }
}
