//! Pomodoro countdown and stopwatch state machines.
//!
//! Both are driven by explicit `tick` calls from the caller's event loop;
//! the core never spawns threads or owns a clock.

mod countdown;
mod stopwatch;

pub use countdown::{Countdown, DEFAULT_COUNTDOWN_MINUTES};
pub use stopwatch::Stopwatch;
