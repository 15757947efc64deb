//! Countdown clock for the timed exam.

use std::fmt;

/// What a single one-second tick observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Clock decremented and time remains.
    Running { remaining: u32 },
    /// Clock just hit zero; reported exactly once.
    Expired,
    /// Clock was already stopped; nothing changed.
    Idle,
}

/// Whole-second countdown, decremented once per tick.
///
/// The display form is derived purely from the remaining integer, with no
/// wall-clock dependency.
///
/// # Examples
///
/// ```
/// # use exam_core::countdown::Countdown;
/// let mut clock = Countdown::new(90);
/// assert_eq!(clock.to_string(), "00:01:30");
/// clock.tick();
/// assert_eq!(clock.remaining_seconds(), 89);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    #[must_use]
    pub fn new(seconds: u32) -> Self {
        Self { remaining: seconds }
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Decrement by one second.
    ///
    /// Returns `Expired` on the tick that reaches zero and `Idle` for every
    /// tick after that, so expiry can never fire twice.
    pub fn tick(&mut self) -> TickOutcome {
        if self.remaining == 0 {
            return TickOutcome::Idle;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            TickOutcome::Expired
        } else {
            TickOutcome::Running {
                remaining: self.remaining,
            }
        }
    }

    /// Rewind to a full duration; used when a fresh quiz set is drawn.
    pub fn reset(&mut self, seconds: u32) {
        self.remaining = seconds;
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.remaining / 3600;
        let minutes = (self.remaining % 3600) / 60;
        let seconds = self.remaining % 60;
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}")
    }
}

/// Exam duration collected from the setup screen.
///
/// Hours clamp to [0, 23] and minutes to [0, 59]; the total floors at one
/// minute so a session can never start already expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamDuration {
    hours: u32,
    minutes: u32,
}

impl ExamDuration {
    pub const MIN_TOTAL_SECONDS: u32 = 60;

    #[must_use]
    pub fn new(hours: u32, minutes: u32) -> Self {
        Self {
            hours: hours.min(23),
            minutes: minutes.min(59),
        }
    }

    #[must_use]
    pub fn hours(&self) -> u32 {
        self.hours
    }

    #[must_use]
    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    #[must_use]
    pub fn total_seconds(&self) -> u32 {
        (self.hours * 3600 + self.minutes * 60).max(Self::MIN_TOTAL_SECONDS)
    }
}

impl Default for ExamDuration {
    /// The standard exam length: 1h30m.
    fn default() -> Self {
        Self::new(1, 30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minute_countdown_expires_exactly_once() {
        let mut clock = Countdown::new(60);
        let mut expiries = 0;

        for _ in 0..60 {
            if clock.tick() == TickOutcome::Expired {
                expiries += 1;
            }
        }

        assert_eq!(expiries, 1);
        assert_eq!(clock.remaining_seconds(), 0);
        assert!(clock.is_expired());
    }

    #[test]
    fn ticks_after_expiry_are_idle_and_never_go_negative() {
        let mut clock = Countdown::new(1);
        assert_eq!(clock.tick(), TickOutcome::Expired);
        assert_eq!(clock.tick(), TickOutcome::Idle);
        assert_eq!(clock.tick(), TickOutcome::Idle);
        assert_eq!(clock.remaining_seconds(), 0);
    }

    #[test]
    fn running_ticks_report_the_new_remaining() {
        let mut clock = Countdown::new(3);
        assert_eq!(clock.tick(), TickOutcome::Running { remaining: 2 });
        assert_eq!(clock.tick(), TickOutcome::Running { remaining: 1 });
        assert_eq!(clock.tick(), TickOutcome::Expired);
    }

    #[test]
    fn reset_rewinds_to_a_full_duration() {
        let mut clock = Countdown::new(2);
        clock.tick();
        clock.tick();
        assert!(clock.is_expired());

        clock.reset(90);
        assert_eq!(clock.remaining_seconds(), 90);
        assert!(!clock.is_expired());
    }

    #[test]
    fn renders_zero_padded_hh_mm_ss() {
        assert_eq!(Countdown::new(5400).to_string(), "01:30:00");
        assert_eq!(Countdown::new(61).to_string(), "00:01:01");
        assert_eq!(Countdown::new(0).to_string(), "00:00:00");
        assert_eq!(Countdown::new(86_399).to_string(), "23:59:59");
    }

    #[test]
    fn duration_clamps_fields_and_floors_the_total() {
        let d = ExamDuration::new(30, 90);
        assert_eq!(d.hours(), 23);
        assert_eq!(d.minutes(), 59);

        assert_eq!(ExamDuration::new(0, 0).total_seconds(), 60);
        assert_eq!(ExamDuration::default().total_seconds(), 5400);
    }
}
