use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TimerError {
    #[error("timer duration must be one of 30, 60, 90 or 120 seconds, got {0}")]
    UnsupportedDuration(u32),
}

/// Countdown length presets offered per question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerDuration {
    Secs30,
    #[default]
    Secs60,
    Secs90,
    Secs120,
}

impl TimerDuration {
    /// The preset set, in menu order.
    pub const PRESETS: [TimerDuration; 4] = [
        TimerDuration::Secs30,
        TimerDuration::Secs60,
        TimerDuration::Secs90,
        TimerDuration::Secs120,
    ];

    /// Validates a raw second count against the preset set.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::UnsupportedDuration` for any non-preset value.
    pub fn from_secs(secs: u32) -> Result<Self, TimerError> {
        match secs {
            30 => Ok(TimerDuration::Secs30),
            60 => Ok(TimerDuration::Secs60),
            90 => Ok(TimerDuration::Secs90),
            120 => Ok(TimerDuration::Secs120),
            other => Err(TimerError::UnsupportedDuration(other)),
        }
    }

    #[must_use]
    pub fn secs(self) -> u32 {
        match self {
            TimerDuration::Secs30 => 30,
            TimerDuration::Secs60 => 60,
            TimerDuration::Secs90 => 90,
            TimerDuration::Secs120 => 120,
        }
    }
}

/// Outcome of a single countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Seconds remaining after this tick.
    Running(u32),
    /// The countdown just reached zero. Reported exactly once.
    Expired,
    /// Paused or already expired; nothing changed.
    Idle,
}

/// Per-question countdown, driven by one `tick` per second from the embedder.
///
/// Moving to a fresh question (or recording an answer) replaces the countdown
/// via `reset`, so two countdowns never run for the same question. The
/// embedder wires `Tick::Expired` to the session's `advance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    duration: TimerDuration,
    remaining: u32,
    paused: bool,
    expired: bool,
}

impl Countdown {
    #[must_use]
    pub fn new(duration: TimerDuration) -> Self {
        Self {
            duration,
            remaining: duration.secs(),
            paused: false,
            expired: false,
        }
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) -> Tick {
        if self.paused || self.expired {
            return Tick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.expired = true;
            Tick::Expired
        } else {
            Tick::Running(self.remaining)
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Starts over with the given duration, cancelling the previous run.
    pub fn reset(&mut self, duration: TimerDuration) {
        *self = Self::new(duration);
    }

    #[must_use]
    pub fn duration(&self) -> TimerDuration {
        self.duration
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expired
    }
}
