use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationPhase {
    #[default]
    Pending,
    /// Terminal within a session.
    Active,
}

/// Tracks whether minting has opened. Moves from `Pending` to `Active` at
/// most once and never back, even when a later snapshot moves the go-live
/// date into the future.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationWindow {
    /// Go-live date in unix seconds.
    target: Option<i64>,
    phase: ActivationPhase,
}

impl ActivationWindow {
    pub fn new(target: Option<i64>) -> Self {
        ActivationWindow {
            target,
            phase: ActivationPhase::Pending,
        }
    }

    pub fn phase(&self) -> ActivationPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == ActivationPhase::Active
    }

    pub fn target(&self) -> Option<i64> {
        self.target
    }

    /// Replaces the countdown target. The latest go-live date always wins,
    /// but an already active window stays active.
    pub fn set_target(&mut self, target: Option<i64>) {
        self.target = target;
    }

    /// Activates the window when `now_ms` has reached the target. Returns
    /// `true` only on the transition itself.
    pub fn observe(&mut self, now_ms: i64) -> bool {
        match self.target {
            Some(target) if now_ms >= target.saturating_mul(1000) => self.complete(),
            _ => false,
        }
    }

    /// Countdown timer completion. Returns `true` only on the transition itself.
    pub fn complete(&mut self) -> bool {
        if self.phase == ActivationPhase::Active {
            return false;
        }
        self.phase = ActivationPhase::Active;
        true
    }

    /// Time left until the target, clamped at zero. `None` when there is no target.
    pub fn remaining(&self, now_ms: i64) -> Option<Countdown> {
        self.target.map(|target| {
            let remaining = target.saturating_mul(1000).saturating_sub(now_ms).max(0);
            Countdown::from_millis(remaining as u64)
        })
    }
}

/// Time left before the go-live date, with whole days folded into hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    total_ms: u64,
}

impl Countdown {
    pub fn from_millis(total_ms: u64) -> Self {
        let total_seconds = total_ms / 1000;
        Countdown {
            hours: total_seconds / 3600,
            minutes: (total_seconds % 3600) / 60,
            seconds: total_seconds % 60,
            total_ms,
        }
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    pub fn is_complete(&self) -> bool {
        self.total_ms == 0
    }
}

impl Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} hours, {} minutes, {} seconds",
            self.hours, self.minutes, self.seconds
        )
    }
}

/// Source of the current time, in unix milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
