//! Pomodoro countdown state.
//!
//! The timer does not own a clock. The event loop delivers one tick per second
//! while a session runs, and each accepted tick that leaves time on the clock
//! asks for the next one. Stopping is therefore just not asking again.
//!
//! Ticks carry the session number they were scheduled for. Starting or
//! resuming bumps the number, so a tick still in flight from an earlier run
//! is ignored instead of double-counting a second.

use crate::task::POMODORO_MINUTES;

/// Length of one session in seconds.
pub const POMODORO_SECONDS: u32 = POMODORO_MINUTES as u32 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pomodoro {
    /// Task credited with the work, if any.
    pub task_id: Option<i64>,
    pub remaining: u32,
    pub running: bool,
    pub completed: bool,
    /// Tick generation currently accepted.
    pub session: u64,
}

/// What a delivered tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stale or paused; nothing changed.
    Ignored,
    /// One second elapsed and time remains.
    Continue,
    /// The countdown just reached zero.
    Finished,
}

/// Work to credit when a session is stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialWork {
    pub task_id: i64,
    pub minutes: i64,
}

impl Default for Pomodoro {
    fn default() -> Self {
        Self {
            task_id: None,
            remaining: POMODORO_SECONDS,
            running: false,
            completed: false,
            session: 0,
        }
    }
}

impl Pomodoro {
    /// A fresh, running session following `self`.
    pub fn restart(&self, task_id: Option<i64>) -> Self {
        Self {
            task_id,
            running: true,
            session: self.session.wrapping_add(1),
            ..Self::default()
        }
    }

    /// Advance by one second if the tick belongs to the running session.
    pub fn tick(&mut self, session: u64) -> TickOutcome {
        if !self.running || session != self.session {
            return TickOutcome::Ignored;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            self.completed = true;
            TickOutcome::Finished
        } else {
            TickOutcome::Continue
        }
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Resume a paused session. Returns the session to schedule ticks for.
    pub fn resume(&mut self) -> Option<u64> {
        if self.running || self.completed {
            return None;
        }
        self.running = true;
        self.session = self.session.wrapping_add(1);
        Some(self.session)
    }

    /// End the session early and report whole minutes worth recording.
    ///
    /// Returns `None` when nothing should be recorded: the session already
    /// completed, has no target task, or lasted less than a minute.
    pub fn stop(&mut self) -> Option<PartialWork> {
        self.running = false;
        if self.completed {
            return None;
        }
        let minutes = self.elapsed_minutes();
        match self.task_id {
            Some(task_id) if minutes > 0 => Some(PartialWork { task_id, minutes }),
            _ => None,
        }
    }

    pub fn elapsed_seconds(&self) -> u32 {
        POMODORO_SECONDS - self.remaining.min(POMODORO_SECONDS)
    }

    pub fn elapsed_minutes(&self) -> i64 {
        i64::from(self.elapsed_seconds() / 60)
    }

    /// Fraction of the session elapsed, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        f64::from(self.elapsed_seconds()) / f64::from(POMODORO_SECONDS)
    }

    /// Remaining time as `MM:SS`.
    pub fn clock(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}
