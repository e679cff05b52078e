use std::sync::Mutex;

use crate::{KgqaError, Result};

/// Strike threshold used when none is configured
pub const DEFAULT_MAX_STRIKES: u32 = 10;

/// Failure accounting for one external client instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateBudget {
    /// Consecutive failed calls
    pub strikes: u32,
    /// Whether the most recent call failed
    pub previous_failed: bool,
}

/// Consecutive-failure guard shared by every call through one client
///
/// A failed call extends the streak when the previous call also failed and
/// starts a new one otherwise; a success clears it. Once strikes exceed
/// `max_strikes` the breaker stays open for the rest of the run.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    max_strikes: u32,
    state: Mutex<RateBudget>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, max_strikes: u32) -> Self {
        Self {
            name: name.into(),
            max_strikes,
            state: Mutex::new(RateBudget::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn budget(&self) -> RateBudget {
        *self.state.lock().unwrap()
    }

    pub fn is_open(&self) -> bool {
        self.budget().strikes > self.max_strikes
    }

    /// Fail fast when the breaker has already tripped
    pub fn check(&self) -> Result<()> {
        let budget = self.budget();
        if budget.strikes > self.max_strikes {
            return Err(self.open_error(budget.strikes));
        }
        Ok(())
    }

    pub fn record_success(&self) {
        let mut state = self.state.lock().unwrap();
        if state.strikes > 0 {
            log::debug!("{}: call succeeded, clearing {} strikes", self.name, state.strikes);
        }
        *state = RateBudget::default();
    }

    /// Count one failed call; returns the fatal error when it trips the breaker
    pub fn record_failure(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.strikes = if state.previous_failed { state.strikes + 1 } else { 1 };
        state.previous_failed = true;
        if state.strikes > self.max_strikes {
            log::error!(
                "{}: {} consecutive failures, giving up on this dependency",
                self.name,
                state.strikes
            );
            return Err(self.open_error(state.strikes));
        }
        Ok(())
    }

    fn open_error(&self, strikes: u32) -> KgqaError {
        KgqaError::CircuitOpen {
            client: self.name.clone(),
            strikes,
        }
    }
}
