//! Shared rate-limit cooldown.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{info, warn};

/// Process-wide "stop calling the primary endpoint until" marker.
///
/// Share one instance behind an `Arc` between every translator that talks to
/// the same endpoint.
#[derive(Debug, Default)]
pub struct CooldownState {
    cooldown_until: Mutex<Option<Instant>>,
}

impl CooldownState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin (or extend) a cooldown lasting `duration` from now.
    pub fn start(&self, duration: Duration) {
        let until = Instant::now() + duration;
        *self.lock() = Some(until);
        info!("Translation cooldown started for {}s", duration.as_secs());
    }

    /// Whether the cooldown is still running. An elapsed cooldown is cleared.
    pub fn is_active(&self) -> bool {
        self.remaining().is_some()
    }

    pub fn remaining(&self) -> Option<Duration> {
        let mut until = self.lock();
        match *until {
            Some(deadline) => {
                let now = Instant::now();
                if now < deadline {
                    Some(deadline - now)
                } else {
                    *until = None;
                    info!("Translation cooldown ended");
                    None
                }
            }
            None => None,
        }
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> MutexGuard<'_, Option<Instant>> {
        self.cooldown_until.lock().unwrap_or_else(|poisoned| {
            warn!("Cooldown mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}
