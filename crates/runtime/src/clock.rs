use std::collections::BTreeSet;

use foundation::time::Time;
use tracing::debug;

/// Playback direction inferred from the sign of the clock multiplier.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlaybackDirection {
    Forward,
    Backward,
}

impl PlaybackDirection {
    /// `multiplier >= 0` is forward; only the sign matters.
    pub fn from_multiplier(multiplier: f64) -> Self {
        if multiplier >= 0.0 {
            PlaybackDirection::Forward
        } else {
            PlaybackDirection::Backward
        }
    }
}

/// One clock notification: where the clock is and which way it is moving.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClockTick {
    pub time: Time,
    pub multiplier: f64,
}

impl ClockTick {
    pub fn new(time: Time, multiplier: f64) -> Self {
        Self { time, multiplier }
    }

    pub fn direction(&self) -> PlaybackDirection {
        PlaybackDirection::from_multiplier(self.multiplier)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionToken(u64);

/// Shared playback clock.
///
/// The clock does not call back into its subscribers. Whoever drives it
/// (`advance`) delivers the returned tick to each subscribed listener in token
/// order, one at a time, so listeners never observe each other mid-update.
#[derive(Debug)]
pub struct Clock {
    current_time: Time,
    multiplier: f64,
    next_token: u64,
    subscribers: BTreeSet<SubscriptionToken>,
}

impl Clock {
    pub fn new(current_time: Time, multiplier: f64) -> Self {
        Self {
            current_time,
            multiplier,
            next_token: 1,
            subscribers: BTreeSet::new(),
        }
    }

    pub fn current_time(&self) -> Time {
        self.current_time
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn set_current_time(&mut self, time: Time) {
        self.current_time = time;
    }

    pub fn set_multiplier(&mut self, multiplier: f64) {
        self.multiplier = multiplier;
    }

    pub fn tick(&self) -> ClockTick {
        ClockTick::new(self.current_time, self.multiplier)
    }

    /// Move the clock by `dt_s` wall seconds scaled by the multiplier.
    pub fn advance(&mut self, dt_s: f64) -> ClockTick {
        self.current_time = Time(self.current_time.0 + dt_s * self.multiplier);
        self.tick()
    }

    pub fn subscribe(&mut self) -> SubscriptionToken {
        let token = SubscriptionToken(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        self.subscribers.insert(token);
        debug!(token = token.0, "clock subscriber added");
        token
    }

    /// Returns `false` if the token was not subscribed.
    pub fn unsubscribe(&mut self, token: SubscriptionToken) -> bool {
        let removed = self.subscribers.remove(&token);
        if removed {
            debug!(token = token.0, "clock subscriber removed");
        }
        removed
    }

    pub fn is_subscribed(&self, token: SubscriptionToken) -> bool {
        self.subscribers.contains(&token)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
