use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EvalError;

const DEFAULT_INITIAL_DELAY_MS: u64 = 10_000;
const DEFAULT_MULTIPLIER: f64 = 2.0;
const DEFAULT_MAX_DELAY_MS: u64 = 60_000;
const DEFAULT_DEADLINE_MS: u64 = 300_000;

/// Exponential backoff for judge calls.
///
/// Delays grow from `initial_delay_ms` by `multiplier` per retry and are
/// capped at `max_delay_ms`. No attempt starts once `deadline_ms` has elapsed
/// since the first one, and every attempt is cut off at the deadline. A zero
/// `deadline_ms` means a single attempt with no retries.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub initial_delay_ms: u64,
    pub multiplier: f64,
    pub max_delay_ms: u64,
    pub deadline_ms: u64,
    /// Shave a deterministic amount (up to half) off each delay
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
            multiplier: DEFAULT_MULTIPLIER,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            deadline_ms: DEFAULT_DEADLINE_MS,
            jitter: false,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            initial_delay_ms: 0,
            multiplier: 1.0,
            max_delay_ms: 0,
            deadline_ms: 0,
            jitter: false,
        }
    }

    pub fn validate(&self) -> Result<(), EvalError> {
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(EvalError::Config(format!(
                "judge.retry.multiplier must be >= 1, got {}",
                self.multiplier
            )));
        }
        if self.initial_delay_ms == 0 && self.deadline_ms > 0 {
            return Err(EvalError::Config(
                "judge.retry.initial_delay_ms must be > 0 when deadline_ms is set; \
                 use deadline_ms = 0 to disable retries"
                    .to_string(),
            ));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(EvalError::Config(format!(
                "judge.retry.initial_delay_ms ({}) exceeds max_delay_ms ({})",
                self.initial_delay_ms, self.max_delay_ms
            )));
        }
        Ok(())
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    /// Backoff before retry number `attempt` (0-based), before jitter.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let raw = self.initial_delay_ms as f64 * self.multiplier.powi(exponent);
        let capped = raw.min(self.max_delay_ms as f64);
        Duration::from_millis(capped as u64)
    }

    /// Backoff actually slept before retry number `attempt`.
    pub fn backoff(&self, attempt: usize) -> Duration {
        let delay = self.delay_for(attempt);
        if !self.jitter {
            return delay;
        }
        let millis = delay.as_millis() as u64;
        let span = (millis / 2).max(1);
        let jitter = ((attempt as u64)
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1))
            % span;
        Duration::from_millis(millis.saturating_sub(jitter))
    }

    /// Sleeps that fit inside the deadline, ignoring time spent in calls.
    ///
    /// This is the longest retry schedule the policy allows; real runs stop
    /// earlier because each failed call also consumes deadline.
    pub fn schedule(&self) -> Vec<Duration> {
        let deadline = self.deadline();
        let mut elapsed = Duration::ZERO;
        let mut out = Vec::new();
        for attempt in 0.. {
            let delay = self.backoff(attempt);
            if delay.is_zero() || elapsed + delay > deadline {
                break;
            }
            elapsed += delay;
            out.push(delay);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(values: &[u64]) -> Vec<Duration> {
        values.iter().map(|s| Duration::from_secs(*s)).collect()
    }

    #[test]
    fn delays_grow_then_cap() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(10));
        assert_eq!(policy.delay_for(1), Duration::from_secs(20));
        assert_eq!(policy.delay_for(2), Duration::from_secs(40));
        assert_eq!(policy.delay_for(3), Duration::from_secs(60));
        assert_eq!(policy.delay_for(50), Duration::from_secs(60));
    }

    #[test]
    fn default_schedule_stops_at_deadline() {
        // 10 + 20 + 40 + 60 + 60 + 60 = 250s; a further 60s would pass 300s.
        assert_eq!(
            RetryPolicy::default().schedule(),
            secs(&[10, 20, 40, 60, 60, 60])
        );
    }

    #[test]
    fn no_retry_policy_has_empty_schedule() {
        assert!(RetryPolicy::none().schedule().is_empty());
    }

    #[test]
    fn jitter_never_exceeds_base_delay() {
        let policy = RetryPolicy {
            jitter: true,
            ..RetryPolicy::default()
        };
        for attempt in 0..10 {
            let base = policy.delay_for(attempt);
            let jittered = policy.backoff(attempt);
            assert!(jittered <= base);
            assert!(jittered >= base / 2);
        }
    }

    #[test]
    fn zero_initial_delay_needs_zero_deadline() {
        let policy = RetryPolicy {
            initial_delay_ms: 0,
            ..RetryPolicy::default()
        };
        assert!(matches!(policy.validate(), Err(EvalError::Config(_))));
        assert!(RetryPolicy::none().validate().is_ok());
    }

    #[test]
    fn multiplier_below_one_is_rejected() {
        let policy = RetryPolicy {
            multiplier: 0.5,
            ..RetryPolicy::default()
        };
        assert!(matches!(policy.validate(), Err(EvalError::Config(_))));
    }
}
