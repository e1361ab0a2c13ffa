//! Retrying fallible calls.
//!
//! A [`RetryPolicy`] is validated once, when it is built; a [`Retry`] then
//! applies it to any `FnMut() -> Result<T, E>`.
//!
//! ```
//! use fnc::retry::{Retry, RetryPolicy};
//!
//! let policy = RetryPolicy::builder().attempts(3).delay(0.0).build().unwrap();
//! let mut calls = 0;
//! let result: Result<(), &str> = Retry::new(policy).call(|| {
//!     calls += 1;
//!     Err("something went wrong")
//! });
//!
//! assert_eq!(result, Err("something went wrong"));
//! assert_eq!(calls, 3);
//! ```
//!
//! Between attempts the delay grows geometrically:
//!
//! ```text
//! sleep(delay), sleep(delay * scale), sleep(delay * scale^2), ...
//! ```
//!
//! capped at `max_delay` when that is non-zero. Jitter, when set, is added to
//! the running delay before each sleep, so it compounds with the scaling.

use std::fmt;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{FncError, Result};

/// Random extra delay added before each sleep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Jitter {
    /// Uniform in `[0, max]`.
    Upto(f64),
    /// Uniform between the two bounds, in either order. Negative samples add nothing.
    Range(f64, f64),
}

impl Jitter {
    fn validate(&self) -> Result<()> {
        let valid = match *self {
            Jitter::Upto(max) => max.is_finite() && max >= 0.0,
            Jitter::Range(a, b) => (a - b).is_finite(),
        };
        if valid {
            Ok(())
        } else {
            Err(FncError::InvalidConfig {
                field: "jitter",
                reason: "must be a non-negative number or a pair of numbers with a finite span",
            })
        }
    }

    fn sample(&self, rng: &mut impl Rng) -> f64 {
        let (a, b) = match *self {
            Jitter::Upto(max) => (0.0, max),
            Jitter::Range(a, b) => (a, b),
        };
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        rng.gen_range(low..=high).max(0.0)
    }
}

/// Validated retry settings. Delays are in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    attempts: u32,
    delay: f64,
    max_delay: f64,
    scale: f64,
    jitter: Option<Jitter>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: 0.5,
            max_delay: 150.0,
            scale: 2.0,
            jitter: None,
        }
    }
}

impl RetryPolicy {
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn delay(&self) -> f64 {
        self.delay
    }

    /// Upper bound for a single sleep. Zero means unbounded.
    pub fn max_delay(&self) -> f64 {
        self.max_delay
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn jitter(&self) -> Option<Jitter> {
        self.jitter
    }

    /// Checks every setting.
    pub fn validate(&self) -> Result<()> {
        if self.attempts == 0 {
            return Err(FncError::InvalidConfig {
                field: "attempts",
                reason: "must be greater than 0",
            });
        }
        if !(self.delay.is_finite() && self.delay >= 0.0) {
            return Err(FncError::InvalidConfig {
                field: "delay",
                reason: "must be a number greater than or equal to 0",
            });
        }
        if !(self.max_delay.is_finite() && self.max_delay >= 0.0) {
            return Err(FncError::InvalidConfig {
                field: "max_delay",
                reason: "must be a number greater than or equal to 0",
            });
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(FncError::InvalidConfig {
                field: "scale",
                reason: "must be a number greater than 0",
            });
        }
        if let Some(jitter) = &self.jitter {
            jitter.validate()?;
        }
        Ok(())
    }
}

/// Builder for [`RetryPolicy`]. Unset fields keep their defaults.
#[derive(Debug, Clone, Default)]
pub struct RetryPolicyBuilder {
    attempts: Option<u32>,
    delay: Option<f64>,
    max_delay: Option<f64>,
    scale: Option<f64>,
    jitter: Option<Jitter>,
}

impl RetryPolicyBuilder {
    /// Total number of calls, including the first.
    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }

    /// Seconds to sleep after the first failure.
    pub fn delay(mut self, delay: f64) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Cap for any single sleep; zero disables the cap.
    pub fn max_delay(mut self, max_delay: f64) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Factor applied to the delay after each sleep.
    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = Some(jitter);
        self
    }

    /// Builds and validates the policy.
    pub fn build(self) -> Result<RetryPolicy> {
        let default = RetryPolicy::default();
        let policy = RetryPolicy {
            attempts: self.attempts.unwrap_or(default.attempts),
            delay: self.delay.unwrap_or(default.delay),
            max_delay: self.max_delay.unwrap_or(default.max_delay),
            scale: self.scale.unwrap_or(default.scale),
            jitter: self.jitter,
        };
        policy.validate()?;
        Ok(policy)
    }
}

/// Serializable form of [`RetryPolicy`].
///
/// ```
/// use fnc::retry::{Jitter, RetryConfig, RetryPolicy};
///
/// let config: RetryConfig = serde_json::from_str(r#"{"attempts": 5, "jitter": [1, 2]}"#).unwrap();
/// let policy = RetryPolicy::try_from(config).unwrap();
/// assert_eq!(policy.attempts(), 5);
/// assert_eq!(policy.delay(), 0.5);
/// assert_eq!(policy.jitter(), Some(Jitter::Range(1.0, 2.0)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub attempts: u32,
    pub delay: f64,
    pub max_delay: f64,
    pub scale: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jitter: Option<Jitter>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryPolicy::default().into()
    }
}

impl From<RetryPolicy> for RetryConfig {
    fn from(policy: RetryPolicy) -> Self {
        Self {
            attempts: policy.attempts,
            delay: policy.delay,
            max_delay: policy.max_delay,
            scale: policy.scale,
            jitter: policy.jitter,
        }
    }
}

impl TryFrom<RetryConfig> for RetryPolicy {
    type Error = FncError;

    fn try_from(config: RetryConfig) -> Result<Self> {
        let policy = RetryPolicy {
            attempts: config.attempts,
            delay: config.delay,
            max_delay: config.max_delay,
            scale: config.scale,
            jitter: config.jitter,
        };
        policy.validate()?;
        Ok(policy)
    }
}

type RetryOn<E> = Box<dyn Fn(&E) -> bool>;
type OnError<E> = Box<dyn Fn(&E, u32)>;
type Sleep = Box<dyn Fn(Duration)>;

/// Applies a [`RetryPolicy`] to fallible calls.
pub struct Retry<E> {
    policy: RetryPolicy,
    retry_on: Option<RetryOn<E>>,
    on_error: Option<OnError<E>>,
    sleep: Sleep,
}

impl<E> Retry<E> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            retry_on: None,
            on_error: None,
            sleep: Box::new(std::thread::sleep),
        }
    }

    /// Restricts retries to errors matching `predicate`. Other errors are
    /// returned at once, without notifying the observer.
    pub fn retry_on<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + 'static,
    {
        self.retry_on = Some(Box::new(predicate));
        self
    }

    /// Observes every retryable failure with its 1-based attempt number,
    /// including the last one.
    pub fn on_error<F>(mut self, observer: F) -> Self
    where
        F: Fn(&E, u32) + 'static,
    {
        self.on_error = Some(Box::new(observer));
        self
    }

    /// Replaces the blocking sleep between attempts.
    pub fn with_sleep<F>(mut self, sleep: F) -> Self
    where
        F: Fn(Duration) + 'static,
    {
        self.sleep = Box::new(sleep);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Calls `op` until it succeeds or the attempts run out.
    ///
    /// The final error is returned unchanged.
    pub fn call<T, F>(&self, mut op: F) -> std::result::Result<T, E>
    where
        F: FnMut() -> std::result::Result<T, E>,
    {
        let policy = &self.policy;
        let mut rng = rand::thread_rng();
        let mut delay = policy.delay;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let err = match op() {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if let Some(retry_on) = &self.retry_on {
                if !retry_on(&err) {
                    debug!(attempt, "error is not retryable");
                    return Err(err);
                }
            }

            if let Some(on_error) = &self.on_error {
                on_error(&err, attempt);
            }

            if attempt >= policy.attempts {
                warn!(attempts = policy.attempts, "retry attempts exhausted");
                return Err(err);
            }

            if let Some(jitter) = &policy.jitter {
                delay += jitter.sample(&mut rng);
            }
            if policy.max_delay > 0.0 {
                delay = delay.min(policy.max_delay);
            }

            debug!(attempt, delay, "retrying after failure");
            (self.sleep)(Duration::try_from_secs_f64(delay).unwrap_or(Duration::MAX));
            delay *= policy.scale;
        }
    }

    /// Turns `op` into a closure that retries on every call.
    pub fn wrap<T, F>(self, mut op: F) -> impl FnMut() -> std::result::Result<T, E>
    where
        F: FnMut() -> std::result::Result<T, E>,
    {
        move || self.call(&mut op)
    }
}

impl<E> fmt::Debug for Retry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retry")
            .field("policy", &self.policy)
            .field("retry_on", &self.retry_on.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorded_sleeps<E>(retry: Retry<E>) -> (Retry<E>, Rc<RefCell<Vec<f64>>>) {
        let sleeps = Rc::new(RefCell::new(Vec::new()));
        let sink = sleeps.clone();
        let retry = retry.with_sleep(move |d| sink.borrow_mut().push(d.as_secs_f64()));
        (retry, sleeps)
    }

    fn always_fails(policy: RetryPolicy) -> Vec<f64> {
        let (retry, sleeps) = recorded_sleeps(Retry::new(policy));
        let result: std::result::Result<(), &str> = retry.call(|| Err("boom"));
        assert_eq!(result, Err("boom"));
        let recorded = sleeps.borrow().clone();
        recorded
    }

    #[test]
    fn test_defaults() {
        let policy = RetryPolicy::builder().build().unwrap();
        assert_eq!(policy, RetryPolicy::default());
        assert_eq!(policy.attempts(), 3);
        assert_eq!(policy.delay(), 0.5);
        assert_eq!(policy.max_delay(), 150.0);
        assert_eq!(policy.scale(), 2.0);
        assert_eq!(policy.jitter(), None);
    }

    #[test]
    fn test_sleep_schedule() {
        let single = RetryPolicy::builder().attempts(1).build().unwrap();
        assert!(always_fails(single).is_empty());

        let doubling = RetryPolicy::builder().attempts(3).delay(0.5).scale(2.0).build().unwrap();
        assert_eq!(always_fails(doubling), vec![0.5, 1.0]);

        let growing = RetryPolicy::builder().attempts(5).delay(1.5).scale(2.5).build().unwrap();
        assert_eq!(always_fails(growing), vec![1.5, 3.75, 9.375, 23.4375]);

        let capped = RetryPolicy::builder()
            .attempts(5)
            .delay(1.5)
            .max_delay(8.0)
            .scale(2.5)
            .build()
            .unwrap();
        assert_eq!(always_fails(capped), vec![1.5, 3.75, 8.0, 8.0]);
    }

    #[test]
    fn test_jitter_adds_to_delay() {
        let policy = RetryPolicy::builder()
            .attempts(5)
            .delay(2.0)
            .scale(1.0)
            .jitter(Jitter::Range(1.0, 2.0))
            .build()
            .unwrap();
        let sleeps = always_fails(policy);
        assert_eq!(sleeps.len(), 4);
        assert!(sleeps[0] >= 3.0 && sleeps[0] <= 4.0);
        assert!(sleeps.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_success_stops_retrying() {
        let policy = RetryPolicy::builder().attempts(5).delay(0.0).build().unwrap();
        let (retry, sleeps) = recorded_sleeps(Retry::new(policy));
        let mut calls = 0;
        let result: std::result::Result<u32, &str> = retry.call(|| {
            calls += 1;
            if calls < 3 {
                Err("not yet")
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result, Ok(3));
        assert_eq!(sleeps.borrow().len(), 2);
    }

    #[test]
    fn test_non_retryable_errors_propagate() {
        #[derive(Debug, PartialEq)]
        enum Failure {
            Transient,
            Fatal,
        }

        let policy = RetryPolicy::builder().attempts(3).delay(0.0).build().unwrap();
        let observed = Rc::new(RefCell::new(Vec::new()));
        let sink = observed.clone();
        let retry = Retry::new(policy)
            .retry_on(|e: &Failure| *e == Failure::Transient)
            .on_error(move |_, attempt| sink.borrow_mut().push(attempt))
            .with_sleep(|_| {});

        let mut calls = 0;
        let result: std::result::Result<(), Failure> = retry.call(|| {
            calls += 1;
            Err(if calls == 1 { Failure::Transient } else { Failure::Fatal })
        });
        assert_eq!(result, Err(Failure::Fatal));
        assert_eq!(calls, 2);
        assert_eq!(*observed.borrow(), vec![1]);
    }

    #[test]
    fn test_observer_sees_every_attempt() {
        let policy = RetryPolicy::builder().attempts(5).delay(0.0).build().unwrap();
        let observed = Rc::new(RefCell::new(Vec::new()));
        let sink = observed.clone();
        let retry = Retry::new(policy)
            .on_error(move |_: &&str, attempt| sink.borrow_mut().push(attempt))
            .with_sleep(|_| {});

        let result: std::result::Result<(), &str> = retry.call(|| Err("boom"));
        assert!(result.is_err());
        assert_eq!(*observed.borrow(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_wrap() {
        let policy = RetryPolicy::builder().attempts(2).delay(0.0).build().unwrap();
        let mut calls = 0;
        {
            let mut wrapped = Retry::new(policy)
                .with_sleep(|_| {})
                .wrap(|| -> std::result::Result<(), &str> {
                    calls += 1;
                    Err("boom")
                });
            assert!(wrapped().is_err());
            assert!(wrapped().is_err());
        }
        assert_eq!(calls, 4);
    }

    #[test]
    fn test_invalid_settings() {
        let cases = [
            (RetryPolicy::builder().attempts(0), "attempts"),
            (RetryPolicy::builder().delay(-1.0), "delay"),
            (RetryPolicy::builder().max_delay(-1.0), "max_delay"),
            (RetryPolicy::builder().scale(0.0), "scale"),
            (RetryPolicy::builder().jitter(Jitter::Upto(-1.0)), "jitter"),
            (RetryPolicy::builder().jitter(Jitter::Range(0.0, f64::NAN)), "jitter"),
            (RetryPolicy::builder().jitter(Jitter::Range(f64::MIN, f64::MAX)), "jitter"),
            (RetryPolicy::builder().jitter(Jitter::Range(0.0, f64::INFINITY)), "jitter"),
        ];
        for (builder, expected) in cases {
            match builder.build() {
                Err(FncError::InvalidConfig { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected invalid {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_wide_but_finite_jitter_is_sampled() {
        let policy = RetryPolicy::builder()
            .attempts(2)
            .delay(0.0)
            .max_delay(1.0)
            .jitter(Jitter::Range(-1e300, 1e300))
            .build()
            .unwrap();
        let sleeps = always_fails(policy);
        assert_eq!(sleeps.len(), 1);
        assert!((0.0..=1.0).contains(&sleeps[0]));
    }

    #[test]
    fn test_config_deserialization() {
        let config: RetryConfig = serde_json::from_str(r#"{"delay": 0, "jitter": 1.5}"#).unwrap();
        assert_eq!(config.attempts, 3);
        assert_eq!(config.jitter, Some(Jitter::Upto(1.5)));

        let policy = RetryPolicy::try_from(config).unwrap();
        assert_eq!(policy.delay(), 0.0);

        let invalid: RetryConfig = serde_json::from_str(r#"{"scale": -2}"#).unwrap();
        assert!(RetryPolicy::try_from(invalid).is_err());

        assert!(serde_json::from_str::<RetryConfig>(r#"{"jitter": "1"}"#).is_err());
    }
}
