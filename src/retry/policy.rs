use crate::retry::Delay;
use crate::{ScrapeError, WalkState};
use std::time::Duration;

/// How long to wait between attempts and how many to make
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
    /// `None` retries until the step succeeds
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub fn unbounded(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    pub fn bounded(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts: Some(max_attempts.max(1)),
        }
    }

    /// Starts counting attempts for one step
    pub fn attempts(&self, state: WalkState) -> Attempts {
        Attempts {
            policy: *self,
            state,
            failures: 0,
        }
    }
}

/// Attempt bookkeeping for one step
///
/// Hands back the delay to wait after a transient failure, or the error that
/// ends the step.
#[derive(Debug)]
pub struct Attempts {
    policy: RetryPolicy,
    state: WalkState,
    failures: u32,
}

impl Attempts {
    /// Records a failed attempt
    ///
    /// # Returns
    ///
    /// * `Ok(Duration)` - The failure was transient; wait this long and try again
    /// * `Err(ScrapeError)` - The failure is fatal, or the attempt cap was reached
    pub fn record(&mut self, error: ScrapeError) -> Result<Duration, ScrapeError> {
        if !error.is_transient() {
            return Err(error);
        }

        self.failures += 1;

        if let Some(max) = self.policy.max_attempts {
            if self.failures >= max {
                return Err(ScrapeError::RetriesExhausted {
                    state: self.state,
                    attempts: self.failures,
                    last: Box::new(error),
                });
            }
        }

        tracing::warn!(
            "Attempt {} at {} failed ({}), retrying in {:?}",
            self.failures,
            self.state,
            error,
            self.policy.delay
        );

        Ok(self.policy.delay)
    }

    /// Failed attempts so far
    pub fn failures(&self) -> u32 {
        self.failures
    }
}

/// One retryable unit of page work
///
/// An attempt must redo everything the step depends on (navigate, execute,
/// snapshot, parse) so a retry starts from scratch.
#[allow(async_fn_in_trait)]
pub trait Step<T> {
    type Output;

    /// Makes one attempt against `target` at hierarchy level `state`
    async fn attempt(&mut self, target: &mut T, state: WalkState) -> Result<Self::Output, ScrapeError>;
}

/// Runs steps under a retry policy
pub struct RetryEnvelope<D> {
    policy: RetryPolicy,
    delay: D,
}

impl<D: Delay> RetryEnvelope<D> {
    pub fn new(policy: RetryPolicy, delay: D) -> Self {
        Self { policy, delay }
    }

    /// Runs `step` until it succeeds or fails fatally
    ///
    /// # Arguments
    ///
    /// * `state` - Hierarchy level the step belongs to, for error reporting
    /// * `target` - What each attempt works on, usually the page driver
    /// * `step` - Attempted again after every transient failure
    pub async fn run<T, S: Step<T>>(
        &self,
        state: WalkState,
        target: &mut T,
        step: &mut S,
    ) -> Result<S::Output, ScrapeError> {
        let mut attempts = self.policy.attempts(state);
        loop {
            match step.attempt(target, state).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    let wait = attempts.record(e)?;
                    self.delay.wait(wait).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::NoDelay;
    use std::cell::RefCell;

    /// Records every requested wait instead of sleeping
    #[derive(Default)]
    struct RecordingDelay {
        waits: RefCell<Vec<Duration>>,
    }

    impl Delay for RecordingDelay {
        async fn wait(&self, duration: Duration) {
            self.waits.borrow_mut().push(duration);
        }
    }

    /// Fails a fixed number of times, then succeeds with the attempt number
    struct Flaky {
        failures: u32,
        error: fn(WalkState) -> ScrapeError,
    }

    impl Step<u32> for Flaky {
        type Output = u32;

        async fn attempt(&mut self, calls: &mut u32, state: WalkState) -> Result<u32, ScrapeError> {
            *calls += 1;
            if *calls <= self.failures {
                Err((self.error)(state))
            } else {
                Ok(*calls)
            }
        }
    }

    fn empty(state: WalkState) -> ScrapeError {
        ScrapeError::empty_render(state, "0 units")
    }

    fn timeout(state: WalkState) -> ScrapeError {
        ScrapeError::navigation(state, "timeout")
    }

    fn no_town(state: WalkState) -> ScrapeError {
        ScrapeError::structural(state, "no Town=")
    }

    #[tokio::test]
    async fn test_empty_render_retried_until_success() {
        let envelope = RetryEnvelope::new(RetryPolicy::unbounded(Duration::from_secs(10)), NoDelay);
        let mut calls = 0;
        let mut step = Flaky { failures: 4, error: empty };

        let result = envelope.run(WalkState::AtBlockLinks, &mut calls, &mut step).await;

        assert_eq!(result.unwrap(), 5);
        assert_eq!(calls, 5);
    }

    #[tokio::test]
    async fn test_structural_mismatch_not_retried() {
        let envelope = RetryEnvelope::new(RetryPolicy::unbounded(Duration::from_secs(5)), NoDelay);
        let mut calls = 0;
        let mut step = Flaky { failures: u32::MAX, error: no_town };

        let err = envelope
            .run(WalkState::AtFlatTypeLinks, &mut calls, &mut step)
            .await
            .unwrap_err();

        assert!(err.is_structural());
        assert_eq!(err.state(), Some(WalkState::AtFlatTypeLinks));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_waits_policy_delay_between_attempts() {
        let delay = RecordingDelay::default();
        let envelope = RetryEnvelope::new(RetryPolicy::unbounded(Duration::from_secs(5)), &delay);
        let mut calls = 0;
        let mut step = Flaky { failures: 2, error: timeout };

        envelope
            .run(WalkState::AtFlatTypeLinks, &mut calls, &mut step)
            .await
            .unwrap();

        assert_eq!(*delay.waits.borrow(), vec![Duration::from_secs(5); 2]);
    }

    #[tokio::test]
    async fn test_bounded_policy_gives_up() {
        let envelope = RetryEnvelope::new(RetryPolicy::bounded(Duration::from_secs(1), 3), NoDelay);
        let mut calls = 0;
        let mut step = Flaky { failures: u32::MAX, error: empty };

        let result = envelope.run(WalkState::AtBlockLinks, &mut calls, &mut step).await;

        match result {
            Err(ScrapeError::RetriesExhausted { attempts, last, .. }) => {
                assert_eq!(attempts, 3);
                assert!(last.is_transient());
            }
            other => panic!("expected RetriesExhausted, got {:?}", other),
        }
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_attempts_record() {
        let mut attempts = RetryPolicy::unbounded(Duration::from_millis(250)).attempts(WalkState::AtSummary);

        let wait = attempts
            .record(ScrapeError::navigation(WalkState::AtSummary, "reset"))
            .unwrap();
        assert_eq!(wait, Duration::from_millis(250));
        assert_eq!(attempts.failures(), 1);

        let fatal = attempts.record(ScrapeError::Browser("gone".to_string()));
        assert!(matches!(fatal, Err(ScrapeError::Browser(_))));
        assert_eq!(attempts.failures(), 1);
    }
}
