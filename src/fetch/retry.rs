use std::time::Duration;

/// How the fetcher handles transient tile failures.
///
/// The baseline is [`RetryPolicy::None`]: every failure is terminal for the
/// layer in that render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    /// No retries - fail on the first error.
    #[default]
    None,

    /// Fixed number of attempts with a constant delay between them.
    Fixed {
        /// Maximum number of attempts (including the initial attempt).
        max_attempts: u32,
        /// Delay between attempts.
        delay: Duration,
    },
}

impl RetryPolicy {
    /// Create a fixed policy allowing `retries` additional attempts.
    ///
    /// Zero retries yields [`RetryPolicy::None`].
    pub fn with_retries(retries: u32, delay: Duration) -> Self {
        if retries == 0 {
            Self::None
        } else {
            Self::Fixed {
                max_attempts: retries.saturating_add(1),
                delay,
            }
        }
    }

    /// Delay before the next attempt, given how many attempts were made so far.
    ///
    /// Returns `None` when no attempts remain.
    pub fn delay_after(&self, attempts_made: u32) -> Option<Duration> {
        match self {
            Self::None => None,
            Self::Fixed {
                max_attempts,
                delay,
            } => (attempts_made < *max_attempts).then_some(*delay),
        }
    }

    /// Maximum number of attempts for this policy.
    pub fn max_attempts(&self) -> u32 {
        match self {
            Self::None => 1,
            Self::Fixed { max_attempts, .. } => *max_attempts,
        }
    }
}
