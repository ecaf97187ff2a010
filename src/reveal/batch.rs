//! Batch sizing for reveal ticks.

use crate::model::RevealError;

/// Default divisor for [`ProportionalBatch`].
pub const DEFAULT_BATCH_DIVISOR: usize = 5;

/// Decides how many queued units a single tick reveals.
///
/// Only consulted while the stream is still open; once the stream has ended
/// the scheduler drains the whole queue in one batch regardless of policy.
pub trait BatchPolicy {
    /// Batch size for a queue holding `queued` units (`queued >= 1`).
    ///
    /// # Errors
    ///
    /// Returns [`RevealError`] when the policy is misconfigured. The
    /// scheduler logs the error and retries on the next frame.
    fn batch_size(&self, queued: usize) -> Result<usize, RevealError>;
}

/// Proportional draining: `max(1, queued / divisor)`.
///
/// Catches up quickly on bursty input and reveals character by character on
/// a slow trickle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProportionalBatch {
    /// Fraction of the queue drained per tick is `1 / divisor`.
    pub divisor: usize,
}

impl ProportionalBatch {
    /// Create a policy with the given divisor.
    pub fn new(divisor: usize) -> Self {
        Self { divisor }
    }
}

impl Default for ProportionalBatch {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_DIVISOR)
    }
}

impl BatchPolicy for ProportionalBatch {
    fn batch_size(&self, queued: usize) -> Result<usize, RevealError> {
        if self.divisor == 0 {
            return Err(RevealError::ZeroDivisor);
        }
        Ok((queued / self.divisor).max(1))
    }
}

impl<F> BatchPolicy for F
where
    F: Fn(usize) -> Result<usize, RevealError>,
{
    fn batch_size(&self, queued: usize) -> Result<usize, RevealError> {
        self(queued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn small_queue_drains_one_unit() {
        let policy = ProportionalBatch::default();
        assert_eq!(policy.batch_size(1), Ok(1));
        assert_eq!(policy.batch_size(4), Ok(1));
    }

    #[test]
    fn large_queue_drains_a_fifth() {
        let policy = ProportionalBatch::default();
        assert_eq!(policy.batch_size(5), Ok(1));
        assert_eq!(policy.batch_size(10), Ok(2));
        assert_eq!(policy.batch_size(503), Ok(100));
    }

    #[test]
    fn zero_divisor_is_an_error() {
        assert_eq!(
            ProportionalBatch::new(0).batch_size(10),
            Err(RevealError::ZeroDivisor)
        );
    }

    #[test]
    fn closures_act_as_policies() {
        let fixed = |_queued: usize| -> Result<usize, RevealError> { Ok(3) };
        assert_eq!(fixed.batch_size(100), Ok(3));
    }

    proptest! {
        #[test]
        fn prop_batch_formula(n in 1usize..100_000) {
            let size = ProportionalBatch::default().batch_size(n).unwrap();
            prop_assert_eq!(size, std::cmp::max(1, n / 5));
            prop_assert!(size >= 1);
            prop_assert!(size <= n);
        }

        #[test]
        fn prop_any_divisor_stays_in_range(n in 1usize..10_000, divisor in 1usize..64) {
            let size = ProportionalBatch::new(divisor).batch_size(n).unwrap();
            prop_assert!((1..=n).contains(&size));
        }
    }
}
