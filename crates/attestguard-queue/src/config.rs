// crates/attestguard-queue/src/config.rs
// ============================================================================
// Module: Queue Configuration
// Description: Worker-pool sizing and retry/backoff tuning (spec.md §4.7, §5).
// Purpose: Bound concurrency and give the retry loop its backoff schedule.
// Dependencies: serde
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

/// Worker-pool configuration for `attestguard-queue`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Number of worker fibers running concurrently (`N` in spec.md §4.7).
    pub concurrency: usize,
    /// Maximum attempts for a thrown job-function failure before giving up.
    pub max_attempts: u32,
    /// Base backoff delay in milliseconds; attempt `k` waits
    /// `backoff_delay_ms * 2^(k-1)`.
    pub backoff_delay_ms: u64,
    /// How long the dispatch loop sleeps between empty polls of the store.
    pub poll_interval_ms: u64,
    /// Grace period after which a stale `active` task is reaped to `failed`
    /// (spec.md §5, worker-restart recovery).
    pub reap_grace_secs: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            max_attempts: 3,
            backoff_delay_ms: 1_000,
            poll_interval_ms: 500,
            reap_grace_secs: 900,
        }
    }
}

impl QueueConfig {
    /// Computes the exponential backoff delay for `attempt` (1-indexed),
    /// `backoff_delay_ms * 2^(attempt-1)` (spec.md §4.7 "Retry").
    #[must_use]
    pub fn backoff_for_attempt(&self, attempt: u32) -> u64 {
        self.backoff_delay_ms
            .saturating_mul(1u64 << attempt.saturating_sub(1).min(63))
    }
}

#[cfg(test)]
mod tests {
    use super::QueueConfig;

    #[test]
    fn backoff_doubles_per_attempt() {
        let config = QueueConfig {
            backoff_delay_ms: 1_000,
            ..QueueConfig::default()
        };
        assert_eq!(config.backoff_for_attempt(1), 1_000);
        assert_eq!(config.backoff_for_attempt(2), 2_000);
        assert_eq!(config.backoff_for_attempt(3), 4_000);
    }

    #[test]
    fn backoff_saturates_instead_of_overflowing() {
        let config = QueueConfig {
            backoff_delay_ms: u64::MAX,
            ..QueueConfig::default()
        };
        assert_eq!(config.backoff_for_attempt(5), u64::MAX);
    }

    #[test]
    fn default_config_is_valid_shape() {
        let config = QueueConfig::default();
        assert!(config.concurrency > 0);
        assert!(config.max_attempts > 0);
        assert!(config.backoff_delay_ms > 0);
    }
}
