//! Reconnect backoff bookkeeping.
//!
//! The delay grows as `round(1.5 * delay - 200)` clamped to
//! `[RETRY_DELAY_FLOOR_MS, RETRY_DELAY_CAP_MS]`. The very first connect
//! uses a shorter delay than the one restored after a manual retry.

use std::time::Duration;

/// Delay in effect before the first successful connect and after every success.
pub const INITIAL_DELAY_MS: u64 = 100;
/// Delay restored by a manual retry; also the lower clamp bound.
pub const RETRY_DELAY_FLOOR_MS: u64 = 500;
/// Upper clamp bound of the delay.
pub const RETRY_DELAY_CAP_MS: u64 = 15_000;
/// Consecutive failed reconnects tolerated before giving up.
pub const MAX_RECONNECT_ATTEMPTS: u32 = 20;

const GROWTH_FACTOR: f64 = 1.5;
const GROWTH_OFFSET_MS: f64 = 200.0;

/// Compute the delay that follows `delay_ms`.
pub fn next_delay_ms(delay_ms: u64) -> u64 {
    let grown = (GROWTH_FACTOR * delay_ms as f64 - GROWTH_OFFSET_MS).round();
    grown.clamp(RETRY_DELAY_FLOOR_MS as f64, RETRY_DELAY_CAP_MS as f64) as u64
}

/// Mutable `(delay, attempt count)` pair owned by the connection manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    delay_ms: u64,
    attempts: u32,
}

impl Backoff {
    /// Backoff for a fresh start: 100ms delay and no failed attempts.
    pub fn new() -> Self {
        Self {
            delay_ms: INITIAL_DELAY_MS,
            attempts: 0,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Record a failed attempt.
    ///
    /// Advances the delay and the attempt count and returns the delay to
    /// wait before the next attempt, which is the one in effect *before*
    /// this call. Returns `None` once the attempt count exceeds
    /// [`MAX_RECONNECT_ATTEMPTS`].
    pub fn record_failure(&mut self) -> Option<Duration> {
        let wait = self.delay();
        self.delay_ms = next_delay_ms(self.delay_ms);
        self.attempts = self.attempts.saturating_add(1);

        if self.exhausted() {
            None
        } else {
            Some(wait)
        }
    }

    pub fn exhausted(&self) -> bool {
        self.attempts > MAX_RECONNECT_ATTEMPTS
    }

    /// Reset after a successful connect.
    pub fn reset_on_success(&mut self) {
        self.delay_ms = INITIAL_DELAY_MS;
        self.attempts = 0;
    }

    /// Reset before a user-initiated retry.
    pub fn reset_for_manual_retry(&mut self) {
        self.delay_ms = RETRY_DELAY_FLOOR_MS;
        self.attempts = 0;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_delay_from_floor() {
        // テスト項目: 500ms からの遅延が 550, 625 と増加する
        // given (前提条件):
        let start = RETRY_DELAY_FLOOR_MS;

        // when (操作):
        let first = next_delay_ms(start);
        let second = next_delay_ms(first);

        // then (期待する結果):
        assert_eq!(first, 550);
        assert_eq!(second, 625);
    }

    #[test]
    fn test_next_delay_from_initial_is_clamped_to_floor() {
        // テスト項目: 初期遅延 100ms の次は下限 500ms に切り上げられる
        // given (前提条件):
        let start = INITIAL_DELAY_MS;

        // when (操作):
        let next = next_delay_ms(start);

        // then (期待する結果):
        assert_eq!(next, RETRY_DELAY_FLOOR_MS);
    }

    #[test]
    fn test_delay_sequence_is_non_decreasing_and_capped() {
        // テスト項目: 連続失敗時の遅延は単調非減少で上限を超えない
        // given (前提条件):
        let mut delay = RETRY_DELAY_FLOOR_MS;
        let mut sequence = vec![delay];

        // when (操作):
        for _ in 0..100 {
            delay = next_delay_ms(delay);
            sequence.push(delay);
        }

        // then (期待する結果):
        for pair in sequence.windows(2) {
            assert!(pair[1] >= pair[0], "{:?} decreased", pair);
        }
        assert!(sequence.iter().all(|&d| d <= RETRY_DELAY_CAP_MS));
        assert_eq!(*sequence.last().unwrap(), RETRY_DELAY_CAP_MS);
    }

    #[test]
    fn test_record_failure_returns_pre_update_delay() {
        // テスト項目: 失敗記録時は更新前の遅延が待機時間として返される
        // given (前提条件):
        let mut backoff = Backoff::new();

        // when (操作):
        let first_wait = backoff.record_failure();
        let second_wait = backoff.record_failure();

        // then (期待する結果):
        assert_eq!(first_wait, Some(Duration::from_millis(100)));
        assert_eq!(second_wait, Some(Duration::from_millis(500)));
        assert_eq!(backoff.delay_ms(), 550);
        assert_eq!(backoff.attempts(), 2);
    }

    #[test]
    fn test_record_failure_gives_up_after_ceiling() {
        // テスト項目: 21 回目の失敗で再接続を諦める
        // given (前提条件):
        let mut backoff = Backoff::new();

        // when (操作):
        let waits: Vec<Option<Duration>> = (0..21).map(|_| backoff.record_failure()).collect();

        // then (期待する結果):
        assert!(waits[..20].iter().all(Option::is_some));
        assert_eq!(waits[20], None);
        assert!(backoff.exhausted());
    }

    #[test]
    fn test_reset_on_success() {
        // テスト項目: 接続成功で遅延 100ms・試行回数 0 に戻る
        // given (前提条件):
        let mut backoff = Backoff::new();
        for _ in 0..7 {
            backoff.record_failure();
        }

        // when (操作):
        backoff.reset_on_success();

        // then (期待する結果):
        assert_eq!(backoff, Backoff::new());
    }

    #[test]
    fn test_reset_for_manual_retry_uses_floor() {
        // テスト項目: 手動再試行では遅延が 100ms ではなく 500ms に戻る
        // given (前提条件):
        let mut backoff = Backoff::new();
        for _ in 0..25 {
            backoff.record_failure();
        }

        // when (操作):
        backoff.reset_for_manual_retry();

        // then (期待する結果):
        assert_eq!(backoff.delay_ms(), RETRY_DELAY_FLOOR_MS);
        assert_eq!(backoff.attempts(), 0);
        assert!(!backoff.exhausted());
    }
}
