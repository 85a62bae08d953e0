//! Conversion of emoji chat server timestamps to wall-clock time.
//!
//! The server stamps every chat message with milliseconds elapsed since
//! its own epoch rather than the Unix epoch.

use chrono::{DateTime, Local, TimeZone, Utc};

/// Server epoch as Unix milliseconds (2022-04-27T16:00:00Z).
pub const EMOJI_CHAT_EPOCH_MS: i64 = 1_651_075_200_000;

/// Convert a server timestamp to Unix milliseconds.
pub fn server_timestamp_to_unix_millis(timestamp: i64) -> i64 {
    timestamp.saturating_add(EMOJI_CHAT_EPOCH_MS)
}

/// Convert a server timestamp to a UTC instant.
///
/// Returns `None` if the value falls outside chrono's representable range.
pub fn server_timestamp_to_utc(timestamp: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(server_timestamp_to_unix_millis(timestamp))
        .single()
}

/// Format a server timestamp as RFC 3339 in the given offset.
///
/// Out-of-range values fall back to the raw number so a bogus timestamp
/// never hides the message it belongs to.
pub fn format_server_timestamp<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match server_timestamp_to_utc(timestamp) {
        Some(dt) => dt.with_timezone(tz).to_rfc3339(),
        None => {
            tracing::debug!("Server timestamp {} is out of range", timestamp);
            timestamp.to_string()
        }
    }
}

/// Format a server timestamp as RFC 3339 in the local time zone.
pub fn format_server_timestamp_local(timestamp: i64) -> String {
    format_server_timestamp(timestamp, &Local)
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;

    fn format_at_offset(timestamp: i64, offset_secs: i32) -> String {
        let offset = FixedOffset::east_opt(offset_secs).unwrap();
        format_server_timestamp(timestamp, &offset)
    }

    #[test]
    fn test_zero_timestamp_is_server_epoch() {
        // テスト項目: タイムスタンプ 0 がサーバーエポックに変換される
        // given (前提条件):
        let timestamp = 0;

        // when (操作):
        let result = server_timestamp_to_unix_millis(timestamp);

        // then (期待する結果):
        assert_eq!(result, EMOJI_CHAT_EPOCH_MS);
    }

    #[test]
    fn test_server_timestamp_to_utc() {
        // テスト項目: サーバータイムスタンプが UTC の日時に変換される
        // given (前提条件):
        let one_day_ms = 24 * 60 * 60 * 1000;

        // when (操作):
        let result = server_timestamp_to_utc(one_day_ms);

        // then (期待する結果):
        let dt = result.expect("timestamp should be in range");
        assert_eq!(dt.to_rfc3339(), "2022-04-28T16:00:00+00:00");
    }

    #[test]
    fn test_format_server_timestamp_fixed_offset() {
        // テスト項目: 固定オフセット (JST) で RFC 3339 形式に整形される
        // given (前提条件):
        let timestamp = 123;

        // when (操作):
        let result = format_at_offset(timestamp, 9 * 3600);

        // then (期待する結果):
        assert_eq!(result, "2022-04-28T01:00:00.123+09:00");
    }

    #[test]
    fn test_format_server_timestamp_out_of_range_falls_back_to_number() {
        // テスト項目: 範囲外のタイムスタンプは数値のまま表示される
        // given (前提条件):
        let timestamp = i64::MAX;

        // when (操作):
        let result = format_at_offset(timestamp, 0);

        // then (期待する結果):
        assert_eq!(result, i64::MAX.to_string());
    }

    #[test]
    fn test_format_server_timestamp_local_is_not_empty() {
        // テスト項目: ローカルタイムゾーンでの整形が空文字列にならない
        // given (前提条件):
        let timestamp = 1000;

        // when (操作):
        let result = format_server_timestamp_local(timestamp);

        // then (期待する結果):
        assert!(result.starts_with("2022-04-2"));
    }
}
