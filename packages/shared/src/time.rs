//! Wall-clock helpers. All timestamps are Unix milliseconds.

use chrono::{DateTime, Days, Local, NaiveTime, SecondsFormat, TimeZone, Utc};

/// One hour in milliseconds.
pub const HOUR_MS: i64 = 60 * 60 * 1000;

/// One day in milliseconds.
pub const DAY_MS: i64 = 24 * HOUR_MS;

/// Current Unix timestamp in milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render a millisecond timestamp as RFC 3339 (UTC).
///
/// Out-of-range values fall back to the Unix epoch.
pub fn timestamp_to_rfc3339(timestamp_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Milliseconds from `now` until the next local midnight.
///
/// Returns a full day when the local calendar cannot be resolved (DST gaps).
pub fn millis_until_next_local_midnight(now: DateTime<Local>) -> i64 {
    let next_midnight = now
        .date_naive()
        .checked_add_days(Days::new(1))
        .map(|date| date.and_time(NaiveTime::MIN))
        .and_then(|naive| Local.from_local_datetime(&naive).earliest());

    match next_midnight {
        Some(midnight) => (midnight - now).num_milliseconds().max(0),
        None => DAY_MS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_timestamp_to_rfc3339() {
        // テスト項目: ミリ秒タイムスタンプを RFC 3339 形式に変換できる
        // given (前提条件):
        let timestamp = 1_672_498_800_123;

        // when (操作):
        let rendered = timestamp_to_rfc3339(timestamp);

        // then (期待する結果):
        assert_eq!(rendered, "2022-12-31T15:00:00.123Z");
    }

    #[test]
    fn test_millis_until_next_local_midnight_is_within_a_day() {
        // テスト項目: 次の深夜 0 時までの時間は 0 より大きく 1 日 (+ DST 分) 以下
        // given (前提条件):
        let now = Local::now();

        // when (操作):
        let millis = millis_until_next_local_midnight(now);

        // then (期待する結果):
        assert!(millis > 0);
        assert!(millis <= DAY_MS + HOUR_MS);
    }

    #[test]
    fn test_millis_until_next_local_midnight_lands_on_midnight() {
        // テスト項目: 算出した時間を足すと翌日の 0 時になる
        // given (前提条件):
        let now = Local
            .with_ymd_and_hms(2024, 6, 15, 13, 30, 0)
            .earliest()
            .unwrap();

        // when (操作):
        let millis = millis_until_next_local_midnight(now);
        let target = now + Duration::milliseconds(millis);

        // then (期待する結果):
        assert_eq!(target.time(), NaiveTime::MIN);
        assert_eq!(target.date_naive(), now.date_naive() + Days::new(1));
    }
}
