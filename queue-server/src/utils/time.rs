//! 时间工具函数 — 业务时区转换
//!
//! "Today" is a calendar day in the business timezone. Repositories only
//! receive `i64` Unix millis or precomputed day keys; all conversions
//! happen here.

use chrono::{NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

/// 当前营业日日期 (业务时区)
pub fn today(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Daily bucket key for ticket numbering, e.g. "2025-08-06"
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// 今天的 bucket key (业务时区)
pub fn today_key(tz: Tz) -> String {
    day_key(today(tz))
}

/// 日期 + 时分秒 → Unix millis (业务时区)
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，fallback 到 UTC。
fn date_hms_to_millis(date: NaiveDate, hour: u32, min: u32, sec: u32, tz: Tz) -> i64 {
    let naive = date.and_hms_opt(hour, min, sec).unwrap_or_default();
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 日期开始 (00:00:00) → Unix millis (业务时区)
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    date_hms_to_millis(date, 0, 0, 0, tz)
}

/// 日期结束 → 次日 00:00:00 的 Unix millis (业务时区)
///
/// 返回次日零点时间戳，调用方使用 `< end` (不含) 语义。
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    date_hms_to_millis(next_day, 0, 0, 0, tz)
}

/// 今天的 [start, end) 毫秒窗口 (业务时区)
pub fn today_window(tz: Tz) -> (i64, i64) {
    let date = today(tz);
    (day_start_millis(date, tz), day_end_millis(date, tz))
}

/// 解析每日重置时间字符串 (HH:MM)，失败返回 00:00
pub fn parse_reset_time(value: &str) -> NaiveTime {
    NaiveTime::parse_from_str(value, "%H:%M").unwrap_or_else(|e| {
        tracing::warn!(
            "Failed to parse reset_time '{}': {}, falling back to 00:00",
            value,
            e
        );
        NaiveTime::MIN
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn day_window_covers_exactly_one_day() {
        let tz: Tz = "UTC".parse().unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 8, 6).unwrap();
        let start = day_start_millis(date, tz);
        let end = day_end_millis(date, tz);
        assert_eq!(end - start, 24 * 60 * 60 * 1000);
    }

    #[test]
    fn day_key_is_iso_date() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 6).unwrap();
        assert_eq!(day_key(date), "2025-08-06");
    }

    #[test]
    fn business_timezone_shifts_the_window() {
        let utc: Tz = "UTC".parse().unwrap();
        let jakarta: Tz = "Asia/Jakarta".parse().unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 8, 6).unwrap();
        // Jakarta is UTC+7, so its midnight comes 7 hours earlier
        assert_eq!(
            day_start_millis(date, utc) - day_start_millis(date, jakarta),
            7 * 60 * 60 * 1000
        );
    }

    #[test]
    fn reset_time_parses_or_falls_back() {
        assert_eq!(parse_reset_time("08:30").hour(), 8);
        assert_eq!(parse_reset_time("08:30").minute(), 30);
        assert_eq!(parse_reset_time("not-a-time"), NaiveTime::MIN);
    }
}
