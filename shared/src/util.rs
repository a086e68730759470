/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Unix millis → ISO-8601 / RFC 3339 string (UTC, millisecond precision).
///
/// All timestamps are stored as `i64` millis; the wire format is ISO-8601.
pub fn millis_to_iso(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Optional Unix millis → optional ISO-8601 string
pub fn opt_millis_to_iso(millis: Option<i64>) -> Option<String> {
    millis.map(millis_to_iso)
}
