//! Application Settings Model
//!
//! Settings are a flat key→value store; values are JSON-encoded strings.
//! Reads overlay the stored pairs on the built-in defaults, so unknown
//! keys pass through untouched and missing keys fall back to defaults.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Typed view of the built-in settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// UI language ("id" | "en")
    pub language: String,
    /// Announcement template, Indonesian — `{number}` is substituted
    pub announcement_template_id: String,
    /// Announcement template, English — `{number}` is substituted
    pub announcement_template_en: String,
    /// How many upcoming tickets the display shows
    pub display_next_count: i64,
    /// Whether the daily reset task is enabled
    pub auto_reset_daily: bool,
    /// Daily reset time, "HH:MM" in the business timezone
    pub reset_time: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            language: "id".into(),
            announcement_template_id: "Nomor antrian {number}, silakan menuju loket".into(),
            announcement_template_en: "Queue number {number}, please proceed to the counter".into(),
            display_next_count: 5,
            auto_reset_daily: true,
            reset_time: "00:00".into(),
        }
    }
}

impl AppSettings {
    /// Defaults as a JSON object, the base layer for [`overlay_defaults`]
    pub fn default_map() -> Map<String, Value> {
        match serde_json::to_value(Self::default()) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Raw settings row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SettingRow {
    pub key: String,
    /// JSON-encoded value
    pub value: String,
}

/// Overlay stored rows on the defaults.
///
/// Values are JSON-decoded; anything that fails to parse is kept as a
/// raw string. Keys outside the defaults pass through unchanged.
pub fn overlay_defaults(rows: &[SettingRow]) -> Map<String, Value> {
    let mut result = AppSettings::default_map();
    for row in rows {
        let value = serde_json::from_str(&row.value)
            .unwrap_or_else(|_| Value::String(row.value.clone()));
        result.insert(row.key.clone(), value);
    }
    result
}
