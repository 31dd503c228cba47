/// Timestamp shapes found in stored records and the rule that turns them
/// into a single `DateTime<Utc>`.
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Document-store timestamp wrapper (`{ seconds, nanoseconds }`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeTimestamp {
    #[serde(alias = "_seconds")]
    pub seconds: i64,
    #[serde(default, alias = "_nanoseconds")]
    pub nanoseconds: u32,
}

/// A timestamp as it arrives from storage, before normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Native(NativeTimestamp),
    /// Already a date; only constructed in code, never parsed
    #[serde(skip_deserializing)]
    Date(DateTime<Utc>),
    EpochMillis(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawTimestamp {
    /// Convert to a date if the shape is understood, `None` otherwise.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Native(native) => Utc
                .timestamp_opt(native.seconds, native.nanoseconds)
                .single(),
            RawTimestamp::Date(date) => Some(*date),
            RawTimestamp::EpochMillis(millis) => {
                if !millis.is_finite() {
                    return None;
                }
                Utc.timestamp_millis_opt(millis.trunc() as i64).single()
            }
            RawTimestamp::Text(text) => parse_date_text(text),
            RawTimestamp::Other(_) => None,
        }
    }
}

impl From<DateTime<Utc>> for RawTimestamp {
    fn from(date: DateTime<Utc>) -> Self {
        RawTimestamp::Date(date)
    }
}

impl From<&str> for RawTimestamp {
    fn from(text: &str) -> Self {
        RawTimestamp::Text(text.to_string())
    }
}

/// Normalize a possibly-missing raw timestamp, substituting `now` for
/// anything absent or unparseable. Never fails.
pub fn normalize_timestamp(raw: Option<&RawTimestamp>, now: DateTime<Utc>) -> DateTime<Utc> {
    raw.and_then(RawTimestamp::to_datetime).unwrap_or(now)
}

fn parse_date_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(text) {
        return Some(date.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Source of "now" for the missing-timestamp fallback
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant, for tests
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
