use chrono::{DateTime, Duration, FixedOffset, Local, SecondsFormat, TimeZone, Utc};

/// Format used when showing timestamps to the operator.
pub const DISPLAY_FORMAT: &str = "%d-%m-%Y %H:%M";

/// A time window `[start, end]` used to query the timer service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// The last `days` days, ending at `now`.
    pub fn lookback(now: DateTime<Utc>, days: u32) -> Self {
        Self {
            start: now - Duration::days(days as i64),
            end: now,
        }
    }

    pub fn start_param(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn end_param(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Jira only accepts offsets without a colon: `2020-09-23T08:00:47.000+0000`.
pub fn jira_timestamp(dt: &DateTime<FixedOffset>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3f%z").to_string()
}

/// Render any timestamp in the operator's local timezone.
pub fn display_local<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    dt.with_timezone(&Local).format(DISPLAY_FORMAT).to_string()
}

/// `H:MM:SS`, hours are not wrapped at 24.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours}:{minutes:02}:{secs:02}")
}
