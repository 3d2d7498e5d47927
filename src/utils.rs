/// Utility functions for timestamp formatting and time zone handling
use log::warn;
use serde::Serializer;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Format a refresh timestamp as YYYY-MM-DD HH:MM in its own offset
///
/// Falls back to default string representation if formatting fails.
pub fn format_datetime(dt: &OffsetDateTime) -> String {
    dt.format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_else(|_| dt.to_string())
}

/// Serde adapter writing an optional refresh time as a formatted string or null
pub fn serialize_timestamp<S>(
    value: &Option<OffsetDateTime>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(dt) => serializer.serialize_str(&format_datetime(dt)),
        None => serializer.serialize_none(),
    }
}

/// Parse a fixed UTC offset such as "+03:00" or "-05:30"
pub fn parse_utc_offset(value: &str) -> Result<UtcOffset, time::error::Parse> {
    UtcOffset::parse(
        value.trim(),
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
}

/// Decide which offset summary timestamps are rendered in
///
/// An explicitly configured offset wins. Otherwise the system local offset is
/// used; it cannot always be determined once other threads are running, in
/// which case timestamps fall back to UTC.
///
/// The result is fixed for the life of the process: a daylight-saving change
/// after startup is not reflected until restart.
pub fn resolve_local_offset(configured: Option<UtcOffset>) -> UtcOffset {
    if let Some(offset) = configured {
        return offset;
    }

    match UtcOffset::current_local_offset() {
        Ok(offset) => offset,
        Err(e) => {
            warn!("Could not determine local UTC offset ({}), using UTC", e);
            UtcOffset::UTC
        }
    }
}
