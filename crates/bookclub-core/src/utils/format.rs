use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Truncate to `max_len` characters, ending with "..." when cut
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None or blank
pub fn format_optional(value: Option<&str>, default: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

/// Render a date or timestamp from the backend as "Mar 14, 2025".
/// Anything unparseable is returned unchanged.
pub fn format_date(date: &str) -> String {
    let date = date.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return dt.format("%b %d, %Y").to_string();
    }
    // The backend emits naive timestamps, with or without fractions
    if let Ok(dt) = NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%b %d, %Y").to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return d.format("%b %d, %Y").to_string();
    }
    date.to_string()
}

/// Comma-joined list, or `empty` when there is nothing to show
pub fn format_list(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}
