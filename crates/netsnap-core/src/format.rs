//! Display formatting for the viewer: byte counts, durations, status
//! classes, and URL path extraction. Pure functions, no state.

/// Formats a byte count for the size column.
///
/// Absent or negative sizes (HAR uses -1 for "unknown") render as "-".
/// Below 1 KiB the raw byte count is shown; above, one-decimal KB.
pub fn format_size(bytes: Option<i64>) -> String {
    match bytes {
        None => "-".to_string(),
        Some(b) if b < 0 => "-".to_string(),
        Some(b) if b < 1024 => format!("{} B", b),
        Some(b) => format!("{:.1} KB", b as f64 / 1024.0),
    }
}

/// Formats a millisecond duration for the time column.
///
/// Absent or negative durations render as "-"; sub-second values as rounded
/// integer milliseconds, the rest as two-decimal seconds.
pub fn format_time(ms: Option<f64>) -> String {
    match ms {
        None => "-".to_string(),
        Some(t) if t < 0.0 => "-".to_string(),
        Some(t) if t < 1000.0 => format!("{} ms", t.round() as i64),
        Some(t) => format!("{:.2} s", t / 1000.0),
    }
}

/// Coarse status bucket used for row styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Ok,
    Redirect,
    Error,
}

impl StatusClass {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusClass::Ok => "ok",
            StatusClass::Redirect => "redirect",
            StatusClass::Error => "error",
        }
    }
}

/// Classifies an HTTP status code: 2xx ok, 3xx redirect, everything else
/// (including 0 for "no response") an error.
pub fn status_class(code: u16) -> StatusClass {
    match code {
        200..=299 => StatusClass::Ok,
        300..=399 => StatusClass::Redirect,
        _ => StatusClass::Error,
    }
}

/// Extracts pathname+query from an absolute URL, for compact display and
/// text filtering. A string that does not parse as a URL is returned
/// unchanged, so the function is idempotent on invalid input.
pub fn extract_path(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(parsed) => match parsed.query() {
            Some(q) => format!("{}?{}", parsed.path(), q),
            None => parsed.path().to_string(),
        },
        Err(_) => raw.to_string(),
    }
}
