use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

static LAST_STAMP_MICROS: AtomicI64 = AtomicI64::new(0);

/// Issue a `createdAt` value strictly greater than every earlier one in this process
pub fn next_created_at() -> String {
    let now = Utc::now().timestamp_micros();
    let mut last = LAST_STAMP_MICROS.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_STAMP_MICROS.compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return format_micros(next),
            Err(current) => last = current,
        }
    }
}

fn format_micros(micros: i64) -> String {
    match Utc.timestamp_micros(micros).single() {
        Some(at) => format_timestamp(&at),
        None => format_timestamp(&Utc::now()),
    }
}

/// Fixed-width RFC 3339 so that text order is chronological order
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Re-render any RFC 3339 timestamp in the canonical stored form
pub fn normalize(raw: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|at| format_timestamp(&at.with_timezone(&Utc)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamps_strictly_increase() {
        let stamps: Vec<String> = (0..500).map(|_| next_created_at()).collect();
        assert!(stamps.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn stamps_are_fixed_width_utc() {
        let stamp = next_created_at();
        assert_eq!(stamp.len(), "2024-05-01T10:00:00.000000Z".len());
        assert!(stamp.ends_with('Z'));
    }

    #[test]
    fn normalizes_offsets_and_precision() {
        assert_eq!(
            normalize("2024-05-01T12:00:00+02:00").as_deref(),
            Some("2024-05-01T10:00:00.000000Z")
        );
        assert_eq!(normalize("not a time"), None);
    }
}
