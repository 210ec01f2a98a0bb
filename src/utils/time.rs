use chrono::{DateTime, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Timestamp for a new log entry that must not sort before `last`.
pub fn not_before(last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match last {
        Some(last) if last > now => last,
        _ => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn clamps_to_previous_timestamp() {
        let now = now();
        let later = now + Duration::seconds(5);
        assert_eq!(not_before(Some(later), now), later);
        assert_eq!(not_before(Some(now - Duration::seconds(5)), now), now);
        assert_eq!(not_before(None, now), now);
    }
}
