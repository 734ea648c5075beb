use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

static LAST_ID_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Current time truncated to the millisecond precision records are stored with.
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// Generates an id from the current Unix time in milliseconds.
///
/// Two calls in the same millisecond get consecutive tokens, so ids are distinct
/// within a process. Separate processes sharing a store can still collide.
pub fn generate_outlink_id(now: DateTime<Utc>) -> String {
    let candidate = now.timestamp_millis();
    let mut last = LAST_ID_MILLIS.load(Ordering::Relaxed);
    loop {
        let next = candidate.max(last + 1);
        match LAST_ID_MILLIS.compare_exchange_weak(last, next, Ordering::SeqCst, Ordering::Relaxed)
        {
            Ok(_) => return next.to_string(),
            Err(actual) => last = actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_outlink_id_is_a_millisecond_token() {
        let now = now_millis();
        let id: i64 = generate_outlink_id(now).parse().unwrap();
        assert!(id >= now.timestamp_millis());
    }

    #[test]
    fn test_generate_outlink_id_is_distinct_within_same_millisecond() {
        let now = now_millis();
        let ids: HashSet<String> = (0..1000).map(|_| generate_outlink_id(now)).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_now_millis_has_no_sub_millisecond_part() {
        let now = now_millis();
        assert_eq!(now.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
