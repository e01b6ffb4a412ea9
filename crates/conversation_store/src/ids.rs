use std::sync::atomic::{AtomicI64, Ordering};

use time::OffsetDateTime;
use uuid::Uuid;

static LAST_WALL_CLOCK_ID: AtomicI64 = AtomicI64::new(0);

/// Current wall-clock time in Unix milliseconds.
#[must_use]
pub fn unix_millis_now() -> i64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    (nanos / 1_000_000) as i64
}

/// Wall-clock millisecond identifier for messages and prompts.
///
/// Bumped past the previously issued value, so two calls in the same
/// millisecond still produce distinct, increasing identifiers.
#[must_use]
pub fn wall_clock_id() -> String {
    let now = unix_millis_now();
    let next = |prev: i64| if now > prev { now } else { prev + 1 };
    let issued = match LAST_WALL_CLOCK_ID.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |prev| {
        Some(next(prev))
    }) {
        Ok(prev) => next(prev),
        Err(prev) => next(prev),
    };
    issued.to_string()
}

/// Random local token for a conversation created before the remote store has
/// assigned its identifier.
#[must_use]
pub fn local_conversation_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::{local_conversation_id, wall_clock_id};

    #[test]
    fn wall_clock_ids_are_distinct_and_increasing() {
        let first: i64 = wall_clock_id().parse().expect("id should be numeric");
        let second: i64 = wall_clock_id().parse().expect("id should be numeric");
        assert!(second > first);
    }

    #[test]
    fn local_conversation_ids_are_unique() {
        assert_ne!(local_conversation_id(), local_conversation_id());
    }
}
