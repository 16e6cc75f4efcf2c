//! Record and route identifiers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::RecordId;

/// Hands out millisecond-timestamp ids that never repeat.
///
/// An id is the current Unix time in milliseconds, bumped past the last id
/// issued when two requests land in the same millisecond or the clock steps
/// backwards.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    /// Start after `floor`, typically the largest numeric id already stored.
    pub fn starting_after(floor: u64) -> Self {
        Self {
            last: AtomicU64::new(floor),
        }
    }

    /// Start after the largest numeric id among `ids`.
    pub fn after_existing<'a>(ids: impl IntoIterator<Item = &'a RecordId>) -> Self {
        let floor = ids
            .into_iter()
            .filter_map(|id| id.as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self::starting_after(floor)
    }

    pub fn next_id(&self) -> RecordId {
        let now = now_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let next = now.max(last.saturating_add(1));
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return RecordId::new(next.to_string()),
                Err(actual) => last = actual,
            }
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
