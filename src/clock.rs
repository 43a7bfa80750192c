use chrono::{DateTime, Utc};

use crate::models::TransactionId;

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Source of fresh transaction ids. The ledger store still checks each id
/// against its current contents before using it. `None` means the source
/// has run out of ids.
pub trait IdSource {
    fn next_id(&mut self) -> Option<TransactionId>;
}

/// Monotonic counter, seeded past the largest id already in the ledger.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: Option<u64>,
}

impl SequentialIds {
    pub fn starting_after(last: Option<TransactionId>) -> Self {
        Self {
            next: last.map_or(Some(1), |id| id.0.checked_add(1)),
        }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> Option<TransactionId> {
        let id = self.next?;
        self.next = id.checked_add(1);
        Some(TransactionId(id))
    }
}
