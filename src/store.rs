use std::collections::HashMap;

use crate::error::{Result, TallyError};

/// A durable byte store addressed by string keys.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Overwrites any previous value. Rejections (quota, read-only medium)
    /// surface as `TallyError::StorageUnavailable`.
    fn set(&mut self, key: &str, value: &[u8]) -> Result<()>;
}

/// In-process store, optionally limited to a total byte quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
    quota: Option<usize>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    pub fn set_quota(&mut self, quota: Option<usize>) {
        self.quota = quota;
    }

    /// Number of successful `set` calls.
    pub fn writes(&self) -> usize {
        self.writes
    }

    fn used_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        if let Some(quota) = self.quota {
            let needed = self.used_without(key) + key.len() + value.len();
            if needed > quota {
                return Err(TallyError::StorageUnavailable(format!(
                    "quota exceeded ({needed} of {quota} bytes)"
                )));
            }
        }
        self.entries.insert(key.to_string(), value.to_vec());
        self.writes += 1;
        Ok(())
    }
}
