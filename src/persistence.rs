use std::collections::HashSet;

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};
use crate::models::{validate_entry, Kind, Transaction, TransactionId};
use crate::store::KeyValueStore;

pub const STORAGE_KEY: &str = "budgetTrackerTransactions";

/// Timestamp layout written by the browser version of the tracker.
const LEGACY_DATE_FORMAT: &str = "%b %d, %Y, %I:%M %p";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord<'a> {
    id: u64,
    description: &'a str,
    amount: f64,
    #[serde(rename = "type")]
    kind: &'static str,
    recorded_at: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadedRecord {
    id: RawId,
    description: String,
    amount: f64,
    #[serde(rename = "type", alias = "kind")]
    kind: String,
    #[serde(alias = "date")]
    recorded_at: RawTimestamp,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Text(String),
}

/// Saves and loads the full transaction list as one JSON blob under a fixed key.
pub struct Persistence<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, STORAGE_KEY)
    }

    pub fn with_key(store: S, key: &str) -> Self {
        Self {
            store,
            key: key.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn save(&mut self, transactions: &[Transaction]) -> Result<()> {
        let bytes = encode(transactions)?;
        self.store.set(&self.key, &bytes)?;
        debug!("saved {} transactions ({} bytes) under '{}'", transactions.len(), bytes.len(), self.key);
        Ok(())
    }

    /// An absent key is the first-run state and yields an empty list.
    pub fn load(&self) -> Result<Vec<Transaction>> {
        match self.store.get(&self.key)? {
            None => {
                debug!("no stored ledger under '{}'", self.key);
                Ok(Vec::new())
            }
            Some(bytes) => decode(&bytes).map_err(|reason| TallyError::CorruptState {
                key: self.key.clone(),
                reason,
            }),
        }
    }
}

pub fn encode(transactions: &[Transaction]) -> Result<Vec<u8>> {
    let records: Vec<StoredRecord> = transactions
        .iter()
        .map(|t| StoredRecord {
            id: t.id.0,
            description: &t.description,
            amount: t.amount,
            kind: t.kind.as_str(),
            recorded_at: t.recorded_at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        })
        .collect();
    serde_json::to_vec(&records).map_err(|e| TallyError::Other(format!("Failed to encode ledger: {e}")))
}

fn decode(bytes: &[u8]) -> std::result::Result<Vec<Transaction>, String> {
    let records: Vec<LoadedRecord> = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
    let mut seen = HashSet::new();
    let mut transactions = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let txn = into_transaction(record).map_err(|e| format!("record {index}: {e}"))?;
        if !seen.insert(txn.id) {
            return Err(format!("record {index}: duplicate id {}", txn.id));
        }
        transactions.push(txn);
    }
    Ok(transactions)
}

fn into_transaction(record: LoadedRecord) -> std::result::Result<Transaction, String> {
    let id = match record.id {
        RawId::Number(n) => n,
        RawId::Text(s) => s.trim().parse().map_err(|_| format!("invalid id {s:?}"))?,
    };
    let kind: Kind = record.kind.parse().map_err(|e| format!("{e}"))?;
    let description = validate_entry(&record.description, record.amount).map_err(|e| e.to_string())?;
    let recorded_at = parse_timestamp(&record.recorded_at)?;
    Ok(Transaction {
        id: TransactionId(id),
        description,
        amount: record.amount,
        kind,
        recorded_at,
    })
}

fn parse_timestamp(raw: &RawTimestamp) -> std::result::Result<DateTime<Utc>, String> {
    match raw {
        RawTimestamp::Millis(ms) => Utc
            .timestamp_millis_opt(*ms)
            .single()
            .ok_or_else(|| format!("timestamp out of range: {ms}")),
        RawTimestamp::Text(text) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                return Ok(dt.with_timezone(&Utc));
            }
            // Newer ICU builds put a narrow no-break space before AM/PM.
            let normalized = text.replace(['\u{202f}', '\u{a0}'], " ");
            let naive = NaiveDateTime::parse_from_str(normalized.trim(), LEGACY_DATE_FORMAT)
                .map_err(|_| format!("unrecognized timestamp {text:?}"))?;
            Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or_else(|| format!("nonexistent local time {text:?}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn txn(id: u64, description: &str, amount: f64, kind: Kind) -> Transaction {
        Transaction {
            id: TransactionId(id),
            description: description.to_string(),
            amount,
            kind,
            recorded_at: Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap()
                + chrono::Duration::nanoseconds(123_456_789 * id as i64),
        }
    }

    fn persistence_with(raw: &str) -> Persistence<MemoryStore> {
        let mut store = MemoryStore::new();
        store.set(STORAGE_KEY, raw.as_bytes()).unwrap();
        Persistence::new(store)
    }

    #[test]
    fn test_load_absent_key_is_empty() {
        let persistence = Persistence::new(MemoryStore::new());
        assert!(persistence.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let mut persistence = Persistence::new(MemoryStore::new());
        let transactions = vec![
            txn(1, "Salary", 1000.0, Kind::Income),
            txn(2, "Rent <flat 3>", 400.0, Kind::Expense),
            txn(3, "Coffee & cake", 0.1 + 0.2, Kind::Expense),
        ];
        persistence.save(&transactions).unwrap();
        assert_eq!(persistence.load().unwrap(), transactions);
    }

    #[test]
    fn test_save_writes_full_record_layout() {
        let mut persistence = Persistence::new(MemoryStore::new());
        persistence.save(&[txn(7, "Salary", 1000.0, Kind::Income)]).unwrap();
        let bytes = persistence.store().get(STORAGE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let record = &value[0];
        assert_eq!(record["id"], 7);
        assert_eq!(record["description"], "Salary");
        assert_eq!(record["amount"], 1000.0);
        assert_eq!(record["type"], "income");
        assert!(record["recordedAt"].as_str().unwrap().starts_with("2026-10-18T09:30:00"));
    }

    #[test]
    fn test_save_overwrites_previous_value() {
        let mut persistence = Persistence::new(MemoryStore::new());
        persistence.save(&[txn(1, "Salary", 1000.0, Kind::Income)]).unwrap();
        persistence.save(&[]).unwrap();
        assert!(persistence.load().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_text_is_corrupt_and_untouched() {
        let persistence = persistence_with("{not json");
        let err = persistence.load().unwrap_err();
        assert!(matches!(err, TallyError::CorruptState { ref key, .. } if key == STORAGE_KEY), "got: {err}");
        let stored = persistence.store().get(STORAGE_KEY).unwrap().unwrap();
        assert_eq!(stored, b"{not json");
    }

    #[test]
    fn test_non_array_shapes_are_corrupt() {
        for raw in [r#"{"id": 1}"#, "42", "null", r#"[1, 2]"#, r#"[{"description": "x"}]"#] {
            let err = persistence_with(raw).load().unwrap_err();
            assert!(matches!(err, TallyError::CorruptState { .. }), "{raw}: {err}");
        }
    }

    #[test]
    fn test_invalid_members_are_corrupt() {
        let cases = [
            r#"[{"id":1,"description":"x","amount":0,"type":"income","recordedAt":0}]"#,
            r#"[{"id":1,"description":"  ","amount":5,"type":"income","recordedAt":0}]"#,
            r#"[{"id":1,"description":"x","amount":5,"type":"gift","recordedAt":0}]"#,
            r#"[{"id":1,"description":"x","amount":5,"type":"income","recordedAt":"yesterday"}]"#,
            r#"[{"id":"abc","description":"x","amount":5,"type":"income","recordedAt":0}]"#,
        ];
        for raw in cases {
            let err = persistence_with(raw).load().unwrap_err();
            assert!(matches!(err, TallyError::CorruptState { .. }), "{raw}: {err}");
        }
    }

    #[test]
    fn test_duplicate_ids_are_corrupt() {
        let raw = r#"[
            {"id":1,"description":"a","amount":5,"type":"income","recordedAt":0},
            {"id":1,"description":"b","amount":6,"type":"expense","recordedAt":0}
        ]"#;
        let err = persistence_with(raw).load().unwrap_err();
        assert!(err.to_string().contains("duplicate id 1"), "got: {err}");
    }

    #[test]
    fn test_load_accepts_kind_alias_string_id_and_millis() {
        let raw = r#"[{"id":"42","description":"Refund","amount":12.5,"kind":"Income","recordedAt":1697640000000}]"#;
        let loaded = persistence_with(raw).load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, TransactionId(42));
        assert_eq!(loaded[0].kind, Kind::Income);
        assert_eq!(loaded[0].recorded_at.timestamp_millis(), 1697640000000);
    }

    #[test]
    fn test_load_accepts_legacy_browser_records() {
        let raw = "[{\"id\":1697640000000,\"description\":\"Groceries\",\"amount\":54.2,\
                   \"type\":\"expense\",\"date\":\"Oct 18, 2023, 03:40\u{202f}PM\"}]";
        let loaded = persistence_with(raw).load().unwrap();
        assert_eq!(loaded[0].id, TransactionId(1697640000000));
        assert_eq!(loaded[0].description, "Groceries");
        let local = loaded[0].recorded_at.with_timezone(&Local);
        assert_eq!(local.format("%Y-%m-%d %H:%M").to_string(), "2023-10-18 15:40");
    }

    #[test]
    fn test_custom_key() {
        let mut persistence = Persistence::with_key(MemoryStore::new(), "other");
        persistence.save(&[txn(1, "Salary", 1000.0, Kind::Income)]).unwrap();
        assert!(persistence.store().get(STORAGE_KEY).unwrap().is_none());
        assert_eq!(persistence.key(), "other");
        assert_eq!(persistence.load().unwrap().len(), 1);
    }
}
