use log::{debug, warn};

use crate::clock::{Clock, IdSource, SequentialIds, SystemClock};
use crate::error::{Result, TallyError};
use crate::models::{validate_entry, Kind, Transaction, TransactionId};
use crate::persistence::Persistence;
use crate::store::KeyValueStore;

type Listener = Box<dyn FnMut(&[Transaction])>;

/// Owns the transaction list. All mutation goes through `&mut self`, and a
/// mutation only sticks once the full list has been saved.
pub struct LedgerStore<S> {
    persistence: Persistence<S>,
    transactions: Vec<Transaction>,
    ids: Box<dyn IdSource>,
    clock: Box<dyn Clock>,
    listeners: Vec<Listener>,
}

impl<S: KeyValueStore> LedgerStore<S> {
    /// Hydrates from the persisted snapshot. A corrupt snapshot is returned as
    /// an error; nothing is written.
    pub fn open(persistence: Persistence<S>) -> Result<Self> {
        let transactions = persistence.load()?;
        debug!("hydrated {} transactions", transactions.len());
        Ok(Self::from_parts(persistence, transactions))
    }

    /// Starts empty without reading the store. The stored value is left as is
    /// until the next successful mutation overwrites it.
    pub fn open_empty(persistence: Persistence<S>) -> Self {
        warn!("starting with an empty ledger; stored data under '{}' was not loaded", persistence.key());
        Self::from_parts(persistence, Vec::new())
    }

    fn from_parts(persistence: Persistence<S>, transactions: Vec<Transaction>) -> Self {
        let last = transactions.iter().map(|t| t.id).max();
        Self {
            persistence,
            transactions,
            ids: Box::new(SequentialIds::starting_after(last)),
            clock: Box::new(SystemClock),
            listeners: Vec::new(),
        }
    }

    pub fn with_ids(mut self, ids: impl IdSource + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Registers a callback run with the current list after every successful mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&[Transaction]) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn list(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    #[cfg(test)]
    pub(crate) fn persistence_mut(&mut self) -> &mut Persistence<S> {
        &mut self.persistence
    }

    pub fn add(&mut self, description: &str, amount: f64, kind: Kind) -> Result<Transaction> {
        let description = validate_entry(description, amount)?;
        let txn = Transaction {
            id: self.fresh_id()?,
            description,
            amount,
            kind,
            recorded_at: self.clock.now(),
        };
        self.transactions.push(txn.clone());
        if let Err(e) = self.persistence.save(&self.transactions) {
            self.transactions.pop();
            warn!("add of transaction {} rolled back: {e}", txn.id);
            return Err(e);
        }
        debug!("added transaction {} ({} {})", txn.id, txn.kind, txn.amount);
        self.notify();
        Ok(txn)
    }

    /// Unknown ids are not an error: returns `false` and writes nothing.
    pub fn remove(&mut self, id: TransactionId) -> Result<bool> {
        let Some(index) = self.transactions.iter().position(|t| t.id == id) else {
            debug!("remove of unknown transaction {id} ignored");
            return Ok(false);
        };
        let removed = self.transactions.remove(index);
        if let Err(e) = self.persistence.save(&self.transactions) {
            self.transactions.insert(index, removed);
            warn!("remove of transaction {id} rolled back: {e}");
            return Err(e);
        }
        debug!("removed transaction {id}");
        self.notify();
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<()> {
        let previous = std::mem::take(&mut self.transactions);
        if let Err(e) = self.persistence.save(&self.transactions) {
            self.transactions = previous;
            warn!("clear rolled back: {e}");
            return Err(e);
        }
        debug!("cleared {} transactions", previous.len());
        self.notify();
        Ok(())
    }

    fn fresh_id(&mut self) -> Result<TransactionId> {
        while let Some(id) = self.ids.next_id() {
            if self.get(id).is_none() {
                return Ok(id);
            }
        }
        Err(TallyError::IdsExhausted)
    }

    fn notify(&mut self) {
        for listener in &mut self.listeners {
            listener(&self.transactions);
        }
    }
}
