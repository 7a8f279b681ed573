//! The document store collaborator.
//!
//! The chart never mutates its own snapshot in response to user actions:
//! writes go to an [`ExpenseStore`] and come back as [`ChangeBatch`]es on the
//! [`ChangeStream`] returned by [`ExpenseStore::subscribe`]. The trait
//! abstracts the backend -- a hosted document database, or the
//! [`MemoryStore`] used by the binary and by tests.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tally_types::{ChangeBatch, ChangeEvent, NewRecord, Record, RecordId};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Errors returned by store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No document has the given id.
    #[error("record not found: {id}")]
    NotFound {
        /// The missing id.
        id: RecordId,
    },

    /// A document with the given id already exists.
    #[error("record already exists: {id}")]
    AlreadyExists {
        /// The conflicting id.
        id: RecordId,
    },

    /// The backend could not be reached.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },

    /// The store has been shut down.
    #[error("store is closed")]
    Closed,
}

/// Ordered stream of change batches for one subscriber.
///
/// Ends (yields `None`) when the store closes.
#[derive(Debug)]
pub struct ChangeStream {
    rx: mpsc::UnboundedReceiver<ChangeBatch>,
}

impl ChangeStream {
    /// Create a connected sender/stream pair.
    pub fn channel() -> (mpsc::UnboundedSender<ChangeBatch>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }

    /// Wait for the next batch. Cancel-safe.
    pub async fn next(&mut self) -> Option<ChangeBatch> {
        self.rx.recv().await
    }

    /// Take the next batch if one is already queued.
    pub fn try_next(&mut self) -> Option<ChangeBatch> {
        self.rx.try_recv().ok()
    }
}

/// A document collection of expenses with a change stream.
pub trait ExpenseStore: Send + Sync {
    /// Add a document; the store assigns its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend rejects the write.
    fn create(
        &self,
        record: NewRecord,
    ) -> impl Future<Output = Result<RecordId, StoreError>> + Send;

    /// Delete the document with `id`. Deleting a missing id succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend rejects the write.
    fn delete_by_id(&self, id: &RecordId) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Open a change stream. The first batch lists every existing document
    /// as `added` (it is skipped when the collection is empty).
    fn subscribe(&self) -> ChangeStream;
}

#[derive(Debug)]
struct Subscriber {
    tx: mpsc::UnboundedSender<ChangeBatch>,
    sequence: u64,
}

impl Subscriber {
    fn send(&mut self, changes: Vec<ChangeEvent>) -> bool {
        self.sequence = self.sequence.saturating_add(1);
        self.tx.send(ChangeBatch::new(self.sequence, changes)).is_ok()
    }
}

#[derive(Debug, Default)]
struct Inner {
    documents: Vec<Record>,
    subscribers: Vec<Subscriber>,
    closed: bool,
}

impl Inner {
    fn emit(&mut self, change: &ChangeEvent) {
        self.subscribers
            .retain_mut(|subscriber| subscriber.send(vec![change.clone()]));
    }

    const fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }
}

/// In-memory [`ExpenseStore`].
///
/// Every subscriber has its own unbounded channel, so delivery is ordered
/// and never drops a batch. Each write emits one single-change batch.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a document under an externally chosen id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`] if the id is taken, or
    /// [`StoreError::Closed`] after [`MemoryStore::close`].
    pub fn insert_with_id(&self, record: Record) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.ensure_open()?;
        if inner.documents.iter().any(|d| d.id == record.id) {
            return Err(StoreError::AlreadyExists { id: record.id });
        }
        debug!(id = %record.id, "document inserted");
        inner.emit(&ChangeEvent::Added {
            record: record.clone(),
        });
        inner.documents.push(record);
        Ok(())
    }

    /// Replace the name and cost of an existing document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or
    /// [`StoreError::Closed`] after [`MemoryStore::close`].
    pub fn modify(&self, id: &RecordId, update: NewRecord) -> Result<Record, StoreError> {
        let mut inner = self.lock();
        inner.ensure_open()?;
        let Some(slot) = inner.documents.iter_mut().find(|d| &d.id == id) else {
            return Err(StoreError::NotFound { id: id.clone() });
        };
        *slot = update.with_id(id.clone());
        let record = slot.clone();
        debug!(%id, "document modified");
        inner.emit(&ChangeEvent::Modified {
            record: record.clone(),
        });
        Ok(record)
    }

    /// Every document in insertion order.
    pub fn documents(&self) -> Vec<Record> {
        self.lock().documents.clone()
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.lock().documents.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().documents.is_empty()
    }

    /// Reject further writes and end every open change stream.
    pub fn close(&self) {
        let mut inner = self.lock();
        inner.closed = true;
        inner.subscribers.clear();
        info!("memory store closed");
    }
}

impl ExpenseStore for MemoryStore {
    async fn create(&self, record: NewRecord) -> Result<RecordId, StoreError> {
        let id = RecordId::generate();
        self.insert_with_id(record.with_id(id.clone()))?;
        Ok(id)
    }

    async fn delete_by_id(&self, id: &RecordId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.ensure_open()?;
        let Some(index) = inner.documents.iter().position(|d| &d.id == id) else {
            debug!(%id, "delete of unknown document ignored");
            return Ok(());
        };
        inner.documents.remove(index);
        debug!(%id, "document deleted");
        inner.emit(&ChangeEvent::Removed { id: id.clone() });
        Ok(())
    }

    fn subscribe(&self) -> ChangeStream {
        let (tx, stream) = ChangeStream::channel();
        let mut inner = self.lock();
        if inner.closed {
            return stream;
        }
        let mut subscriber = Subscriber { tx, sequence: 0 };
        if !inner.documents.is_empty() {
            let initial = inner
                .documents
                .iter()
                .map(|record| ChangeEvent::Added {
                    record: record.clone(),
                })
                .collect();
            subscriber.send(initial);
        }
        inner.subscribers.push(subscriber);
        debug!(subscribers = inner.subscribers.len(), "change stream opened");
        stream
    }
}
