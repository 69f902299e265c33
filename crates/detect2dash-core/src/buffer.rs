//! Bounded in-memory retention of detection batches.
//!
//! Batches are kept most recent first. Inserting past capacity evicts the
//! oldest batch. Every operation holds a single lock for its whole duration,
//! so the size bound holds under concurrent ingestion.

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use parking_lot::Mutex;
use serde_json::Number;
use tracing::info;

use crate::error::IngestError;
use crate::model::{DetectedObject, DetectionBatch, TIMESTAMP_FORMAT};

/// Number of batches retained when no capacity is configured.
pub const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(20) {
    Some(capacity) => capacity,
    None => panic!("default capacity must be non-zero"),
};

/// Summary of an accepted ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReceipt {
    pub timestamp: String,
    pub object_count: usize,
    /// Buffer length after the insert.
    pub retained: usize,
    /// Whether the oldest batch was dropped to make room.
    pub evicted: bool,
}

/// Thread-safe, size-bounded store shared across handlers.
#[derive(Debug)]
pub struct RetentionBuffer {
    capacity: NonZeroUsize,
    inner: Mutex<VecDeque<Arc<DetectionBatch>>>,
}

impl Default for RetentionBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl RetentionBuffer {
    pub fn new(capacity: NonZeroUsize) -> Self {
        // The deque grows on demand; only preallocate for typical sizes.
        let preallocate = capacity.get().min(DEFAULT_CAPACITY.get()) + 1;
        Self {
            capacity,
            inner: Mutex::new(VecDeque::with_capacity(preallocate)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Store a batch stamped with the current local time.
    pub fn ingest(
        &self,
        objects: Vec<DetectedObject>,
        inference_time_ms: Option<Number>,
    ) -> Result<IngestReceipt, IngestError> {
        self.ingest_at(objects, inference_time_ms, Local::now().naive_local())
    }

    /// Store a batch stamped with `received_at`.
    ///
    /// Rejects empty `objects` or a missing inference time without touching
    /// the buffer.
    pub fn ingest_at(
        &self,
        objects: Vec<DetectedObject>,
        inference_time_ms: Option<Number>,
        received_at: NaiveDateTime,
    ) -> Result<IngestReceipt, IngestError> {
        let inference_time_ms = match inference_time_ms {
            Some(n) if !objects.is_empty() => n,
            _ => return Err(IngestError::Incomplete),
        };

        let batch = DetectionBatch {
            timestamp: received_at.format(TIMESTAMP_FORMAT).to_string(),
            objects,
            inference_time_ms,
        };

        info!(
            timestamp = %batch.timestamp,
            objects = %serde_json::to_string(&batch.objects).unwrap_or_default(),
            inference_time_ms = %batch.inference_time_ms,
            "Detection batch received"
        );

        let timestamp = batch.timestamp.clone();
        let object_count = batch.objects.len();

        let mut guard = self.inner.lock();
        guard.push_front(Arc::new(batch));
        let evicted = if guard.len() > self.capacity.get() {
            guard.pop_back().is_some()
        } else {
            false
        };
        let retained = guard.len();
        drop(guard);

        Ok(IngestReceipt {
            timestamp,
            object_count,
            retained,
            evicted,
        })
    }

    /// Current batches, most recent first.
    pub fn snapshot(&self) -> Vec<Arc<DetectionBatch>> {
        self.inner.lock().iter().cloned().collect()
    }

    /// Drop every retained batch, returning how many were removed.
    pub fn clear(&self) -> usize {
        let mut guard = self.inner.lock();
        let removed = guard.len();
        guard.clear();
        removed
    }
}
