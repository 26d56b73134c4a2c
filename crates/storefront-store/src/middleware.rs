//! # Write-Path Middleware
//!
//! Stamps timestamps onto every mutating request before it is persisted.
//!
//! ```text
//! create(path, record) ──► record.createdAt = now ──► inner.create
//! update(path, patch)  ──► patch.updatedAt  = now ──► inner.update
//! get(path, query)     ──────────────────────────────► inner.get
//! ```
//!
//! Timestamps are epoch milliseconds.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::trace;

use crate::client::ItemStore;
use crate::error::{StoreError, StoreResult};
use crate::path::{Query, ResourcePath};

pub const CREATED_AT: &str = "createdAt";
pub const UPDATED_AT: &str = "updatedAt";

// =============================================================================
// Clock
// =============================================================================

/// Source of "now" in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now_millis: i64) -> Self {
        ManualClock {
            now: AtomicI64::new(now_millis),
        }
    }

    pub fn set(&self, now_millis: i64) {
        self.now.store(now_millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Stamping
// =============================================================================

/// Kind of mutating request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Create,
    Update,
}

impl WriteKind {
    pub const fn field(&self) -> &'static str {
        match self {
            WriteKind::Create => CREATED_AT,
            WriteKind::Update => UPDATED_AT,
        }
    }
}

/// Sets the timestamp field for `kind` on an object body.
pub fn stamp(record: &mut Value, kind: WriteKind, now_millis: i64) -> StoreResult<()> {
    let object = record.as_object_mut().ok_or_else(|| {
        StoreError::InvalidRecord(format!("cannot stamp {} on a non-object", kind.field()))
    })?;
    object.insert(kind.field().to_string(), Value::from(now_millis));
    Ok(())
}

/// An [`ItemStore`] that stamps writes before delegating.
pub struct Timestamped<S> {
    inner: S,
    clock: Arc<dyn Clock>,
}

impl<S: ItemStore> Timestamped<S> {
    pub fn new(inner: S) -> Self {
        Self::with_clock(inner, Arc::new(SystemClock))
    }

    pub fn with_clock(inner: S, clock: Arc<dyn Clock>) -> Self {
        Timestamped { inner, clock }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: ItemStore> ItemStore for Timestamped<S> {
    async fn get(&self, path: &ResourcePath, query: &Query) -> StoreResult<Value> {
        self.inner.get(path, query).await
    }

    async fn create(&self, path: &ResourcePath, mut record: Value) -> StoreResult<Value> {
        let now = self.clock.now_millis();
        stamp(&mut record, WriteKind::Create, now)?;
        trace!(path = %path, created_at = now, "Stamped create");
        self.inner.create(path, record).await
    }

    async fn update(&self, path: &ResourcePath, mut patch: Value) -> StoreResult<Value> {
        let now = self.clock.now_millis();
        stamp(&mut patch, WriteKind::Update, now)?;
        trace!(path = %path, updated_at = now, "Stamped update");
        self.inner.update(path, patch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stamp_sets_field_for_kind() {
        let mut record = json!({ "name": "Filter" });
        stamp(&mut record, WriteKind::Create, 1_000).unwrap();
        assert_eq!(record["createdAt"], 1_000);
        assert!(record.get("updatedAt").is_none());

        stamp(&mut record, WriteKind::Update, 2_000).unwrap();
        assert_eq!(record["updatedAt"], 2_000);
        assert_eq!(record["createdAt"], 1_000);
    }

    #[test]
    fn test_stamp_rejects_non_object() {
        let mut record = json!("text");
        assert!(stamp(&mut record, WriteKind::Update, 1).is_err());
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(10);
        clock.advance(5);
        assert_eq!(clock.now_millis(), 15);
        clock.set(100);
        assert_eq!(clock.now_millis(), 100);
    }
}
