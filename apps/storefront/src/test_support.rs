//! Item store doubles for page and state tests.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use storefront_store::{
    open_local, seed_demo, DbConfig, ItemStore, Query, ResourcePath, StoreError, StoreResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Create,
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: Method,
    pub target: String,
}

/// Records every call and forwards it to a real store, with switchable
/// failures and delays.
pub struct RecordingStore {
    inner: Arc<dyn ItemStore>,
    calls: Mutex<Vec<Call>>,
    fail_writes: AtomicBool,
    failing_writes: Mutex<Vec<String>>,
    failing_gets: Mutex<Vec<String>>,
    delayed_gets: Mutex<Vec<(String, Duration)>>,
    write_delay: Mutex<Duration>,
}

impl RecordingStore {
    /// Wraps a fresh in-memory SQLite store.
    pub async fn local() -> Self {
        let store = open_local(DbConfig::in_memory()).await.unwrap();
        RecordingStore {
            inner: Arc::new(store),
            calls: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
            failing_writes: Mutex::new(Vec::new()),
            failing_gets: Mutex::new(Vec::new()),
            delayed_gets: Mutex::new(Vec::new()),
            write_delay: Mutex::new(Duration::ZERO),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, method: Method) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    pub fn creates(&self) -> usize {
        self.count(Method::Create)
    }

    pub fn updates(&self) -> usize {
        self.count(Method::Update)
    }

    pub fn writes(&self) -> usize {
        self.creates() + self.updates()
    }

    /// Fails every write, or with `false` clears all write failures.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
        if !fail {
            self.failing_writes.lock().unwrap().clear();
        }
    }

    /// Fails writes whose path starts with `prefix`.
    pub fn fail_writes_on(&self, prefix: &str) {
        self.failing_writes.lock().unwrap().push(prefix.to_string());
    }

    /// Fails reads whose `path?query` starts with `prefix`.
    pub fn fail_gets_on(&self, prefix: &str) {
        self.failing_gets.lock().unwrap().push(prefix.to_string());
    }

    /// Delays reads whose `path?query` starts with `prefix`.
    pub fn delay_gets_on(&self, prefix: &str, delay: Duration) {
        self.delayed_gets
            .lock()
            .unwrap()
            .push((prefix.to_string(), delay));
    }

    /// Holds every create and update for `delay` before it reaches the store.
    pub fn delay_writes(&self, delay: Duration) {
        *self.write_delay.lock().unwrap() = delay;
    }

    fn record(&self, method: Method, target: &str) {
        self.calls.lock().unwrap().push(Call {
            method,
            target: target.to_string(),
        });
    }

    async fn before_write(&self, target: &str) -> StoreResult<()> {
        let delay = *self.write_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let failing = self
            .failing_writes
            .lock()
            .unwrap()
            .iter()
            .any(|prefix| target.starts_with(prefix.as_str()));
        if failing || self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Transport(format!("connection reset: {}", target)));
        }
        Ok(())
    }
}

#[async_trait]
impl ItemStore for RecordingStore {
    async fn get(&self, path: &ResourcePath, query: &Query) -> StoreResult<Value> {
        let target = format!("{}{}", path, query);
        self.record(Method::Get, &target);

        let delay = self
            .delayed_gets
            .lock()
            .unwrap()
            .iter()
            .find(|(prefix, _)| target.starts_with(prefix.as_str()))
            .map(|(_, delay)| *delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .failing_gets
            .lock()
            .unwrap()
            .iter()
            .any(|prefix| target.starts_with(prefix.as_str()));
        if failing {
            return Err(StoreError::Transport(format!("connection reset: {}", target)));
        }
        self.inner.get(path, query).await
    }

    async fn create(&self, path: &ResourcePath, record: Value) -> StoreResult<Value> {
        let target = path.to_string();
        self.record(Method::Create, &target);
        self.before_write(&target).await?;
        self.inner.create(path, record).await
    }

    async fn update(&self, path: &ResourcePath, patch: Value) -> StoreResult<Value> {
        let target = path.to_string();
        self.record(Method::Update, &target);
        self.before_write(&target).await?;
        self.inner.update(path, patch).await
    }
}

/// Every call fails as if the network were down.
pub struct FailingStore;

#[async_trait]
impl ItemStore for FailingStore {
    async fn get(&self, path: &ResourcePath, _query: &Query) -> StoreResult<Value> {
        Err(StoreError::Transport(format!("unreachable: {}", path)))
    }

    async fn create(&self, path: &ResourcePath, _record: Value) -> StoreResult<Value> {
        Err(StoreError::Transport(format!("unreachable: {}", path)))
    }

    async fn update(&self, path: &ResourcePath, _patch: Value) -> StoreResult<Value> {
        Err(StoreError::Transport(format!("unreachable: {}", path)))
    }
}

/// Seeds the demo catalog behind the recorder, so no call is recorded.
pub async fn seed_catalog(store: &RecordingStore) {
    seed_demo(store.inner.clone()).await.unwrap();
}
