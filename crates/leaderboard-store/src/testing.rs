//! Fault injection for exercising store failure paths.
//!
//! Only compiled with the `test-util` feature.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::StoreError;
use crate::kv::KvStore;

/// A store operation that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    /// `GET`
    Get,
    /// `SET`
    Set,
    /// `KEYS prefix*`
    Keys,
}

#[derive(Debug, Default)]
struct Faults {
    get: AtomicBool,
    set: AtomicBool,
    keys: AtomicBool,
}

impl Faults {
    const fn flag(&self, op: StoreOp) -> &AtomicBool {
        match op {
            StoreOp::Get => &self.get,
            StoreOp::Set => &self.set,
            StoreOp::Keys => &self.keys,
        }
    }
}

/// Wraps a store and fails the operations switched on with [`fail`].
///
/// Clones share both the inner store and the fault switches.
///
/// [`fail`]: FaultyStore::fail
#[derive(Debug, Clone)]
pub struct FaultyStore<S> {
    inner: S,
    faults: Arc<Faults>,
}

impl<S: KvStore> FaultyStore<S> {
    /// Wrap `inner` with every operation initially healthy.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            faults: Arc::new(Faults::default()),
        }
    }

    /// Make `op` fail (`true`) or succeed (`false`) from now on.
    pub fn fail(&self, op: StoreOp, failing: bool) {
        self.faults.flag(op).store(failing, Ordering::SeqCst);
    }

    /// The wrapped store.
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    fn check(&self, op: StoreOp) -> Result<(), StoreError> {
        if self.faults.flag(op).load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("injected {op:?} failure")));
        }
        Ok(())
    }
}

impl<S: KvStore> KvStore for FaultyStore<S> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check(StoreOp::Get)?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check(StoreOp::Set)?;
        self.inner.set(key, value).await
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.check(StoreOp::Keys)?;
        self.inner.keys_with_prefix(prefix).await
    }
}
