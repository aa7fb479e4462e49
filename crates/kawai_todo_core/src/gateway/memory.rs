//! In-process gateway for tests and embedders without a filesystem.

use super::{GatewayError, GatewayResult, PersistenceGateway};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Volatile single-slot gateway with switchable failure modes.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    blob: Mutex<Option<String>>,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gateway that already holds `blob`, as after an earlier run.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        let gateway = Self::default();
        *gateway.slot() = Some(blob.into());
        gateway
    }

    /// Current stored blob.
    pub fn blob(&self) -> Option<String> {
        self.slot().clone()
    }

    /// Number of saves that reached storage.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        self.blob.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PersistenceGateway for MemoryGateway {
    fn load(&self) -> GatewayResult<Option<String>> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("memory load disabled".to_string()));
        }
        Ok(self.blob())
    }

    fn save(&self, blob: &str) -> GatewayResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("memory save disabled".to_string()));
        }
        *self.slot() = Some(blob.to_string());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
