//! # Base Fee Snapshot
//!
//! The latest observed base fee per gas, written by a block watcher outside
//! this crate and read by the dynamic fee strategy. Zero means unknown.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Read access to the latest base fee per gas, in wei.
pub trait BaseFeeSource: Send + Sync {
    fn base_fee_per_gas(&self) -> u64;
}

/// Fixed snapshot.
impl BaseFeeSource for u64 {
    fn base_fee_per_gas(&self) -> u64 {
        *self
    }
}

impl BaseFeeSource for AtomicU64 {
    fn base_fee_per_gas(&self) -> u64 {
        self.load(Ordering::Acquire)
    }
}

impl<T: BaseFeeSource + ?Sized> BaseFeeSource for Arc<T> {
    fn base_fee_per_gas(&self) -> u64 {
        (**self).base_fee_per_gas()
    }
}

/// Shared base fee cell.
///
/// Clones point at the same value: hand one to the header watcher and one to
/// the estimator.
#[derive(Debug, Clone, Default)]
pub struct BaseFeeTracker {
    base_fee_per_gas: Arc<AtomicU64>,
}

impl BaseFeeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_fee(base_fee_per_gas: u64) -> Self {
        Self {
            base_fee_per_gas: Arc::new(AtomicU64::new(base_fee_per_gas)),
        }
    }

    /// Store the base fee of the newest block.
    pub fn update(&self, base_fee_per_gas: u64) {
        self.base_fee_per_gas
            .store(base_fee_per_gas, Ordering::Release);
    }

    pub fn load(&self) -> u64 {
        self.base_fee_per_gas.load(Ordering::Acquire)
    }
}

impl BaseFeeSource for BaseFeeTracker {
    fn base_fee_per_gas(&self) -> u64 {
        self.load()
    }
}
