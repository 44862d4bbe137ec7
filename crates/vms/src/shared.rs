//! Reloadable handle for concurrent readers.
//!
//! Readers take an `Arc<Workbench>` snapshot and keep using it for as long as
//! they like; a reload builds the replacement outside the lock and only holds
//! the write lock for the pointer swap.

use std::sync::Arc;

use tracing::info;
use vms_error::Result;
use vms_types::AnalysisConfig;

use crate::workbench::Workbench;

const LOG_COMPONENT: &str = "vms.shared";

#[derive(Debug, Clone)]
pub struct SharedWorkbench {
    current: Arc<parking_lot::RwLock<Arc<Workbench>>>,
}

impl SharedWorkbench {
    #[must_use]
    pub fn new(workbench: Workbench) -> Self {
        Self {
            current: Arc::new(parking_lot::RwLock::new(Arc::new(workbench))),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Workbench> {
        Arc::clone(&self.current.read())
    }

    /// Swap in a new workbench, returning the previous one.
    pub fn replace(&self, workbench: Workbench) -> Arc<Workbench> {
        self.swap(Arc::new(workbench))
    }

    fn swap(&self, next: Arc<Workbench>) -> Arc<Workbench> {
        std::mem::replace(&mut *self.current.write(), next)
    }

    /// Install `next` and hand the same snapshot back, whatever other writers
    /// do afterwards.
    fn install(&self, next: Workbench) -> Arc<Workbench> {
        let next = Arc::new(next);
        self.swap(Arc::clone(&next));
        next
    }

    /// Reload from the current snapshot's sources. On error the current
    /// snapshot stays in place.
    pub fn reload(&self) -> Result<Arc<Workbench>> {
        let next = self.snapshot().reload()?;
        info!(component = LOG_COMPONENT, "shared workbench reloaded");
        Ok(self.install(next))
    }

    /// Rebuild the current snapshot with new tunables.
    pub fn reconfigure(&self, config: AnalysisConfig) -> Result<Arc<Workbench>> {
        let next = self.snapshot().reconfigure(config)?;
        Ok(self.install(next))
    }
}
