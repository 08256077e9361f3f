///! Seen-set of already reported satellites
///!
///! Process-lifetime state: a NORAD ID enters at most once and is never
///! evicted, so within one run no satellite is reported twice. A restart
///! starts empty by design.
///!
///! The discovery job is the only writer; the rollup job reads the size.
///! Both run as separate tokio tasks, so the set sits behind an RwLock
///! which is never held across a network await.

use crate::module::n2yo::NoradId;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Cloneable handle to the shared seen-set. Inject a fresh instance per
/// test; the process creates exactly one at startup.
#[derive(Clone, Default)]
pub struct ReportedSet {
    inner: Arc<RwLock<HashSet<NoradId>>>,
}

impl ReportedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, norad_id: NoradId) -> bool {
        self.inner.read().await.contains(&norad_id)
    }

    /// Record a satellite as reported. Returns false if it was already
    /// present.
    pub async fn mark_reported(&self, norad_id: NoradId) -> bool {
        self.inner.write().await.insert(norad_id)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
