// Per-unit, per-operation single-flight tracking

use crate::models::UnitId;
use crate::utils::lock_mutex_recover;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Operations the engine runs against the document service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitOperation {
    Refine,
    Feedback,
    Comment,
    /// Project-wide; tracked without a unit
    Export,
}

impl UnitOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitOperation::Refine => "refine",
            UnitOperation::Feedback => "feedback",
            UnitOperation::Comment => "comment",
            UnitOperation::Export => "export",
        }
    }
}

impl fmt::Display for UnitOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one pending call
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InFlightKey {
    pub unit_id: Option<UnitId>,
    pub operation: UnitOperation,
}

/// Set of pending calls, owned by one engine
#[derive(Debug, Clone, Default)]
pub struct InFlightRegistry {
    pending: Arc<Mutex<HashSet<InFlightKey>>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a call as pending. Returns `None` when the same call is already
    /// pending. The flag is cleared when the guard drops, including when the
    /// owning future is dropped mid-call.
    pub fn try_acquire(
        &self,
        unit_id: Option<&UnitId>,
        operation: UnitOperation,
    ) -> Option<InFlightGuard> {
        let key = InFlightKey {
            unit_id: unit_id.cloned(),
            operation,
        };
        let inserted = lock_mutex_recover(&self.pending).insert(key.clone());
        if !inserted {
            return None;
        }
        Some(InFlightGuard {
            pending: Arc::clone(&self.pending),
            key,
        })
    }

    pub fn is_pending(&self, unit_id: Option<&UnitId>, operation: UnitOperation) -> bool {
        let key = InFlightKey {
            unit_id: unit_id.cloned(),
            operation,
        };
        lock_mutex_recover(&self.pending).contains(&key)
    }

    /// Sorted snapshot of pending calls
    pub fn snapshot(&self) -> Vec<InFlightKey> {
        let mut keys: Vec<InFlightKey> = lock_mutex_recover(&self.pending).iter().cloned().collect();
        keys.sort();
        keys
    }
}

/// Clears its in-flight flag on drop
#[derive(Debug)]
pub struct InFlightGuard {
    pending: Arc<Mutex<HashSet<InFlightKey>>>,
    key: InFlightKey,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock_mutex_recover(&self.pending).remove(&self.key);
    }
}
