//! Live map instances keyed by placeholder identity.
//!
//! The registry holds only `Weak` references to placeholders, so it never
//! keeps a removed element alive. Holding the `Weak` also pins the
//! element's allocation, which keeps the address key unique for as long as
//! the record exists.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::runtime::host::{Element, ElementRef, LiveMap};

/// Identifies one registration, so a stale release action cannot remove a
/// newer instance recorded for the same element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceToken {
    key: usize,
    generation: u64,
}

struct Record {
    element: Weak<dyn Element>,
    generation: u64,
    map: Box<dyn LiveMap>,
}

/// Side table from placeholder element to its live map.
#[derive(Default)]
pub struct InstanceRegistry {
    records: Mutex<HashMap<usize, Record>>,
    generation: AtomicU64,
}

impl std::fmt::Debug for InstanceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceRegistry")
            .field("live", &self.len())
            .finish_non_exhaustive()
    }
}

fn key_of(element: &ElementRef) -> usize {
    Arc::as_ptr(element).cast::<()>() as usize
}

impl InstanceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `element` currently has a live map.
    #[must_use]
    pub fn contains(&self, element: &ElementRef) -> bool {
        self.lock().contains_key(&key_of(element))
    }

    /// Number of live maps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records the live map for `element`.
    ///
    /// Records whose element has since been dropped are pruned first and
    /// their maps removed.
    pub fn insert(&self, element: &ElementRef, map: Box<dyn LiveMap>) -> InstanceToken {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let key = key_of(element);
        let mut records = self.lock();

        records.retain(|_, record| {
            if record.element.strong_count() > 0 {
                return true;
            }
            tracing::debug!("releasing map of a dropped placeholder");
            record.map.remove();
            false
        });

        let previous = records.insert(
            key,
            Record {
                element: Arc::downgrade(element),
                generation,
                map,
            },
        );
        if let Some(mut previous) = previous {
            previous.map.remove();
        }

        InstanceToken { key, generation }
    }

    /// Destroys and forgets the map recorded under `token`.
    ///
    /// Returns `false` when the record is already gone or was replaced.
    pub fn release(&self, token: InstanceToken) -> bool {
        let mut records = self.lock();
        match records.get(&token.key) {
            Some(record) if record.generation == token.generation => {}
            _ => return false,
        }
        if let Some(mut record) = records.remove(&token.key) {
            record.map.remove();
            true
        } else {
            false
        }
    }

    /// Destroys every recorded map.
    pub fn release_all(&self) -> usize {
        let mut records = self.lock();
        let count = records.len();
        for (_, mut record) in records.drain() {
            record.map.remove();
        }
        count
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<usize, Record>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
