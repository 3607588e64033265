//! Versioned in-memory entity stores
//!
//! One store per entity kind {Auction, Lot, Vehicle}. Each store keeps two
//! maps keyed by id - the latest snapshot and the last committed version -
//! behind a single short mutex. The mutex covers only the compare-and-swap;
//! it does not serialize unrelated application-level work.
//!
//! # Versioning contract
//!
//! The domain increments an entity's version *before* `update` is called
//! (inside the mutating operation). An entity loaded at version V and
//! mutated once therefore arrives at V+1; if anyone else committed in the
//! interim the stored version has advanced and the check fails with a
//! version conflict carrying `expected` (what the store would have accepted)
//! and `actual` (what arrived).

use parking_lot::Mutex;
use shared::models::{Auction, Entity, Lot, Vehicle};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Store errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: Uuid },

    #[error("{kind} already exists: {id}")]
    DuplicateId { kind: &'static str, id: Uuid },

    #[error("Version conflict on {kind} {id}: expected {expected}, actual {actual}")]
    VersionConflict {
        kind: &'static str,
        id: Uuid,
        expected: u32,
        actual: u32,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

struct StoreInner<T> {
    entities: HashMap<Uuid, T>,
    stored_versions: HashMap<Uuid, u32>,
}

/// Generic versioned store with optimistic-version put
pub struct VersionedStore<T: Entity> {
    inner: Mutex<StoreInner<T>>,
}

pub type AuctionStore = VersionedStore<Auction>;
pub type LotStore = VersionedStore<Lot>;
pub type VehicleStore = VersionedStore<Vehicle>;

impl<T: Entity> Default for VersionedStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> VersionedStore<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                entities: HashMap::new(),
                stored_versions: HashMap::new(),
            }),
        }
    }

    /// Insert a new entity; fails if the id is already present
    pub fn add(&self, entity: T) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        let id = entity.id();
        if inner.entities.contains_key(&id) {
            return Err(StoreError::DuplicateId { kind: T::kind(), id });
        }
        inner.stored_versions.insert(id, entity.version());
        inner.entities.insert(id, entity);
        Ok(())
    }

    /// Snapshot of the entity, if present
    pub fn get(&self, id: Uuid) -> Option<T> {
        self.inner.lock().entities.get(&id).cloned()
    }

    /// Snapshot list of all entities
    pub fn get_all(&self) -> Vec<T> {
        self.inner.lock().entities.values().cloned().collect()
    }

    /// Replace the snapshot under the optimistic version check
    ///
    /// Requires the stored version to exist and the incoming entity to be at
    /// exactly `stored + 1`. The whole check-and-replace runs under the
    /// store mutex.
    pub fn update(&self, entity: T) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        let id = entity.id();
        let stored = *inner
            .stored_versions
            .get(&id)
            .ok_or(StoreError::NotFound { kind: T::kind(), id })?;
        let expected = stored + 1;
        let actual = entity.version();
        if actual != expected {
            return Err(StoreError::VersionConflict {
                kind: T::kind(),
                id,
                expected,
                actual,
            });
        }
        inner.stored_versions.insert(id, actual);
        inner.entities.insert(id, entity);
        Ok(())
    }

    /// Last committed version for an id (diagnostic)
    pub fn stored_version(&self, id: Uuid) -> Option<u32> {
        self.inner.lock().stored_versions.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entities.is_empty()
    }
}

impl VersionedStore<Lot> {
    /// Snapshot list of the lots belonging to one auction
    pub fn get_by_auction(&self, auction_id: Uuid) -> Vec<Lot> {
        self.inner
            .lock()
            .entities
            .values()
            .filter(|lot| lot.auction_id() == auction_id)
            .cloned()
            .collect()
    }
}
