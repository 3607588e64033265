//! Unit-of-work transaction scope
//!
//! A scope represents one logical transaction over the three stores. Its
//! repository views defer writes - `add` / `update` record a pending change
//! without touching the backing store - while reads pass straight through
//! (read-committed). `commit` replays the pending changes in recorded order;
//! any duplicate-id or version-conflict propagates and the caller discards
//! the scope.
//!
//! # Atomicity caveat
//!
//! Commit applies changes one-by-one against independent stores, so a later
//! failure can leave earlier changes applied. The contract is all-or-retry:
//! the orchestrator discards the failed scope and re-runs the whole command.
//! A transactional backend would upgrade commit to a single atomic batch
//! without changing this interface.
//!
//! A scope is owned by a single caller and is not shareable across threads.

use crate::store::{AuctionStore, LotStore, StoreResult, VehicleStore};
use shared::models::{Auction, Lot, Vehicle};
use std::cell::RefCell;
use std::sync::Arc;
use uuid::Uuid;

/// A deferred write, replayed on commit in recorded order
#[derive(Debug, Clone)]
enum PendingChange {
    AddAuction(Auction),
    UpdateAuction(Auction),
    AddLot(Lot),
    UpdateLot(Lot),
    AddVehicle(Vehicle),
}

/// Unit-of-work scope over the three stores
pub struct UnitOfWork {
    auctions: Arc<AuctionStore>,
    lots: Arc<LotStore>,
    vehicles: Arc<VehicleStore>,
    pending: RefCell<Vec<PendingChange>>,
}

impl UnitOfWork {
    pub fn new(
        auctions: Arc<AuctionStore>,
        lots: Arc<LotStore>,
        vehicles: Arc<VehicleStore>,
    ) -> Self {
        Self {
            auctions,
            lots,
            vehicles,
            pending: RefCell::new(Vec::new()),
        }
    }

    /// Auction repository view
    pub fn auctions(&self) -> AuctionRepo<'_> {
        AuctionRepo { scope: self }
    }

    /// Lot repository view
    pub fn lots(&self) -> LotRepo<'_> {
        LotRepo { scope: self }
    }

    /// Vehicle repository view (insert-only)
    pub fn vehicles(&self) -> VehicleRepo<'_> {
        VehicleRepo { scope: self }
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pending.borrow().is_empty()
    }

    /// Apply pending changes in recorded order; returns the count applied
    ///
    /// The pending list is cleared whether or not the replay succeeds - a
    /// failed scope is dead and must be discarded by the caller.
    pub fn commit(&self) -> StoreResult<usize> {
        let changes = self.pending.take();
        let mut applied = 0;
        for change in changes {
            match change {
                PendingChange::AddAuction(a) => self.auctions.add(a)?,
                PendingChange::UpdateAuction(a) => self.auctions.update(a)?,
                PendingChange::AddLot(l) => self.lots.add(l)?,
                PendingChange::UpdateLot(l) => self.lots.update(l)?,
                PendingChange::AddVehicle(v) => self.vehicles.add(v)?,
            }
            applied += 1;
        }
        Ok(applied)
    }

    /// Discard pending changes
    pub fn rollback(&self) {
        self.pending.borrow_mut().clear();
    }

    fn record(&self, change: PendingChange) {
        self.pending.borrow_mut().push(change);
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        let pending = self.pending.borrow();
        if !pending.is_empty() {
            tracing::debug!(
                discarded = pending.len(),
                "Scope dropped with uncommitted changes"
            );
        }
    }
}

/// Deferred-write view over the auction store
pub struct AuctionRepo<'a> {
    scope: &'a UnitOfWork,
}

impl AuctionRepo<'_> {
    pub fn add(&self, auction: Auction) {
        self.scope.record(PendingChange::AddAuction(auction));
    }

    pub fn update(&self, auction: Auction) {
        self.scope.record(PendingChange::UpdateAuction(auction));
    }

    /// Read-committed pass-through
    pub fn get(&self, id: Uuid) -> Option<Auction> {
        self.scope.auctions.get(id)
    }

    pub fn get_all(&self) -> Vec<Auction> {
        self.scope.auctions.get_all()
    }
}

/// Deferred-write view over the lot store
pub struct LotRepo<'a> {
    scope: &'a UnitOfWork,
}

impl LotRepo<'_> {
    pub fn add(&self, lot: Lot) {
        self.scope.record(PendingChange::AddLot(lot));
    }

    pub fn update(&self, lot: Lot) {
        self.scope.record(PendingChange::UpdateLot(lot));
    }

    pub fn get(&self, id: Uuid) -> Option<Lot> {
        self.scope.lots.get(id)
    }

    pub fn get_by_auction(&self, auction_id: Uuid) -> Vec<Lot> {
        self.scope.lots.get_by_auction(auction_id)
    }
}

/// Insert-only view over the vehicle store
pub struct VehicleRepo<'a> {
    scope: &'a UnitOfWork,
}

impl VehicleRepo<'_> {
    pub fn add(&self, vehicle: Vehicle) {
        self.scope.record(PendingChange::AddVehicle(vehicle));
    }

    pub fn get(&self, id: Uuid) -> Option<Vehicle> {
        self.scope.vehicles.get(id)
    }

    pub fn get_all(&self) -> Vec<Vehicle> {
        self.scope.vehicles.get_all()
    }
}
