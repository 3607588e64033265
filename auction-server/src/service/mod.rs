//! AuctionService - command orchestration over the versioned stores
//!
//! This module handles:
//! - Per-entity serialization (lazily created lock tables)
//! - Unit-of-work scoping per command
//! - Retry with exponential backoff on version conflicts
//! - Event broadcasting after successful commits
//!
//! # Serialization model
//!
//! Two process-wide lock tables map entity ids to single-permit mutexes:
//! `auction_locks` serializes lifecycle commands and lot creation per
//! auction, `lot_locks` serializes bid placement per lot. Commands scoped to
//! different ids run in parallel. Entries are created on demand; lot locks
//! are swept when their auction ends, auction locks are never evicted.
//!
//! # Bid ingestion
//!
//! `place_bid` is AP: every precondition-valid bid on an active auction is
//! appended, including bids at or below the current high. The winner and the
//! valid-bid set are determined at read time from the sequence-ordered
//! projection, so determination stays consistent no matter how ingestion
//! interleaved.

mod error;
pub mod validate;

pub use error::{ServiceError, ServiceResult};

use crate::config::ServiceConfig;
use crate::sequence::{InProcessSequence, SequenceSource};
use crate::store::{AuctionStore, LotStore, StoreError, VehicleStore};
use crate::uow::UnitOfWork;
use dashmap::DashMap;
use rust_decimal::Decimal;
use shared::auction_api::{
    AuctionEvent, AuctionEventType, BidOutcome, CreateAuctionRequest, CreateLotRequest,
    CreateVehicleRequest, EventPayload, PlaceBidRequest, VehicleFilter,
};
use shared::models::{Auction, Bid, Entity, Lot, Vehicle, VehicleSpec};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// The application-level command surface of the bidding core
pub struct AuctionService {
    auctions: Arc<AuctionStore>,
    lots: Arc<LotStore>,
    vehicles: Arc<VehicleStore>,
    /// Per-auction serialization for lifecycle commands and lot creation
    auction_locks: DashMap<Uuid, Arc<Mutex<()>>>,
    /// Per-lot serialization for bid placement
    lot_locks: DashMap<Uuid, Arc<Mutex<()>>>,
    sequences: Arc<dyn SequenceSource>,
    event_tx: broadcast::Sender<AuctionEvent>,
    shutdown: CancellationToken,
    config: ServiceConfig,
}

impl AuctionService {
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_sequence_source(config, Arc::new(InProcessSequence::new()))
    }

    /// Create a service with an externally supplied sequence source
    /// (e.g. a centralized counter for multi-instance deployments)
    pub fn with_sequence_source(config: ServiceConfig, sequences: Arc<dyn SequenceSource>) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_channel_capacity);
        Self {
            auctions: Arc::new(AuctionStore::new()),
            lots: Arc::new(LotStore::new()),
            vehicles: Arc::new(VehicleStore::new()),
            auction_locks: DashMap::new(),
            lot_locks: DashMap::new(),
            sequences,
            event_tx,
            shutdown: CancellationToken::new(),
            config,
        }
    }

    /// Subscribe to post-commit event broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<AuctionEvent> {
        self.event_tx.subscribe()
    }

    /// Request cooperative shutdown: pending lock waits and retry sleeps
    /// return `Cancelled`. Committed work is never undone.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    // ========== Commands ==========

    /// Create a vehicle; insert-only, no event
    pub fn create_vehicle(&self, req: CreateVehicleRequest) -> ServiceResult<Vehicle> {
        validate::create_vehicle(&req)?;
        let spec = VehicleSpec::resolve(req.kind, &req.extra_attrs);
        let vehicle = Vehicle::new(
            req.make, req.model, req.year, req.vin, req.mileage, req.color, spec,
        )?;

        let scope = self.scope();
        scope.vehicles().add(vehicle.clone());
        scope.commit()?;
        tracing::info!(vehicle_id = %vehicle.id(), kind = %req.kind, "Vehicle created");
        Ok(vehicle)
    }

    pub fn create_auction(&self, req: CreateAuctionRequest) -> ServiceResult<Auction> {
        validate::create_auction(&req)?;
        let auction = Auction::new(req.title, req.description)?;

        let scope = self.scope();
        scope.auctions().add(auction.clone());
        scope.commit()?;
        tracing::info!(auction_id = %auction.id(), title = %auction.title(), "Auction created");

        self.emit(AuctionEvent::new(
            AuctionEventType::AuctionCreated,
            auction.id(),
            EventPayload::AuctionCreated {
                title: auction.title().to_string(),
            },
        ));
        Ok(auction)
    }

    /// Transition an auction Created -> Active
    pub async fn start_auction(&self, auction_id: Uuid) -> ServiceResult<()> {
        let _guard = self.acquire(self.auction_lock(auction_id)).await?;

        let mut attempt = 1;
        let event = loop {
            let scope = self.scope();
            let mut auction = scope
                .auctions()
                .get(auction_id)
                .ok_or(ServiceError::AuctionNotFound(auction_id))?;
            let start_time = auction.start()?;
            let lot_count = auction.lots().len();
            scope.auctions().update(auction);

            match scope.commit() {
                Ok(_) => {
                    break AuctionEvent::new(
                        AuctionEventType::AuctionStarted,
                        auction_id,
                        EventPayload::AuctionStarted {
                            start_time,
                            lot_count,
                        },
                    );
                }
                Err(err) => {
                    drop(scope);
                    self.handle_commit_error(err, &mut attempt).await?;
                }
            }
        };

        drop(_guard);
        tracing::info!(auction_id = %auction_id, "Auction started");
        self.emit(event);
        Ok(())
    }

    /// Transition an auction Active -> Ended
    ///
    /// While the auction lock is still held, the per-lot lock entries of the
    /// auction's lots are swept from the table; closed lots reject bids at
    /// the state check, so a racing bidder that already cloned a lock handle
    /// loses nothing but the wait.
    pub async fn close_auction(&self, auction_id: Uuid) -> ServiceResult<()> {
        let _guard = self.acquire(self.auction_lock(auction_id)).await?;

        let mut attempt = 1;
        let event = loop {
            let scope = self.scope();
            let mut auction = scope
                .auctions()
                .get(auction_id)
                .ok_or(ServiceError::AuctionNotFound(auction_id))?;
            let end_time = auction.close()?;
            scope.auctions().update(auction);

            match scope.commit() {
                Ok(_) => {
                    break AuctionEvent::new(
                        AuctionEventType::AuctionEnded,
                        auction_id,
                        EventPayload::AuctionEnded { end_time },
                    );
                }
                Err(err) => {
                    drop(scope);
                    self.handle_commit_error(err, &mut attempt).await?;
                }
            }
        };

        let swept = self.sweep_lot_locks(auction_id);
        drop(_guard);
        tracing::info!(auction_id = %auction_id, swept_lot_locks = swept, "Auction ended");
        self.emit(event);
        Ok(())
    }

    /// Create a lot and attach it to its auction atomically
    pub async fn create_lot(&self, req: CreateLotRequest) -> ServiceResult<Lot> {
        validate::create_lot(&req)?;
        let _guard = self.acquire(self.auction_lock(req.auction_id)).await?;

        let mut attempt = 1;
        let lot = loop {
            let scope = self.scope();
            let vehicle = scope
                .vehicles()
                .get(req.vehicle_id)
                .ok_or(ServiceError::VehicleNotFound(req.vehicle_id))?;
            let mut auction = scope
                .auctions()
                .get(req.auction_id)
                .ok_or(ServiceError::AuctionNotFound(req.auction_id))?;

            let lot = Lot::new(req.auction_id, vehicle, req.starting_bid, req.reserve_price)?;
            auction.add_lot(lot.clone())?;
            scope.auctions().update(auction);
            scope.lots().add(lot.clone());

            match scope.commit() {
                Ok(_) => break lot,
                Err(err) => {
                    drop(scope);
                    self.handle_commit_error(err, &mut attempt).await?;
                }
            }
        };

        tracing::info!(
            lot_id = %lot.id(),
            auction_id = %req.auction_id,
            starting_bid = %req.starting_bid,
            "Lot created"
        );
        Ok(lot)
    }

    /// Place a bid on a lot
    ///
    /// Ingestion is AP: the bid is appended even when it is not currently
    /// the highest (`success = true`, `is_currently_highest = false`).
    /// Every failure except an unknown lot is reported through the
    /// structured outcome rather than as an error.
    pub async fn place_bid(&self, req: PlaceBidRequest) -> ServiceResult<BidOutcome> {
        if let Err(err) = validate::place_bid(&req) {
            return Ok(BidOutcome::rejected(err.to_string()));
        }

        // Fast-path pre-check with a transient scope, before taking the lock
        {
            let scope = self.scope();
            let lot = scope
                .lots()
                .get(req.lot_id)
                .ok_or(ServiceError::LotNotFound(req.lot_id))?;
            if !self.auction_accepts_bids(&scope, lot.auction_id()) {
                return Ok(Self::not_accepting(lot.auction_id()));
            }
        }

        let _guard = self.acquire(self.lot_lock(req.lot_id)).await?;

        let mut attempt = 1;
        let (lot, bid_id, sequence, is_currently_highest) = loop {
            let scope = self.scope();
            let mut lot = scope
                .lots()
                .get(req.lot_id)
                .ok_or(ServiceError::LotNotFound(req.lot_id))?;
            let auction_id = lot.auction_id();
            if !self.auction_accepts_bids(&scope, auction_id) {
                return Ok(Self::not_accepting(auction_id));
            }

            // Advisory only - computed before the append, never enforced
            let is_currently_highest = lot.would_bid_be_valid(req.amount);

            // A failed commit still consumed this sequence; gaps are fine,
            // the projection depends only on total order
            let sequence = self.sequences.next(req.lot_id);

            let bid_id = match lot.place_bid(req.bidder_id.as_str(), req.amount, sequence) {
                Ok(id) => id,
                Err(err) => return Ok(BidOutcome::rejected(err.to_string())),
            };
            scope.lots().update(lot.clone());

            match scope.commit() {
                Ok(_) => break (lot, bid_id, sequence, is_currently_highest),
                Err(StoreError::VersionConflict { .. }) if attempt < self.config.max_attempts => {
                    drop(scope);
                    self.retry_pause(attempt).await?;
                    attempt += 1;
                }
                Err(StoreError::VersionConflict { .. }) => {
                    tracing::error!(
                        lot_id = %req.lot_id,
                        attempts = self.config.max_attempts,
                        "Bid commit retries exhausted"
                    );
                    return Ok(BidOutcome::rejected(
                        "Bid could not be committed, please retry",
                    ));
                }
                Err(err) => return Err(err.into()),
            }
        };

        drop(_guard);

        // Emit outside the lock; a full channel or absent receivers never
        // invalidate the committed bid
        self.emit(AuctionEvent::new(
            AuctionEventType::BidPlaced,
            lot.auction_id(),
            EventPayload::BidPlaced {
                lot_id: req.lot_id,
                bid_id,
                bidder_id: req.bidder_id.clone(),
                amount: req.amount,
                sequence,
                is_currently_highest,
            },
        ));

        let current_highest = lot.highest_bid_amount();
        tracing::info!(
            lot_id = %req.lot_id,
            bid_id = %bid_id,
            amount = %req.amount,
            sequence,
            is_currently_highest,
            "Bid accepted"
        );
        Ok(BidOutcome::accepted(bid_id, current_highest, is_currently_highest))
    }

    // ========== Read paths ==========

    pub fn get_auction(&self, id: Uuid) -> ServiceResult<Auction> {
        self.auctions.get(id).ok_or(ServiceError::AuctionNotFound(id))
    }

    pub fn list_auctions(&self) -> Vec<Auction> {
        self.auctions.get_all()
    }

    pub fn get_lot(&self, id: Uuid) -> ServiceResult<Lot> {
        self.lots.get(id).ok_or(ServiceError::LotNotFound(id))
    }

    /// Highest valid bid on the lot, if any
    pub fn get_highest_bid(&self, lot_id: Uuid) -> ServiceResult<Option<Bid>> {
        Ok(self.get_lot(lot_id)?.highest_bid())
    }

    /// Amount of the highest valid bid, or the starting bid
    pub fn get_highest_bid_amount(&self, lot_id: Uuid) -> ServiceResult<Decimal> {
        Ok(self.get_lot(lot_id)?.highest_bid_amount())
    }

    /// Winning bidder, if the reserve (when set) is met
    pub fn get_winner(&self, lot_id: Uuid) -> ServiceResult<Option<String>> {
        Ok(self.get_lot(lot_id)?.winning_bidder())
    }

    /// Every appended bid on the lot, in sequence order
    pub fn get_bid_history(&self, lot_id: Uuid) -> ServiceResult<Vec<Bid>> {
        let lot = self.get_lot(lot_id)?;
        let mut bids = lot.bids().to_vec();
        bids.sort_by_key(|b| b.sequence);
        Ok(bids)
    }

    pub fn search_vehicles(&self, filter: &VehicleFilter) -> Vec<Vehicle> {
        self.vehicles
            .get_all()
            .into_iter()
            .filter(|v| {
                filter.kind.map_or(true, |k| v.spec().kind() == k)
                    && filter
                        .make
                        .as_deref()
                        .map_or(true, |m| v.make().eq_ignore_ascii_case(m))
                    && filter
                        .model
                        .as_deref()
                        .map_or(true, |m| v.model().eq_ignore_ascii_case(m))
                    && filter.min_year.map_or(true, |y| v.year() >= y)
                    && filter.max_year.map_or(true, |y| v.year() <= y)
            })
            .collect()
    }

    // ========== Internals ==========

    fn scope(&self) -> UnitOfWork {
        UnitOfWork::new(
            Arc::clone(&self.auctions),
            Arc::clone(&self.lots),
            Arc::clone(&self.vehicles),
        )
    }

    fn auction_lock(&self, id: Uuid) -> Arc<Mutex<()>> {
        self.auction_locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn lot_lock(&self, id: Uuid) -> Arc<Mutex<()>> {
        self.lot_locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the lot-lock entries of an ended auction's lots
    ///
    /// Must run under the auction lock: lot commands take the lot lock only
    /// after observing an active auction, and activation cannot recur.
    fn sweep_lot_locks(&self, auction_id: Uuid) -> usize {
        let mut swept = 0;
        for lot in self.lots.get_by_auction(auction_id) {
            if self.lot_locks.remove(&lot.id()).is_some() {
                swept += 1;
            }
        }
        swept
    }

    async fn acquire(&self, lock: Arc<Mutex<()>>) -> ServiceResult<OwnedMutexGuard<()>> {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(ServiceError::Cancelled),
            guard = lock.lock_owned() => Ok(guard),
        }
    }

    /// Backoff between commit attempts; honors the shutdown token
    async fn retry_pause(&self, attempt: u32) -> ServiceResult<()> {
        let delay = self.config.backoff_delay(attempt);
        tracing::warn!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            "Version conflict at commit, backing off"
        );
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(ServiceError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    /// Shared conflict handling for the lifecycle commands: retry within the
    /// attempt budget, escalate to `RetriesExhausted` beyond it, pass any
    /// other store failure through untouched.
    async fn handle_commit_error(&self, err: StoreError, attempt: &mut u32) -> ServiceResult<()> {
        match err {
            StoreError::VersionConflict { .. } if *attempt < self.config.max_attempts => {
                self.retry_pause(*attempt).await?;
                *attempt += 1;
                Ok(())
            }
            StoreError::VersionConflict { .. } => {
                tracing::error!(attempts = self.config.max_attempts, "Commit retries exhausted");
                Err(ServiceError::RetriesExhausted {
                    attempts: self.config.max_attempts,
                })
            }
            other => Err(other.into()),
        }
    }

    fn auction_accepts_bids(&self, scope: &UnitOfWork, auction_id: Uuid) -> bool {
        scope
            .auctions()
            .get(auction_id)
            .is_some_and(|a| a.can_accept_bids())
    }

    fn not_accepting(auction_id: Uuid) -> BidOutcome {
        BidOutcome::rejected(ServiceError::AuctionNotAcceptingBids(auction_id).to_string())
    }

    fn emit(&self, event: AuctionEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::warn!("Event broadcast failed: no active receivers");
        }
    }
}

#[cfg(test)]
mod tests;
