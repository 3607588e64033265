//! Lot - a single vehicle offered within an auction, carrying its bids
//!
//! Bid ingestion is deliberately AP: `place_bid` appends every
//! precondition-valid bid without comparing it against the current high.
//! Consistency is recovered at read time by `valid_bids`, a deterministic
//! projection of the appended bid set ordered by sequence. Winner and
//! highest-amount queries are all derived from that single projection.

use crate::error::{DomainError, DomainResult};
use crate::models::{Bid, Entity, Vehicle};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lot entity
///
/// `auction_id`, `vehicle` and `starting_bid` are immutable once created;
/// only the bid list (and the version/updated_at prelude) ever changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lot {
    id: Uuid,
    auction_id: Uuid,
    vehicle: Vehicle,
    starting_bid: Decimal,
    reserve_price: Option<Decimal>,
    bids: Vec<Bid>,
    /// Local fallback counter, used only when no external sequence source
    /// is supplied
    local_sequence: i64,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    version: u32,
}

impl Lot {
    pub fn new(
        auction_id: Uuid,
        vehicle: Vehicle,
        starting_bid: Decimal,
        reserve_price: Option<Decimal>,
    ) -> DomainResult<Self> {
        if auction_id.is_nil() {
            return Err(DomainError::invalid("auction_id must not be nil"));
        }
        if starting_bid <= Decimal::ZERO {
            return Err(DomainError::invalid(format!(
                "starting_bid must be positive, got {starting_bid}"
            )));
        }
        if let Some(reserve) = reserve_price {
            if reserve <= Decimal::ZERO {
                return Err(DomainError::invalid(format!(
                    "reserve_price must be positive, got {reserve}"
                )));
            }
        }
        Ok(Self {
            id: Uuid::new_v4(),
            auction_id,
            vehicle,
            starting_bid,
            reserve_price,
            bids: Vec::new(),
            local_sequence: 0,
            created_at: Utc::now(),
            updated_at: None,
            version: 1,
        })
    }

    /// Publish a mutation: stamp `updated_at`, bump `version`
    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
        self.version += 1;
    }

    /// Append a bid unconditionally (AP ingestion) and publish
    ///
    /// `amount > 0` and `sequence > 0` are preconditions; there is no
    /// amount-vs-current-high check here. Returns the new bid's id.
    pub fn place_bid(
        &mut self,
        bidder_id: impl Into<String>,
        amount: Decimal,
        sequence: i64,
    ) -> DomainResult<Uuid> {
        let bid = Bid::new(bidder_id, self.id, amount, sequence)?;
        let bid_id = bid.id;
        self.bids.push(bid);
        self.touch();
        Ok(bid_id)
    }

    /// Append a bid using the lot's own fallback counter
    pub fn place_bid_local(
        &mut self,
        bidder_id: impl Into<String>,
        amount: Decimal,
    ) -> DomainResult<Uuid> {
        let sequence = self.next_local_sequence();
        self.place_bid(bidder_id, amount, sequence)
    }

    fn next_local_sequence(&mut self) -> i64 {
        self.local_sequence += 1;
        self.local_sequence
    }

    // ========== Consistent reads ==========

    /// The valid-bid projection - single source of truth
    ///
    /// Projects the bid list into ascending sequence order and sweeps with a
    /// running high initialized to `starting_bid`; a bid is included iff its
    /// amount strictly exceeds the running high. Equal amounts lose to the
    /// earlier sequence.
    pub fn valid_bids(&self) -> Vec<Bid> {
        let mut ordered: Vec<&Bid> = self.bids.iter().collect();
        ordered.sort_by_key(|b| b.sequence);

        let mut current_high = self.starting_bid;
        let mut valid = Vec::new();
        for bid in ordered {
            if bid.amount > current_high {
                current_high = bid.amount;
                valid.push(bid.clone());
            }
        }
        valid
    }

    /// Amount of the highest valid bid, or `starting_bid` if there is none
    pub fn highest_bid_amount(&self) -> Decimal {
        self.valid_bids()
            .last()
            .map_or(self.starting_bid, |b| b.amount)
    }

    /// The highest valid bid, if any
    pub fn highest_bid(&self) -> Option<Bid> {
        self.valid_bids().pop()
    }

    /// Winning bidder: the highest valid bid, provided the reserve (when
    /// set) is met
    pub fn winning_bidder(&self) -> Option<String> {
        let highest = self.highest_bid()?;
        if let Some(reserve) = self.reserve_price {
            if highest.amount < reserve {
                return None;
            }
        }
        Some(highest.bidder_id)
    }

    /// Advisory check: would `amount` currently be a valid bid?
    ///
    /// Not enforced on append; ingestion accepts every bid regardless.
    pub fn would_bid_be_valid(&self, amount: Decimal) -> bool {
        amount > self.highest_bid_amount()
    }

    // ========== Accessors ==========

    pub fn auction_id(&self) -> Uuid {
        self.auction_id
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn starting_bid(&self) -> Decimal {
        self.starting_bid
    }

    pub fn reserve_price(&self) -> Option<Decimal> {
        self.reserve_price
    }

    /// All appended bids, in append order
    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for Lot {
    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn kind() -> &'static str {
        "Lot"
    }
}
