//! Bid - immutable record of a single offer on a lot

use crate::error::{DomainError, DomainResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single bid on a lot
///
/// Identity is the bid `id`. Equal amounts are allowed; the lot orders bids
/// by `sequence`, which the sequence source guarantees is strictly monotonic
/// per lot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bid {
    pub id: Uuid,
    pub bidder_id: String,
    pub lot_id: Uuid,
    pub amount: Decimal,
    pub bid_time: DateTime<Utc>,
    pub sequence: i64,
}

impl Bid {
    /// Construct a bid; `amount > 0` and `sequence > 0` are preconditions
    pub fn new(
        bidder_id: impl Into<String>,
        lot_id: Uuid,
        amount: Decimal,
        sequence: i64,
    ) -> DomainResult<Self> {
        let bidder_id = bidder_id.into();
        if bidder_id.trim().is_empty() {
            return Err(DomainError::invalid("bidder_id must not be empty"));
        }
        if amount <= Decimal::ZERO {
            return Err(DomainError::invalid(format!(
                "bid amount must be positive, got {amount}"
            )));
        }
        if sequence <= 0 {
            return Err(DomainError::invalid(format!(
                "bid sequence must be positive, got {sequence}"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            bidder_id,
            lot_id,
            amount,
            bid_time: Utc::now(),
            sequence,
        })
    }
}
