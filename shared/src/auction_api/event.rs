//! Auction events - immutable facts emitted after a successful commit
//!
//! Delivery to external consumers is at-least-once; consumers deduplicate on
//! `event_id`. The partition key is `auction_id`, which preserves per-auction
//! order (the per-auction command lock serializes the emitting commits).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Auction event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionEvent {
    /// Event unique ID (consumer deduplication key)
    pub event_id: Uuid,
    /// Event type
    pub event_type: AuctionEventType,
    /// Auction this event belongs to (partition key)
    pub auction_id: Uuid,
    /// Server timestamp (Unix milliseconds)
    pub timestamp: i64,
    /// Event payload
    pub payload: EventPayload,
}

/// Event type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuctionEventType {
    AuctionCreated,
    AuctionStarted,
    AuctionEnded,
    BidPlaced,
}

impl std::fmt::Display for AuctionEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuctionEventType::AuctionCreated => write!(f, "AUCTION_CREATED"),
            AuctionEventType::AuctionStarted => write!(f, "AUCTION_STARTED"),
            AuctionEventType::AuctionEnded => write!(f, "AUCTION_ENDED"),
            AuctionEventType::BidPlaced => write!(f, "BID_PLACED"),
        }
    }
}

/// Event payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    AuctionCreated {
        title: String,
    },

    AuctionStarted {
        start_time: DateTime<Utc>,
        lot_count: usize,
    },

    AuctionEnded {
        end_time: DateTime<Utc>,
    },

    BidPlaced {
        lot_id: Uuid,
        bid_id: Uuid,
        bidder_id: String,
        amount: Decimal,
        sequence: i64,
        /// Advisory flag computed before the append; the bid is accepted
        /// either way
        is_currently_highest: bool,
    },
}

impl AuctionEvent {
    pub fn new(event_type: AuctionEventType, auction_id: Uuid, payload: EventPayload) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type,
            auction_id,
            timestamp: crate::util::now_millis(),
            payload,
        }
    }
}
