//! Auction entity and lifecycle state machine
//!
//! Transitions are strictly Created -> Active -> Ended. Lots may be appended
//! only in Created, and activation requires at least one lot. Every legal
//! transition publishes a new version; an illegal transition fails with a
//! state violation and changes nothing.

use crate::error::{DomainError, DomainResult};
use crate::models::{Entity, Lot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Auction lifecycle state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuctionState {
    Created,
    Active,
    Ended,
}

impl std::fmt::Display for AuctionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuctionState::Created => write!(f, "CREATED"),
            AuctionState::Active => write!(f, "ACTIVE"),
            AuctionState::Ended => write!(f, "ENDED"),
        }
    }
}

/// Auction entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auction {
    id: Uuid,
    title: String,
    description: String,
    state: AuctionState,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    lots: Vec<Lot>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    version: u32,
}

impl Auction {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> DomainResult<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::invalid("title must not be empty"));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            title,
            description: description.into(),
            state: AuctionState::Created,
            start_time: None,
            end_time: None,
            lots: Vec::new(),
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

    /// Created -> Active; requires at least one lot. Returns the stamped
    /// start time.
    pub fn start(&mut self) -> DomainResult<DateTime<Utc>> {
        if self.state != AuctionState::Created {
            return Err(DomainError::state(format!(
                "cannot start auction in state {}",
                self.state
            )));
        }
        if self.lots.is_empty() {
            return Err(DomainError::state("cannot start an auction with no lots"));
        }
        let now = Utc::now();
        self.state = AuctionState::Active;
        self.start_time = Some(now);
        self.touch();
        Ok(now)
    }

    /// Active -> Ended. Returns the stamped end time.
    pub fn close(&mut self) -> DomainResult<DateTime<Utc>> {
        if self.state != AuctionState::Active {
            return Err(DomainError::state(format!(
                "cannot end auction in state {}",
                self.state
            )));
        }
        let now = Utc::now();
        self.state = AuctionState::Ended;
        self.end_time = Some(now);
        self.touch();
        Ok(now)
    }

    /// Append a lot; legal only in Created
    pub fn add_lot(&mut self, lot: Lot) -> DomainResult<()> {
        if self.state != AuctionState::Created {
            return Err(DomainError::state(format!(
                "cannot add lots to auction in state {}",
                self.state
            )));
        }
        if lot.auction_id() != self.id {
            return Err(DomainError::invalid(format!(
                "lot belongs to auction {}, not {}",
                lot.auction_id(),
                self.id
            )));
        }
        self.lots.push(lot);
        self.touch();
        Ok(())
    }

    pub fn can_accept_bids(&self) -> bool {
        self.state == AuctionState::Active
    }

    // ========== Accessors ==========

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn state(&self) -> AuctionState {
        self.state
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for Auction {
    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn kind() -> &'static str {
        "Auction"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Vehicle, VehicleSpec};
    use rust_decimal_macros::dec;

    fn test_lot_for(auction: &Auction) -> Lot {
        let vehicle = Vehicle::new(
            "Toyota",
            "Hilux",
            2022,
            "JTE12345678901234",
            dec!(41000),
            "White",
            VehicleSpec::Truck {
                load_capacity_kg: 1000,
                bed_length_m: dec!(1.8),
                four_wheel_drive: true,
            },
        )
        .unwrap();
        Lot::new(auction.id(), vehicle, dec!(15000), None).unwrap()
    }

    #[test]
    fn test_new_auction() {
        let auction = Auction::new("Dec 2025", "year-end sale").unwrap();
        assert_eq!(auction.state(), AuctionState::Created);
        assert_eq!(auction.version(), 1);
        assert!(auction.start_time().is_none());
        assert!(!auction.can_accept_bids());

        assert!(Auction::new("  ", "").is_err());
    }

    #[test]
    fn test_start_requires_a_lot() {
        let mut auction = Auction::new("Dec 2025", "").unwrap();
        let err = auction.start().unwrap_err();
        assert!(matches!(err, DomainError::StateViolation(_)));
        // Failed transition publishes nothing
        assert_eq!(auction.version(), 1);
        assert_eq!(auction.state(), AuctionState::Created);
    }

    #[test]
    fn test_full_lifecycle() {
        let mut auction = Auction::new("Dec 2025", "").unwrap();
        let lot = test_lot_for(&auction);
        auction.add_lot(lot).unwrap();
        assert_eq!(auction.version(), 2);

        auction.start().unwrap();
        assert_eq!(auction.state(), AuctionState::Active);
        assert!(auction.start_time().is_some());
        assert!(auction.can_accept_bids());
        assert_eq!(auction.version(), 3);

        auction.close().unwrap();
        assert_eq!(auction.state(), AuctionState::Ended);
        assert!(auction.end_time().is_some());
        assert!(!auction.can_accept_bids());
        assert_eq!(auction.version(), 4);
    }

    #[test]
    fn test_add_lot_after_start_rejected() {
        let mut auction = Auction::new("Dec 2025", "").unwrap();
        auction.add_lot(test_lot_for(&auction)).unwrap();
        auction.start().unwrap();

        let late = test_lot_for(&auction);
        let err = auction.add_lot(late).unwrap_err();
        assert!(matches!(err, DomainError::StateViolation(_)));
        assert_eq!(auction.lots().len(), 1);
    }

    #[test]
    fn test_close_before_start_rejected() {
        let mut auction = Auction::new("Dec 2025", "").unwrap();
        let err = auction.close().unwrap_err();
        assert!(matches!(err, DomainError::StateViolation(_)));
    }

    #[test]
    fn test_double_start_rejected() {
        let mut auction = Auction::new("Dec 2025", "").unwrap();
        auction.add_lot(test_lot_for(&auction)).unwrap();
        auction.start().unwrap();
        assert!(auction.start().is_err());
    }

    #[test]
    fn test_add_foreign_lot_rejected() {
        let mut auction = Auction::new("Dec 2025", "").unwrap();
        let other = Auction::new("Other", "").unwrap();
        let foreign = test_lot_for(&other);
        assert!(auction.add_lot(foreign).is_err());
    }

    #[test]
    fn test_version_increases_by_one_per_mutation() {
        let mut auction = Auction::new("Dec 2025", "").unwrap();
        let before = auction.version();
        auction.add_lot(test_lot_for(&auction)).unwrap();
        assert_eq!(auction.version(), before + 1);
        auction.start().unwrap();
        assert_eq!(auction.version(), before + 2);
        auction.close().unwrap();
        assert_eq!(auction.version(), before + 3);
    }
}
