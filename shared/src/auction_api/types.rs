//! Command requests and structured results

use crate::models::VehicleKind;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Create-vehicle request
///
/// `extra_attrs` carries the variant-specific attributes; coercion failures
/// fall back to defaults during spec resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVehicleRequest {
    pub kind: VehicleKind,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub vin: String,
    pub mileage: Decimal,
    pub color: String,
    #[serde(default)]
    pub extra_attrs: Map<String, Value>,
}

/// Create-auction request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuctionRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Create-lot request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLotRequest {
    pub auction_id: Uuid,
    pub vehicle_id: Uuid,
    pub starting_bid: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserve_price: Option<Decimal>,
}

/// Place-bid request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceBidRequest {
    pub lot_id: Uuid,
    pub bidder_id: String,
    pub amount: Decimal,
}

/// Structured bid result
///
/// Ingestion is AP: a bid below the current high is still accepted
/// (`success = true`, `is_currently_highest = false`). Rejections carry a
/// human-readable message and no bid id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bid_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_highest: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_currently_highest: Option<bool>,
}

impl BidOutcome {
    pub fn accepted(bid_id: Uuid, current_highest: Decimal, is_currently_highest: bool) -> Self {
        Self {
            success: true,
            message: "Bid accepted".to_string(),
            bid_id: Some(bid_id),
            current_highest: Some(current_highest),
            is_currently_highest: Some(is_currently_highest),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            bid_id: None,
            current_highest: None,
            is_currently_highest: None,
        }
    }
}

/// Vehicle search filter; all criteria are conjunctive
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<VehicleKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_year: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_bid_outcome_constructors() {
        let id = Uuid::new_v4();
        let accepted = BidOutcome::accepted(id, dec!(19000), false);
        assert!(accepted.success);
        assert_eq!(accepted.bid_id, Some(id));
        assert_eq!(accepted.is_currently_highest, Some(false));

        let rejected = BidOutcome::rejected("Auction is not accepting bids");
        assert!(!rejected.success);
        assert!(rejected.bid_id.is_none());
        assert!(rejected.current_highest.is_none());
    }

    #[test]
    fn test_create_vehicle_request_extra_attrs_default() {
        let json = r#"{"kind":"SEDAN","make":"BMW","model":"i4","year":2023,
            "vin":"WBA12345678901234","mileage":"28000","color":"Grey"}"#;
        let req: CreateVehicleRequest = serde_json::from_str(json).unwrap();
        assert!(req.extra_attrs.is_empty());
        assert_eq!(req.mileage, dec!(28000));
    }
}
