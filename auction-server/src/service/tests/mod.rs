use super::*;
use crate::config::ServiceConfig;
use rust_decimal_macros::dec;
use serde_json::{Map, Value};
use shared::models::VehicleKind;


fn test_service() -> AuctionService {
    AuctionService::new(ServiceConfig::default())
}

fn sedan_request() -> CreateVehicleRequest {
    let mut extra_attrs = Map::new();
    extra_attrs.insert("doors".to_string(), Value::from(4));
    extra_attrs.insert("sunroof".to_string(), Value::from(true));
    CreateVehicleRequest {
        kind: VehicleKind::Sedan,
        make: "BMW".to_string(),
        model: "i4 M50".to_string(),
        year: 2023,
        vin: "WBA12345678901234".to_string(),
        mileage: dec!(28000),
        color: "Grey".to_string(),
        extra_attrs,
    }
}

fn bid(lot_id: Uuid, bidder_id: &str, amount: Decimal) -> PlaceBidRequest {
    PlaceBidRequest {
        lot_id,
        bidder_id: bidder_id.to_string(),
        amount,
    }
}

/// Create an auction with one lot; optionally start it
async fn seeded_auction(
    service: &AuctionService,
    starting_bid: Decimal,
    reserve_price: Option<Decimal>,
    started: bool,
) -> (Auction, Lot) {
    let auction = service
        .create_auction(CreateAuctionRequest {
            title: "Dec 2025".to_string(),
            description: "year-end sale".to_string(),
        })
        .unwrap();
    let vehicle = service.create_vehicle(sedan_request()).unwrap();
    let lot = service
        .create_lot(CreateLotRequest {
            auction_id: auction.id(),
            vehicle_id: vehicle.id(),
            starting_bid,
            reserve_price,
        })
        .await
        .unwrap();
    if started {
        service.start_auction(auction.id()).await.unwrap();
    }
    (service.get_auction(auction.id()).unwrap(), lot)
}
