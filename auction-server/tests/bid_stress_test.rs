//! Bidding stress test - interleaved auctions under concurrent load
//!
//! Drives several auctions through their whole lifecycle while bidder tasks
//! hammer every lot in parallel, then checks what the core guarantees:
//! every accepted bid committed, sequences distinct, the valid-bid
//! projection strictly increasing, versions advanced exactly once per
//! mutation.

use auction_server::{AuctionService, ServiceConfig};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use shared::auction_api::{
    AuctionEventType, CreateAuctionRequest, CreateLotRequest, CreateVehicleRequest,
    PlaceBidRequest,
};
use shared::models::{AuctionState, Entity, VehicleKind};
use std::sync::Arc;
use uuid::Uuid;

const AUCTIONS: usize = 4;
const LOTS_PER_AUCTION: usize = 3;
const BIDDERS_PER_LOT: usize = 25;

fn vehicle_request(tag: usize) -> CreateVehicleRequest {
    CreateVehicleRequest {
        kind: VehicleKind::Suv,
        make: "Kia".to_string(),
        model: "Sorento".to_string(),
        year: 2022,
        vin: format!("KNA123456789{tag:05}"),
        mileage: dec!(35000),
        color: "Black".to_string(),
        extra_attrs: serde_json::Map::new(),
    }
}

async fn build_auction(service: &AuctionService, idx: usize) -> (Uuid, Vec<Uuid>) {
    let auction = service
        .create_auction(CreateAuctionRequest {
            title: format!("Stress auction {idx}"),
            description: String::new(),
        })
        .unwrap();

    let mut lot_ids = Vec::new();
    for lot_idx in 0..LOTS_PER_AUCTION {
        let vehicle = service
            .create_vehicle(vehicle_request(idx * 100 + lot_idx))
            .unwrap();
        let lot = service
            .create_lot(CreateLotRequest {
                auction_id: auction.id(),
                vehicle_id: vehicle.id(),
                starting_bid: dec!(1000),
                reserve_price: Some(dec!(1010)),
            })
            .await
            .unwrap();
        lot_ids.push(lot.id());
    }
    service.start_auction(auction.id()).await.unwrap();
    (auction.id(), lot_ids)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn stress_interleaved_auctions() {
    auction_server::logging::init_tracing();

    let service = Arc::new(AuctionService::new(ServiceConfig::default()));
    let mut events = service.subscribe();

    // Phase 1: build all auctions
    let mut auctions = Vec::new();
    for idx in 0..AUCTIONS {
        auctions.push(build_auction(&service, idx).await);
    }

    // Phase 2: bid storm across every lot of every auction at once
    let mut handles = Vec::new();
    for (_, lot_ids) in &auctions {
        for &lot_id in lot_ids {
            for bidder in 0..BIDDERS_PER_LOT {
                let service = Arc::clone(&service);
                handles.push(tokio::spawn(async move {
                    let amount = Decimal::from(1001 + bidder as i64);
                    service
                        .place_bid(PlaceBidRequest {
                            lot_id,
                            bidder_id: format!("bidder-{bidder}"),
                            amount,
                        })
                        .await
                        .unwrap()
                }));
            }
        }
    }
    for handle in handles {
        let outcome = handle.await.unwrap();
        assert!(outcome.success, "bid rejected: {}", outcome.message);
    }

    // Phase 3: close everything
    for (auction_id, _) in &auctions {
        service.close_auction(*auction_id).await.unwrap();
    }

    // Phase 4: verify invariants
    for (auction_id, lot_ids) in &auctions {
        let auction = service.get_auction(*auction_id).unwrap();
        assert_eq!(auction.state(), AuctionState::Ended);
        // create(1) + add_lot * 3 + start + close
        assert_eq!(auction.version(), 1 + LOTS_PER_AUCTION as u32 + 2);

        for &lot_id in lot_ids {
            let lot = service.get_lot(lot_id).unwrap();
            assert_eq!(lot.bids().len(), BIDDERS_PER_LOT);

            let mut sequences: Vec<i64> =
                lot.bids().iter().map(|b| b.sequence).collect();
            sequences.sort_unstable();
            sequences.dedup();
            assert_eq!(sequences.len(), BIDDERS_PER_LOT);
            assert!(sequences[0] >= 1);

            let valid = lot.valid_bids();
            assert!(!valid.is_empty());
            assert!(valid.windows(2).all(|p| p[0].amount < p[1].amount));
            assert!(valid
                .windows(2)
                .all(|p| p[0].sequence < p[1].sequence));
            assert_eq!(lot.highest_bid_amount(), dec!(1025));
            assert!(lot.highest_bid_amount() >= lot.starting_bid());

            // Reserve 1010 < 1025, so a winner exists
            let winner = service.get_winner(lot_id).unwrap();
            assert!(winner.is_some());
        }
    }

    // Event stream: per-auction order is start -> bids -> end
    let mut per_auction: std::collections::HashMap<Uuid, Vec<AuctionEventType>> =
        std::collections::HashMap::new();
    while let Ok(event) = events.try_recv() {
        per_auction
            .entry(event.auction_id)
            .or_default()
            .push(event.event_type);
    }
    assert_eq!(per_auction.len(), AUCTIONS);
    for types in per_auction.values() {
        assert_eq!(types.first(), Some(&AuctionEventType::AuctionCreated));
        assert_eq!(types.last(), Some(&AuctionEventType::AuctionEnded));
        let bids = types
            .iter()
            .filter(|t| **t == AuctionEventType::BidPlaced)
            .count();
        assert_eq!(bids, LOTS_PER_AUCTION * BIDDERS_PER_LOT);
    }
}
