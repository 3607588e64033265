//! Wire types for the auction command surface and event stream

pub mod event;
pub mod types;

pub use event::{AuctionEvent, AuctionEventType, EventPayload};
pub use types::{
    BidOutcome, CreateAuctionRequest, CreateLotRequest, CreateVehicleRequest, PlaceBidRequest,
    VehicleFilter,
};
