//! Shared types for the auction platform
//!
//! Entity model, domain errors and wire types used by the bidding core and
//! by the (out-of-tree) HTTP edge:
//!
//! - **models** (`models`): Auction, Lot, Bid, Vehicle with invariants and
//!   the versioning contract
//! - **api types** (`auction_api`): command requests/results and the event
//!   stream payloads
//! - **errors** (`error`): domain-level error taxonomy

pub mod auction_api;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::DomainError;
pub use models::{Auction, AuctionState, Bid, Entity, Lot, Vehicle, VehicleKind, VehicleSpec};
pub use serde::{Deserialize, Serialize};
