//! Entity model for the auction platform
//!
//! All entities share the same persistence prelude: a stable `Uuid` id,
//! `created_at` / `updated_at` instants and a `version` counter starting at 1.
//! Every mutating operation that publishes state bumps the version and stamps
//! `updated_at`; reads never touch either. The version is what the store's
//! optimistic compare-and-swap checks against.

mod auction;
mod bid;
mod lot;
mod vehicle;

pub use auction::{Auction, AuctionState};
pub use bid::Bid;
pub use lot::Lot;
pub use vehicle::{Vehicle, VehicleKind, VehicleSpec};

use uuid::Uuid;

/// Persistence contract shared by all stored entities
///
/// The generic versioned store is written against this trait; the three
/// concrete instantiations are Auction, Lot and Vehicle.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Stable unique identifier, generated at construction
    fn id(&self) -> Uuid;

    /// Current version (1 at construction, +1 per publishing mutation)
    fn version(&self) -> u32;

    /// Entity kind label used in store errors and logs
    fn kind() -> &'static str;
}
