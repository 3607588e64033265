//! Auction bidding core
//!
//! # Architecture
//!
//! The crate is the concurrent bidding and lifecycle engine of the car
//! auction platform. The HTTP edge, authorization and the external event
//! forwarder live outside this crate; the surface here is the
//! [`AuctionService`] command API and its broadcast event channel.
//!
//! ```text
//! auction-server/src/
//! ├── config.rs      # ServiceConfig (retry tuning, channel capacity)
//! ├── logging.rs     # tracing subscriber setup
//! ├── store/         # versioned in-memory stores (optimistic CAS)
//! ├── sequence.rs    # per-lot monotonic sequence source
//! ├── uow/           # unit-of-work transaction scope
//! └── service/       # command orchestrator (locks, retries, events)
//! ```
//!
//! # Command flow for a bid
//!
//! ```text
//! place_bid(req)
//!     ├─ 1. Validate request bounds
//!     ├─ 2. Fast-path pre-check (lot exists, auction active)
//!     ├─ 3. Acquire per-lot lock
//!     ├─ 4. Fresh scope: reload lot + auction
//!     ├─ 5. Advisory would-be-highest check
//!     ├─ 6. Draw sequence, append bid, record update
//!     ├─ 7. Commit (optimistic CAS; backoff + retry on conflict)
//!     ├─ 8. Release lock
//!     └─ 9. Broadcast BidPlaced, return structured outcome
//! ```

pub mod config;
pub mod logging;
pub mod sequence;
pub mod service;
pub mod store;
pub mod uow;

// Re-export public surface
pub use config::ServiceConfig;
pub use sequence::{InProcessSequence, SequenceSource};
pub use service::{AuctionService, ServiceError, ServiceResult};
pub use store::{AuctionStore, LotStore, StoreError, VehicleStore, VersionedStore};
pub use uow::UnitOfWork;
