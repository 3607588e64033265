use crate::store::StoreError;
use shared::error::DomainError;
use thiserror::Error;
use uuid::Uuid;

/// Service errors
///
/// Version conflicts are handled inside the retry loop and never surface
/// directly; after the attempt budget is spent they become
/// `RetriesExhausted`. Not-found, state violations and invalid input
/// surface immediately without retry.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Auction not found: {0}")]
    AuctionNotFound(Uuid),

    #[error("Lot not found: {0}")]
    LotNotFound(Uuid),

    #[error("Vehicle not found: {0}")]
    VehicleNotFound(Uuid),

    #[error("Auction {0} is not accepting bids")]
    AuctionNotAcceptingBids(Uuid),

    #[error("Commit failed after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("Operation cancelled by shutdown")]
    Cancelled,
}

pub type ServiceResult<T> = Result<T, ServiceError>;
