//! Command-boundary validation
//!
//! Bounds enforced before any lock is taken or sequence drawn. Entity
//! constructors re-check the invariants that must hold for any snapshot
//! (positive amounts, 17-char VIN); the ranges here are the request-level
//! contract the integration tests pin down.

use rust_decimal::Decimal;
use shared::auction_api::{
    CreateAuctionRequest, CreateLotRequest, CreateVehicleRequest, PlaceBidRequest,
};
use shared::error::{DomainError, DomainResult};

const TITLE_MIN: usize = 3;
const TITLE_MAX: usize = 200;
const DESCRIPTION_MAX: usize = 2000;
const NAME_MIN: usize = 1;
const NAME_MAX: usize = 100;
const YEAR_MIN: i32 = 1900;
const YEAR_MAX: i32 = 2100;
const VIN_LEN: usize = 17;
const COLOR_MIN: usize = 1;
const COLOR_MAX: usize = 50;
const PARTNER_ID_MIN: usize = 1;
const PARTNER_ID_MAX: usize = 100;

/// 0.01
const MONEY_MIN: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
/// 1,000,000,000
const MONEY_MAX: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);
/// 10,000,000
const MILEAGE_MAX: Decimal = Decimal::from_parts(10_000_000, 0, 0, false, 0);

fn check_len(value: &str, field: &str, min: usize, max: usize) -> DomainResult<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(DomainError::invalid(format!(
            "{field} must be {min}-{max} characters, got {len}"
        )));
    }
    Ok(())
}

fn check_money(amount: Decimal, field: &str) -> DomainResult<()> {
    if amount < MONEY_MIN || amount > MONEY_MAX {
        return Err(DomainError::invalid(format!(
            "{field} must be between {MONEY_MIN} and {MONEY_MAX}, got {amount}"
        )));
    }
    Ok(())
}

pub fn create_auction(req: &CreateAuctionRequest) -> DomainResult<()> {
    check_len(&req.title, "title", TITLE_MIN, TITLE_MAX)?;
    check_len(&req.description, "description", 0, DESCRIPTION_MAX)?;
    Ok(())
}

pub fn create_vehicle(req: &CreateVehicleRequest) -> DomainResult<()> {
    check_len(&req.make, "make", NAME_MIN, NAME_MAX)?;
    check_len(&req.model, "model", NAME_MIN, NAME_MAX)?;
    if req.year < YEAR_MIN || req.year > YEAR_MAX {
        return Err(DomainError::invalid(format!(
            "year must be between {YEAR_MIN} and {YEAR_MAX}, got {}",
            req.year
        )));
    }
    check_len(&req.vin, "vin", VIN_LEN, VIN_LEN)?;
    if req.mileage < Decimal::ZERO || req.mileage > MILEAGE_MAX {
        return Err(DomainError::invalid(format!(
            "mileage must be between 0 and {MILEAGE_MAX}, got {}",
            req.mileage
        )));
    }
    check_len(&req.color, "color", COLOR_MIN, COLOR_MAX)?;
    Ok(())
}

pub fn create_lot(req: &CreateLotRequest) -> DomainResult<()> {
    check_money(req.starting_bid, "starting_bid")?;
    if let Some(reserve) = req.reserve_price {
        check_money(reserve, "reserve_price")?;
    }
    Ok(())
}

pub fn place_bid(req: &PlaceBidRequest) -> DomainResult<()> {
    check_len(
        &req.bidder_id,
        "bidder_id",
        PARTNER_ID_MIN,
        PARTNER_ID_MAX,
    )?;
    check_money(req.amount, "amount")?;
    Ok(())
}
