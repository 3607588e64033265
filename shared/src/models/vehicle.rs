//! Vehicle entity - immutable once created
//!
//! Variant-specific attributes are modelled as a tagged enum rather than an
//! inheritance tree; construction dispatches on the variant tag and coerces
//! loosely-typed request attributes, falling back to defaults when a value is
//! missing or the wrong shape.

use crate::error::{DomainError, DomainResult};
use crate::models::Entity;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Vehicle variant tag as accepted at the command boundary
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleKind {
    Sedan,
    Suv,
    Truck,
}

impl std::fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VehicleKind::Sedan => write!(f, "SEDAN"),
            VehicleKind::Suv => write!(f, "SUV"),
            VehicleKind::Truck => write!(f, "TRUCK"),
        }
    }
}

/// Variant-specific attributes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleSpec {
    Sedan {
        doors: u8,
        sunroof: bool,
    },
    Suv {
        seating: u8,
        four_wheel_drive: bool,
        cargo_liters: u32,
    },
    Truck {
        load_capacity_kg: u32,
        bed_length_m: Decimal,
        four_wheel_drive: bool,
    },
}

// Coercion defaults
const DEFAULT_DOORS: u8 = 4;
const DEFAULT_SEATING: u8 = 5;
const DEFAULT_CARGO_LITERS: u32 = 500;
const DEFAULT_LOAD_CAPACITY_KG: u32 = 1000;
/// 1.8
const DEFAULT_BED_LENGTH_M: Decimal = Decimal::from_parts(18, 0, 0, false, 1);

fn attr_u64(attrs: &Map<String, Value>, key: &str, default: u64) -> u64 {
    attrs.get(key).and_then(Value::as_u64).unwrap_or(default)
}

fn attr_bool(attrs: &Map<String, Value>, key: &str, default: bool) -> bool {
    attrs.get(key).and_then(Value::as_bool).unwrap_or(default)
}

fn attr_decimal(attrs: &Map<String, Value>, key: &str, default: Decimal) -> Decimal {
    attrs
        .get(key)
        .and_then(|v| {
            v.as_str()
                .and_then(|s| s.parse().ok())
                .or_else(|| v.as_f64().and_then(Decimal::from_f64_retain))
        })
        .unwrap_or(default)
}

impl VehicleSpec {
    /// Resolve a spec from the variant tag and loosely-typed extra attributes
    ///
    /// Coercion failures fall back to per-field defaults rather than failing
    /// the whole request.
    pub fn resolve(kind: VehicleKind, attrs: &Map<String, Value>) -> Self {
        match kind {
            VehicleKind::Sedan => VehicleSpec::Sedan {
                doors: attr_u64(attrs, "doors", u64::from(DEFAULT_DOORS)) as u8,
                sunroof: attr_bool(attrs, "sunroof", false),
            },
            VehicleKind::Suv => VehicleSpec::Suv {
                seating: attr_u64(attrs, "seating", u64::from(DEFAULT_SEATING)) as u8,
                four_wheel_drive: attr_bool(attrs, "four_wheel_drive", false),
                cargo_liters: attr_u64(attrs, "cargo_liters", u64::from(DEFAULT_CARGO_LITERS))
                    as u32,
            },
            VehicleKind::Truck => VehicleSpec::Truck {
                load_capacity_kg: attr_u64(
                    attrs,
                    "load_capacity_kg",
                    u64::from(DEFAULT_LOAD_CAPACITY_KG),
                ) as u32,
                bed_length_m: attr_decimal(attrs, "bed_length_m", DEFAULT_BED_LENGTH_M),
                four_wheel_drive: attr_bool(attrs, "four_wheel_drive", false),
            },
        }
    }

    /// Variant tag of this spec
    pub fn kind(&self) -> VehicleKind {
        match self {
            VehicleSpec::Sedan { .. } => VehicleKind::Sedan,
            VehicleSpec::Suv { .. } => VehicleKind::Suv,
            VehicleSpec::Truck { .. } => VehicleKind::Truck,
        }
    }
}

/// Vehicle entity
///
/// Immutable once created: `updated_at` stays `None` and `version` stays 1
/// for the entity's whole lifetime. The store treats vehicles as insert-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vehicle {
    id: Uuid,
    make: String,
    model: String,
    year: i32,
    vin: String,
    mileage: Decimal,
    color: String,
    spec: VehicleSpec,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    version: u32,
}

impl Vehicle {
    /// Construct a vehicle, enforcing the entity-level invariants
    ///
    /// Command-boundary bounds (year range, string lengths) are checked by
    /// the service validator; this constructor only guards what must hold for
    /// any vehicle snapshot: a 17-character VIN, non-negative mileage and
    /// non-empty make/model.
    pub fn new(
        make: impl Into<String>,
        model: impl Into<String>,
        year: i32,
        vin: impl Into<String>,
        mileage: Decimal,
        color: impl Into<String>,
        spec: VehicleSpec,
    ) -> DomainResult<Self> {
        let make = make.into();
        let model = model.into();
        let vin = vin.into();

        if make.trim().is_empty() {
            return Err(DomainError::invalid("make must not be empty"));
        }
        if model.trim().is_empty() {
            return Err(DomainError::invalid("model must not be empty"));
        }
        if vin.chars().count() != 17 {
            return Err(DomainError::invalid(format!(
                "vin must be exactly 17 characters, got {}",
                vin.chars().count()
            )));
        }
        if mileage < Decimal::ZERO {
            return Err(DomainError::invalid(format!(
                "mileage must be non-negative, got {mileage}"
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            make,
            model,
            year,
            vin,
            mileage,
            color: color.into(),
            spec,
            created_at: Utc::now(),
            updated_at: None,
            version: 1,
        })
    }

    pub fn make(&self) -> &str {
        &self.make
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn vin(&self) -> &str {
        &self.vin
    }

    pub fn mileage(&self) -> Decimal {
        self.mileage
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn spec(&self) -> &VehicleSpec {
        &self.spec
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Vehicle {
    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn kind() -> &'static str {
        "Vehicle"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn attrs(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_spec_resolve_sedan() {
        let spec = VehicleSpec::resolve(
            VehicleKind::Sedan,
            &attrs(&[("doors", Value::from(2)), ("sunroof", Value::from(true))]),
        );
        assert_eq!(
            spec,
            VehicleSpec::Sedan {
                doors: 2,
                sunroof: true
            }
        );
    }

    #[test]
    fn test_spec_resolve_falls_back_on_bad_types() {
        // "doors" is a string, "sunroof" missing entirely
        let spec = VehicleSpec::resolve(
            VehicleKind::Sedan,
            &attrs(&[("doors", Value::from("four"))]),
        );
        assert_eq!(
            spec,
            VehicleSpec::Sedan {
                doors: 4,
                sunroof: false
            }
        );
    }

    #[test]
    fn test_spec_resolve_truck_defaults() {
        let spec = VehicleSpec::resolve(VehicleKind::Truck, &Map::new());
        assert_eq!(
            spec,
            VehicleSpec::Truck {
                load_capacity_kg: 1000,
                bed_length_m: dec!(1.8),
                four_wheel_drive: false
            }
        );
    }

    #[test]
    fn test_new_vehicle_starts_at_version_one() {
        let v = Vehicle::new(
            "BMW",
            "i4 M50",
            2023,
            "WBA12345678901234",
            dec!(28000),
            "Grey",
            VehicleSpec::Sedan {
                doors: 4,
                sunroof: true,
            },
        )
        .unwrap();
        assert_eq!(v.version(), 1);
        assert!(v.updated_at.is_none());
        assert_eq!(v.spec().kind(), VehicleKind::Sedan);
    }

    #[test]
    fn test_vin_length_enforced() {
        let err = Vehicle::new(
            "BMW",
            "i4",
            2023,
            "TOOSHORT",
            dec!(0),
            "Grey",
            VehicleSpec::Sedan {
                doors: 4,
                sunroof: false,
            },
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn test_negative_mileage_rejected() {
        let err = Vehicle::new(
            "BMW",
            "i4",
            2023,
            "WBA12345678901234",
            dec!(-1),
            "Grey",
            VehicleSpec::Sedan {
                doors: 4,
                sunroof: false,
            },
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }
}
