use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::shipment::CargoRisk;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Suspension {
    Pneumatic,
    Hydraulic,
    Rigid,
    LeafSpring,
}

impl Suspension {
    /// Pneumatic and hydraulic suspensions qualify for sensitive cargo.
    pub fn is_cushioned(&self) -> bool {
        matches!(self, Suspension::Pneumatic | Suspension::Hydraulic)
    }
}

/// Immutable catalog entry. Capacity drives matching; market value and
/// useful life drive per-trip depreciation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleClass {
    pub name: String,
    pub capacity_kg: f64,
    pub volume_m3: f64,
    pub cost_per_km: f64,
    pub market_value: f64,
    #[serde(default)]
    pub useful_life_km: Option<f64>,
    #[serde(default)]
    pub useful_life_days: Option<f64>,
    pub suspension: Suspension,
    #[serde(default)]
    pub restricted_cargo: Vec<CargoRisk>,
}

impl VehicleClass {
    /// Catalog entries with a zero useful life would divide depreciation by
    /// zero, so they are rejected here rather than at pricing time.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "vehicle name cannot be empty".to_string(),
            ));
        }

        for (field, value) in [
            ("capacity_kg", self.capacity_kg),
            ("volume_m3", self.volume_m3),
            ("cost_per_km", self.cost_per_km),
            ("market_value", self.market_value),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::InvalidInput(format!(
                    "{field} must be a non-negative finite number"
                )));
            }
        }

        if let Some(life_km) = self.useful_life_km {
            if !life_km.is_finite() || life_km <= 0.0 {
                return Err(AppError::InvalidInput(
                    "useful_life_km must be positive".to_string(),
                ));
            }
        }
        if let Some(life_days) = self.useful_life_days {
            if !life_days.is_finite() || life_days <= 0.0 {
                return Err(AppError::InvalidInput(
                    "useful_life_days must be positive".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Vehicle classes seeded at startup; `POST /vehicles` extends the catalog.
pub fn default_catalog() -> Vec<VehicleClass> {
    vec![
        VehicleClass {
            name: "Sprinter Van".to_string(),
            capacity_kg: 1_500.0,
            volume_m3: 14.0,
            cost_per_km: 6.0,
            market_value: 650_000.0,
            useful_life_km: Some(500_000.0),
            useful_life_days: None,
            suspension: Suspension::Hydraulic,
            restricted_cargo: vec![CargoRisk::Machinery],
        },
        VehicleClass {
            name: "Box Truck 3.5t".to_string(),
            capacity_kg: 3_500.0,
            volume_m3: 32.0,
            cost_per_km: 9.0,
            market_value: 1_100_000.0,
            useful_life_km: Some(700_000.0),
            useful_life_days: None,
            suspension: Suspension::LeafSpring,
            restricted_cargo: vec![],
        },
        VehicleClass {
            name: "Rabon 8t".to_string(),
            capacity_kg: 8_000.0,
            volume_m3: 45.0,
            cost_per_km: 12.0,
            market_value: 1_900_000.0,
            useful_life_km: Some(900_000.0),
            useful_life_days: None,
            suspension: Suspension::Pneumatic,
            restricted_cargo: vec![],
        },
        VehicleClass {
            name: "Torton 17t".to_string(),
            capacity_kg: 17_000.0,
            volume_m3: 60.0,
            cost_per_km: 16.0,
            market_value: 2_800_000.0,
            useful_life_km: Some(1_000_000.0),
            useful_life_days: None,
            suspension: Suspension::Pneumatic,
            restricted_cargo: vec![],
        },
        VehicleClass {
            name: "Trailer 30t".to_string(),
            capacity_kg: 30_000.0,
            volume_m3: 90.0,
            cost_per_km: 22.0,
            market_value: 4_200_000.0,
            useful_life_km: Some(1_200_000.0),
            useful_life_days: None,
            suspension: Suspension::Pneumatic,
            restricted_cargo: vec![CargoRisk::Perishable],
        },
    ]
}
