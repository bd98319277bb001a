use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Cargo-risk category; anything but `None` carries a pricing multiplier,
/// and hazardous/perishable/machinery cargo additionally restricts which
/// suspensions may carry it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum CargoRisk {
    #[default]
    None,
    Hazardous,
    Perishable,
    Fragile,
    Machinery,
}

impl CargoRisk {
    /// Sensitive cargo must ride on cushioned (pneumatic/hydraulic) suspension.
    pub fn is_sensitive(&self) -> bool {
        matches!(
            self,
            CargoRisk::Hazardous | CargoRisk::Perishable | CargoRisk::Machinery
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransportMode {
    Ftl,
    Ltl,
    Ptl,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum InsuranceElection {
    Carrier,
    #[default]
    Customer,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ServiceLevel {
    #[default]
    Standard,
    Express,
}

/// Immutable pricing input describing one shipment request. Distances and
/// toll figures come from an external routing provider as plain numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub weight_kg: f64,
    #[serde(default)]
    pub volume_m3: Option<f64>,
    #[serde(default)]
    pub declared_value: f64,
    #[serde(default)]
    pub cargo_risk: CargoRisk,
    pub mode: TransportMode,
    pub outbound_km: f64,
    #[serde(default)]
    pub return_km: Option<f64>,
    #[serde(default)]
    pub toll_outbound: f64,
    #[serde(default)]
    pub toll_return: f64,
    #[serde(default)]
    pub loading_support: bool,
    #[serde(default)]
    pub unloading_support: bool,
    #[serde(default)]
    pub stackable: bool,
    #[serde(default)]
    pub stretch_wrap: bool,
    #[serde(default)]
    pub insurance: InsuranceElection,
    #[serde(default)]
    pub service: ServiceLevel,
    #[serde(default)]
    pub round_trip: bool,
    #[serde(default)]
    pub weekend_pickup: bool,
    #[serde(default)]
    pub trip_days: Option<f64>,
    #[serde(default)]
    pub required_vehicle_type: Option<String>,
}

impl Shipment {
    /// Rejects negative or non-finite numeric fields before any pricing
    /// arithmetic runs. Zero weight, volume, and distance are valid inputs
    /// (quote-only requests with no confirmed route).
    pub fn validate(&self) -> Result<(), AppError> {
        check_non_negative("weight_kg", self.weight_kg)?;
        check_non_negative("declared_value", self.declared_value)?;
        check_non_negative("outbound_km", self.outbound_km)?;
        check_non_negative("toll_outbound", self.toll_outbound)?;
        check_non_negative("toll_return", self.toll_return)?;

        if let Some(volume) = self.volume_m3 {
            check_non_negative("volume_m3", volume)?;
        }
        if let Some(return_km) = self.return_km {
            check_non_negative("return_km", return_km)?;
        }
        if let Some(trip_days) = self.trip_days {
            check_non_negative("trip_days", trip_days)?;
        }

        Ok(())
    }
}

fn check_non_negative(field: &str, value: f64) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::InvalidInput(format!(
            "{field} must be a finite number"
        )));
    }
    if value < 0.0 {
        return Err(AppError::InvalidInput(format!(
            "{field} cannot be negative"
        )));
    }
    Ok(())
}
