use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::shipment::CargoRisk;

/// Per-category pricing multipliers applied as a surcharge on the
/// base-plus-depreciation cost. `None` cargo is always 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskMultipliers {
    pub hazardous: f64,
    pub perishable: f64,
    pub fragile: f64,
    pub machinery: f64,
}

impl Default for RiskMultipliers {
    fn default() -> Self {
        Self {
            hazardous: 1.35,
            perishable: 1.2,
            fragile: 1.15,
            machinery: 1.25,
        }
    }
}

impl RiskMultipliers {
    pub fn factor(&self, risk: CargoRisk) -> f64 {
        match risk {
            CargoRisk::None => 1.0,
            CargoRisk::Hazardous => self.hazardous,
            CargoRisk::Perishable => self.perishable,
            CargoRisk::Fragile => self.fragile,
            CargoRisk::Machinery => self.machinery,
        }
    }
}

/// Tenant-wide pricing configuration. Defaults are applied here, at load
/// time; persisted partial documents never reach the calculator unmerged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    pub insurance_rate: f64,
    pub profit_margin: f64,
    pub base_trip_price: f64,
    pub per_km_rate: f64,
    pub imponderables_rate: f64,
    pub risk_multipliers: RiskMultipliers,
    pub loading_fee: f64,
    pub unloading_fee: f64,
    pub stretch_wrap_fee: f64,
    pub stackable_fee: f64,
    pub express_multiplier: f64,
    pub round_trip_multiplier: f64,
    pub weekend_multiplier: f64,
    pub ftl_premium: f64,
    pub ltl_discount: f64,
    pub ptl_factor: f64,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            insurance_rate: 0.015,
            profit_margin: 1.4,
            base_trip_price: 1_000.0,
            per_km_rate: 10.0,
            imponderables_rate: 0.03,
            risk_multipliers: RiskMultipliers::default(),
            loading_fee: 350.0,
            unloading_fee: 350.0,
            stretch_wrap_fee: 180.0,
            stackable_fee: 120.0,
            express_multiplier: 1.25,
            round_trip_multiplier: 1.0,
            weekend_multiplier: 1.1,
            ftl_premium: 1.5,
            ltl_discount: 0.8,
            ptl_factor: 0.9,
        }
    }
}

impl PricingSettings {
    /// A margin below 1.0 would under-recover operating cost; rejected at
    /// the boundary along with negative rates.
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.profit_margin.is_finite() || self.profit_margin < 1.0 {
            return Err(AppError::InvalidInput(
                "profit_margin must be >= 1.0".to_string(),
            ));
        }

        for (field, value) in [
            ("insurance_rate", self.insurance_rate),
            ("base_trip_price", self.base_trip_price),
            ("per_km_rate", self.per_km_rate),
            ("imponderables_rate", self.imponderables_rate),
            ("loading_fee", self.loading_fee),
            ("unloading_fee", self.unloading_fee),
            ("stretch_wrap_fee", self.stretch_wrap_fee),
            ("stackable_fee", self.stackable_fee),
            ("hazardous multiplier", self.risk_multipliers.hazardous),
            ("perishable multiplier", self.risk_multipliers.perishable),
            ("fragile multiplier", self.risk_multipliers.fragile),
            ("machinery multiplier", self.risk_multipliers.machinery),
            ("express_multiplier", self.express_multiplier),
            ("round_trip_multiplier", self.round_trip_multiplier),
            ("weekend_multiplier", self.weekend_multiplier),
            ("ftl_premium", self.ftl_premium),
            ("ptl_factor", self.ptl_factor),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::InvalidInput(format!(
                    "{field} cannot be negative"
                )));
            }
        }

        if !self.ltl_discount.is_finite() || self.ltl_discount <= 0.0 || self.ltl_discount > 1.0 {
            return Err(AppError::InvalidInput(
                "ltl_discount must be in (0.0, 1.0]".to_string(),
            ));
        }
        if self.ftl_premium < 1.0 {
            return Err(AppError::InvalidInput(
                "ftl_premium must be >= 1.0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(PricingSettings::default().validate().is_ok());
    }

    #[test]
    fn margin_below_one_is_rejected() {
        let settings = PricingSettings {
            profit_margin: 0.9,
            ..PricingSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn negative_rate_is_rejected() {
        let settings = PricingSettings {
            insurance_rate: -0.01,
            ..PricingSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn ltl_discount_above_one_is_rejected() {
        let settings = PricingSettings {
            ltl_discount: 1.2,
            ..PricingSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
