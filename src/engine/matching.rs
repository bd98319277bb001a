use crate::models::shipment::{Shipment, TransportMode};
use crate::models::vehicle::VehicleClass;

/// Above this weight an FTL shipment needs a heavy vehicle; below it an
/// LTL shipment is restricted to van-class vehicles.
pub const HEAVY_CARGO_KG: f64 = 7_000.0;

/// Returns every catalog vehicle able to carry the shipment, sorted
/// cheapest-capacity-first. An empty result means "quote unavailable",
/// not an error.
pub fn match_vehicles(shipment: &Shipment, catalog: &[VehicleClass]) -> Vec<VehicleClass> {
    let mut suitable: Vec<VehicleClass> = catalog
        .iter()
        .filter(|vehicle| is_suitable(shipment, vehicle))
        .cloned()
        .collect();

    suitable.sort_by(|a, b| {
        a.capacity_kg
            .total_cmp(&b.capacity_kg)
            .then_with(|| a.name.cmp(&b.name))
    });

    suitable
}

fn is_suitable(shipment: &Shipment, vehicle: &VehicleClass) -> bool {
    if vehicle.capacity_kg < shipment.weight_kg {
        return false;
    }

    if let Some(volume) = shipment.volume_m3 {
        if vehicle.volume_m3 < volume {
            return false;
        }
    }

    if let Some(required) = &shipment.required_vehicle_type {
        if &vehicle.name != required {
            return false;
        }
    }

    match shipment.mode {
        TransportMode::Ftl if shipment.weight_kg >= HEAVY_CARGO_KG => {
            if vehicle.capacity_kg < HEAVY_CARGO_KG {
                return false;
            }
        }
        TransportMode::Ltl if shipment.weight_kg < HEAVY_CARGO_KG => {
            if vehicle.capacity_kg >= HEAVY_CARGO_KG {
                return false;
            }
        }
        _ => {}
    }

    if shipment.cargo_risk.is_sensitive() && !vehicle.suspension.is_cushioned() {
        return false;
    }

    if vehicle.restricted_cargo.contains(&shipment.cargo_risk) {
        return false;
    }

    true
}
