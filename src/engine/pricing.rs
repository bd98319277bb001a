use crate::engine::matching::match_vehicles;
use crate::error::AppError;
use crate::models::quote::{CostBreakdown, LineItem, LineItemKind};
use crate::models::shipment::{InsuranceElection, ServiceLevel, Shipment, TransportMode};
use crate::models::vehicle::VehicleClass;
use crate::settings::PricingSettings;

pub const VAT_RATE: f64 = 0.16;

/// Prices a shipment on the given vehicle, or on the cheapest suitable
/// vehicle from the catalog when none is supplied. Pure function of its
/// inputs; persisting the breakdown is the caller's concern.
///
/// The line-item ledger is arranged so that the items always sum to the
/// subtotal: every multiplicative step (risk, service level, mode, margin)
/// is emitted as its own delta item instead of silently scaling earlier
/// lines. Tolls and carrier insurance enter after the margin as
/// pass-through items and are never marked up.
pub fn price_shipment(
    shipment: &Shipment,
    vehicle: Option<&VehicleClass>,
    catalog: &[VehicleClass],
    settings: &PricingSettings,
) -> Result<CostBreakdown, AppError> {
    shipment.validate()?;
    settings.validate()?;

    let selected: VehicleClass;
    let vehicle = match vehicle {
        Some(vehicle) => vehicle,
        None => {
            selected = match_vehicles(shipment, catalog)
                .into_iter()
                .next()
                .ok_or(AppError::NoSuitableVehicle)?;
            &selected
        }
    };

    let outbound_km = shipment.outbound_km;
    let return_km = shipment
        .round_trip
        .then(|| shipment.return_km.unwrap_or(outbound_km));

    let mut items: Vec<LineItem> = Vec::new();

    // Steps 1-2: per-leg operating cost and depreciation form the core
    // every multiplier applies to.
    let mut core = 0.0;
    let push = |items: &mut Vec<LineItem>, kind, label: &str, amount: f64| {
        if amount != 0.0 {
            items.push(LineItem::new(kind, label, amount));
        }
        amount
    };

    core += push(
        &mut items,
        LineItemKind::Base,
        "Base trip price",
        settings.base_trip_price,
    );

    let km_rate = if vehicle.cost_per_km > 0.0 {
        vehicle.cost_per_km
    } else {
        settings.per_km_rate
    };
    core += push(
        &mut items,
        LineItemKind::Base,
        "Outbound leg operating cost",
        km_rate * outbound_km,
    );
    if let Some(return_km) = return_km {
        core += push(
            &mut items,
            LineItemKind::Base,
            "Return leg operating cost",
            km_rate * return_km,
        );
    }

    core += push(
        &mut items,
        LineItemKind::Base,
        "Outbound leg depreciation",
        leg_depreciation(vehicle, outbound_km),
    );
    if let Some(return_km) = return_km {
        core += push(
            &mut items,
            LineItemKind::Base,
            "Return leg depreciation",
            leg_depreciation(vehicle, return_km),
        );
    }
    core += push(
        &mut items,
        LineItemKind::Base,
        "Trip depreciation",
        day_depreciation(vehicle, shipment.trip_days),
    );

    let operational_cost = core;
    let total_km = outbound_km + return_km.unwrap_or(0.0);
    // With no confirmed route the operational figure is the base cost alone.
    let operational_cost_per_km = if total_km > 0.0 {
        operational_cost / total_km
    } else {
        operational_cost
    };

    // Step 3: risk surcharge, visible to the customer rather than folded
    // into the base lines.
    let risk_factor = settings.risk_multipliers.factor(shipment.cargo_risk);
    core += push(
        &mut items,
        LineItemKind::Surcharge,
        "Cargo risk surcharge",
        core * (risk_factor - 1.0),
    );

    // Step 5: service multipliers in fixed order: express, round trip,
    // weekend.
    if shipment.service == ServiceLevel::Express {
        core += push(
            &mut items,
            LineItemKind::Surcharge,
            "Express service",
            core * (settings.express_multiplier - 1.0),
        );
    }
    if shipment.round_trip {
        core += push(
            &mut items,
            LineItemKind::Surcharge,
            "Round trip service",
            core * (settings.round_trip_multiplier - 1.0),
        );
    }
    if shipment.weekend_pickup {
        core += push(
            &mut items,
            LineItemKind::Surcharge,
            "Weekend pickup",
            core * (settings.weekend_multiplier - 1.0),
        );
    }

    // Step 6: mode adjustment, once, after the service multipliers. The
    // LTL delta comes out negative (shared-capacity discount).
    let (mode_factor, mode_label) = match shipment.mode {
        TransportMode::Ftl => (settings.ftl_premium, "Full-truckload premium"),
        TransportMode::Ltl => (settings.ltl_discount, "Shared-capacity discount"),
        TransportMode::Ptl => (settings.ptl_factor, "Partial-load adjustment"),
    };
    core += push(
        &mut items,
        LineItemKind::Surcharge,
        mode_label,
        core * (mode_factor - 1.0),
    );

    // Step 4: flat maneuver and packaging fees; margin-bearing but never
    // scaled by distance, weight, or the multipliers above.
    let mut fees = 0.0;
    if shipment.loading_support {
        fees += push(
            &mut items,
            LineItemKind::Fee,
            "Loading maneuver",
            settings.loading_fee,
        );
    }
    if shipment.unloading_support {
        fees += push(
            &mut items,
            LineItemKind::Fee,
            "Unloading maneuver",
            settings.unloading_fee,
        );
    }
    if shipment.stretch_wrap {
        fees += push(
            &mut items,
            LineItemKind::Fee,
            "Stretch wrap",
            settings.stretch_wrap_fee,
        );
    }
    if shipment.stackable {
        fees += push(
            &mut items,
            LineItemKind::Fee,
            "Stackable packaging",
            settings.stackable_fee,
        );
    }

    // Step 9: contingency buffer, before margin.
    let imponderables = push(
        &mut items,
        LineItemKind::Imponderables,
        "Imponderables",
        (core + fees) * settings.imponderables_rate,
    );

    // Step 10: margin on everything except pass-through items.
    let utility = push(
        &mut items,
        LineItemKind::Surcharge,
        "Profit margin",
        (core + fees + imponderables) * (settings.profit_margin - 1.0),
    );

    // Steps 7-8: reimbursements, excluded from markup.
    push(
        &mut items,
        LineItemKind::PassThrough,
        "Outbound tolls",
        shipment.toll_outbound,
    );
    if shipment.round_trip {
        push(
            &mut items,
            LineItemKind::PassThrough,
            "Return tolls",
            shipment.toll_return,
        );
    }
    if shipment.insurance == InsuranceElection::Carrier {
        push(
            &mut items,
            LineItemKind::PassThrough,
            "Carrier insurance",
            shipment.declared_value * settings.insurance_rate,
        );
    }

    // Steps 11-12: VAT on the full subtotal, pass-through included; cents
    // rounding happens here and nowhere earlier.
    let subtotal: f64 = items.iter().map(|item| item.amount).sum();
    let tax = subtotal * VAT_RATE;
    let total = round2(subtotal + tax);
    let utility_percent = if total > 0.0 {
        utility / total * 100.0
    } else {
        0.0
    };

    Ok(CostBreakdown {
        vehicle: vehicle.name.clone(),
        items,
        subtotal: round2(subtotal),
        tax: round2(tax),
        total,
        utility: round2(utility),
        utility_percent: round2(utility_percent),
        operational_cost_per_km: round2(operational_cost_per_km),
    })
}

/// Allocated share of the vehicle's market value for one leg, for
/// vehicles with a distance-based useful life. Zero life values never
/// reach this point (rejected at catalog insertion).
fn leg_depreciation(vehicle: &VehicleClass, leg_km: f64) -> f64 {
    match vehicle.useful_life_km {
        Some(life_km) => vehicle.market_value / life_km * leg_km,
        None => 0.0,
    }
}

/// Day-based depreciation covers the whole trip and is charged once,
/// however many legs it has. Distance life takes precedence; day life
/// applies only when the shipment carries an estimated duration.
fn day_depreciation(vehicle: &VehicleClass, trip_days: Option<f64>) -> f64 {
    if vehicle.useful_life_km.is_some() {
        return 0.0;
    }
    match (vehicle.useful_life_days, trip_days) {
        (Some(life_days), Some(days)) => vehicle.market_value / life_days * days,
        _ => 0.0,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
