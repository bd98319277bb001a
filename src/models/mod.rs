pub mod delivery;
pub mod driver;
pub mod quote;
pub mod shipment;
pub mod vehicle;
