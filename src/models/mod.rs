//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos: el vehículo canónico por VIN,
//! la unidad (asociación), la respuesta del API de VIN y las piezas ACES.

pub mod part;
pub mod unit;
pub mod vehicle;
pub mod vin_decode;

pub use part::Part;
pub use unit::{EnrichedUnit, Unit, UNIT_FIELD_NAMES};
pub use vehicle::Vehicle;
pub use vin_decode::{DecodeDialect, VinDecodeResponse, VinDecodeResult};
