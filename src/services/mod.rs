//! Services module
//!
//! Este módulo contiene la lógica de negocio: normalización de VIN,
//! resolución de catálogo, combinación unidad/vehículo y las operaciones
//! de unidades y piezas.

pub mod field_mapper;
pub mod merge_engine;
pub mod parts_lookup_service;
pub mod unit_service;
pub mod vehicle_resolver;

pub use parts_lookup_service::PartsLookupService;
pub use unit_service::{UnitChanges, UnitService};
pub use vehicle_resolver::VehicleResolver;
