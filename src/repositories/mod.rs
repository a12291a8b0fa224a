//! Repositorios sobre el almacén clave-valor

pub mod unit_repository;
pub mod vehicle_repository;

pub use unit_repository::UnitRepository;
pub use vehicle_repository::{VehicleRepository, BATCH_SIZE};
