//! Controllers
//!
//! Capa entre las rutas HTTP y los servicios: validación y forma de respuesta.

pub mod unit_controller;

pub use unit_controller::UnitController;
