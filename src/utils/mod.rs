//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, construcción
//! de SQL contra el catálogo y generación de IDs.

pub mod errors;
pub mod id_generator;
pub mod sql;
