//! Configuración del proyecto
//!
//! Este módulo contiene las variables de entorno y la configuración de los
//! servicios externos.

pub mod environment;
pub mod query;

pub use environment::*;
pub use query::{NhtsaConfig, QueryServiceConfig};
