//! Unit Service
//!
//! Asociaciones cliente ↔ VIN con enriquecimiento de vehículo: decodificación
//! de VIN, resolución de catálogo y almacenamiento deduplicado por VIN.

pub mod cache;
pub mod clients;
pub mod config;
pub mod controllers;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_app_router;
pub use state::AppState;
