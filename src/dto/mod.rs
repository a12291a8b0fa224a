//! DTOs de la API HTTP

pub mod api_response;
pub mod unit_dto;

pub use api_response::{ApiResponse, ItemsResponse};
