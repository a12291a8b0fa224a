//! Clients - HTTP Clients for External APIs
//!
//! This module contains the clients for the VIN decode API and the
//! asynchronous catalog query service.

pub mod nhtsa_client;
pub mod query_client;

#[cfg(any(test, feature = "test-util"))]
pub mod fakes;

pub use nhtsa_client::{NhtsaClient, VinDecoder};
pub use query_client::{
    DisabledQueryService, HttpQueryService, QueryContext, QueryExecutionClient, QueryService,
    QueryState, QueryStatus, RawRow, ResultRow,
};
