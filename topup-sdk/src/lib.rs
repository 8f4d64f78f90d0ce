//! Wire-level objects for the top-up order service.
//!
//! This crate carries only the request/response shapes and the error-code
//! vocabulary of the HTTP API. It holds no business logic, so both the
//! server and any Rust client can depend on it.

pub mod objects;
