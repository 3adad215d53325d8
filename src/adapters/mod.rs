//! Adapters - Implementations of port interfaces.
//!
//! - `auth` - GoTrue-compatible identity provider and a test double
//! - `http` - axum REST surface
//! - `memory` - in-process store implementing every store port
//! - `postgres` - sqlx-backed stores and stored procedures

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
