//! Domain layer: entities, value objects and business rules.
//!
//! No I/O happens here; stores and auth are reached through `crate::ports`.

pub mod foundation;
pub mod referral;
pub mod user;
