//! Dream Journal - referral, rewards and profile provisioning core
//!
//! Signup orchestration on top of a GoTrue-style auth service, journaling
//! profiles provisioned on first access, referral codes and attribution,
//! and a points ledger with tiers.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
