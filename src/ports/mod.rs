//! Ports - interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Store Ports
//!
//! - `ProfileStore` - user profiles and the atomic creation procedures
//! - `ReferralCodeStore` - code generation, persistence and public validation
//! - `ReferralRepository` - referrer → referred edges
//! - `RewardsStore` - reward ledgers and the tier catalog
//!
//! ## Auth Port
//!
//! - `AuthProvider` - identity creation and sessions

mod auth_provider;
mod profile_store;
mod referral_code_store;
mod referral_repository;
mod rewards_store;

pub use auth_provider::{AuthProvider, AuthSession, SignUpMetadata, SignUpRequest};
pub use profile_store::{ProcedureOutcome, ProfileStore};
pub use referral_code_store::{PublicCodeValidation, ReferralCodeStore};
pub use referral_repository::ReferralRepository;
pub use rewards_store::RewardsStore;
