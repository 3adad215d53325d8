//! Authentication adapters.
//!
//! Implementations of the `AuthProvider` port:
//!
//! - `mock` - In-memory provider for tests and local development
//! - `gotrue` - Production GoTrue (Supabase Auth) REST client

mod gotrue;
mod mock;

pub use gotrue::{GoTrueAuthProvider, GoTrueConfig};
pub use mock::MockAuthProvider;
