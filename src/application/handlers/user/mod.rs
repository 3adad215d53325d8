//! User handlers.
//!
//! Profile provisioning for signed-in identities and the direct-write
//! fallback used during signup.

mod provisioner;

pub use provisioner::{FallbackReport, ProfileProvisioner, ProfileProvisioning};
