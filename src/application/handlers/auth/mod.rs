//! Auth handlers: signup orchestration and session pass-through.

mod session;
mod sign_up;

pub use session::{CurrentUserHandler, SignInCommand, SignInHandler, SignOutHandler};
pub use sign_up::{
    ProfileCreation, ProfilePreferences, SignUpCommand, SignUpError, SignUpHandler, SignUpResult,
};
