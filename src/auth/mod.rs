//! Credential core: password hashing, session tokens and reset tokens.

pub mod error;
pub mod password;
pub mod reset;
pub mod token;

pub use error::AuthError;
pub use token::{TokenError, TokenSigner};
