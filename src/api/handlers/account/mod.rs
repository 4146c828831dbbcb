//! Account handlers and supporting modules.
//!
//! These orchestrate the credential lifecycle: they consult the store,
//! delegate cryptographic work to [`crate::auth`], mutate account state and
//! surface typed failures. Each request is one short-lived unit of work
//! against the pool; reset-token consumption is a single atomic statement
//! so concurrent completions cannot both spend one token.

pub(crate) mod login;
pub(crate) mod password;
mod principal;
pub(crate) mod profile;
pub(crate) mod register;
pub(crate) mod reset;
mod state;
mod storage;
pub(crate) mod types;
mod utils;

#[cfg(test)]
mod tests;

pub use state::{AccountConfig, AccountState};
