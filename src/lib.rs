//! # Anagrafe (Account Registry & Authentication)
//!
//! `anagrafe` is an HTTP account service. It handles registration, login,
//! password reset over emailed tokens, and profile management.
//!
//! ## Sessions
//!
//! Authentication issues a signed bearer token (`HS256` JWT) carrying the
//! account id. Tokens are stateless: the server keeps no session table and
//! logout is a client-side discard. A token stays valid until it expires,
//! default seven days after issue.
//!
//! ## Password Reset
//!
//! Reset tokens are random 256-bit values sent by email; only a `SHA-256`
//! digest is stored. A token is single use, expires after ten minutes, and
//! is consumed atomically so concurrent resets cannot both succeed.
//!
//! ## Error Surface
//!
//! Login failures return one message for both unknown email and wrong
//! password, so the API does not reveal which accounts exist. Reset token
//! failures are equally opaque: invalid and expired tokens are
//! indistinguishable to the caller.

pub mod api;
pub mod auth;
pub mod cli;
