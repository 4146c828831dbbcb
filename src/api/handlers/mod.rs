pub(crate) mod account;
pub(crate) mod health;

pub use account::{AccountConfig, AccountState};
