//! Account registration, login and admin operations.

mod manager;

pub use manager::AccountManager;
