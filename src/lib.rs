//! Moodline - daily mood/stress/sleep check-in web service.
//!
//! Users register, log in with a signed session cookie, record one
//! check-in per calendar day, and view a 7-day trend plus history.
//! The first registered account is the admin.

pub mod account;
pub mod api;
pub mod checkin;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod flash;
pub mod server;
pub mod session;
