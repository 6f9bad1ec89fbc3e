//! Daily check-in validation, upsert and trend computation.

mod manager;

pub use manager::{CheckinManager, WeeklySeries};
