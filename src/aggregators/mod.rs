//! Grouped aggregation from per-site daily readings down to one row per
//! county and year.
//!
//! Each year's readings first collapse to one value per county-day
//! ([`daily`]). All years are then concatenated and reduced to yearly
//! statistics ([`yearly`]), and finally summarised across counties
//! ([`summary`]).

pub mod daily;
pub mod summary;
pub mod types;
pub mod utility;
pub mod yearly;
