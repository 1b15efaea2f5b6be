//! Common types used across the application.

pub mod days;
pub mod id;
pub mod pagination;

pub use days::{HALF_DAY, from_half_days, is_half_day_multiple, to_half_days};
pub use id::*;
pub use pagination::{MAX_PER_PAGE, PageMeta, PageRequest, PageResponse, PageWindow};

#[cfg(test)]
#[path = "id_tests.rs"]
mod id_tests;
