//! Raw-table transformations.
//!
//! - [`clean`]: turn a loaded sheet into a time-indexed table of numeric columns

pub mod clean;

pub use clean::{clean, CleanOptions, CleanedTable, PeriodFormat, DEFAULT_SENTINELS};
