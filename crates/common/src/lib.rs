//! Shared value types used across the field viewer crates.

pub mod types;

pub use types::{Color, FieldPoint, GroupId, Sample};
