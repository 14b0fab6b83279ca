//! Viewer kernel: the owned session state stepped by a fixed-rate tick.
//!
//! # Invariants
//! - Within one tick the camera advances before the batcher steps.
//! - Pausing gates the batcher step only; the camera keeps moving.
//! - All state lives in one owned [`Viewer`]; nothing is global.

pub mod viewer;

pub use viewer::{Viewer, ViewerConfig, ViewerError};
