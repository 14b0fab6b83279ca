//! Point sources: a rectangular sampling domain walked lazily in row-major
//! order, and the scalar field that lifts each sample into 3D.
//!
//! # Invariants
//! - Enumeration is deterministic: outer loop over the x index, inner over y.
//! - A cursor is single-pass. Restarting means asking the source for a new one.
//! - Zero or non-finite scale factors are rejected at construction.

mod domain;
mod error;
mod field;
mod preset;
mod source;

pub use domain::{GridDomain, SampleCursor};
pub use error::FieldError;
pub use field::{FnField, Mandelbrot, ScalarField, ESCAPE_AT_START};
pub use preset::{ParsePresetError, Preset};
pub use source::PointSource;
