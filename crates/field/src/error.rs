use thiserror::Error;

/// Invalid sampling-domain parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("scale factor for the {axis} axis must be non-zero")]
    ZeroScale { axis: char },
    #[error("scale factor for the {axis} axis must be finite, got {value}")]
    NonFiniteScale { axis: char, value: f64 },
    #[error("grid of size {size_x} x {size_y} has more samples than can be indexed")]
    DomainTooLarge { size_x: i64, size_y: i64 },
}
