use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Height returned when a point escapes on the very first iteration.
pub const ESCAPE_AT_START: f64 = 10.0;

/// A scalar field over two reals. Produces the height of a sample.
pub trait ScalarField {
    /// Evaluate the field at `(u, v)`.
    fn evaluate(&self, u: f64, v: f64) -> f64;

    /// Short human-readable label, used in logs and overlays.
    fn label(&self) -> &str {
        "field"
    }
}

/// A field backed by a plain closure.
pub struct FnField<F> {
    label: String,
    f: F,
}

impl<F> FnField<F>
where
    F: Fn(f64, f64) -> f64,
{
    pub fn new(label: impl Into<String>, f: F) -> Self {
        Self {
            label: label.into(),
            f,
        }
    }
}

impl<F> ScalarField for FnField<F>
where
    F: Fn(f64, f64) -> f64,
{
    fn evaluate(&self, u: f64, v: f64) -> f64 {
        (self.f)(u, v)
    }

    fn label(&self) -> &str {
        &self.label
    }
}

impl<F> std::fmt::Debug for FnField<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnField").field("label", &self.label).finish()
    }
}

/// Escape-time rule `z(n+1) = z(n)^power + (u + i·v)` starting from `z(0) = 0`.
///
/// If `|z|` exceeds `outer_limit` on iteration `n` the height is
/// `stretch_factor / n`, or [`ESCAPE_AT_START`] when `n == 0`. Points that
/// never escape within `max_iterations` sit at height 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mandelbrot {
    pub max_iterations: u32,
    pub stretch_factor: f64,
    pub power: u32,
    pub outer_limit: f64,
}

impl Default for Mandelbrot {
    fn default() -> Self {
        Self {
            max_iterations: 400,
            stretch_factor: 100.0,
            power: 2,
            outer_limit: 2.0,
        }
    }
}

impl Mandelbrot {
    /// Iteration on which the orbit of `c` escapes, if it does.
    pub fn escape_iteration(&self, c: Complex64) -> Option<u32> {
        let mut z = Complex64::new(0.0, 0.0);
        for n in 0..self.max_iterations {
            z = z.powu(self.power) + c;
            if z.norm() > self.outer_limit {
                return Some(n);
            }
        }
        None
    }
}

impl ScalarField for Mandelbrot {
    fn evaluate(&self, u: f64, v: f64) -> f64 {
        match self.escape_iteration(Complex64::new(u, v)) {
            Some(0) => ESCAPE_AT_START,
            Some(n) => self.stretch_factor / n as f64,
            None => 0.0,
        }
    }

    fn label(&self) -> &str {
        "mandelbrot"
    }
}
