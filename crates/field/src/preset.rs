use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::FieldError;
use crate::field::Mandelbrot;
use crate::source::PointSource;

const FUNCTION_DOMAIN: (i64, i64, f64, f64) = (100, 100, 10.0, 10.0);
const MANDELBROT_DOMAIN: (i64, i64, f64, f64) = (800, 800, 200.0, 200.0);

/// Built-in point sources. `z` below is `x + i·y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Preset {
    /// Escape-time heights of the Mandelbrot set.
    Mandelbrot,
    /// `|z²|`
    SquareModulus,
    /// `Re(z²)`
    SquareReal,
    /// `Im(z²)`
    SquareImag,
    /// `|z·(z² + 1)|`
    CubicModulus,
    /// `x·y`
    Product,
}

impl Preset {
    pub const ALL: [Preset; 6] = [
        Preset::Mandelbrot,
        Preset::SquareModulus,
        Preset::SquareReal,
        Preset::SquareImag,
        Preset::CubicModulus,
        Preset::Product,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Mandelbrot => "mandelbrot",
            Preset::SquareModulus => "square-modulus",
            Preset::SquareReal => "square-real",
            Preset::SquareImag => "square-imag",
            Preset::CubicModulus => "cubic-modulus",
            Preset::Product => "product",
        }
    }

    /// The preset after this one, wrapping around.
    pub fn next(self) -> Preset {
        let i = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// Samples evaluated per tick when this preset is loaded.
    pub fn count_per_tick(self) -> usize {
        match self {
            Preset::Mandelbrot => 1000,
            _ => 100,
        }
    }

    /// Whether generation starts immediately. The fractal is heavy, so it waits for Enter.
    pub fn start_running(self) -> bool {
        !matches!(self, Preset::Mandelbrot)
    }

    pub fn source(self) -> Result<PointSource, FieldError> {
        let name = self.name();
        match self {
            Preset::Mandelbrot => PointSource::mandelbrot(
                MANDELBROT_DOMAIN,
                Mandelbrot {
                    outer_limit: 5.0,
                    stretch_factor: 200.0,
                    ..Mandelbrot::default()
                },
            ),
            Preset::SquareModulus => {
                PointSource::from_fn(name, FUNCTION_DOMAIN, |x, y| Complex64::new(x, y).powu(2).norm())
            }
            Preset::SquareReal => {
                PointSource::from_fn(name, FUNCTION_DOMAIN, |x, y| Complex64::new(x, y).powu(2).re)
            }
            Preset::SquareImag => {
                PointSource::from_fn(name, FUNCTION_DOMAIN, |x, y| Complex64::new(x, y).powu(2).im)
            }
            Preset::CubicModulus => PointSource::from_fn(name, FUNCTION_DOMAIN, |x, y| {
                let z = Complex64::new(x, y);
                (z * (z.powu(2) + 1.0)).norm()
            }),
            Preset::Product => PointSource::from_fn(name, FUNCTION_DOMAIN, |x, y| x * y),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown preset name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown preset `{0}`")]
pub struct ParsePresetError(pub String);

impl FromStr for Preset {
    type Err = ParsePresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| ParsePresetError(s.to_string()))
    }
}
