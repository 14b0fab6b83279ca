use fieldview_common::{FieldPoint, Sample};

use crate::domain::{GridDomain, SampleCursor};
use crate::error::FieldError;
use crate::field::{FnField, Mandelbrot, ScalarField};

/// A sampling domain paired with the field that lifts its samples into 3D.
pub struct PointSource {
    domain: GridDomain,
    field: Box<dyn ScalarField>,
}

impl PointSource {
    pub fn new(domain: GridDomain, field: impl ScalarField + 'static) -> Self {
        Self {
            domain,
            field: Box::new(field),
        }
    }

    /// Source over `(size_x, size_y, scale_x, scale_y)` evaluating a closure.
    pub fn from_fn<F>(
        label: &str,
        size: (i64, i64, f64, f64),
        f: F,
    ) -> Result<Self, FieldError>
    where
        F: Fn(f64, f64) -> f64 + 'static,
    {
        let domain = GridDomain::new(size.0, size.1, size.2, size.3)?;
        Ok(Self::new(domain, FnField::new(label, f)))
    }

    /// Source over `(size_x, size_y, scale_x, scale_y)` evaluating an escape-time rule.
    pub fn mandelbrot(size: (i64, i64, f64, f64), rule: Mandelbrot) -> Result<Self, FieldError> {
        let domain = GridDomain::new(size.0, size.1, size.2, size.3)?;
        Ok(Self::new(domain, rule))
    }

    /// A fresh lazy walk over the domain. Each call starts from the beginning.
    pub fn iterate_positions(&self) -> SampleCursor {
        self.domain.cursor()
    }

    /// Lift one sample into 3D.
    pub fn evaluate(&self, sample: Sample) -> FieldPoint {
        FieldPoint::new(sample.u, self.field.evaluate(sample.u, sample.v), sample.v)
    }

    pub fn domain(&self) -> &GridDomain {
        &self.domain
    }

    pub fn label(&self) -> &str {
        self.field.label()
    }
}

impl std::fmt::Debug for PointSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointSource")
            .field("domain", &self.domain)
            .field("field", &self.field.label())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_maps_height_to_y() {
        let source = PointSource::from_fn("product", (2, 2, 1.0, 1.0), |x, y| x * y).unwrap();
        let p = source.evaluate(Sample::new(2.0, 3.0));
        assert_eq!(p, FieldPoint::new(2.0, 6.0, 3.0));
    }

    #[test]
    fn construction_rejects_zero_scale() {
        let err = PointSource::from_fn("sum", (2, 2, 1.0, 0.0), |x, y| x + y).unwrap_err();
        assert_eq!(err, FieldError::ZeroScale { axis: 'y' });
        assert!(PointSource::mandelbrot((2, 2, 0.0, 1.0), Mandelbrot::default()).is_err());
    }

    #[test]
    fn iterate_positions_restarts_each_call() {
        let source = PointSource::from_fn("sum", (2, 2, 1.0, 1.0), |x, y| x + y).unwrap();
        let drained: Vec<_> = source.iterate_positions().collect();
        assert_eq!(drained.len(), 9);
        assert_eq!(source.iterate_positions().count(), 9);
    }

    #[test]
    fn label_comes_from_field() {
        let source = PointSource::mandelbrot((4, 4, 2.0, 2.0), Mandelbrot::default()).unwrap();
        assert_eq!(source.label(), "mandelbrot");
        assert!(format!("{source:?}").contains("mandelbrot"));
    }
}
