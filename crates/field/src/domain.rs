use std::iter::FusedIterator;
use std::ops::RangeInclusive;

use fieldview_common::Sample;
use serde::{Deserialize, Serialize};

use crate::error::FieldError;

/// Rectangular sampling domain `(size_x, size_y, scale_x, scale_y)`.
///
/// Integer grid indices run from `(-size).div_euclid(2)` to `size.div_euclid(2)`
/// inclusive on each axis, and each index is divided by the axis scale to give
/// the real coordinate. Floor division on the negated size means an odd size
/// gets its extra index on the negative side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridDomain {
    size_x: i64,
    size_y: i64,
    scale_x: f64,
    scale_y: f64,
}

impl GridDomain {
    pub fn new(size_x: i64, size_y: i64, scale_x: f64, scale_y: f64) -> Result<Self, FieldError> {
        check_scale('x', scale_x)?;
        check_scale('y', scale_y)?;
        checked_axis_len(size_x)
            .zip(checked_axis_len(size_y))
            .and_then(|(x, y)| x.checked_mul(y))
            .ok_or(FieldError::DomainTooLarge { size_x, size_y })?;
        if size_x < 0 || size_y < 0 {
            tracing::debug!(size_x, size_y, "negative grid size, domain is empty");
        }
        Ok(Self {
            size_x,
            size_y,
            scale_x,
            scale_y,
        })
    }

    pub fn size(&self) -> (i64, i64) {
        (self.size_x, self.size_y)
    }

    pub fn scale(&self) -> (f64, f64) {
        (self.scale_x, self.scale_y)
    }

    /// Integer index range along x.
    pub fn x_indices(&self) -> RangeInclusive<i64> {
        axis_indices(self.size_x)
    }

    /// Integer index range along y.
    pub fn y_indices(&self) -> RangeInclusive<i64> {
        axis_indices(self.size_y)
    }

    /// Total number of samples in the domain.
    pub fn len(&self) -> u64 {
        axis_len(self.size_x) * axis_len(self.size_y)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row-major mapping from a flat index to its sample. Pure; `None` past the end.
    pub fn sample_at(&self, index: u64) -> Option<Sample> {
        if index >= self.len() {
            return None;
        }
        let rows = axis_len(self.size_y);
        let xi = self.x_indices().start() + (index / rows) as i64;
        let yi = self.y_indices().start() + (index % rows) as i64;
        Some(Sample::new(
            xi as f64 / self.scale_x,
            yi as f64 / self.scale_y,
        ))
    }

    /// Fresh cursor positioned at the first sample.
    pub fn cursor(&self) -> SampleCursor {
        SampleCursor {
            domain: *self,
            next: 0,
            len: self.len(),
        }
    }
}

fn check_scale(axis: char, value: f64) -> Result<(), FieldError> {
    if !value.is_finite() {
        return Err(FieldError::NonFiniteScale { axis, value });
    }
    if value == 0.0 {
        return Err(FieldError::ZeroScale { axis });
    }
    Ok(())
}

/// Index count along one axis, or `None` if the bounds or the count overflow.
fn checked_axis_len(size: i64) -> Option<u64> {
    let start = size.checked_neg()?.div_euclid(2);
    let end = size.div_euclid(2);
    if end < start {
        return Some(0);
    }
    let len = end.checked_sub(start)?.checked_add(1)?;
    u64::try_from(len).ok()
}

fn axis_indices(size: i64) -> RangeInclusive<i64> {
    (-size).div_euclid(2)..=size.div_euclid(2)
}

fn axis_len(size: i64) -> u64 {
    let range = axis_indices(size);
    if range.is_empty() {
        0
    } else {
        (range.end() - range.start() + 1) as u64
    }
}

/// Single-pass cursor over a [`GridDomain`].
///
/// Holds only the next flat index; once it reaches the end it stays there.
#[derive(Debug, Clone)]
pub struct SampleCursor {
    domain: GridDomain,
    next: u64,
    len: u64,
}

impl SampleCursor {
    /// Samples not yet yielded.
    pub fn remaining(&self) -> u64 {
        self.len - self.next
    }

    pub fn is_exhausted(&self) -> bool {
        self.next >= self.len
    }

    /// Flat index of the next sample.
    pub fn position(&self) -> u64 {
        self.next
    }
}

impl Iterator for SampleCursor {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        let sample = self.domain.sample_at(self.next)?;
        self.next += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = usize::try_from(self.remaining()).unwrap_or(usize::MAX);
        (n, Some(n))
    }
}

impl ExactSizeIterator for SampleCursor {}

impl FusedIterator for SampleCursor {}
