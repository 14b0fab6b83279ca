use std::time::{Duration, Instant};

use fieldview_common::{Color, GroupId};
use fieldview_field::{PointSource, SampleCursor};

use crate::batch::{PrimitiveGroup, RenderBatch};

/// Per-tick batching configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchConfig {
    /// Maximum number of samples pulled and evaluated per step.
    pub count_per_tick: usize,
    /// Colour applied uniformly to every point appended by a step.
    pub color: Color,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            count_per_tick: 10,
            color: Color::WHITE,
        }
    }
}

/// Statistics from the last step, for overlays and tracing.
#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    pub points_this_step: usize,
    pub total_points: usize,
    pub remaining: u64,
    pub groups: usize,
    pub exhausted: bool,
    pub step_time: Duration,
}

/// Pulls up to `count_per_tick` samples per step from the active source and
/// appends them to the render batch as one primitive group.
pub struct PointBatcher {
    pub config: BatchConfig,
    source: PointSource,
    cursor: SampleCursor,
    batch: RenderBatch,
    stats: BatchStats,
}

impl PointBatcher {
    pub fn new(source: PointSource, config: BatchConfig) -> Self {
        let cursor = source.iterate_positions();
        let stats = BatchStats {
            remaining: cursor.remaining(),
            exhausted: cursor.is_exhausted(),
            ..BatchStats::default()
        };
        Self {
            config,
            source,
            cursor,
            batch: RenderBatch::new(),
            stats,
        }
    }

    /// Pull, evaluate and append one group. Returns `None` once the source is drained.
    pub fn step(&mut self) -> Option<GroupId> {
        let _span = tracing::info_span!("batch_step").entered();
        let step_start = Instant::now();

        let source = &self.source;
        let points: Vec<_> = self
            .cursor
            .by_ref()
            .take(self.config.count_per_tick)
            .map(|sample| source.evaluate(sample))
            .collect();

        let appended = if points.is_empty() {
            None
        } else {
            Some(self.batch.push(PrimitiveGroup {
                id: GroupId::new(),
                points,
                color: self.config.color,
            }))
        };

        let points_this_step = appended
            .and_then(|id| self.batch.group(id))
            .map_or(0, PrimitiveGroup::len);
        self.stats = BatchStats {
            points_this_step,
            total_points: self.batch.point_count(),
            remaining: self.cursor.remaining(),
            groups: self.batch.group_count(),
            exhausted: self.cursor.is_exhausted(),
            step_time: step_start.elapsed(),
        };

        tracing::trace!(
            appended = points_this_step,
            total = self.stats.total_points,
            remaining = self.stats.remaining,
            "batch step complete"
        );

        appended
    }

    /// Swap in a new source. With `clear_existing` every previously appended
    /// group is released; otherwise old and new points coexist.
    pub fn reset(&mut self, source: PointSource, clear_existing: bool) {
        let released = if clear_existing { self.batch.clear() } else { 0 };
        tracing::debug!(
            from = self.source.label(),
            to = source.label(),
            released,
            "point source replaced"
        );
        self.cursor = source.iterate_positions();
        self.source = source;
        self.stats = BatchStats {
            total_points: self.batch.point_count(),
            remaining: self.cursor.remaining(),
            groups: self.batch.group_count(),
            exhausted: self.cursor.is_exhausted(),
            ..BatchStats::default()
        };
    }

    pub fn batch(&self) -> &RenderBatch {
        &self.batch
    }

    pub fn source(&self) -> &PointSource {
        &self.source
    }

    /// Samples the active source has yet to yield.
    pub fn remaining(&self) -> u64 {
        self.cursor.remaining()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor.is_exhausted()
    }

    pub fn stats(&self) -> &BatchStats {
        &self.stats
    }
}
