use std::fmt::Write as _;

use fieldview_stream::RenderBatch;
use glam::{Mat4, Vec2, Vec3};

use crate::camera::CameraModel;

/// Everything a backend needs to place the camera for one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    pub projection: Mat4,
    pub modelview: Mat4,
    /// Camera position in world space.
    pub eye: Vec3,
    /// `(yaw, pitch)` in degrees.
    pub rotation: Vec2,
}

impl RenderView {
    pub fn from_camera(camera: &CameraModel, aspect: f32) -> Self {
        let (projection, modelview) = camera.view_transform(aspect);
        Self {
            projection,
            modelview,
            eye: camera.position,
            rotation: camera.rotation(),
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.modelview
    }
}

impl Default for RenderView {
    fn default() -> Self {
        Self::from_camera(&CameraModel::default(), 16.0 / 9.0)
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the point batch and a view, then produces output. It
/// never mutates the batch; the batcher owns it.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given batch and view.
    fn render(&self, batch: &RenderBatch, view: &RenderView) -> Self::Output;
}

/// Text renderer for headless runs, logs and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// Maximum number of points listed; `None` lists all of them.
    pub max_points: Option<usize>,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(max_points: usize) -> Self {
        Self {
            max_points: Some(max_points),
        }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, batch: &RenderBatch, view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Point Batch (groups={}, points={}) ===",
            batch.group_count(),
            batch.point_count()
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) yaw={:.1} pitch={:.1}",
            view.eye.x, view.eye.y, view.eye.z, view.rotation.x, view.rotation.y
        );

        let limit = self.max_points.unwrap_or(usize::MAX);
        for (p, c) in batch.points().take(limit) {
            let _ = writeln!(
                out,
                "  ({:.3}, {:.3}, {:.3}) #{:02x}{:02x}{:02x}",
                p.x, p.height, p.z, c.r, c.g, c.b
            );
        }
        let hidden = batch.point_count().saturating_sub(limit);
        if hidden > 0 {
            let _ = writeln!(out, "  ... {hidden} more");
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldview_common::Color;
    use fieldview_field::PointSource;
    use fieldview_stream::{BatchConfig, PointBatcher};

    fn filled_batcher() -> PointBatcher {
        let source = PointSource::from_fn("sum", (2, 2, 1.0, 1.0), |x, y| x + y).unwrap();
        let mut batcher = PointBatcher::new(
            source,
            BatchConfig {
                count_per_tick: 100,
                color: Color::rgb(255, 0, 0),
            },
        );
        batcher.step();
        batcher
    }

    #[test]
    fn debug_renderer_empty_batch() {
        let renderer = DebugTextRenderer::new();
        let output = renderer.render(&RenderBatch::new(), &RenderView::default());
        assert!(output.contains("groups=0"));
        assert!(output.contains("points=0"));
        assert!(output.contains("yaw=-45.0"));
    }

    #[test]
    fn debug_renderer_lists_points() {
        let batcher = filled_batcher();
        let output = DebugTextRenderer::new().render(batcher.batch(), &RenderView::default());
        assert!(output.contains("points=9"));
        assert!(output.contains("(-1.000, -2.000, -1.000) #ff0000"));
        assert!(output.contains("(1.000, 2.000, 1.000)"));
    }

    #[test]
    fn debug_renderer_respects_limit() {
        let batcher = filled_batcher();
        let output = DebugTextRenderer::with_limit(2).render(batcher.batch(), &RenderView::default());
        assert!(output.contains("... 7 more"));
    }

    #[test]
    fn render_view_tracks_camera() {
        let mut camera = CameraModel::default();
        camera.position = Vec3::new(1.0, 2.0, 3.0);
        let view = RenderView::from_camera(&camera, 1.0);
        assert_eq!(view.eye, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(view.view_projection(), view.projection * view.modelview);
    }
}
