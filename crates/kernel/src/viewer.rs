use std::time::Duration;

use fieldview_common::{Color, GroupId};
use fieldview_field::{FieldError, PointSource, Preset};
use fieldview_input::{Action, InputRouter, Key, MotionIntent};
use fieldview_render::{CameraConfig, CameraModel, RenderView};
use fieldview_stream::{BatchConfig, BatchStats, PointBatcher, RenderBatch};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("invalid point source: {0}")]
    Field(#[from] FieldError),
}

/// Session configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerConfig {
    pub batch: BatchConfig,
    /// Whether point generation runs from the first tick.
    pub start_running: bool,
    pub background: Color,
    /// Nominal interval between ticks.
    pub tick_interval: Duration,
    pub camera: CameraConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            batch: BatchConfig::default(),
            start_running: true,
            background: Color::BLACK,
            tick_interval: Duration::from_millis(100),
            camera: CameraConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Defaults with the batch size and run state a preset expects.
    pub fn for_preset(preset: Preset) -> Self {
        Self {
            batch: BatchConfig {
                count_per_tick: preset.count_per_tick(),
                ..BatchConfig::default()
            },
            start_running: preset.start_running(),
            ..Self::default()
        }
    }
}

/// One viewing session: camera, input router, batcher and the run gate.
pub struct Viewer {
    pub config: ViewerConfig,
    camera: CameraModel,
    router: InputRouter,
    batcher: PointBatcher,
    running: bool,
    ticks: u64,
}

impl Viewer {
    pub fn new(source: PointSource, config: ViewerConfig) -> Self {
        tracing::debug!(
            source = source.label(),
            samples = source.domain().len(),
            count_per_tick = config.batch.count_per_tick,
            running = config.start_running,
            "viewer created"
        );
        Self {
            camera: CameraModel::new(config.camera),
            router: InputRouter::new(),
            batcher: PointBatcher::new(source, config.batch),
            running: config.start_running,
            ticks: 0,
            config,
        }
    }

    /// Build a session for a built-in preset with that preset's defaults.
    pub fn from_preset(preset: Preset) -> Result<Self, ViewerError> {
        Ok(Self::new(preset.source()?, ViewerConfig::for_preset(preset)))
    }

    /// Advance the camera by `dt` seconds, then run one batcher step if running.
    pub fn tick(&mut self, dt: f32) -> Option<GroupId> {
        self.ticks += 1;
        self.camera.advance(dt, self.router.intent());
        if !self.running {
            return None;
        }
        self.batcher.step()
    }

    /// Feed a key event. Viewer-level actions are applied here and also
    /// returned, so the host can react to the ones it owns.
    pub fn handle_key(&mut self, key: Key, pressed: bool) -> Option<Action> {
        if !pressed {
            self.router.key_up(key);
            return None;
        }
        let action = self.router.key_down(key)?;
        match action {
            Action::ToggleRunning => {
                self.running = !self.running;
                tracing::info!(running = self.running, "generation toggled");
            }
            Action::ResetCamera => {
                self.camera.reset();
                tracing::info!("camera reset");
            }
            Action::NextPreset => {}
        }
        Some(action)
    }

    /// Swap the point source. With `remove_old` the existing points are released.
    pub fn change_target(&mut self, source: PointSource, remove_old: bool) {
        self.batcher.reset(source, remove_old);
    }

    /// Drop all held movement/rotation intents.
    pub fn release_keys(&mut self) {
        self.router.clear();
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Change the per-tick sample budget for subsequent steps.
    pub fn set_count_per_tick(&mut self, count: usize) {
        self.config.batch.count_per_tick = count;
        self.batcher.config.count_per_tick = count;
    }

    pub fn view(&self, aspect: f32) -> RenderView {
        RenderView::from_camera(&self.camera, aspect)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn camera(&self) -> &CameraModel {
        &self.camera
    }

    pub fn intent(&self) -> MotionIntent {
        self.router.intent()
    }

    pub fn batch(&self) -> &RenderBatch {
        self.batcher.batch()
    }

    pub fn stats(&self) -> &BatchStats {
        self.batcher.stats()
    }

    pub fn source(&self) -> &PointSource {
        self.batcher.source()
    }

    pub fn remaining(&self) -> u64 {
        self.batcher.remaining()
    }

    pub fn is_exhausted(&self) -> bool {
        self.batcher.is_exhausted()
    }

    /// Ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    fn sum_viewer(count_per_tick: usize) -> Viewer {
        let source = PointSource::from_fn("sum", (2, 2, 1.0, 1.0), |x, y| x + y).unwrap();
        Viewer::new(
            source,
            ViewerConfig {
                batch: BatchConfig {
                    count_per_tick,
                    ..BatchConfig::default()
                },
                ..ViewerConfig::default()
            },
        )
    }

    #[test]
    fn drains_small_domain_in_one_tick() {
        let mut viewer = sum_viewer(100);
        let id = viewer.tick(0.1).unwrap();
        assert!(viewer.is_exhausted());

        let group = viewer.batch().group(id).unwrap();
        assert_eq!(group.len(), 9);
        let mut seen: Vec<(i64, i64)> = Vec::new();
        for p in &group.points {
            assert_eq!(p.height, p.x + p.z);
            seen.push((p.x as i64, p.z as i64));
        }
        seen.sort();
        let mut expected = Vec::new();
        for x in -1..=1 {
            for y in -1..=1 {
                expected.push((x, y));
            }
        }
        assert_eq!(seen, expected);

        assert!(viewer.tick(0.1).is_none());
        assert_eq!(viewer.batch().point_count(), 9);
    }

    #[test]
    fn paused_viewer_moves_camera_but_not_batch() {
        let mut viewer = sum_viewer(3);
        viewer.set_running(false);
        viewer.handle_key(Key::W, true);
        let before = viewer.camera().position;

        assert!(viewer.tick(0.1).is_none());
        assert!(viewer.batch().is_empty());
        assert_ne!(viewer.camera().position, before);
        assert_eq!(viewer.ticks(), 1);
    }

    #[test]
    fn enter_toggles_running() {
        let mut viewer = sum_viewer(3);
        assert!(viewer.is_running());
        assert_eq!(viewer.handle_key(Key::Enter, true), Some(Action::ToggleRunning));
        assert!(!viewer.is_running());
        viewer.handle_key(Key::Enter, false);
        viewer.handle_key(Key::Enter, true);
        assert!(viewer.is_running());
    }

    #[test]
    fn r_resets_camera() {
        let mut viewer = sum_viewer(3);
        viewer.handle_key(Key::D, true);
        viewer.handle_key(Key::Left, true);
        for _ in 0..10 {
            viewer.tick(0.1);
        }
        assert_ne!(viewer.camera().position, Vec3::new(1.5, 2.0, 1.5));

        assert_eq!(viewer.handle_key(Key::R, true), Some(Action::ResetCamera));
        assert_eq!(viewer.camera().position, Vec3::new(1.5, 2.0, 1.5));
        assert_eq!(viewer.camera().rotation(), Vec2::new(-45.0, -45.0));
    }

    #[test]
    fn key_release_stops_motion() {
        let mut viewer = sum_viewer(3);
        viewer.handle_key(Key::S, true);
        viewer.handle_key(Key::S, false);
        let before = viewer.camera().position;
        viewer.tick(0.1);
        assert_eq!(viewer.camera().position, before);
    }

    #[test]
    fn tab_is_left_to_the_host() {
        let mut viewer = sum_viewer(3);
        assert_eq!(viewer.handle_key(Key::Tab, true), Some(Action::NextPreset));
        assert!(viewer.is_running());
    }

    #[test]
    fn change_target_replaces_points() {
        let mut viewer = sum_viewer(100);
        viewer.tick(0.1);
        let product = PointSource::from_fn("product", (4, 4, 1.0, 1.0), |x, y| x * y).unwrap();
        viewer.change_target(product, true);
        assert!(viewer.batch().is_empty());
        assert_eq!(viewer.remaining(), 25);
        assert_eq!(viewer.source().label(), "product");

        viewer.tick(0.1);
        assert_eq!(viewer.batch().point_count(), 25);
    }

    #[test]
    fn change_target_can_keep_points() {
        let mut viewer = sum_viewer(100);
        viewer.tick(0.1);
        let again = PointSource::from_fn("sum", (2, 2, 1.0, 1.0), |x, y| x + y).unwrap();
        viewer.change_target(again, false);
        viewer.tick(0.1);
        assert_eq!(viewer.batch().point_count(), 18);
    }

    #[test]
    fn count_per_tick_is_adjustable() {
        let mut viewer = sum_viewer(2);
        viewer.tick(0.1);
        viewer.set_count_per_tick(5);
        viewer.tick(0.1);
        assert_eq!(viewer.batch().point_count(), 7);
        assert_eq!(viewer.stats().points_this_step, 5);
    }

    #[test]
    fn preset_viewer_uses_preset_defaults() {
        let viewer = Viewer::from_preset(Preset::Mandelbrot).unwrap();
        assert!(!viewer.is_running());
        assert_eq!(viewer.config.batch.count_per_tick, 1000);

        let viewer = Viewer::from_preset(Preset::SquareReal).unwrap();
        assert!(viewer.is_running());
        assert_eq!(viewer.remaining(), 101 * 101);
    }

    #[test]
    fn view_reflects_camera() {
        let viewer = sum_viewer(1);
        let view = viewer.view(2.0);
        assert_eq!(view.eye, viewer.camera().position);
        assert_eq!(view.rotation, Vec2::new(-45.0, -45.0));
    }
}
