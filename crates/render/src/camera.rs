use fieldview_input::MotionIntent;
use glam::{IVec2, Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Tunables for the first-person camera. Angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Units per second when strafing.
    pub speed_scale: f32,
    /// Degrees per second of rotation intent, before sensitivity.
    pub angular_scale: f32,
    pub sensitivity: f32,
    /// Vertical field of view.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub home_position: Vec3,
    /// `(yaw, pitch)` restored by [`CameraModel::reset`].
    pub home_rotation: Vec2,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            speed_scale: 5.0,
            angular_scale: 40.0,
            sensitivity: 0.15,
            fov_degrees: 65.0,
            near: 0.1,
            far: 60.0,
            home_position: Vec3::new(1.5, 2.0, 1.5),
            home_rotation: Vec2::new(-45.0, -45.0),
        }
    }
}

/// First-person camera: position plus yaw/pitch in degrees.
///
/// Pitch is clamped to `[-90, 90]`; yaw is left unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraModel {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub config: CameraConfig,
}

impl Default for CameraModel {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

impl CameraModel {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            position: config.home_position,
            yaw: config.home_rotation.x,
            pitch: config.home_rotation.y,
            config,
        }
    }

    /// `(yaw, pitch)` in degrees.
    pub fn rotation(&self) -> Vec2 {
        Vec2::new(self.yaw, self.pitch)
    }

    /// Back to the configured home position and rotation.
    pub fn reset(&mut self) {
        self.position = self.config.home_position;
        self.yaw = self.config.home_rotation.x;
        self.pitch = self.config.home_rotation.y;
        tracing::trace!(position = ?self.position, yaw = self.yaw, pitch = self.pitch, "camera at home");
    }

    /// Unit-speed motion direction for a strafe intent.
    ///
    /// `strafe.x` is forward/back, `strafe.y` is left/right. Forward motion
    /// follows the pitch; any lateral component keeps the motion horizontal.
    pub fn motion_vector(&self, strafe: IVec2) -> Vec3 {
        if strafe == IVec2::ZERO {
            return Vec3::ZERO;
        }
        let strafe_angle = (strafe.x as f32).atan2(strafe.y as f32).to_degrees();
        let pitch = self.pitch.to_radians();
        let heading = (self.yaw + strafe_angle).to_radians();

        let (mut m, mut dy) = (pitch.cos(), pitch.sin());
        if strafe.y != 0 {
            m = 1.0;
            dy = 0.0;
        }
        if strafe.x > 0 {
            dy = -dy;
        }
        Vec3::new(heading.cos() * m, dy, heading.sin() * m)
    }

    /// Integrate one tick of motion and rotation intent over `dt` seconds.
    pub fn advance(&mut self, dt: f32, intent: MotionIntent) {
        let d = dt * self.config.speed_scale;
        self.position += self.motion_vector(intent.strafe) * d;

        let a = dt * self.config.angular_scale;
        self.rotate(intent.rotate.y as f32 * a, -(intent.rotate.x as f32) * a);
    }

    /// Rotate by raw degrees, scaled by sensitivity. Pitch is clamped afterwards.
    pub fn rotate(&mut self, d_yaw: f32, d_pitch: f32) {
        let s = self.config.sensitivity;
        self.yaw += d_yaw * s;
        self.pitch = (self.pitch + d_pitch * s).clamp(-90.0, 90.0);
    }

    fn orientation(&self) -> Mat4 {
        let yaw = self.yaw.to_radians();
        let axis = Vec3::new(yaw.cos(), 0.0, yaw.sin());
        Mat4::from_rotation_y(yaw) * Mat4::from_axis_angle(axis, (-self.pitch).to_radians())
    }

    /// World-to-eye transform: rotate, then translate by `-position`.
    pub fn modelview_matrix(&self) -> Mat4 {
        self.orientation() * Mat4::from_translation(-self.position)
    }

    /// Perspective projection with a 0..1 depth range.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.config.fov_degrees.to_radians(),
            aspect,
            self.config.near,
            self.config.far,
        )
    }

    /// `(projection, modelview)` for a viewport of the given aspect ratio.
    pub fn view_transform(&self, aspect: f32) -> (Mat4, Mat4) {
        (self.projection_matrix(aspect), self.modelview_matrix())
    }

    /// Unit view direction in world space.
    pub fn forward(&self) -> Vec3 {
        self.orientation().transpose().transform_vector3(Vec3::NEG_Z)
    }

    /// Unit right vector in world space.
    pub fn right(&self) -> Vec3 {
        self.orientation().transpose().transform_vector3(Vec3::X)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn intent(strafe: (i32, i32), rotate: (i32, i32)) -> MotionIntent {
        MotionIntent {
            strafe: IVec2::new(strafe.0, strafe.1),
            rotate: IVec2::new(rotate.0, rotate.1),
        }
    }

    #[test]
    fn default_camera_is_home() {
        let cam = CameraModel::default();
        assert_eq!(cam.position, Vec3::new(1.5, 2.0, 1.5));
        assert_eq!(cam.rotation(), Vec2::new(-45.0, -45.0));
        let (proj, mv) = cam.view_transform(16.0 / 9.0);
        assert!(!proj.is_nan());
        assert!(!mv.is_nan());
    }

    #[test]
    fn reset_restores_home() {
        let mut cam = CameraModel::default();
        for _ in 0..20 {
            cam.advance(0.1, intent((-1, 1), (1, -1)));
        }
        cam.position = Vec3::new(100.0, -3.0, 7.0);
        cam.reset();
        assert_eq!(cam.position, Vec3::new(1.5, 2.0, 1.5));
        assert_eq!(cam.rotation(), Vec2::new(-45.0, -45.0));
    }

    #[test]
    fn idle_intent_does_not_move() {
        let mut cam = CameraModel::default();
        cam.advance(0.1, MotionIntent::default());
        assert_eq!(cam.position, Vec3::new(1.5, 2.0, 1.5));
        assert_eq!(cam.rotation(), Vec2::new(-45.0, -45.0));
    }

    #[test]
    fn pitch_clamps_at_ninety() {
        let mut cam = CameraModel::default();
        for _ in 0..1000 {
            cam.advance(0.1, intent((0, 0), (-1, 0)));
            assert!(cam.pitch <= 90.0);
        }
        assert_eq!(cam.pitch, 90.0);
    }

    #[test]
    fn pitch_clamps_at_minus_ninety() {
        let mut cam = CameraModel::default();
        for _ in 0..1000 {
            cam.advance(0.1, intent((0, 0), (1, 0)));
            assert!(cam.pitch >= -90.0);
        }
        assert_eq!(cam.pitch, -90.0);
    }

    #[test]
    fn yaw_is_unbounded() {
        let mut cam = CameraModel::default();
        for _ in 0..1000 {
            cam.advance(0.1, intent((0, 0), (0, 1)));
        }
        // 1000 ticks * 0.1 s * 40 deg/s * 0.15
        assert!((cam.yaw - (-45.0 + 600.0)).abs() < 0.1);
    }

    #[test]
    fn rotation_rate_follows_config() {
        let mut cam = CameraModel::default();
        cam.advance(0.1, intent((0, 0), (-1, 1)));
        assert!((cam.yaw - (-45.0 + 0.6)).abs() < EPS);
        assert!((cam.pitch - (-45.0 + 0.6)).abs() < EPS);
    }

    #[test]
    fn lateral_strafe_is_horizontal_at_any_pitch() {
        let mut cam = CameraModel::default();
        for pitch in [-90.0, -45.0, 0.0, 30.0, 90.0] {
            cam.pitch = pitch;
            for lr in [-1, 1] {
                let v = cam.motion_vector(IVec2::new(0, lr));
                assert_eq!(v.y, 0.0);
                assert!((v.length() - 1.0).abs() < EPS);
            }
        }
        let start = cam.position;
        cam.advance(0.5, intent((0, 1), (0, 0)));
        assert_eq!(cam.position.y, start.y);
    }

    #[test]
    fn forward_motion_follows_view_direction() {
        let mut cam = CameraModel::default();
        for (yaw, pitch) in [(-45.0, -45.0), (10.0, 20.0), (200.0, -80.0)] {
            cam.yaw = yaw;
            cam.pitch = pitch;
            let v = cam.motion_vector(IVec2::new(-1, 0));
            assert!((v - cam.forward()).length() < EPS, "yaw={yaw} pitch={pitch}");
        }
    }

    #[test]
    fn backward_motion_is_reverse_of_forward() {
        let mut cam = CameraModel::default();
        cam.yaw = 30.0;
        cam.pitch = 25.0;
        let fwd = cam.motion_vector(IVec2::new(-1, 0));
        let back = cam.motion_vector(IVec2::new(1, 0));
        assert!((fwd + back).length() < EPS);
    }

    #[test]
    fn right_strafe_follows_view_right() {
        let mut cam = CameraModel::default();
        cam.yaw = 75.0;
        cam.pitch = -30.0;
        let v = cam.motion_vector(IVec2::new(0, 1));
        assert!((v - cam.right()).length() < EPS);
    }

    #[test]
    fn home_view_looks_toward_origin() {
        let cam = CameraModel::default();
        let to_origin = (Vec3::ZERO - cam.position).normalize();
        assert!(cam.forward().dot(to_origin) > 0.9);
    }

    #[test]
    fn modelview_moves_eye_to_origin() {
        let mut cam = CameraModel::default();
        cam.position = Vec3::new(3.0, -1.0, 4.0);
        cam.yaw = 12.0;
        cam.pitch = 34.0;
        let eye = cam.modelview_matrix().transform_point3(cam.position);
        assert!(eye.length() < EPS);
    }

    #[test]
    fn advance_scales_by_speed() {
        let mut cam = CameraModel::default();
        cam.pitch = 0.0;
        cam.yaw = 0.0;
        cam.advance(0.1, intent((0, 1), (0, 0)));
        // heading = yaw, five units per second
        assert!((cam.position - Vec3::new(2.0, 2.0, 1.5)).length() < EPS);
    }
}
