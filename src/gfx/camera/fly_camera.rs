use cgmath::*;

use crate::config::CameraSettings;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Pitch limit in degrees, short of straight up/down so the view basis stays defined
pub const MAX_PITCH: f32 = 89.0;

/// First-person camera steered by yaw and pitch
///
/// Yaw -90 with zero pitch looks down -Z.
#[derive(Debug, Clone, Copy)]
pub struct FlyCamera {
    pub position: Point3<f32>,
    pub world_up: Vector3<f32>,
    /// Degrees
    pub yaw: f32,
    /// Degrees, clamped to +-[`MAX_PITCH`]
    pub pitch: f32,
    /// Units per second
    pub move_speed: f32,
    /// Degrees per unit of mouse motion
    pub turn_speed: f32,
    pub aspect: f32,
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::from_settings(&CameraSettings::default(), 16.0 / 9.0)
    }
}

impl FlyCamera {
    pub fn from_settings(settings: &CameraSettings, aspect: f32) -> Self {
        let [x, y, z] = settings.position;
        Self {
            position: Point3::new(x, y, z),
            world_up: Vector3::unit_y(),
            yaw: settings.yaw_deg,
            pitch: settings.pitch_deg.clamp(-MAX_PITCH, MAX_PITCH),
            move_speed: settings.move_speed,
            turn_speed: settings.turn_speed,
            aspect,
            fovy: Deg(settings.fov_deg),
            znear: settings.z_near,
            zfar: settings.z_far,
        }
    }

    /// Unit view direction
    pub fn front(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = Rad::from(Deg(self.yaw)).0.sin_cos();
        let (pitch_sin, pitch_cos) = Rad::from(Deg(self.pitch)).0.sin_cos();
        Vector3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize()
    }

    pub fn right(&self) -> Vector3<f32> {
        self.front().cross(self.world_up).normalize()
    }

    pub fn up(&self) -> Vector3<f32> {
        self.right().cross(self.front()).normalize()
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.front(), self.up())
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    /// Turns by a mouse delta; positive `dy` (mouse moved down) looks down.
    pub fn turn(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.turn_speed;
        self.pitch = (self.pitch - dy * self.turn_speed).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Moves along the view and strafe directions, scaled by speed and time
    pub fn translate(&mut self, forward: f32, strafe: f32, dt: f32) {
        let velocity = self.move_speed * dt;
        self.position += self.front() * (forward * velocity) + self.right() * (strafe * velocity);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_close(actual: Vector3<f32>, expected: Vector3<f32>) {
        assert!(
            (actual - expected).magnitude() < 1e-5,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    fn level_camera() -> FlyCamera {
        FlyCamera {
            pitch: 0.0,
            ..FlyCamera::default()
        }
    }

    #[test]
    fn test_default_matches_settings() {
        let camera = FlyCamera::default();
        assert_eq!(camera.position, Point3::new(0.0, 5.0, 40.0));
        assert_eq!(camera.yaw, -90.0);
        assert_eq!(camera.pitch, -10.0);
        assert_eq!(camera.fovy, Deg(45.0));
    }

    #[test]
    fn test_yaw_minus_90_faces_negative_z() {
        let camera = level_camera();
        assert_vec_close(camera.front(), -Vector3::unit_z());
        assert_vec_close(camera.right(), Vector3::unit_x());
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = level_camera();
        camera.turn(0.0, -1000.0);
        assert_eq!(camera.pitch, MAX_PITCH);

        camera.turn(0.0, 5000.0);
        assert_eq!(camera.pitch, -MAX_PITCH);
    }

    #[test]
    fn test_translate_scales_with_dt() {
        let mut camera = level_camera();
        let start = camera.position;
        camera.translate(1.0, 0.0, 0.5);

        let moved = camera.position - start;
        assert_vec_close(moved, Vector3::new(0.0, 0.0, -2.5));
    }

    #[test]
    fn test_view_matrix_moves_eye_to_origin() {
        let camera = FlyCamera::default();
        let eye_in_view = camera.view_matrix().transform_point(camera.position);
        assert!(eye_in_view.to_vec().magnitude() < 1e-4);
    }
}
