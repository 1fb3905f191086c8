use winit::{
    event::{DeviceEvent, ElementState, KeyEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::fly_camera::FlyCamera;

/// Keyboard and mouse state for the fly camera
///
/// Keys are tracked as held/released and applied each frame in
/// [`CameraController::update_camera`]; mouse motion is accumulated between
/// frames so fast input is not lost.
#[derive(Debug, Default)]
pub struct CameraController {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
    mouse_delta: (f32, f32),
    /// Mouse look is ignored while set
    pub look_locked: bool,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_events(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if !self.look_locked {
                self.mouse_delta.0 += delta.0 as f32;
                self.mouse_delta.1 += delta.1 as f32;
            }
        }
    }

    /// Returns true when the key was one the camera uses
    pub fn process_keyed_events(&mut self, event: &KeyEvent) -> bool {
        let PhysicalKey::Code(code) = event.physical_key else {
            return false;
        };
        self.set_key(code, event.state == ElementState::Pressed)
    }

    pub fn set_key(&mut self, code: KeyCode, pressed: bool) -> bool {
        match code {
            KeyCode::KeyW | KeyCode::ArrowUp => self.forward = pressed,
            KeyCode::KeyS | KeyCode::ArrowDown => self.backward = pressed,
            KeyCode::KeyA | KeyCode::ArrowLeft => self.left = pressed,
            KeyCode::KeyD | KeyCode::ArrowRight => self.right = pressed,
            _ => return false,
        }
        true
    }

    /// Applies held keys and the accumulated mouse delta, then resets the delta
    pub fn update_camera(&mut self, camera: &mut FlyCamera, dt: f32) {
        let forward = axis(self.forward, self.backward);
        let strafe = axis(self.right, self.left);
        if forward != 0.0 || strafe != 0.0 {
            camera.translate(forward, strafe, dt);
        }

        let (dx, dy) = std::mem::take(&mut self.mouse_delta);
        if !self.look_locked && (dx != 0.0 || dy != 0.0) {
            camera.turn(dx, dy);
        }
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_key_moves_camera() {
        let mut controller = CameraController::new();
        let mut camera = FlyCamera {
            pitch: 0.0,
            ..FlyCamera::default()
        };
        let start = camera.position;

        assert!(controller.set_key(KeyCode::KeyW, true));
        controller.update_camera(&mut camera, 1.0);
        assert!(camera.position.z < start.z);

        controller.set_key(KeyCode::KeyW, false);
        let stopped = camera.position;
        controller.update_camera(&mut camera, 1.0);
        assert_eq!(camera.position, stopped);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let mut controller = CameraController::new();
        let mut camera = FlyCamera::default();
        let start = camera.position;

        controller.set_key(KeyCode::KeyA, true);
        controller.set_key(KeyCode::KeyD, true);
        controller.update_camera(&mut camera, 1.0);
        assert_eq!(camera.position, start);
    }

    #[test]
    fn test_mouse_delta_is_consumed_once() {
        let mut controller = CameraController::new();
        let mut camera = FlyCamera::default();

        controller.process_events(&DeviceEvent::MouseMotion { delta: (10.0, 0.0) });
        controller.process_events(&DeviceEvent::MouseMotion { delta: (10.0, 0.0) });
        controller.update_camera(&mut camera, 0.016);
        assert!((camera.yaw - (-90.0 + 20.0 * camera.turn_speed)).abs() < 1e-5);

        let yaw = camera.yaw;
        controller.update_camera(&mut camera, 0.016);
        assert_eq!(camera.yaw, yaw);
    }

    #[test]
    fn test_locked_look_ignores_mouse() {
        let mut controller = CameraController::new();
        controller.look_locked = true;
        let mut camera = FlyCamera::default();

        controller.process_events(&DeviceEvent::MouseMotion { delta: (50.0, 50.0) });
        controller.update_camera(&mut camera, 0.016);
        assert_eq!(camera.yaw, -90.0);
    }

    #[test]
    fn test_unrelated_key_is_not_consumed() {
        let mut controller = CameraController::new();
        assert!(!controller.set_key(KeyCode::Space, true));
    }
}
