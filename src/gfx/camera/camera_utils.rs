use cgmath::{Matrix4, Point3};
use winit::event::{DeviceEvent, KeyEvent};

use super::{camera_controller::CameraController, fly_camera::FlyCamera};

pub struct CameraManager {
    pub camera: FlyCamera,
    pub controller: CameraController,
}

impl CameraManager {
    pub fn new(camera: FlyCamera, controller: CameraController) -> Self {
        Self { camera, controller }
    }

    pub fn process_event(&mut self, event: &DeviceEvent) {
        self.controller.process_events(event);
    }

    pub fn process_keyboard_event(&mut self, event: &KeyEvent) -> bool {
        self.controller.process_keyed_events(event)
    }

    pub fn update(&mut self, dt: f32) {
        self.controller.update_camera(&mut self.camera, dt);
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.camera.view_matrix()
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.camera.projection_matrix()
    }

    pub fn eye(&self) -> Point3<f32> {
        self.camera.position
    }
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix4.into()
}
