use anyhow::Context;
use std::{sync::Arc, time::Instant};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowAttributes, WindowId},
};

use crate::{
    config::OrreryConfig,
    gfx::{rendering::RenderEngine, scene::layout::planet_system, scene::Scene},
};

/// Everything that lives only while the window exists
pub struct SceneContext {
    pub window: Arc<Window>,
    pub render_engine: RenderEngine,
    pub scene: Scene,
}

impl SceneContext {
    fn create(event_loop: &ActiveEventLoop, config: &OrreryConfig) -> anyhow::Result<Self> {
        let settings = &config.window;
        let window = event_loop
            .create_window(
                WindowAttributes::default()
                    .with_title(settings.title.clone())
                    .with_inner_size(LogicalSize::new(settings.width, settings.height)),
            )
            .context("Failed to create window")?;
        let window = Arc::new(window);
        capture_cursor(&window);

        let (width, height) = window.inner_size().into();
        let render_engine = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            settings.vsync,
        ))
        .context("Failed to initialise the renderer")?;

        let (width, height) = render_engine.get_surface_size();
        let mut scene = planet_system(config, width as f32 / height as f32)
            .context("Failed to build the scene")?;
        render_engine.prepare_scene(&mut scene);

        Ok(Self {
            window,
            render_engine,
            scene,
        })
    }
}

/// Hides the cursor and keeps it inside the window for mouse look
fn capture_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(err) = grabbed {
        log::warn!("Could not capture the cursor: {}", err);
    }
    window.set_cursor_visible(false);
}

pub struct OrreryApp {
    config: OrreryConfig,
    context: Option<SceneContext>,
    paused: bool,
    last_frame: Instant,
}

impl OrreryApp {
    pub fn new(config: OrreryConfig) -> Self {
        Self {
            config,
            context: None,
            paused: false,
            last_frame: Instant::now(),
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        let pressed = event.state == ElementState::Pressed;
        match event.physical_key {
            PhysicalKey::Code(KeyCode::Escape) if pressed => event_loop.exit(),
            PhysicalKey::Code(KeyCode::Space) => {
                if self.paused != pressed {
                    log::debug!("{}", if pressed { "Paused" } else { "Resumed" });
                }
                self.paused = pressed;
            }
            _ => {
                if let Some(context) = self.context.as_mut() {
                    context.scene.camera_manager.process_keyboard_event(event);
                }
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let Some(context) = self.context.as_mut() else {
            return;
        };

        context.scene.update(dt, self.paused);
        context.render_engine.update(&mut context.scene);

        if self.paused {
            return;
        }

        match context.render_engine.render_frame(&context.scene) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated; reconfiguring");
                context.render_engine.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory; exiting");
                event_loop.exit();
            }
            Err(err) => log::warn!("Skipped frame: {}", err),
        }
    }
}

impl ApplicationHandler for OrreryApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.context.is_some() {
            return;
        }

        match SceneContext::create(event_loop, &self.config) {
            Ok(context) => {
                self.context = Some(context);
                self.last_frame = Instant::now();
            }
            Err(err) => {
                log::error!("{:#}", err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, &event),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(context) = self.context.as_mut() {
                    context.render_engine.resize(width, height);
                    context.scene.resize(width, height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let Some(context) = self.context.as_mut() {
            context.scene.camera_manager.process_event(&event);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(context) = self.context.as_ref() {
            context.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(context) = self.context.take() {
            log::info!("Closing at tick {}", context.scene.clock.ticks);
        }
    }
}

/// Opens the window and runs until it is closed
pub fn run(config: OrreryConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = OrreryApp::new(config);
    event_loop
        .run_app(&mut app)
        .context("Event loop terminated with an error")?;
    Ok(())
}
