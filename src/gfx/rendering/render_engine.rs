use std::sync::Arc;

use crate::{
    error::RenderError,
    gfx::{
        resources::{
            global_bindings::GlobalBindings, layouts::BindingLayouts,
            texture_resource::TextureResource,
        },
        scene::{object::DrawObject, scene::Scene},
    },
};

use super::pipeline_manager::{PipelineConfig, PipelineManager};

pub const PHONG_PIPELINE: &str = "Phong";

const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

/// Owns the surface, device and everything needed to draw a [`Scene`]
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    pub pipeline_manager: PipelineManager,
    layouts: BindingLayouts,
    global_bindings: GlobalBindings,
}

impl RenderEngine {
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<RenderEngine, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or(RenderError::NoSurfaceFormat)?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: choose_present_mode(&surface_capabilities.present_modes, vsync),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "Surface configured: {}x{} {:?} {:?}",
            config.width,
            config.height,
            format,
            config.present_mode
        );

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let layouts = BindingLayouts::new(&device);
        let global_bindings = GlobalBindings::new(&device, &layouts.globals);

        let device: Arc<wgpu::Device> = device.into();
        let queue: Arc<wgpu::Queue> = queue.into();

        let mut pipeline_manager = PipelineManager::new(device.clone());
        pipeline_manager.load_shader("phong", include_str!("shader.wgsl"));
        pipeline_manager.register_pipeline(
            PHONG_PIPELINE,
            PipelineConfig::default_with_shader("phong")
                .with_label(PHONG_PIPELINE)
                .with_color_format(format)
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_bind_group_layouts(
                    layouts.as_array().into_iter().cloned().collect(),
                ),
        );
        pipeline_manager.create_all_pipelines()?;

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_texture,
            pipeline_manager,
            layouts,
            global_bindings,
        })
    }

    /// Uploads meshes, materials and textures of a freshly built scene
    pub fn prepare_scene(&self, scene: &mut Scene) {
        scene.init_gpu_resources(&self.device, &self.queue, &self.layouts);
    }

    /// Pushes camera, lights and object transforms to the GPU
    pub fn update(&mut self, scene: &mut Scene) {
        self.global_bindings
            .update(&self.queue, scene.global_uniforms());
        scene.sync_gpu(&self.queue);
    }

    /// Clears to black and draws every visible object.
    ///
    /// Surface errors are returned so the caller can reconfigure or quit.
    pub fn render_frame(&mut self, scene: &Scene) -> Result<(), wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(PHONG_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

                for object in scene.objects.iter().filter(|o| o.visible) {
                    render_pass.draw_object(object, scene.material_for(object), &scene.textures);
                }
            } else {
                log::error!("Pipeline '{}' is missing; nothing drawn", PHONG_PIPELINE);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Reapplies the current configuration after a lost or outdated surface
    pub fn reconfigure(&mut self) {
        self.resize(self.config.width, self.config.height);
    }

    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}

/// Fifo with vsync; otherwise the lowest-latency mode the surface offers
pub fn choose_present_mode(available: &[wgpu::PresentMode], vsync: bool) -> wgpu::PresentMode {
    if vsync {
        return wgpu::PresentMode::Fifo;
    }
    [wgpu::PresentMode::Immediate, wgpu::PresentMode::Mailbox]
        .into_iter()
        .find(|mode| available.contains(mode))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::PresentMode;

    #[test]
    fn test_vsync_always_uses_fifo() {
        assert_eq!(choose_present_mode(&[PresentMode::Immediate], true), PresentMode::Fifo);
    }

    #[test]
    fn test_unsynced_prefers_immediate() {
        let available = [PresentMode::Fifo, PresentMode::Mailbox, PresentMode::Immediate];
        assert_eq!(choose_present_mode(&available, false), PresentMode::Immediate);
        assert_eq!(
            choose_present_mode(&[PresentMode::Fifo, PresentMode::Mailbox], false),
            PresentMode::Mailbox
        );
        assert_eq!(choose_present_mode(&[PresentMode::Fifo], false), PresentMode::Fifo);
    }
}
