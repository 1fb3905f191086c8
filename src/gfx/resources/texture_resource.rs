//! Texture resource management for wgpu
//!
//! GPU textures, views and samplers, plus the depth buffer used by the
//! main pass. Colour textures are decoded from disk with the `image` crate.

use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::{
    error::AssetError,
    wgpu_utils::{BindGroupBuilder, BindGroupLayoutWithDesc},
};

/// GPU texture resource containing texture, view, and sampler
#[derive(Clone)]
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl TextureResource {
    /// Standard depth buffer format used throughout the engine
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Creates a depth texture matching the surface configuration
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Uploads RGBA8 pixels as a texture with a repeating sampler
    ///
    /// Texels are stored as plain `Rgba8Unorm`; lighting works on the raw
    /// image values and the surface is non-sRGB as well.
    ///
    /// # Arguments
    /// * `data` - Raw RGBA8 pixel data (4 bytes per pixel)
    /// * `filter_mode` - Nearest for sharp texels, Linear for smooth
    pub fn create_from_rgba_data_with_filter(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
        width: u32,
        height: u32,
        label: &str,
        filter_mode: wgpu::FilterMode,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: filter_mode,
            min_filter: filter_mode,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Uploads a decoded image with linear filtering
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        label: &str,
    ) -> Self {
        let (width, height) = image.dimensions();
        Self::create_from_rgba_data_with_filter(
            device,
            queue,
            image.as_raw(),
            width,
            height,
            label,
            wgpu::FilterMode::Linear,
        )
    }

    /// Decodes an image file and uploads it
    pub fn from_path(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
    ) -> Result<Self, AssetError> {
        let image = load_image(path)?;
        Ok(Self::from_image(device, queue, &image, &path.display().to_string()))
    }
}

/// Decodes an image file into RGBA8 pixels.
pub fn load_image(path: &Path) -> Result<RgbaImage, AssetError> {
    let image = image::open(path).map_err(|source| AssetError::Texture {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgba8())
}

/// 1x1 opaque white, used where a mesh has no diffuse map
pub fn white_image() -> RgbaImage {
    RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]))
}

/// Handle into a [`TextureLibrary`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(usize);

impl TextureId {
    /// The built-in white texture
    pub const WHITE: Self = Self(0);
}

struct TextureSlot {
    label: String,
    source: Option<PathBuf>,
    image: RgbaImage,
    gpu: Option<(TextureResource, wgpu::BindGroup)>,
}

/// Decoded textures, uploaded once the GPU is available
///
/// Slot 0 always holds the white fallback texture. Loading the same path
/// twice returns the existing id.
pub struct TextureLibrary {
    slots: Vec<TextureSlot>,
}

impl Default for TextureLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureLibrary {
    pub fn new() -> Self {
        Self {
            slots: vec![TextureSlot {
                label: "white".to_string(),
                source: None,
                image: white_image(),
                gpu: None,
            }],
        }
    }

    /// Decodes `path` and registers it.
    pub fn load(&mut self, path: &Path) -> Result<TextureId, AssetError> {
        if let Some(index) = self
            .slots
            .iter()
            .position(|slot| slot.source.as_deref() == Some(path))
        {
            return Ok(TextureId(index));
        }

        let image = load_image(path)?;
        log::info!(
            "Loaded texture '{}' ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(self.insert(&path.display().to_string(), Some(path.to_path_buf()), image))
    }

    /// Like [`Self::load`], but falls back to white with a warning.
    pub fn load_or_white(&mut self, path: &Path) -> TextureId {
        match self.load(path) {
            Ok(id) => id,
            Err(err) => {
                log::warn!("{}; using a plain white texture instead", err);
                TextureId::WHITE
            }
        }
    }

    /// Registers already decoded pixels
    pub fn add_image(&mut self, label: &str, image: RgbaImage) -> TextureId {
        self.insert(label, None, image)
    }

    fn insert(&mut self, label: &str, source: Option<PathBuf>, image: RgbaImage) -> TextureId {
        self.slots.push(TextureSlot {
            label: label.to_string(),
            source,
            image,
            gpu: None,
        });
        TextureId(self.slots.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn image(&self, id: TextureId) -> Option<&RgbaImage> {
        self.slots.get(id.0).map(|slot| &slot.image)
    }

    /// Uploads every texture that is not on the GPU yet
    pub fn upload_all(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
    ) {
        for slot in self.slots.iter_mut().filter(|slot| slot.gpu.is_none()) {
            let resource = TextureResource::from_image(device, queue, &slot.image, &slot.label);
            let bind_group = BindGroupBuilder::new(layout)
                .texture(&resource.view)
                .sampler(&resource.sampler)
                .create(device, &format!("Texture Bind Group: {}", slot.label));
            slot.gpu = Some((resource, bind_group));
        }
    }

    /// Bind group for `id`, falling back to white for unknown ids
    pub fn bind_group(&self, id: TextureId) -> Option<&wgpu::BindGroup> {
        self.slots
            .get(id.0)
            .or_else(|| self.slots.first())
            .and_then(|slot| slot.gpu.as_ref())
            .map(|(_, bind_group)| bind_group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_starts_with_white() {
        let library = TextureLibrary::new();
        assert_eq!(library.len(), 1);

        let white = library.image(TextureId::WHITE).unwrap();
        assert_eq!(white.dimensions(), (1, 1));
        assert_eq!(white.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_missing_file_falls_back_to_white() {
        let mut library = TextureLibrary::new();
        let id = library.load_or_white(Path::new("does/not/exist.png"));

        assert_eq!(id, TextureId::WHITE);
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_image(Path::new("nowhere/container.png")).unwrap_err();
        match err {
            AssetError::Texture { path, .. } => {
                assert_eq!(path, PathBuf::from("nowhere/container.png"))
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_added_images_get_fresh_ids() {
        let mut library = TextureLibrary::new();
        let a = library.add_image("a", white_image());
        let b = library.add_image("b", white_image());

        assert_ne!(a, b);
        assert_ne!(a, TextureId::WHITE);
        assert_eq!(library.len(), 3);
    }
}
