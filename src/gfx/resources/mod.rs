// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Handles textures, materials, lights, and bind groups for rendering.

pub mod global_bindings;
pub mod layouts;
pub mod lights;
pub mod material;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{GlobalBindings, GlobalUBOContent};
pub use layouts::BindingLayouts;
pub use lights::{DirectionalLight, PointLight, MAX_POINT_LIGHTS};
pub use material::{Material, MaterialId, MaterialManager};
pub use texture_resource::{TextureId, TextureLibrary, TextureResource};
