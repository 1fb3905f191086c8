//! # Graphics Module
//!
//! Everything between mesh data and pixels: CPU geometry, the scene graph,
//! GPU resources, the fly camera and the Phong renderer.
//!
//! ## Architecture Overview
//!
//! - **Geometry** ([`geometry`]) - Interleaved meshes and smooth normals
//! - **Scene Management** ([`scene`]) - Node hierarchy, objects, lights and clock
//! - **Resource Management** ([`resources`]) - Materials, textures and uniforms
//! - **Camera System** ([`camera`]) - First-person fly camera
//! - **Rendering Pipeline** ([`rendering`]) - Surface setup and per-frame drawing
//!
//! ## Usage
//!
//! ```no_run
//! use orrery::{config::OrreryConfig, gfx::scene::layout::planet_system};
//!
//! let config = OrreryConfig::default();
//! let scene = planet_system(&config, 16.0 / 9.0).unwrap();
//! // The render engine uploads it once a window exists:
//! // render_engine.prepare_scene(&mut scene);
//! ```

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::FlyCamera;
pub use rendering::RenderEngine;
