//! # Scene Management Module
//!
//! The transform hierarchy, the objects bound to it, and the lights and
//! camera that go with them.
//!
//! ## Key Components
//!
//! - [`Scene`] - Owns the graph, objects, materials, textures, lights and camera
//! - [`SceneGraph`] - Parent/child transform composition
//! - [`Object`] - GPU meshes bound to a graph node with a material and texture
//! - [`Vertex3D`] - GPU vertex with position, texture coordinates and normal
//!
//! ## Usage
//!
//! ```no_run
//! use orrery::config::OrreryConfig;
//! use orrery::gfx::scene::layout::planet_system;
//!
//! let mut scene = planet_system(&OrreryConfig::default(), 16.0 / 9.0).unwrap();
//! scene.update(1.0 / 60.0, false);
//! ```

pub mod graph;
pub mod layout;
pub mod model;
pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use graph::{NodeId, SceneGraph, TransformOp};
pub use object::{DrawObject, Mesh, Object};
pub use scene::{Scene, SceneClock};
pub use vertex::Vertex3D;
