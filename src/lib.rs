// src/lib.rs
//! Orrery
//!
//! A small real-time 3D scene built on wgpu and winit: textured cubes and an
//! imported planet orbit a moving pivot under Phong lighting. Mesh normals are
//! smoothed per vertex by [`gfx::geometry::compute_smooth_normals`].

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::{run, OrreryApp};
pub use config::OrreryConfig;
pub use gfx::geometry::compute_smooth_normals;
