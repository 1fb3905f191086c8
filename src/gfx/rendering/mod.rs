// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! Surface and device setup, the Phong pipeline, and per-frame drawing.

pub mod pipeline_manager;
pub mod render_engine;

// Re-export main types
pub use pipeline_manager::{PipelineConfig, PipelineManager};
pub use render_engine::{RenderEngine, PHONG_PIPELINE};
