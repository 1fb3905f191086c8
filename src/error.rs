//! Error types for the Orrery renderer
//!
//! Library code returns these typed errors; the binary and the event loop
//! wrap them with `anyhow` context at the application boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Precondition failures of the smooth-normal pass.
///
/// Every variant is raised before the vertex buffer is written to, so a
/// failed call leaves the caller's buffer exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalError {
    #[error("vertex stride {stride} cannot hold a 3-float position")]
    InvalidStride { stride: usize },

    #[error("normal offset {normal_offset} overlaps the position at the start of each record")]
    NormalOverlapsPosition { normal_offset: usize },

    #[error("normal at offset {normal_offset} does not fit in a record of stride {stride}")]
    NormalOutOfRecord { normal_offset: usize, stride: usize },

    #[error("vertex buffer length {len} is not a multiple of stride {stride}")]
    RaggedVertexBuffer { len: usize, stride: usize },

    #[error("index buffer length {len} is not a multiple of 3")]
    IncompleteTriangle { len: usize },

    #[error("triangle {triangle} references vertex {index}, but the buffer only holds {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },
}

/// Failures while loading textures and models from disk.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to decode texture '{path}': {source}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to load model '{path}': {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("model '{path}' contains no meshes")]
    EmptyModel { path: PathBuf },

    #[error("invalid mesh data: {0}")]
    Mesh(#[from] NormalError),
}

/// Scene graph construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("parent node {0} does not exist")]
    UnknownNode(usize),
}

/// Configuration loading and saving errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file '{path}' is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// GPU initialisation errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,

    #[error("pipeline '{0}' could not be created")]
    Pipeline(String),
}
