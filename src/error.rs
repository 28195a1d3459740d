use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by renderer setup and resource loading
///
/// Shader and pipeline validation failures are reported through wgpu error
/// scopes instead of the uncaptured-error handler, so callers can decide
/// whether a bad shader is fatal
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create rendering surface")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter found")]
    AdapterNotFound(#[from] wgpu::RequestAdapterError),

    #[error("failed to acquire GPU device")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("surface is not supported by the selected adapter")]
    SurfaceConfig,

    #[error("shader compilation failed: {reason}")]
    ShaderCompile { reason: String },

    #[error("pipeline creation failed: {reason}")]
    PipelineLink { reason: String },

    #[error("failed to read texture `{path}`")]
    TextureIo {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to decode texture `{path}`")]
    TextureDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
