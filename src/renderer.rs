use std::path::Path;

use image::RgbaImage;
use log::{info, warn};
use wgpu::{
    Buffer, BufferUsages, Color, CommandEncoder, Device, DeviceDescriptor, Instance, LoadOp,
    Operations, PresentMode, Queue, RenderPass, RenderPassColorAttachment, RenderPassDescriptor,
    RequestAdapterOptions, StoreOp, Surface, SurfaceConfiguration, SurfaceError, SurfaceTarget,
    SurfaceTexture, TextureFormat, TextureView, WindowHandle,
    util::{BufferInitDescriptor, DeviceExt},
};

use crate::{
    error::RenderError,
    pipeline::{Blend, Pipelines},
    texture::Texture,
};

/// Usage hint for vertex & index buffer allocation
///
/// `Static` buffers are filled once at creation; `Dynamic` buffers can be
/// rewritten later through the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    Static,
    Dynamic,
}

impl BufferUsage {
    pub(crate) fn flags(self, kind: BufferUsages) -> BufferUsages {
        match self {
            BufferUsage::Static => kind,
            BufferUsage::Dynamic => kind | BufferUsages::COPY_DST,
        }
    }
}

struct RenderTarget {
    surface: Surface<'static>,
    config: SurfaceConfiguration,
}

struct Gpu {
    device: Device,
    queue: Queue,
}

/// An in-flight frame: the acquired surface texture & the command encoder
/// recording into it
pub struct Frame {
    pub view: TextureView,
    pub encoder: CommandEncoder,
    surface_texture: SurfaceTexture,
}

/// Low-level GPU renderer built on `wgpu`
///
/// Handles the rendering pipeline, surface configuration, resources
/// (textures, buffers) & drawing
pub struct Renderer {
    gpu: Gpu,
    target: RenderTarget,
    pipelines: Pipelines,
    default_texture: Texture,
    clear_color: Color,
}

impl Renderer {
    /// Creates a new `Renderer` with a configured surface, pipeline & default resources
    ///
    /// Initializes `wgpu`, sets up an alpha-blended sprite pipeline & a 1×1
    /// white fallback texture. Every setup failure is surfaced as a
    /// [`RenderError`] rather than a panic
    pub async fn new(
        inner_width: u32,
        inner_height: u32,
        window: impl Into<SurfaceTarget<'static>> + WindowHandle,
    ) -> Result<Renderer, RenderError> {
        let instance = Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                // Force find adapter that can present to this surface
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await?;
        info!("adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                #[cfg(target_arch = "wasm32")]
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                ..Default::default()
            })
            .await?;

        // WebGPU throws error 'size is zero' if not set
        let (w, h) = (inner_width.max(1), inner_height.max(1));

        let mut surface_cfg = surface
            .get_default_config(&adapter, w, h)
            .ok_or(RenderError::SurfaceConfig)?;
        surface_cfg.present_mode = PresentMode::AutoVsync;
        surface.configure(&device, &surface_cfg);

        let pipelines = Pipelines::new(&device, surface_cfg.format, Blend::Alpha).await?;
        let default_texture = Texture::create_default(&device, &queue, &pipelines.texture_layout);

        Ok(Renderer {
            gpu: Gpu { device, queue },
            target: RenderTarget {
                surface,
                config: surface_cfg,
            },
            pipelines,
            default_texture,
            clear_color: Color::BLACK,
        })
    }

    pub fn device(&self) -> &Device {
        &self.gpu.device
    }

    pub fn queue(&self) -> &Queue {
        &self.gpu.queue
    }

    pub fn surface_format(&self) -> TextureFormat {
        self.target.config.format
    }

    pub(crate) fn pipelines(&self) -> &Pipelines {
        &self.pipelines
    }

    pub(crate) fn default_texture(&self) -> &Texture {
        &self.default_texture
    }

    /// Begins a new frame, returning the surface texture and command encoder
    ///
    /// Returns `None` if the surface is temporarily unavailable (lost,
    /// outdated); the frame is skipped and the next paint retries
    pub fn begin_frame(&mut self) -> Option<Frame> {
        let surface_texture = match self.target.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::OutOfMemory) => {
                panic!("Out of GPU memory!");
            }
            Err(err) => {
                warn!("skipping frame: {err}");
                return None;
            }
        };

        let view = surface_texture.texture.create_view(&Default::default());
        let encoder = self.gpu.device.create_command_encoder(&Default::default());

        Some(Frame {
            view,
            encoder,
            surface_texture,
        })
    }

    /// Begins a render pass that clears the frame to the current clear color
    pub fn begin_render_pass<'a>(
        &'a self,
        encoder: &'a mut CommandEncoder,
        view: &'a TextureView,
    ) -> RenderPass<'a> {
        encoder.begin_render_pass(&RenderPassDescriptor {
            color_attachments: &[Some(RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: Operations {
                    load: LoadOp::Clear(self.clear_color),
                    store: StoreOp::Store,
                },
            })],
            ..Default::default()
        })
    }

    /// Ends the frame by submitting commands and presenting
    pub fn end_frame(&mut self, frame: Frame) {
        self.gpu.queue.submit(Some(frame.encoder.finish()));
        frame.surface_texture.present();
    }

    /// Allocates a vertex buffer filled with the given bytes
    pub fn create_vertex_buffer(&self, usage: BufferUsage, contents: &[u8]) -> Buffer {
        self.gpu.device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Sprite Vertex Buffer"),
            contents,
            usage: usage.flags(BufferUsages::VERTEX),
        })
    }

    /// Allocates an index buffer filled with the given bytes
    pub fn create_index_buffer(&self, usage: BufferUsage, contents: &[u8]) -> Buffer {
        self.gpu.device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Sprite Index Buffer"),
            contents,
            usage: usage.flags(BufferUsages::INDEX),
        })
    }

    /// Loads a texture from an image file on disk
    ///
    /// Returns the GPU texture together with the decoded pixels for preview
    /// display
    pub fn load_texture(&self, path: impl AsRef<Path>) -> Result<(Texture, RgbaImage), RenderError> {
        Texture::from_path(
            &self.gpu.device,
            &self.gpu.queue,
            &self.pipelines.texture_layout,
            path,
        )
    }

    /// Creates a texture from raw RGBA bytes
    pub fn create_texture(&self, data: &[u8], w: u32, h: u32) -> Texture {
        Texture::from_bytes(
            &self.gpu.device,
            &self.gpu.queue,
            &self.pipelines.texture_layout,
            data,
            w,
            h,
        )
    }

    /// Resizes the surface & updates internal render targets
    pub fn resize(&mut self, w: u32, h: u32) {
        (self.target.config.width, self.target.config.height) = (w, h);
        self.target
            .surface
            .configure(&self.gpu.device, &self.target.config);
    }

    /// Returns the current surface dimensions (in pixels)
    pub fn surface_size(&self) -> (f32, f32) {
        (
            self.target.config.width as f32,
            self.target.config.height as f32,
        )
    }

    /// Sets the color used to clear the screen before drawing
    pub fn set_clear_color(&mut self, color: [f64; 4]) {
        self.clear_color = Color {
            r: color[0],
            g: color[1],
            b: color[2],
            a: color[3],
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_usage_hints_map_to_wgpu_flags() {
        assert_eq!(
            BufferUsage::Static.flags(BufferUsages::VERTEX),
            BufferUsages::VERTEX
        );
        assert_eq!(
            BufferUsage::Dynamic.flags(BufferUsages::VERTEX),
            BufferUsages::VERTEX | BufferUsages::COPY_DST
        );
        assert_eq!(
            BufferUsage::Static.flags(BufferUsages::INDEX),
            BufferUsages::INDEX
        );
    }
}
