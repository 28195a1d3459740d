use std::path::Path;

use image::RgbaImage;
use log::info;
use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindingResource, Device,
    Extent3d, Origin3d, Queue, RenderPass, TexelCopyBufferLayout, TexelCopyTextureInfo,
    TextureAspect, TextureDescriptor, TextureDimension, TextureFormat, TextureUsages,
};

use crate::error::RenderError;

/// A GPU texture that can be bound in shaders for rendering
///
/// Owns the underlying `wgpu::Texture` and its bind group; the GPU-side
/// allocation is released when this value drops
pub struct Texture {
    texture: wgpu::Texture,
    bind_group: BindGroup,
}

impl Texture {
    /// Creates a new texture from raw RGBA image data,
    /// uploads the data, & builds the bind group using the layout
    ///
    /// - `data`: Must be in tightly packed 8-bit RGBA format
    /// - `width`, `height`: Dimensions of the image in pixels
    pub fn from_bytes(
        device: &Device,
        queue: &Queue,
        bind_group_layout: &BindGroupLayout,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Self {
        let size = Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&TextureDescriptor {
            label: Some("Sprite Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: Origin3d::ZERO,
                aspect: TextureAspect::All,
            },
            data,
            TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&Default::default());
        let sampler = device.create_sampler(&Default::default());
        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("Sprite Texture Bind Group"),
            layout: bind_group_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::TextureView(&view),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            texture,
            bind_group,
        }
    }

    /// Loads a texture from an image file on disk
    ///
    /// Returns the GPU texture together with the decoded RGBA pixels, so the
    /// caller can hand the image to a preview widget without re-reading the file.
    /// I/O failures yield [`RenderError::TextureIo`], malformed image data
    /// yields [`RenderError::TextureDecode`]
    pub fn from_path(
        device: &Device,
        queue: &Queue,
        bind_group_layout: &BindGroupLayout,
        path: impl AsRef<Path>,
    ) -> Result<(Self, RgbaImage), RenderError> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|err| match &err {
                image::ImageError::IoError(_) => RenderError::TextureIo {
                    path: path.to_path_buf(),
                    source: err,
                },
                _ => RenderError::TextureDecode {
                    path: path.to_path_buf(),
                    source: err,
                },
            })?
            .to_rgba8();
        let (w, h) = img.dimensions();
        info!("loaded texture `{}` ({w}x{h})", path.display());

        let texture = Self::from_bytes(device, queue, bind_group_layout, &img, w, h);
        Ok((texture, img))
    }

    /// Creates a 1×1 white fallback texture
    ///
    /// Used when a sprite has no texture attached, so the tint color
    /// passes through unchanged
    pub fn create_default(device: &Device, queue: &Queue, layout: &BindGroupLayout) -> Self {
        Self::from_bytes(device, queue, layout, &[255u8, 255, 255, 255], 1, 1)
    }

    /// Returns the texture dimensions in pixels
    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }

    /// Binds this texture at the given index in the render pass
    ///
    /// - `index` must match the bind group index used in the pipeline layout
    pub fn bind<'rp>(&'rp self, pass: &mut RenderPass<'rp>, index: u32) {
        pass.set_bind_group(index, &self.bind_group, &[]);
    }
}
