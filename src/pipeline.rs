use wgpu::{
    BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType, BlendState,
    ColorTargetState, ColorWrites, Device, ErrorFilter, FragmentState, PipelineLayoutDescriptor,
    RenderPipeline, RenderPipelineDescriptor, SamplerBindingType, ShaderModule,
    ShaderModuleDescriptor, ShaderSource, ShaderStages, TextureFormat, TextureSampleType,
    TextureViewDimension, VertexState,
};

use crate::{error::RenderError, vertex::Vertex};

/// Blending mode applied to the sprite pipeline's color target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Blend {
    Opaque,
    #[default]
    Alpha,
}

impl Blend {
    pub(crate) fn state(self) -> Option<BlendState> {
        match self {
            Blend::Opaque => None,
            Blend::Alpha => Some(BlendState::ALPHA_BLENDING),
        }
    }
}

/// Contains the render pipeline and bind group layouts for [`Renderer`](crate::Renderer)
///
/// Centralizes GPU pipeline configuration, including:
/// - The sprite rendering pipeline (one textured quad per draw)
/// - Texture bind group layout (for sampling textures in shaders)
/// - Uniform bind group layout (for the per-sprite MVP matrix & color)
pub struct Pipelines {
    pub sprite: RenderPipeline,
    pub texture_layout: BindGroupLayout,
    pub uniform_layout: BindGroupLayout,
}

impl Pipelines {
    /// Creates the pipeline and bind group layouts for the given device and surface format
    ///
    /// Shader module and pipeline creation run inside validation error scopes;
    /// a malformed shader yields [`RenderError::ShaderCompile`] and a layout
    /// mismatch yields [`RenderError::PipelineLink`] instead of an uncaptured
    /// device error
    pub async fn new(
        device: &Device,
        surface_format: TextureFormat,
        blend: Blend,
    ) -> Result<Self, RenderError> {
        let texture_layout = create_texture_bind_group_layout(device);
        let uniform_layout = create_uniform_bind_group_layout(device);

        let shader = create_shader(device, include_str!("../shader.wgsl")).await?;

        device.push_error_scope(ErrorFilter::Validation);
        let sprite = create_sprite_pipeline(
            device,
            surface_format,
            blend,
            &shader,
            &texture_layout,
            &uniform_layout,
        );
        if let Some(err) = device.pop_error_scope().await {
            return Err(RenderError::PipelineLink {
                reason: err.to_string(),
            });
        }

        Ok(Self {
            sprite,
            texture_layout,
            uniform_layout,
        })
    }
}

/// Compiles a WGSL shader module from source
///
/// wgpu reports malformed WGSL through the device error scope; wrapping
/// module creation in one turns the failure into a returnable value
/// instead of an uncaptured device error
pub async fn create_shader(device: &Device, source: &str) -> Result<ShaderModule, RenderError> {
    device.push_error_scope(ErrorFilter::Validation);
    let module = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("Sprite Shader"),
        source: ShaderSource::Wgsl(source.into()),
    });
    match device.pop_error_scope().await {
        Some(err) => Err(RenderError::ShaderCompile {
            reason: err.to_string(),
        }),
        None => Ok(module),
    }
}

/// Creates the bind group layout for texture sampling
///
/// Defines two bindings:
/// - Binding 0: 2D texture (fragment shader)
/// - Binding 1: Sampler (fragment shader)
fn create_texture_bind_group_layout(device: &Device) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("Texture Bind Group Layout"),
        entries: &[
            BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Texture {
                    sample_type: TextureSampleType::Float { filterable: true },
                    view_dimension: TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 1,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Sampler(SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// Creates the bind group layout for the per-sprite uniform
///
/// One binding: a uniform buffer holding the MVP matrix (vertex shader)
/// and the RGBA tint color (fragment shader)
fn create_uniform_bind_group_layout(device: &Device) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("Sprite Uniform Bind Group Layout"),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStages::VERTEX_FRAGMENT,
            ty: BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

/// Creates the sprite rendering pipeline
///
/// Configured with:
/// - The requested blend mode ([`Blend::Alpha`] by default)
/// - Vertex shader transforms using the per-sprite MVP uniform
/// - Fragment shader samples the bound texture & multiplies by the tint color
/// - `Vertex` buffer layout from the vertex module
fn create_sprite_pipeline(
    device: &Device,
    surface_format: TextureFormat,
    blend: Blend,
    shader: &ShaderModule,
    texture_layout: &BindGroupLayout,
    uniform_layout: &BindGroupLayout,
) -> RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("Sprite Pipeline Layout"),
        bind_group_layouts: &[texture_layout, uniform_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("Sprite Pipeline"),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::desc()],
            compilation_options: Default::default(),
        },
        primitive: Default::default(),
        depth_stencil: None,
        multisample: Default::default(),
        fragment: Some(FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format: surface_format,
                blend: blend.state(),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_modes_map_to_color_target_state() {
        assert_eq!(Blend::Opaque.state(), None);
        assert_eq!(Blend::Alpha.state(), Some(BlendState::ALPHA_BLENDING));
        // sprites draw with alpha blending unless opted out
        assert_eq!(Blend::default(), Blend::Alpha);
    }
}
