use std::path::Path;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};
use image::RgbaImage;
use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, Buffer, BufferUsages, IndexFormat, RenderPass,
    util::{BufferInitDescriptor, DeviceExt},
};

use crate::{
    error::RenderError,
    renderer::{BufferUsage, Renderer},
    texture::Texture,
    vertex::Vertex,
};

/// Unit quad with the texture mapped corner-to-corner: UVs equal the
/// positions, so (0,0) is the top-left of both the quad & the image
const QUAD_VERTICES: [Vertex; 4] = [
    Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0]),
    Vertex::new([1.0, 0.0, 0.0], [1.0, 0.0]),
    Vertex::new([1.0, 1.0, 0.0], [1.0, 1.0]),
    Vertex::new([0.0, 1.0, 0.0], [0.0, 1.0]),
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

/// Per-sprite shader inputs: the composed MVP matrix & the RGBA tint color
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SpriteUniform {
    pub mvp: [[f32; 4]; 4],
    pub color: [f32; 4],
}

/// Transform & color state of one sprite
///
/// The setters take raw UI-control values and map them the way the sliders
/// feed them in: color channels come in as 0–100 integers, position & scale
/// as raw integers, rotation as a float divided by 50. None of them validate
/// or clamp; out-of-range inputs pass straight through
pub struct Sprite {
    position: Vec3,
    rotation: f32,
    scale: Vec3,
    color: [f32; 4],
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: 0.0,
            scale: Vec3::ONE,
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

impl Sprite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Red channel from a 0–100 control value
    pub fn set_red(&mut self, v: i32) {
        self.color[0] = v as f32 / 100.0;
    }

    /// Green channel from a 0–100 control value
    pub fn set_green(&mut self, v: i32) {
        self.color[1] = v as f32 / 100.0;
    }

    /// Blue channel from a 0–100 control value
    pub fn set_blue(&mut self, v: i32) {
        self.color[2] = v as f32 / 100.0;
    }

    /// Alpha channel from a 0–100 control value
    pub fn set_alpha(&mut self, v: i32) {
        self.color[3] = v as f32 / 100.0;
    }

    pub fn set_pos_x(&mut self, v: i32) {
        self.position.x = v as f32;
    }

    pub fn set_pos_y(&mut self, v: i32) {
        self.position.y = v as f32;
    }

    pub fn set_scale_x(&mut self, v: i32) {
        self.scale.x = v as f32;
    }

    pub fn set_scale_y(&mut self, v: i32) {
        self.scale.y = v as f32;
    }

    /// Rotation about the Z axis from a raw control value; the angle in
    /// radians is `v / 50.0`, with no wraparound
    pub fn set_rotation_z(&mut self, v: f32) {
        self.rotation = v / 50.0;
    }

    /// Overwrites the x/y position, leaving z untouched
    pub fn update_position(&mut self, pos: Vec2) {
        self.position.x = pos.x;
        self.position.y = pos.y;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    /// Recomputes the model matrix as translate × rotate(about Z) × scale,
    /// in exactly that order
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_rotation_z(self.rotation)
            * Mat4::from_scale(self.scale)
    }

    /// Builds the shader uniform for this sprite under the given
    /// view-projection matrix
    pub fn uniform(&self, view_proj: Mat4) -> SpriteUniform {
        SpriteUniform {
            mvp: (view_proj * self.model_matrix()).to_cols_array_2d(),
            color: self.color,
        }
    }
}

/// GPU residency of a sprite: one vertex buffer, one index buffer, one
/// uniform buffer & bind group, and an optionally attached texture
///
/// All buffers are created once here and never recreated; wgpu releases
/// them when the mesh drops
pub struct SpriteMesh {
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    uniform_buffer: Buffer,
    uniform_bind_group: BindGroup,
    texture: Option<Texture>,
}

impl SpriteMesh {
    pub fn new(renderer: &Renderer) -> Self {
        let vertex_buffer = renderer
            .create_vertex_buffer(BufferUsage::Static, bytemuck::cast_slice(&QUAD_VERTICES));
        let index_buffer =
            renderer.create_index_buffer(BufferUsage::Static, bytemuck::cast_slice(&QUAD_INDICES));

        let uniform = SpriteUniform {
            mvp: Mat4::IDENTITY.to_cols_array_2d(),
            color: [1.0, 1.0, 1.0, 1.0],
        };
        let uniform_buffer = renderer.device().create_buffer_init(&BufferInitDescriptor {
            label: Some("Sprite Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniform),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let uniform_bind_group = renderer.device().create_bind_group(&BindGroupDescriptor {
            label: Some("Sprite Uniform Bind Group"),
            layout: &renderer.pipelines().uniform_layout,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            vertex_buffer,
            index_buffer,
            uniform_buffer,
            uniform_bind_group,
            texture: None,
        }
    }

    /// Attaches a texture, dropping any previously attached one
    ///
    /// The old GPU allocation is released exactly once, when the replaced
    /// value drops here
    pub fn set_texture(&mut self, texture: Texture) {
        self.texture = Some(texture);
    }

    /// Loads an image file and attaches it as this sprite's texture
    ///
    /// Returns the decoded pixels so the caller can show a preview.
    /// On error the previously attached texture is kept
    pub fn load_texture(
        &mut self,
        renderer: &Renderer,
        path: impl AsRef<Path>,
    ) -> Result<RgbaImage, RenderError> {
        let (texture, preview) = renderer.load_texture(path)?;
        self.texture = Some(texture);
        Ok(preview)
    }

    /// Detaches the current texture; drawing falls back to the renderer's
    /// white default
    pub fn clear_texture(&mut self) {
        self.texture = None;
    }

    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    /// Draws the sprite within an existing render pass
    ///
    /// Recomputes the MVP from the sprite state, uploads the uniform, binds
    /// the attached texture (or the white default) & issues the indexed draw
    pub fn draw<'rp>(
        &'rp self,
        renderer: &'rp Renderer,
        pass: &mut RenderPass<'rp>,
        sprite: &Sprite,
        view_proj: Mat4,
    ) {
        let uniform = sprite.uniform(view_proj);
        renderer
            .queue()
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));

        pass.set_pipeline(&renderer.pipelines().sprite);

        let texture = self.texture.as_ref().unwrap_or(renderer.default_texture());
        texture.bind(pass, 0);
        pass.set_bind_group(1, &self.uniform_bind_group, &[]);

        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), IndexFormat::Uint16);
        pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{vec2, vec3};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn model_matrix_is_translate_rotate_scale() {
        let mut sprite = Sprite::new();
        sprite.set_pos_x(10);
        sprite.set_pos_y(20);
        sprite.set_scale_x(2);
        sprite.set_scale_y(3);
        sprite.set_rotation_z(100.0);

        let expected = Mat4::from_translation(vec3(10.0, 20.0, 0.0))
            * Mat4::from_rotation_z(2.0)
            * Mat4::from_scale(vec3(2.0, 3.0, 1.0));
        assert_eq!(sprite.model_matrix(), expected);
    }

    #[test]
    fn transform_order_scales_before_rotating_before_translating() {
        let mut sprite = Sprite::new();
        sprite.set_pos_x(10);
        sprite.set_pos_y(20);
        sprite.set_scale_x(2);
        sprite.set_scale_y(2);
        // angle = v / 50 → a quarter turn
        sprite.set_rotation_z(50.0 * FRAC_PI_2);

        // (1,0): scale → (2,0), rotate 90° → (0,2), translate → (10,22)
        let p = sprite.model_matrix().transform_point3(vec3(1.0, 0.0, 0.0));
        assert!((p - vec3(10.0, 22.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn default_sprite_is_identity_white() {
        let sprite = Sprite::default();
        assert_eq!(sprite.model_matrix(), Mat4::IDENTITY);
        assert_eq!(sprite.color(), [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn color_channels_map_hundredths() {
        let mut sprite = Sprite::new();
        sprite.set_red(100);
        sprite.set_green(50);
        sprite.set_blue(25);
        sprite.set_alpha(0);
        assert_eq!(sprite.color(), [1.0, 0.5, 0.25, 0.0]);
    }

    #[test]
    fn out_of_range_control_values_pass_through() {
        // inputs outside 0–100 are not clamped; they produce out-of-range
        // channel values by design of the control mapping
        let mut sprite = Sprite::new();
        sprite.set_red(150);
        sprite.set_green(-50);
        assert_eq!(sprite.color()[0], 1.5);
        assert_eq!(sprite.color()[1], -0.5);
    }

    #[test]
    fn rotation_maps_fiftieths_without_wraparound() {
        let mut sprite = Sprite::new();
        sprite.set_rotation_z(100.0);
        assert_eq!(sprite.rotation(), 2.0);

        sprite.set_rotation_z(50_000.0);
        assert_eq!(sprite.rotation(), 1000.0);
    }

    #[test]
    fn repeated_rotation_input_is_idempotent() {
        let mut a = Sprite::new();
        let mut b = Sprite::new();
        a.set_rotation_z(42.0);
        b.set_rotation_z(42.0);
        b.set_rotation_z(42.0);
        assert_eq!(a.rotation(), b.rotation());
        assert_eq!(a.model_matrix(), b.model_matrix());
    }

    #[test]
    fn update_position_keeps_z() {
        let mut sprite = Sprite::new();
        sprite.update_position(vec2(5.0, 7.0));
        assert_eq!(sprite.position(), vec3(5.0, 7.0, 0.0));
    }

    #[test]
    fn red_sliders_yield_red_uniform() {
        // sliders at (r=100, g=0, b=0, a=100) must reach the shader as (1,0,0,1)
        let mut sprite = Sprite::new();
        sprite.set_red(100);
        sprite.set_green(0);
        sprite.set_blue(0);
        sprite.set_alpha(100);

        let uniform = sprite.uniform(Mat4::IDENTITY);
        assert_eq!(uniform.color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(uniform.mvp, sprite.model_matrix().to_cols_array_2d());
    }

    #[test]
    fn uniform_composes_view_projection_with_model() {
        let mut sprite = Sprite::new();
        sprite.set_pos_x(100);

        let view_proj = Mat4::orthographic_lh(0.0, 800.0, 600.0, 0.0, 0.0, 1000.0);
        let uniform = sprite.uniform(view_proj);
        let expected = view_proj * sprite.model_matrix();
        assert_eq!(uniform.mvp, expected.to_cols_array_2d());
    }

    #[test]
    fn quad_covers_unit_square_with_matching_uvs() {
        // UVs mirror the corner positions, so the full image maps onto the quad
        for vertex in QUAD_VERTICES {
            let v: [f32; 5] = bytemuck::cast(vertex);
            assert_eq!([v[3], v[4]], [v[0], v[1]]);
            assert_eq!(v[2], 0.0);
        }
        // two triangles sharing the top-left/bottom-right diagonal
        assert_eq!(QUAD_INDICES, [0, 1, 2, 2, 3, 0]);
    }
}
