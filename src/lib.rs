pub mod camera;
pub mod error;
pub mod pipeline;
pub mod sprite;
pub mod texture;
pub mod vertex;

mod renderer;

pub use glam::{Mat4, Vec2, Vec3, vec2, vec3};
pub use wgpu::{Device, Queue, RenderPass, TextureFormat};

pub use camera::Camera;
pub use error::RenderError;
pub use renderer::{BufferUsage, Frame, Renderer};
pub use sprite::{Sprite, SpriteMesh, SpriteUniform};
pub use texture::Texture;
