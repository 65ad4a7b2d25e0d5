//! GPU rendering subsystem.
//!
//! One shader program draws every mesh: positions in logical pixels, a
//! per-vertex color and a texture coordinate sampled from a bound texture.
//!
//! Convention:
//! - CPU geometry is in logical pixels (top-left origin, +Y down).
//! - The vertex stage converts to NDC using a viewport uniform (group 0).
//! - The texture and its sampler live in group 1.

mod ctx;
mod mesh;
mod mesh_renderer;
mod overlay;
mod shader;
mod texture;

pub use ctx::{RenderCtx, RenderTarget, ViewportUniform};
pub use mesh::{DynamicMesh, GpuMesh, Mesh, MeshError};
pub use mesh_renderer::{MeshDraw, MeshRenderer};
pub use overlay::slider_overlay;
pub use shader::{
    compile, link, CompiledShader, ProgramModules, ShaderBlock, ShaderDocument, ShaderError,
    ShaderKind, ShaderProgram, FRAGMENT_SHADER_TYPE, VERTEX_SHADER_TYPE,
};
pub use texture::{GpuTexture, TextureLayout};
