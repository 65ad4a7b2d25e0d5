/// A single acquired swapchain frame.
///
/// Holding the surface texture blocks acquisition of the next frame, so this
/// must be handed back to [`Gpu::submit`](super::Gpu::submit) promptly.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
