use bytemuck::{Pod, Zeroable};

use crate::coords::Viewport;

/// Per-frame view of the device handed to renderers.
///
/// `viewport` is in logical pixels, the space mesh positions are given in.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    pub viewport: Viewport,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        viewport: Viewport,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            viewport,
        }
    }

    /// Uniform block mapping logical pixels to clip space for this frame.
    #[inline]
    pub fn viewport_uniform(&self) -> ViewportUniform {
        ViewportUniform::new(self.viewport)
    }
}

/// Layout of the `viewport` uniform read by the mesh vertex shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ViewportUniform {
    pub size: [f32; 2],
    _pad: [f32; 2],
}

impl ViewportUniform {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// Degenerate sizes are clamped to one pixel so the shader never divides by zero.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            size: [viewport.width.max(1.0), viewport.height.max(1.0)],
            _pad: [0.0; 2],
        }
    }
}

/// Encoder and swapchain view one frame records into.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self { encoder, color_view }
    }

    /// Opens a single-attachment pass on the color view.
    ///
    /// `LoadOp::Clear` starts the frame; later passes use `LoadOp::Load` to
    /// draw on top.
    pub fn begin_pass(&mut self, label: &str, load: wgpu::LoadOp<wgpu::Color>) -> wgpu::RenderPass<'_> {
        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_uniform_is_sixteen_bytes() {
        assert_eq!(ViewportUniform::SIZE, 16);
    }

    #[test]
    fn viewport_uniform_carries_logical_size() {
        let u = ViewportUniform::new(Viewport::new(640.0, 480.0));
        assert_eq!(u.size, [640.0, 480.0]);
    }

    #[test]
    fn minimized_viewport_is_clamped_to_one_pixel() {
        let u = ViewportUniform::new(Viewport::new(0.0, -3.0));
        assert_eq!(u.size, [1.0, 1.0]);
    }
}
