use std::borrow::Cow;

use image::RgbaImage;
use image::imageops::{self, FilterType};

/// Bind group layout for a sampled texture (group 1 of the mesh program).
#[derive(Debug)]
pub struct TextureLayout(wgpu::BindGroupLayout);

impl TextureLayout {
    pub fn new(device: &wgpu::Device) -> Self {
        Self(device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("prism texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        }))
    }

    #[inline]
    pub fn raw(&self) -> &wgpu::BindGroupLayout {
        &self.0
    }
}

/// A 2D RGBA texture with its full mip chain, sampler and bind group.
///
/// Magnification and minification filter linearly; the mip level is picked
/// nearest.
#[derive(Debug)]
pub struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    bind_group: wgpu::BindGroup,
}

impl GpuTexture {
    /// Uploads `image` and every mip level derived from it.
    ///
    /// Images larger than the device's 2D texture limit are downscaled to
    /// fit, keeping their aspect ratio.
    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &TextureLayout,
        label: &str,
        image: &RgbaImage,
    ) -> Self {
        let max_dim = device.limits().max_texture_dimension_2d;
        let image = fit_within(image, max_dim);
        if let Cow::Owned(fitted) = &image {
            log::warn!(
                "texture `{label}` is larger than the device limit of {max_dim}px; downscaled to {}x{}",
                fitted.width(),
                fitted.height()
            );
        }

        let levels = mip_chain(&image);
        let size = wgpu::Extent3d {
            width: image.width().max(1),
            height: image.height().max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: levels.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, pixels) in levels.iter().enumerate() {
            let (w, h) = pixels.dimensions();
            if w == 0 || h == 0 {
                continue;
            }
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                pixels.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * w),
                    rows_per_image: Some(h),
                },
                wgpu::Extent3d {
                    width: w,
                    height: h,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            // mipmap_filter stays at its default (nearest level).
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: layout.raw(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        log::debug!(
            "uploaded texture `{label}` {}x{} ({} mip levels)",
            size.width,
            size.height,
            levels.len()
        );

        Self {
            texture,
            view,
            sampler,
            bind_group,
        }
    }

    /// 1x1 opaque white; what untextured draws sample.
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue, layout: &TextureLayout) -> Self {
        let pixel = RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        Self::from_rgba(device, queue, layout, "prism white texture", &pixel)
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }

    #[inline]
    pub fn mip_level_count(&self) -> u32 {
        self.texture.mip_level_count()
    }

    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    #[inline]
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    #[inline]
    pub(crate) fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Downscales `image` so neither side exceeds `max_dim`, keeping the
/// aspect ratio. Images that already fit are borrowed unchanged.
pub(crate) fn fit_within(image: &RgbaImage, max_dim: u32) -> Cow<'_, RgbaImage> {
    let (w, h) = image.dimensions();
    let largest = w.max(h);
    let max_dim = max_dim.max(1);
    if largest <= max_dim {
        return Cow::Borrowed(image);
    }

    let scale = |side: u32| ((u64::from(side) * u64::from(max_dim)) / u64::from(largest)).max(1) as u32;
    Cow::Owned(imageops::resize(image, scale(w), scale(h), FilterType::Triangle))
}

/// Levels in a full chain down to 1x1.
pub(crate) fn mip_level_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    u32::BITS - largest.leading_zeros()
}

/// Level 0 followed by successive halvings (triangle filter).
pub(crate) fn mip_chain(base: &RgbaImage) -> Vec<RgbaImage> {
    let (w, h) = base.dimensions();
    let count = mip_level_count(w, h);

    let mut levels = Vec::with_capacity(count as usize);
    levels.push(base.clone());
    for level in 1..count {
        let lw = (w >> level).max(1);
        let lh = (h >> level).max(1);
        let Some(prev) = levels.last() else { break };
        let next = imageops::resize(prev, lw, lh, FilterType::Triangle);
        levels.push(next);
    }
    levels
}
