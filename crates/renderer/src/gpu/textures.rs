use anyhow::Result;
use image::RgbaImage;

use super::context::GpuContext;
use super::mipmap::{mip_level_count, MipChainGenerator};

pub(crate) const PHOTO_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// One uploaded photo, sampled through its own bind group.
pub struct PhotoTexture {
    pub index: usize,
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
    pub mip_levels: u32,
}

impl PhotoTexture {
    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }
}

/// Shared sampler and layout for every photo texture of a mosaic.
pub struct PhotoBindings {
    pub layout: wgpu::BindGroupLayout,
    pub sampler: wgpu::Sampler,
}

impl PhotoBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("photo texture layout"),
            entries: &photo_layout_entries(),
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("photo sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self { layout, sampler }
    }
}

fn photo_layout_entries() -> [wgpu::BindGroupLayoutEntry; 2] {
    [
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
    ]
}

/// Level count to allocate for a photo, or one when mipmaps are off.
pub fn photo_mip_levels(width: u32, height: u32, mipmaps: bool) -> u32 {
    if mipmaps {
        mip_level_count(width, height)
    } else {
        1
    }
}

/// Uploads `image` as level 0 and, when `mips` is given, fills the rest of the chain.
pub fn upload_photo(
    context: &GpuContext,
    bindings: &PhotoBindings,
    mips: Option<&mut MipChainGenerator>,
    index: usize,
    image: &RgbaImage,
) -> Result<PhotoTexture> {
    let (width, height) = image.dimensions();
    context.check_texture_size(width, height)?;

    let mip_levels = photo_mip_levels(width, height, mips.is_some());
    let mut usage = wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST;
    if mip_levels > 1 {
        usage |= wgpu::TextureUsages::RENDER_ATTACHMENT;
    }
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = context.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("photo texture"),
        size,
        mip_level_count: mip_levels,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: PHOTO_TEXTURE_FORMAT,
        usage,
        view_formats: &[],
    });

    context.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        image.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );

    if let Some(generator) = mips {
        generator.generate(&context.device, &context.queue, &texture);
    }

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = context.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("photo bind group"),
        layout: &bindings.layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&bindings.sampler),
            },
        ],
    });

    tracing::trace!(index, width, height, mip_levels, "uploaded photo texture");
    Ok(PhotoTexture {
        index,
        texture,
        view,
        bind_group,
        mip_levels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_levels_respect_the_toggle() {
        assert_eq!(photo_mip_levels(300, 170, true), 9);
        assert_eq!(photo_mip_levels(300, 170, false), 1);
        assert_eq!(photo_mip_levels(1, 1, true), 1);
    }

    #[test]
    fn photo_layout_samples_in_fragment_stage() {
        let entries = photo_layout_entries();
        assert_eq!(entries[0].binding, 0);
        assert_eq!(entries[1].binding, 1);
        assert!(entries
            .iter()
            .all(|entry| entry.visibility == wgpu::ShaderStages::FRAGMENT));
    }
}
