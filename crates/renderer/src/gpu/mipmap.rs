//! Mip chain generation by repeated downsampling passes.
//!
//! Level `n + 1` is rendered from level `n` with a linear sampler, one render
//! pass per level, all recorded on one encoder so each pass sees the previous
//! level complete. Pipelines and samplers are cached per texture format on the
//! [`MipChainGenerator`] that owns them.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use crate::compile::{compile_blit_fragment_shader, compile_blit_vertex_shader};

/// Formats kept warm before the oldest pipeline is dropped.
const MAX_CACHED_FORMATS: usize = 4;

/// Number of levels in a full chain: `1 + floor(log2(max(width, height)))`.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    32 - largest.leading_zeros()
}

/// Dimensions of `level`, never smaller than one texel per axis.
pub fn mip_level_size(width: u32, height: u32, level: u32) -> (u32, u32) {
    let shrink = |value: u32| value.checked_shr(level).unwrap_or(0).max(1);
    (shrink(width), shrink(height))
}

/// Every level's dimensions, base first, ending at 1×1.
pub fn mip_chain(width: u32, height: u32) -> Vec<(u32, u32)> {
    (0..mip_level_count(width, height))
        .map(|level| mip_level_size(width, height, level))
        .collect()
}

struct MipPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl MipPipeline {
    fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("mip blit layout"),
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
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mip blit pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_module = compile_blit_vertex_shader(device);
        let fragment_module = compile_blit_fragment_shader(device);

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mip blit pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some("main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("mip blit sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            pipeline,
            bind_group_layout,
            sampler,
        }
    }
}

/// Map with a fixed capacity; the oldest insertion is evicted first.
struct BoundedCache<K, V> {
    capacity: usize,
    entries: HashMap<K, V>,
    order: VecDeque<K>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Copy + Eq + Hash + std::fmt::Debug,
{
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn get_or_insert_with(&mut self, key: K, build: impl FnOnce() -> V) -> &V {
        if !self.entries.contains_key(&key) {
            while self.entries.len() >= self.capacity {
                let Some(oldest) = self.order.pop_front() else {
                    break;
                };
                self.entries.remove(&oldest);
                tracing::debug!(?oldest, "evicted cached entry");
            }
            self.entries.insert(key, build());
            self.order.push_back(key);
        }
        &self.entries[&key]
    }

    fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Source and target level of every downsampling pass, in submission order.
fn blit_passes(levels: u32) -> impl Iterator<Item = (u32, u32)> {
    (1..levels).map(|target| (target - 1, target))
}

/// Owns the per-format downsampling pipelines for one device.
pub struct MipChainGenerator {
    cache: BoundedCache<wgpu::TextureFormat, MipPipeline>,
}

impl Default for MipChainGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MipChainGenerator {
    pub fn new() -> Self {
        Self::with_capacity(MAX_CACHED_FORMATS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: BoundedCache::new(capacity),
        }
    }

    pub fn cached_formats(&self) -> usize {
        self.cache.len()
    }

    pub fn is_cached(&self, format: wgpu::TextureFormat) -> bool {
        self.cache.contains(&format)
    }

    /// Fills levels `1..` of `texture` from level 0.
    ///
    /// The texture must be a 2D, renderable and sampleable texture
    /// (`RENDER_ATTACHMENT | TEXTURE_BINDING`). Only the levels it was
    /// allocated with are written.
    pub fn generate(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, texture: &wgpu::Texture) {
        let (width, height) = (texture.width(), texture.height());
        let allocated = texture.mip_level_count();
        let wanted = mip_level_count(width, height);
        if allocated < wanted {
            tracing::warn!(
                allocated,
                wanted,
                width,
                height,
                "texture has a truncated mip chain; generating allocated levels only"
            );
        }
        let levels = allocated.min(wanted);
        if levels <= 1 {
            return;
        }

        let format = texture.format();
        let mip = self.cache.get_or_insert_with(format, || {
            tracing::debug!(?format, "building mip pipeline");
            MipPipeline::new(device, format)
        });
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("mip chain encoder"),
        });

        let views: Vec<wgpu::TextureView> = (0..levels)
            .map(|level| {
                texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some("mip level view"),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    base_mip_level: level,
                    mip_level_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();

        for (source, target) in blit_passes(levels) {
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("mip blit bind group"),
                layout: &mip.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&views[source as usize]),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&mip.sampler),
                    },
                ],
            });

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("mip blit pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &views[target as usize],
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&mip.pipeline);
            render_pass.set_bind_group(0, &bind_group, &[]);
            render_pass.draw(0..4, 0..1);
        }

        queue.submit(std::iter::once(encoder.finish()));
        tracing::trace!(width, height, levels, "generated mip chain");
    }
}
