use anyhow::{Context, Result};
use mosaic::{Mosaic, MosaicParams, ViewTransform, Viewport};

use crate::batch::PhotoBatch;
use crate::types::RendererConfig;

use super::buffers::{batch_position, join_instances, MosaicBuffers, MosaicInstance};
use super::context::GpuContext;
use super::mipmap::MipChainGenerator;
use super::textures::{upload_photo, PhotoBindings, PhotoTexture};

/// Counters describing what a [`GpuMosaic`] holds on the device.
#[derive(Debug, Clone, PartialEq)]
pub struct MosaicSummary {
    pub adapter: String,
    pub photos: usize,
    pub cells: usize,
    pub mip_levels: Vec<u32>,
    pub vertex_bytes: usize,
    pub index_bytes: usize,
    pub size_bytes: usize,
    pub viewport: Viewport,
}

/// A laid-out mosaic with its photos, geometry and transforms resident on the GPU.
pub struct GpuMosaic {
    context: GpuContext,
    mips: MipChainGenerator,
    bindings: PhotoBindings,
    textures: Vec<PhotoTexture>,
    mosaic: Mosaic,
    view: ViewTransform,
    buffers: MosaicBuffers,
}

impl GpuMosaic {
    /// Uploads every photo of `batch`, lays the batch out for `viewport` and
    /// uploads the emitted buffers.
    pub fn new(
        context: GpuContext,
        config: &RendererConfig,
        batch: &PhotoBatch,
        params: MosaicParams,
        viewport: Viewport,
        view: ViewTransform,
    ) -> Result<Self> {
        let mut mips = MipChainGenerator::new();
        let bindings = PhotoBindings::new(&context.device);

        let mut textures = Vec::with_capacity(batch.len());
        for photo in batch.photos() {
            let generator = config.mipmaps.then_some(&mut mips);
            let texture = upload_photo(&context, &bindings, generator, photo.index, &photo.image)
                .with_context(|| format!("failed to upload {}", photo.path.display()))?;
            textures.push(texture);
        }

        let mosaic = Mosaic::new(batch.layout_photos()?, params, viewport)
            .context("failed to lay out photo batch")?;
        let buffers = MosaicBuffers::upload(&context.device, mosaic.buffers(), &mosaic.transforms(&view));

        tracing::info!(
            photos = textures.len(),
            cells = mosaic.buffers().len(),
            width = viewport.width,
            height = viewport.height,
            "mosaic resident on GPU"
        );

        Ok(Self {
            context,
            mips,
            bindings,
            textures,
            mosaic,
            view,
            buffers,
        })
    }

    /// Relays out the batch for `viewport` and replaces the geometry buffers.
    ///
    /// Textures are kept. On error the previous layout and buffers stay valid.
    pub fn resize(&mut self, viewport: Viewport) -> Result<()> {
        if viewport == self.mosaic.viewport() {
            return Ok(());
        }
        self.mosaic
            .resize(viewport)
            .with_context(|| format!("failed to relayout for {}x{}", viewport.width, viewport.height))?;
        self.buffers = MosaicBuffers::upload(
            &self.context.device,
            self.mosaic.buffers(),
            &self.mosaic.transforms(&self.view),
        );
        Ok(())
    }

    /// Replaces the shared view and rewrites every slot transform.
    pub fn set_view(&mut self, view: ViewTransform) {
        self.view = view;
        let transforms = self.mosaic.transforms(&self.view);
        self.buffers.write_transforms(&self.context.queue, &transforms);
    }

    /// Regenerates the mip chain of every texture that carries one.
    pub fn regenerate_mips(&mut self) {
        for texture in &self.textures {
            if texture.mip_levels > 1 {
                self.mips
                    .generate(&self.context.device, &self.context.queue, &texture.texture);
            }
        }
    }

    pub fn instances(&self) -> Vec<MosaicInstance> {
        let slots = self.mosaic.slots(&self.view);
        join_instances(&slots, |photo| {
            batch_position(&self.textures, photo, |texture| texture.index)
        })
    }

    pub fn summary(&self) -> MosaicSummary {
        let emitted = self.mosaic.buffers();
        MosaicSummary {
            adapter: self.context.adapter_profile.name.clone(),
            photos: self.textures.len(),
            cells: emitted.len(),
            mip_levels: self.textures.iter().map(|texture| texture.mip_levels).collect(),
            vertex_bytes: emitted.vertex_bytes().len(),
            index_bytes: emitted.index_bytes().len(),
            size_bytes: emitted.size_bytes().len(),
            viewport: self.mosaic.viewport(),
        }
    }

    pub fn mosaic(&self) -> &Mosaic {
        &self.mosaic
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn buffers(&self) -> &MosaicBuffers {
        &self.buffers
    }

    pub fn textures(&self) -> &[PhotoTexture] {
        &self.textures
    }

    pub fn photo_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bindings.layout
    }

    pub fn context(&self) -> &GpuContext {
        &self.context
    }
}
