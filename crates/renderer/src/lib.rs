//! GPU upload path for waterfall photo mosaics.
//!
//! ```text
//!   paths ──▶ PhotoBatch::load ──▶ Mosaic::new ──▶ GpuMosaic
//!                 (barrier)          (layout)        │ textures + mips
//!                                                    └ vertex/index/size/transform buffers
//! ```
//!
//! Nothing here owns a window; callers bring their own surface and draw the
//! [`MosaicInstance`] list with the buffers exposed by [`GpuMosaic`].

mod batch;
mod compile;
mod gpu;
mod types;

pub use batch::{probe_photos, LoadedPhoto, PhotoBatch};
pub use gpu::{
    join_instances, mip_chain, mip_level_count, mip_level_size, photo_mip_levels, upload_photo,
    vertex_layout, GpuContext, GpuMosaic, MipChainGenerator, MosaicBuffers, MosaicInstance,
    MosaicSummary, PhotoBindings, PhotoTexture, CELL_SIZE_STRIDE, TRANSFORM_STRIDE,
};
pub use types::{AdapterProfile, GpuMemoryMode, GpuPowerPreference, RendererConfig};
