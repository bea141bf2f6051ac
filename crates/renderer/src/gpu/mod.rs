//! Headless GPU side of the mosaic.
//!
//! - `context` acquires an adapter, device and queue without a surface.
//! - `mipmap` fills mip chains with one downsampling pass per level.
//! - `textures` uploads decoded photos and binds them for sampling.
//! - `buffers` mirrors the emitted geometry and per-slot transforms on the device.
//! - `state` glues everything together behind [`GpuMosaic`].

mod buffers;
mod context;
mod mipmap;
mod state;
mod textures;

pub use buffers::{
    join_instances, vertex_layout, MosaicBuffers, MosaicInstance, CELL_SIZE_STRIDE, TRANSFORM_STRIDE,
};
pub use context::GpuContext;
pub use mipmap::{mip_chain, mip_level_count, mip_level_size, MipChainGenerator};
pub use state::{GpuMosaic, MosaicSummary};
pub use textures::{photo_mip_levels, upload_photo, PhotoBindings, PhotoTexture};
