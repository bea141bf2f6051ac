//! Waterfall photo mosaic layout and buffer packing.
//!
//! A batch of photos is arranged in two phases and then flattened for the GPU:
//!
//! ```text
//!   Vec<Photo> ──▶ seed_columns ──▶ pack_remaining ──▶ GridLayout ──▶ emit
//!   (sized)        centre-out row    shortest column               │
//!                                                                  ▼
//!                         vertices / indices / sizes / EmissionSlot per cell
//! ```
//!
//! [`Mosaic`] wraps the whole pipeline: it owns the batch, re-sizes photos for
//! the viewport, rebuilds the layout on every resize and produces the joined
//! per-slot records ([`MosaicSlot`]) a renderer binds transforms and textures
//! from.

mod emit;
mod grid;
mod photo;
mod seed;
mod transform;
mod waterfall;

pub use emit::{
    emit, CellSize, EmissionSlot, EmittedBuffers, QuadVertex, INDICES_PER_QUAD, MAX_CELLS,
    VERTICES_PER_QUAD,
};
pub use grid::{Cell, Column, ColumnState, GridLayout, CELL_DEPTH};
pub use photo::{Photo, Size, Viewport};
pub use seed::seed_columns;
pub use transform::{build_transform, to_columns, Projection, ViewTransform};
pub use waterfall::{pack_remaining, place, shortest_column, Placement, Side};

use std::ops::Range;

use serde::Serialize;

/// Column count used when nothing else is configured.
pub const DEFAULT_COLUMNS: usize = 4;
/// Gap between neighbouring photos, in pixels.
pub const DEFAULT_GAP_PX: f32 = 12.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("layout needs at least one column")]
    NoColumns,
    #[error("{columns} columns need at least {columns} photos, batch has {photos}")]
    NotEnoughPhotos { columns: usize, photos: usize },
    #[error("photo {index} has a zero or non-finite size")]
    ZeroSizedPhoto { index: usize },
    #[error("photo at position {position} carries index {index}; batch must be in index order")]
    OutOfOrder { position: usize, index: usize },
    #[error("gap must be finite and non-negative, got {0}")]
    InvalidGap(f32),
    #[error("viewport {width}x{height} has no area")]
    EmptyViewport { width: u32, height: u32 },
    #[error("{cells} cells exceed the {max} addressable with 16-bit indices")]
    IndexSpaceExhausted { cells: usize, max: usize },
}

/// Checks every precondition of seeding and packing up front.
pub(crate) fn validate_batch(photos: &[Photo], gap: f32) -> Result<(), LayoutError> {
    if !gap.is_finite() || gap < 0.0 {
        return Err(LayoutError::InvalidGap(gap));
    }
    for (position, photo) in photos.iter().enumerate() {
        if photo.index() != position {
            return Err(LayoutError::OutOfOrder {
                position,
                index: photo.index(),
            });
        }
        if !photo.vertex_size().is_placeable() {
            return Err(LayoutError::ZeroSizedPhoto {
                index: photo.index(),
            });
        }
    }
    Ok(())
}

/// Inputs of the packing phase in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub columns: usize,
    /// Horizontal gap between columns.
    pub gap: f32,
    /// Factor applied to `gap` between stacked cells.
    pub aspect: f32,
}

impl LayoutParams {
    /// Converts a pixel gap on `viewport` into world units.
    pub fn for_viewport(viewport: Viewport, columns: usize, gap_px: f32) -> Self {
        Self {
            columns,
            gap: gap_px / viewport.width.max(1) as f32,
            aspect: viewport.aspect(),
        }
    }
}

/// Seeds and packs a sized batch. Nothing is built when a precondition fails.
pub fn build_layout(photos: &[Photo], params: &LayoutParams) -> Result<GridLayout, LayoutError> {
    validate_batch(photos, params.gap)?;
    let mut layout = seed_columns(photos, params.columns, params.gap)?;
    let placements = pack_remaining(
        &mut layout,
        &photos[params.columns..],
        params.gap,
        params.aspect,
    );
    tracing::debug!(
        columns = params.columns,
        seeded = params.columns,
        stacked = placements.len(),
        "built waterfall layout"
    );
    Ok(layout)
}

/// Layout settings that survive viewport changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MosaicParams {
    pub columns: usize,
    pub gap_px: f32,
}

impl Default for MosaicParams {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            gap_px: DEFAULT_GAP_PX,
        }
    }
}

/// One emission slot joined with its transform.
///
/// Geometry range, texture (by photo index) and matrix travel together so a
/// renderer never has to line up parallel arrays by convention.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MosaicSlot {
    pub slot: usize,
    pub photo: usize,
    pub position: [f32; 3],
    pub vertices: Range<u32>,
    pub indices: Range<u32>,
    pub transform: [[f32; 4]; 4],
}

/// A resolved photo batch laid out for one viewport.
#[derive(Debug, Clone)]
pub struct Mosaic {
    photos: Vec<Photo>,
    params: MosaicParams,
    viewport: Viewport,
    layout: GridLayout,
    buffers: EmittedBuffers,
}

impl Mosaic {
    /// Sizes, lays out and emits `photos` for `viewport`.
    pub fn new(
        photos: Vec<Photo>,
        params: MosaicParams,
        viewport: Viewport,
    ) -> Result<Self, LayoutError> {
        let (photos, layout, buffers) = Self::relayout(photos, params, viewport)?;
        Ok(Self {
            photos,
            params,
            viewport,
            layout,
            buffers,
        })
    }

    fn relayout(
        mut photos: Vec<Photo>,
        params: MosaicParams,
        viewport: Viewport,
    ) -> Result<(Vec<Photo>, GridLayout, EmittedBuffers), LayoutError> {
        if viewport.is_empty() {
            return Err(LayoutError::EmptyViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        for photo in &mut photos {
            photo.resize(viewport, params.columns);
        }
        let layout_params = LayoutParams::for_viewport(viewport, params.columns, params.gap_px);
        let layout = build_layout(&photos, &layout_params)?;
        let buffers = emit(&layout, &photos)?;
        Ok((photos, layout, buffers))
    }

    /// Re-sizes every photo and rebuilds layout and buffers for `viewport`.
    ///
    /// On error the previous layout stays in place.
    pub fn resize(&mut self, viewport: Viewport) -> Result<(), LayoutError> {
        let (photos, layout, buffers) =
            Self::relayout(self.photos.clone(), self.params, viewport)?;
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            cells = buffers.len(),
            "relayout after resize"
        );
        self.photos = photos;
        self.viewport = viewport;
        self.layout = layout;
        self.buffers = buffers;
        Ok(())
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn params(&self) -> MosaicParams {
        self.params
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn buffers(&self) -> &EmittedBuffers {
        &self.buffers
    }

    /// Per-slot matrices in emission order.
    pub fn transforms(&self, view: &ViewTransform) -> Vec<[[f32; 4]; 4]> {
        self.buffers
            .slots
            .iter()
            .map(|slot| to_columns(view.slot_matrix(slot.position)))
            .collect()
    }

    /// Joined per-slot records for `view`, in emission order.
    pub fn slots(&self, view: &ViewTransform) -> Vec<MosaicSlot> {
        self.buffers
            .slots
            .iter()
            .enumerate()
            .map(|(index, slot)| MosaicSlot {
                slot: index,
                photo: slot.photo,
                position: slot.position,
                vertices: slot.vertices.clone(),
                indices: slot.indices.clone(),
                transform: to_columns(view.slot_matrix(slot.position)),
            })
            .collect()
    }
}
