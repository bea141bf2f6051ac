//! Serialises a [`GridLayout`] into flat geometry buffers.
//!
//! Emission order is the column-major, top-to-bottom walk of the layout. The
//! Nth quad of the vertex/index buffers, the Nth entry of the size buffer and
//! the Nth [`EmissionSlot`] all describe the same cell, and so must the Nth
//! transform and texture binding built from those slots.

use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use serde::Serialize;

use crate::grid::GridLayout;
use crate::photo::Photo;
use crate::LayoutError;

pub const VERTICES_PER_QUAD: usize = 4;
pub const INDICES_PER_QUAD: usize = 6;

/// Largest cell count whose vertices remain addressable by `u16` indices.
pub const MAX_CELLS: usize = (u16::MAX as usize + 1) / VERTICES_PER_QUAD;

/// Corner order shared by every quad: top-left, top-right, bottom-left, bottom-right.
const CORNER_UVS: [[f32; 2]; VERTICES_PER_QUAD] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];

/// Two counter-clockwise triangles over [`CORNER_UVS`]: TL-BL-TR, TR-BL-BR.
const QUAD_INDICES: [u16; INDICES_PER_QUAD] = [0, 2, 1, 1, 2, 3];

/// Interleaved vertex: position then texture coordinate, 20 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize)]
pub struct QuadVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Vertex size of the photo in one emission slot, 8 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize)]
pub struct CellSize {
    pub width: f32,
    pub height: f32,
}

/// Everything the renderer needs to know about one emitted cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmissionSlot {
    /// Index of the photo whose texture must be bound for this slot.
    pub photo: usize,
    /// Cell centre in world units.
    pub position: [f32; 3],
    pub vertices: Range<u32>,
    pub indices: Range<u32>,
}

/// Flat buffers produced from one layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmittedBuffers {
    pub vertices: Vec<QuadVertex>,
    pub indices: Vec<u16>,
    pub sizes: Vec<CellSize>,
    pub slots: Vec<EmissionSlot>,
}

impl EmittedBuffers {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn size_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.sizes)
    }

    /// Photo index for every slot, in emission order.
    pub fn photo_order(&self) -> Vec<usize> {
        self.slots.iter().map(|slot| slot.photo).collect()
    }
}

/// Emits quads for every cell of `layout`.
///
/// `photos` is the batch the layout was built from, indexed by photo index.
/// A layout that does not cover the batch exactly once, or whose columns are
/// out of order, is a bug in the caller and panics.
pub fn emit(layout: &GridLayout, photos: &[Photo]) -> Result<EmittedBuffers, LayoutError> {
    let cells = layout.cell_count();
    assert_eq!(
        cells,
        photos.len(),
        "layout holds {cells} cells for a batch of {} photos",
        photos.len()
    );
    debug_assert!(layout.is_well_formed(), "column cells are not top-to-bottom");
    if cells > MAX_CELLS {
        return Err(LayoutError::IndexSpaceExhausted {
            cells,
            max: MAX_CELLS,
        });
    }

    let mut buffers = EmittedBuffers {
        vertices: Vec::with_capacity(cells * VERTICES_PER_QUAD),
        indices: Vec::with_capacity(cells * INDICES_PER_QUAD),
        sizes: Vec::with_capacity(cells),
        slots: Vec::with_capacity(cells),
    };

    for (slot, cell) in layout.emission_order().enumerate() {
        let photo = &photos[cell.photo];
        assert_eq!(photo.index(), cell.photo, "batch is not indexed by photo");
        let size = photo.vertex_size();
        let half_w = size.width / 2.0;
        let half_h = size.height / 2.0;
        let corners = [[-half_w, half_h], [half_w, half_h], [-half_w, -half_h], [half_w, -half_h]];

        let first_vertex = (slot * VERTICES_PER_QUAD) as u32;
        let first_index = (slot * INDICES_PER_QUAD) as u32;
        for (corner, uv) in corners.iter().zip(CORNER_UVS.iter()) {
            buffers.vertices.push(QuadVertex {
                position: [corner[0], corner[1], 0.0],
                uv: *uv,
            });
        }
        let base = first_vertex as u16;
        buffers
            .indices
            .extend(QUAD_INDICES.iter().map(|index| base + index));
        buffers.sizes.push(CellSize {
            width: size.width,
            height: size.height,
        });
        buffers.slots.push(EmissionSlot {
            photo: cell.photo,
            position: cell.position(),
            vertices: first_vertex..first_vertex + VERTICES_PER_QUAD as u32,
            indices: first_index..first_index + INDICES_PER_QUAD as u32,
        });
    }

    tracing::debug!(
        cells,
        vertices = buffers.vertices.len(),
        indices = buffers.indices.len(),
        "emitted mosaic buffers"
    );
    Ok(buffers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::Size;
    use crate::seed::seed_columns;
    use crate::waterfall::pack_remaining;

    fn batch(count: usize) -> Vec<Photo> {
        (0..count)
            .map(|i| {
                Photo::new(i, 100, 100)
                    .unwrap()
                    .with_vertex_size(Size::new(0.2, 0.1 + (i % 3) as f32 * 0.1))
            })
            .collect()
    }

    fn layout_for(photos: &[Photo], columns: usize) -> GridLayout {
        let mut layout = seed_columns(photos, columns, 0.02).unwrap();
        pack_remaining(&mut layout, &photos[columns..], 0.02, 1.0);
        layout
    }

    #[test]
    fn buffer_strides_match_renderer_contract() {
        assert_eq!(std::mem::size_of::<QuadVertex>(), 20);
        assert_eq!(std::mem::size_of::<CellSize>(), 8);
        assert_eq!(MAX_CELLS, 16384);
    }

    #[test]
    fn emits_one_quad_per_photo() {
        let photos = batch(11);
        let layout = layout_for(&photos, 3);
        let buffers = emit(&layout, &photos).unwrap();

        assert_eq!(buffers.len(), 11);
        assert_eq!(buffers.vertices.len(), 44);
        assert_eq!(buffers.indices.len(), 66);
        assert_eq!(buffers.sizes.len(), 11);
        assert_eq!(buffers.vertex_bytes().len(), 44 * 20);
        assert_eq!(buffers.size_bytes().len(), 11 * 8);

        let mut order = buffers.photo_order();
        order.sort_unstable();
        assert_eq!(order, (0..11).collect::<Vec<_>>());
    }

    #[test]
    fn slot_order_follows_columns_then_rows() {
        let photos = batch(9);
        let layout = layout_for(&photos, 2);
        let buffers = emit(&layout, &photos).unwrap();
        let expected: Vec<usize> = layout.emission_order().map(|cell| cell.photo).collect();
        assert_eq!(buffers.photo_order(), expected);

        let split = layout.columns()[0].len();
        let left: Vec<f32> = buffers.slots[..split].iter().map(|s| s.position[1]).collect();
        assert!(left.windows(2).all(|pair| pair[0] > pair[1]));
        assert!(buffers.slots[..split]
            .iter()
            .all(|slot| slot.position[0] == layout.columns()[0].state().seed_x()));
    }

    #[test]
    fn indices_are_offset_per_slot() {
        let photos = batch(3);
        let layout = layout_for(&photos, 3);
        let buffers = emit(&layout, &photos).unwrap();
        assert_eq!(&buffers.indices[..6], &[0, 2, 1, 1, 2, 3]);
        assert_eq!(&buffers.indices[6..12], &[4, 6, 5, 5, 6, 7]);
        assert_eq!(&buffers.indices[12..], &[8, 10, 9, 9, 10, 11]);
        assert_eq!(buffers.slots[2].vertices, 8..12);
        assert_eq!(buffers.slots[2].indices, 12..18);
    }

    #[test]
    fn quads_are_centred_with_fixed_uvs() {
        let photos = batch(1);
        let layout = layout_for(&photos, 1);
        let buffers = emit(&layout, &photos).unwrap();
        let quad = &buffers.vertices[..4];
        assert_eq!(quad[0].position, [-0.1, 0.05, 0.0]);
        assert_eq!(quad[3].position, [0.1, -0.05, 0.0]);
        let uvs: Vec<[f32; 2]> = quad.iter().map(|v| v.uv).collect();
        assert_eq!(uvs, CORNER_UVS.to_vec());
        assert_eq!(buffers.sizes[0], CellSize { width: 0.2, height: 0.1 });
    }

    #[test]
    fn triangles_wind_counter_clockwise() {
        let photos = batch(2);
        let layout = layout_for(&photos, 2);
        let buffers = emit(&layout, &photos).unwrap();
        for triangle in buffers.indices.chunks(3) {
            let a = buffers.vertices[triangle[0] as usize].position;
            let b = buffers.vertices[triangle[1] as usize].position;
            let c = buffers.vertices[triangle[2] as usize].position;
            let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
            assert!(cross > 0.0);
        }
    }

    #[test]
    fn repeated_emission_is_byte_identical() {
        let photos = batch(17);
        let layout = layout_for(&photos, 4);
        let first = emit(&layout, &photos).unwrap();
        let second = emit(&layout, &photos).unwrap();
        assert_eq!(first.vertex_bytes(), second.vertex_bytes());
        assert_eq!(first.index_bytes(), second.index_bytes());
        assert_eq!(first.size_bytes(), second.size_bytes());
        assert_eq!(first.slots, second.slots);
    }

    #[test]
    #[should_panic(expected = "cells for a batch")]
    fn mismatched_batch_is_a_bug() {
        let photos = batch(4);
        let layout = layout_for(&photos, 4);
        let _ = emit(&layout, &photos[..3]);
    }
}
