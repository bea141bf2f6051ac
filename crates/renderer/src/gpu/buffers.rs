use std::ops::Range;

use mosaic::{CellSize, EmittedBuffers, MosaicSlot, QuadVertex};
use wgpu::util::DeviceExt;

/// Bytes per column-major 4x4 transform in the storage buffer.
pub const TRANSFORM_STRIDE: wgpu::BufferAddress = std::mem::size_of::<[[f32; 4]; 4]>() as _;

/// Bytes per [`CellSize`] record in the size buffer.
pub const CELL_SIZE_STRIDE: wgpu::BufferAddress = std::mem::size_of::<CellSize>() as _;

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

/// Layout of [`QuadVertex`]: position then uv.
pub fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

/// Device copies of the emitted geometry plus one transform per slot.
pub struct MosaicBuffers {
    pub vertices: wgpu::Buffer,
    pub indices: wgpu::Buffer,
    pub sizes: wgpu::Buffer,
    pub transforms: wgpu::Buffer,
    pub index_count: u32,
    pub slot_count: usize,
}

impl MosaicBuffers {
    pub fn upload(
        device: &wgpu::Device,
        emitted: &EmittedBuffers,
        transforms: &[[[f32; 4]; 4]],
    ) -> Self {
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mosaic vertices"),
            contents: emitted.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mosaic indices"),
            contents: emitted.index_bytes(),
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        });
        let sizes = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mosaic cell sizes"),
            contents: emitted.size_bytes(),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });
        let transforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mosaic transforms"),
            contents: bytemuck::cast_slice(transforms),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });

        tracing::debug!(
            vertices = emitted.vertices.len(),
            indices = emitted.indices.len(),
            slots = emitted.len(),
            "uploaded mosaic buffers"
        );

        Self {
            vertices,
            indices,
            sizes,
            transforms,
            index_count: emitted.indices.len() as u32,
            slot_count: emitted.len(),
        }
    }

    pub fn index_format() -> wgpu::IndexFormat {
        wgpu::IndexFormat::Uint16
    }

    /// Overwrites the transform storage in place; the slot count must not change.
    pub fn write_transforms(&self, queue: &wgpu::Queue, transforms: &[[[f32; 4]; 4]]) {
        debug_assert_eq!(transforms.len(), self.slot_count);
        queue.write_buffer(&self.transforms, 0, bytemuck::cast_slice(transforms));
    }
}

/// One drawable slot: which photo, which texture, which index range, which matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct MosaicInstance {
    pub slot: usize,
    pub photo: usize,
    /// Position of the photo's texture in the uploaded texture list.
    pub texture: usize,
    pub indices: Range<u32>,
    pub transform: [[f32; 4]; 4],
    /// Byte offset of this slot's matrix in the transform buffer.
    pub transform_offset: wgpu::BufferAddress,
}

/// Joins emitted slots with the texture each photo was uploaded to.
///
/// `texture_of` maps a photo index to its texture position; slots whose photo
/// has no texture are skipped.
pub fn join_instances(
    slots: &[MosaicSlot],
    texture_of: impl Fn(usize) -> Option<usize>,
) -> Vec<MosaicInstance> {
    slots
        .iter()
        .filter_map(|slot| {
            let texture = texture_of(slot.photo)?;
            Some(MosaicInstance {
                slot: slot.slot,
                photo: slot.photo,
                texture,
                indices: slot.indices.clone(),
                transform: slot.transform,
                transform_offset: slot.slot as wgpu::BufferAddress * TRANSFORM_STRIDE,
            })
        })
        .collect()
}

/// Position of `photo` in a list uploaded in batch order, if it is there.
///
/// Batch order means the item for photo `n` sits at position `n`.
pub(crate) fn batch_position<T>(
    items: &[T],
    photo: usize,
    index_of: impl Fn(&T) -> usize,
) -> Option<usize> {
    items
        .get(photo)
        .filter(|item| index_of(item) == photo)
        .map(|_| photo)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(slot: usize, photo: usize) -> MosaicSlot {
        MosaicSlot {
            slot,
            photo,
            position: [0.0; 3],
            vertices: (slot as u32 * 4)..(slot as u32 * 4 + 4),
            indices: (slot as u32 * 6)..(slot as u32 * 6 + 6),
            transform: [[0.0; 4]; 4],
        }
    }

    #[test]
    fn vertex_layout_matches_quad_vertex() {
        let layout = vertex_layout();
        assert_eq!(layout.array_stride, 20);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.attributes[1].format, wgpu::VertexFormat::Float32x2);
        assert_eq!(CELL_SIZE_STRIDE, 8);
    }

    #[test]
    fn instances_follow_slot_order() {
        let slots = vec![slot(0, 2), slot(1, 0), slot(2, 1)];
        let textures = [0usize, 1, 2];
        let instances = join_instances(&slots, |photo| textures.get(photo).copied());

        assert_eq!(instances.len(), 3);
        assert_eq!(instances[0].photo, 2);
        assert_eq!(instances[0].texture, 2);
        assert_eq!(instances[1].indices, 6..12);
        assert_eq!(instances[2].transform_offset, 2 * 64);
    }

    #[test]
    fn slots_without_texture_are_skipped() {
        let slots = vec![slot(0, 0), slot(1, 5)];
        let instances = join_instances(&slots, |photo| (photo == 0).then_some(0));
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].slot, 0);
    }

    #[test]
    fn batch_position_is_direct_lookup() {
        let uploaded = vec![0usize, 1, 2, 3];
        assert_eq!(batch_position(&uploaded, 2, |index| *index), Some(2));
        assert_eq!(batch_position(&uploaded, 4, |index| *index), None);

        let shifted = vec![1usize, 2];
        assert_eq!(batch_position(&shifted, 1, |index| *index), None);
    }
}
