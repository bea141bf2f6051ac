use std::fmt::Write as _;

use mosaic::{Mosaic, Viewport};
use serde::Serialize;

/// Serializable view of a computed layout, in emission order.
#[derive(Debug, Serialize)]
pub struct LayoutReport {
    pub viewport: Viewport,
    pub columns: usize,
    pub gap_px: f32,
    pub heights: Vec<f32>,
    pub slots: Vec<SlotReport>,
}

#[derive(Debug, Serialize)]
pub struct SlotReport {
    pub slot: usize,
    pub photo: usize,
    pub position: [f32; 3],
    pub size: [f32; 2],
    pub vertices: [u32; 2],
    pub indices: [u32; 2],
}

impl LayoutReport {
    pub fn from_mosaic(mosaic: &Mosaic) -> Self {
        let buffers = mosaic.buffers();
        let slots = buffers
            .slots
            .iter()
            .zip(&buffers.sizes)
            .enumerate()
            .map(|(slot, (emitted, size))| SlotReport {
                slot,
                photo: emitted.photo,
                position: emitted.position,
                size: [size.width, size.height],
                vertices: [emitted.vertices.start, emitted.vertices.end],
                indices: [emitted.indices.start, emitted.indices.end],
            })
            .collect();
        Self {
            viewport: mosaic.viewport(),
            columns: mosaic.params().columns,
            gap_px: mosaic.params().gap_px,
            heights: mosaic.layout().heights(),
            slots,
        }
    }
}

/// One line per column: seed x, stacked height and photos top to bottom.
pub fn column_summary(mosaic: &Mosaic) -> String {
    let mut out = String::new();
    for (index, column) in mosaic.layout().columns().iter().enumerate() {
        let photos: Vec<String> = column
            .cells()
            .map(|cell| cell.photo.to_string())
            .collect();
        let _ = writeln!(
            out,
            "column {index}: x={:.4} height={:.4} photos=[{}]",
            column.state().seed_x(),
            column.state().height,
            photos.join(", ")
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic::{MosaicParams, Photo};

    fn sample_mosaic() -> Mosaic {
        let photos = [(400, 300), (300, 400), (500, 500), (640, 480), (200, 300)]
            .into_iter()
            .enumerate()
            .map(|(index, (w, h))| Photo::new(index, w, h).unwrap())
            .collect();
        let params = MosaicParams {
            columns: 2,
            gap_px: 10.0,
        };
        Mosaic::new(photos, params, Viewport::new(900, 600)).unwrap()
    }

    #[test]
    fn report_covers_every_photo_once() {
        let report = LayoutReport::from_mosaic(&sample_mosaic());
        assert_eq!(report.columns, 2);
        assert_eq!(report.heights.len(), 2);
        let mut photos: Vec<usize> = report.slots.iter().map(|slot| slot.photo).collect();
        photos.sort_unstable();
        assert_eq!(photos, vec![0, 1, 2, 3, 4]);
        for (index, slot) in report.slots.iter().enumerate() {
            assert_eq!(slot.vertices, [index as u32 * 4, index as u32 * 4 + 4]);
            assert_eq!(slot.indices, [index as u32 * 6, index as u32 * 6 + 6]);
        }
    }

    #[test]
    fn summary_lists_each_column() {
        let summary = column_summary(&sample_mosaic());
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("column 0: x="));
        assert!(lines[1].starts_with("column 1: x="));
    }
}
