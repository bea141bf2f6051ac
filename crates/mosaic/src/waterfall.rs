//! Waterfall growth: every photo after the seed row joins the shortest column.

use serde::Serialize;

use crate::grid::{Cell, GridLayout, CELL_DEPTH};
use crate::photo::Photo;

/// Which end of a column a photo was attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
}

/// Record of a single waterfall step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub photo: usize,
    pub column: usize,
    pub side: Side,
    pub y: f32,
}

/// Index of the column with the smallest accumulated height, lowest index on ties.
///
/// Returns `None` only for a layout without columns.
pub fn shortest_column(layout: &GridLayout) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, column) in layout.columns.iter().enumerate() {
        let height = column.state.height;
        match best {
            Some((_, shortest)) if height >= shortest => {}
            _ => best = Some((index, height)),
        }
    }
    best.map(|(index, _)| index)
}

/// Attaches `photo` to the shortest column of `layout`.
///
/// A column whose edges are balanced or top-heavy (`top + bottom >= 0`) grows
/// downwards, otherwise it grows upwards. `vertical_gap` is the already
/// aspect-corrected gap between stacked cells.
pub fn place(layout: &mut GridLayout, photo: &Photo, vertical_gap: f32) -> Option<Placement> {
    let column_index = shortest_column(layout)?;
    let column = &mut layout.columns[column_index];
    let height = photo.vertex_size().height;
    let state = &mut column.state;

    let (side, y) = if state.top + state.bottom >= 0.0 {
        let centre = state.bottom - vertical_gap - height / 2.0;
        state.bottom = centre - height / 2.0;
        (Side::Bottom, centre)
    } else {
        let centre = state.top + vertical_gap + height / 2.0;
        state.top = centre + height / 2.0;
        (Side::Top, centre)
    };
    state.height += height;

    let cell = Cell {
        x: state.seed_x(),
        y,
        z: CELL_DEPTH,
        photo: photo.index(),
    };
    match side {
        Side::Top => column.cells.push_front(cell),
        Side::Bottom => column.cells.push_back(cell),
    }

    tracing::trace!(
        photo = photo.index(),
        column = column_index,
        ?side,
        y,
        "placed photo"
    );

    Some(Placement {
        photo: photo.index(),
        column: column_index,
        side,
        y,
    })
}

/// Places every photo of `remaining` in order and returns the placements.
///
/// `remaining` must be the tail of the batch that follows the seed row.
pub fn pack_remaining(
    layout: &mut GridLayout,
    remaining: &[Photo],
    gap: f32,
    aspect: f32,
) -> Vec<Placement> {
    let vertical_gap = gap * aspect;
    remaining
        .iter()
        .filter_map(|photo| place(layout, photo, vertical_gap))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::Size;
    use crate::seed::seed_columns;

    fn photo(index: usize, height: f32) -> Photo {
        Photo::new(index, 100, 100)
            .unwrap()
            .with_vertex_size(Size::new(0.2, height))
    }

    fn batch(heights: &[f32]) -> Vec<Photo> {
        heights
            .iter()
            .enumerate()
            .map(|(index, height)| photo(index, *height))
            .collect()
    }

    #[test]
    fn ties_go_to_lowest_column() {
        let photos = batch(&[1.0, 1.0, 1.0, 1.0]);
        let mut layout = seed_columns(&photos[..3], 3, 0.1).unwrap();
        let placement = place(&mut layout, &photos[3], 0.1).unwrap();
        assert_eq!(placement.column, 0);
        assert_eq!(placement.side, Side::Bottom);
    }

    #[test]
    fn alternates_bottom_then_top() {
        let photos = batch(&[1.0, 1.0, 1.0, 1.0]);
        let mut layout = seed_columns(&photos[..1], 1, 0.0).unwrap();
        let placements = pack_remaining(&mut layout, &photos[1..], 0.1, 1.0);

        let sides: Vec<Side> = placements.iter().map(|p| p.side).collect();
        assert_eq!(sides, vec![Side::Bottom, Side::Top, Side::Bottom]);
        assert!((placements[0].y + 1.1).abs() < 1e-5);
        assert!((placements[1].y - 1.1).abs() < 1e-5);
        assert!((placements[2].y + 2.2).abs() < 1e-5);

        let column = &layout.columns()[0];
        let order: Vec<usize> = column.cells().map(|cell| cell.photo).collect();
        assert_eq!(order, vec![2, 0, 1, 3]);
        assert!((column.state().height - 4.0).abs() < 1e-5);
    }

    #[test]
    fn vertical_gap_scales_with_aspect() {
        let photos = batch(&[1.0, 1.0]);
        let mut layout = seed_columns(&photos[..1], 1, 0.1).unwrap();
        let placements = pack_remaining(&mut layout, &photos[1..], 0.1, 2.0);
        assert!((placements[0].y + (0.5 + 0.2 + 0.5)).abs() < 1e-5);
    }

    #[test]
    fn chosen_column_is_never_taller_than_others() {
        let heights: Vec<f32> = (0..40).map(|i| 0.2 + (i * 7 % 11) as f32 * 0.05).collect();
        let photos = batch(&heights);
        let mut layout = seed_columns(&photos[..4], 4, 0.02).unwrap();
        for photo in &photos[4..] {
            let before = layout.heights();
            let placement = place(&mut layout, photo, 0.02).unwrap();
            let chosen = before[placement.column];
            assert!(before.iter().all(|height| chosen <= *height));
            assert!(before[..placement.column].iter().all(|height| chosen < *height));
        }
    }

    #[test]
    fn columns_stay_strictly_descending() {
        let heights: Vec<f32> = (0..25).map(|i| 0.1 + (i % 5) as f32 * 0.1).collect();
        let photos = batch(&heights);
        let mut layout = seed_columns(&photos[..3], 3, 0.05).unwrap();
        pack_remaining(&mut layout, &photos[3..], 0.05, 1.5);
        assert!(layout.is_well_formed());
        assert_eq!(layout.cell_count(), photos.len());
    }

    #[test]
    fn two_columns_stay_balanced() {
        let photos = batch(&[1.0; 5]);
        let mut layout = seed_columns(&photos[..2], 2, 0.1).unwrap();
        let placements = pack_remaining(&mut layout, &photos[2..], 0.1, 1.0);
        assert_eq!(placements.len(), 3);
        let heights = layout.heights();
        assert!((heights[0] - heights[1]).abs() <= 1.0 + 1e-5);
        let columns: Vec<usize> = placements.iter().map(|p| p.column).collect();
        assert_eq!(columns, vec![0, 1, 0]);
    }

    #[test]
    fn cells_inherit_column_seed() {
        let photos = batch(&[1.0; 9]);
        let mut layout = seed_columns(&photos[..4], 4, 0.1).unwrap();
        pack_remaining(&mut layout, &photos[4..], 0.1, 1.0);
        for column in layout.columns() {
            assert!(column.cells().all(|cell| cell.x == column.state().seed_x()));
        }
    }
}
