//! Center-out seeding of the first row.
//!
//! The first `columns` photos each open one column. Placement alternates left
//! and right of the centre, so for four columns the order is
//!
//! ```text
//!   photo:   2   0 | 1   3
//!   column:  0   1 | 2   3
//! ```
//!
//! and for an odd count the first photo takes the middle column at `x = 0`.

use crate::grid::{Column, GridLayout};
use crate::photo::Photo;
use crate::{validate_batch, LayoutError};

/// Running seed coordinate on one side of the centre line.
#[derive(Debug, Clone, Copy, Default)]
struct RowSide {
    reach: f32,
    started: bool,
}

impl RowSide {
    /// Moves the coordinate outward for a photo of `width` and returns the new distance.
    ///
    /// The first placement on a side moves by half the photo's width plus half
    /// the gap; every later one by the photo's full width plus the gap.
    fn advance(&mut self, width: f32, gap: f32) -> f32 {
        self.reach += if self.started {
            width + gap
        } else {
            (width + gap) / 2.0
        };
        self.started = true;
        self.reach
    }
}

/// Builds the single seed row from `photos[..columns]`.
///
/// Fails without touching anything when there are fewer photos than columns,
/// no columns, or a seed photo has no placeable vertex size.
pub fn seed_columns(photos: &[Photo], columns: usize, gap: f32) -> Result<GridLayout, LayoutError> {
    if columns == 0 {
        return Err(LayoutError::NoColumns);
    }
    if photos.len() < columns {
        return Err(LayoutError::NotEnoughPhotos {
            columns,
            photos: photos.len(),
        });
    }
    let seeds = &photos[..columns];
    validate_batch(seeds, gap)?;

    let middle = columns / 2;
    let offset = columns % 2;
    let mut left = RowSide::default();
    let mut right = RowSide::default();
    let mut slots: Vec<Option<Column>> = vec![None; columns];

    for (i, photo) in seeds.iter().enumerate() {
        let size = photo.vertex_size();
        let (target, x) = if offset == 1 && i == 0 {
            (middle, 0.0)
        } else if i % 2 == 0 {
            (middle - 1 - (i / 2 - offset), -left.advance(size.width, gap))
        } else {
            (middle + (i - 1) / 2 + offset, right.advance(size.width, gap))
        };

        tracing::trace!(photo = photo.index(), column = target, x, "seeded column");
        debug_assert!(slots[target].is_none(), "column {target} seeded twice");
        slots[target] = Some(Column::seeded(x, size.height, photo.index()));
    }

    let columns: Vec<Column> = slots.into_iter().flatten().collect();
    debug_assert_eq!(columns.len(), seeds.len());
    Ok(GridLayout::from_columns(columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::Size;

    fn photo(index: usize, width: f32, height: f32) -> Photo {
        Photo::new(index, 100, 100)
            .unwrap()
            .with_vertex_size(Size::new(width, height))
    }

    fn uniform(count: usize, width: f32, height: f32) -> Vec<Photo> {
        (0..count).map(|i| photo(i, width, height)).collect()
    }

    fn seeds(layout: &GridLayout) -> Vec<f32> {
        layout
            .columns()
            .iter()
            .map(|column| column.state().seed_x())
            .collect()
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn odd_count_seeds_middle_at_origin() {
        let photos = uniform(3, 0.2, 1.0);
        let layout = seed_columns(&photos, 3, 0.1).unwrap();
        let xs = seeds(&layout);

        assert_eq!(xs[1], 0.0);
        assert_eq!(layout.columns()[1].cells().next().unwrap().photo, 0);
        assert!(close(xs[2], 0.15));
        assert_eq!(layout.columns()[2].cells().next().unwrap().photo, 1);
        assert!(close(xs[0], -0.15));
        assert_eq!(layout.columns()[0].cells().next().unwrap().photo, 2);
        assert_eq!(xs.iter().filter(|x| **x == 0.0).count(), 1);
    }

    #[test]
    fn odd_count_uses_each_photos_own_width() {
        let photos = vec![
            photo(0, 0.2, 1.0),
            photo(1, 0.3, 1.0),
            photo(2, 0.4, 1.0),
            photo(3, 0.1, 1.0),
            photo(4, 0.5, 1.0),
        ];
        let layout = seed_columns(&photos, 5, 0.1).unwrap();
        let xs = seeds(&layout);
        // Photo 1 opens the right side, photo 3 follows it.
        assert!(close(xs[3], 0.15 + 0.05));
        assert!(close(xs[4], xs[3] + 0.1 + 0.1));
        // Photo 2 opens the left side, photo 4 follows it.
        assert!(close(xs[1], -(0.2 + 0.05)));
        assert!(close(xs[0], xs[1] - (0.5 + 0.1)));
    }

    #[test]
    fn even_count_alternates_left_then_right() {
        let photos = uniform(4, 0.2, 1.0);
        let layout = seed_columns(&photos, 4, 0.1).unwrap();
        let owners: Vec<usize> = layout
            .columns()
            .iter()
            .map(|column| column.cells().next().unwrap().photo)
            .collect();
        assert_eq!(owners, vec![2, 0, 1, 3]);

        let xs = seeds(&layout);
        // First placement on each side: half width plus half gap.
        assert!(close(xs[1], -(0.1 + 0.05)));
        assert!(close(xs[2], 0.1 + 0.05));
        // Then a full width plus gap further out.
        assert!(close(xs[0], xs[1] - (0.2 + 0.1)));
        assert!(close(xs[3], xs[2] + (0.2 + 0.1)));
    }

    #[test]
    fn even_counts_are_symmetric() {
        for columns in [2usize, 4, 6, 8] {
            let photos = uniform(columns, 0.15, 0.5);
            let layout = seed_columns(&photos, columns, 0.02).unwrap();
            let xs = seeds(&layout);
            for i in 0..columns {
                assert!(close(xs[i], -xs[columns - 1 - i]), "columns={columns}");
            }
            assert!(xs.iter().all(|x| *x != 0.0));
        }
    }

    #[test]
    fn later_placements_advance_by_own_width() {
        let photos = vec![
            photo(0, 0.2, 1.0),
            photo(1, 0.2, 1.0),
            photo(2, 0.4, 1.0),
            photo(3, 0.2, 1.0),
        ];
        let layout = seed_columns(&photos, 4, 0.1).unwrap();
        let xs = seeds(&layout);
        assert!(close(xs[1], -0.15));
        assert!(close(xs[0], -(0.15 + 0.4 + 0.1)));
        assert!(close(xs[2], 0.15));
        assert!(close(xs[3], 0.15 + 0.2 + 0.1));
    }

    #[test]
    fn even_uniform_seeds_keep_the_gap() {
        let photos = uniform(6, 0.12, 1.0);
        let layout = seed_columns(&photos, 6, 0.05).unwrap();
        let xs = seeds(&layout);
        for pair in xs.windows(2) {
            assert!(close(pair[1] - pair[0], 0.12 + 0.05));
        }
    }

    #[test]
    fn every_seed_cell_sits_on_the_row() {
        let photos = uniform(5, 0.1, 0.4);
        let layout = seed_columns(&photos, 5, 0.0).unwrap();
        for column in layout.columns() {
            assert_eq!(column.len(), 1);
            assert_eq!(column.cells().next().unwrap().y, 0.0);
            assert!(close(column.state().top, 0.2));
            assert!(close(column.state().bottom, -0.2));
            assert!(close(column.state().height, 0.4));
        }
    }

    #[test]
    fn single_column_seeds_at_origin() {
        let layout = seed_columns(&uniform(1, 0.3, 0.3), 1, 0.1).unwrap();
        assert_eq!(seeds(&layout), vec![0.0]);
    }

    #[test]
    fn rejects_short_batch() {
        let err = seed_columns(&uniform(2, 0.1, 0.1), 3, 0.1).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::NotEnoughPhotos {
                columns: 3,
                photos: 2
            }
        ));
    }

    #[test]
    fn rejects_zero_columns() {
        assert!(matches!(
            seed_columns(&uniform(2, 0.1, 0.1), 0, 0.1),
            Err(LayoutError::NoColumns)
        ));
    }

    #[test]
    fn rejects_unsized_seed() {
        let mut photos = uniform(3, 0.1, 0.1);
        photos[1] = photo(1, 0.0, 0.1);
        assert!(matches!(
            seed_columns(&photos, 3, 0.1),
            Err(LayoutError::ZeroSizedPhoto { index: 1 })
        ));
    }
}
