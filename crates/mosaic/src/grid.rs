use std::collections::VecDeque;

use serde::Serialize;

/// Depth shared by every placed cell, in front of a camera at the origin looking down `-z`.
pub const CELL_DEPTH: f32 = -2.0;

/// A placed photo inside a column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cell {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub photo: usize,
}

impl Cell {
    pub fn position(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// Geometry bookkeeping for one column.
///
/// `top` and `bottom` are the outer edges of the stacked cells in world units
/// (y grows upwards); `height` is the sum of the heights of every placed photo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnState {
    seed_x: f32,
    pub top: f32,
    pub bottom: f32,
    pub height: f32,
}

impl ColumnState {
    pub(crate) fn seeded(seed_x: f32, seed_height: f32) -> Self {
        Self {
            seed_x,
            top: seed_height / 2.0,
            bottom: -seed_height / 2.0,
            height: seed_height,
        }
    }

    /// Horizontal coordinate assigned during seeding. Never changes afterwards.
    pub fn seed_x(&self) -> f32 {
        self.seed_x
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub(crate) state: ColumnState,
    pub(crate) cells: VecDeque<Cell>,
}

impl Column {
    pub(crate) fn seeded(seed_x: f32, seed_height: f32, photo: usize) -> Self {
        let mut cells = VecDeque::new();
        cells.push_back(Cell {
            x: seed_x,
            y: 0.0,
            z: CELL_DEPTH,
            photo,
        });
        Self {
            state: ColumnState::seeded(seed_x, seed_height),
            cells,
        }
    }

    pub fn state(&self) -> &ColumnState {
        &self.state
    }

    /// Cells ordered top to bottom.
    pub fn cells(&self) -> impl ExactSizeIterator<Item = &Cell> + '_ {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub(crate) fn is_strictly_descending(&self) -> bool {
        self.cells
            .iter()
            .zip(self.cells.iter().skip(1))
            .all(|(upper, lower)| upper.y > lower.y)
    }
}

/// Result of the packing phase: every column with its cells.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub(crate) columns: Vec<Column>,
}

impl GridLayout {
    pub(crate) fn from_columns(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn cell_count(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    /// Cells in emission order: columns left to right as stored, each top to bottom.
    pub fn emission_order(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.columns.iter().flat_map(|column| column.cells.iter())
    }

    /// Accumulated heights per column, in column order.
    pub fn heights(&self) -> Vec<f32> {
        self.columns.iter().map(|column| column.state.height).collect()
    }

    pub(crate) fn is_well_formed(&self) -> bool {
        self.columns.iter().all(Column::is_strictly_descending)
    }
}
