use serde::Serialize;

use crate::LayoutError;

/// Width/height pair in whatever unit the owner documents (pixels or world units).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when both sides are finite and strictly positive.
    pub fn is_placeable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Surface the mosaic is laid out for, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height; this is the factor applied to vertical gaps.
    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

/// One image of the batch.
///
/// `index` and the natural size are fixed at construction. The display size
/// (pixels) and the vertex size (world units, i.e. fractions of the viewport)
/// are derived from the viewport via [`Photo::resize`] and change on every
/// viewport change.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    index: usize,
    natural: (u32, u32),
    aspect: f32,
    display: Size,
    vertex: Size,
}

impl Photo {
    /// Creates an unsized photo from its natural pixel dimensions.
    pub fn new(index: usize, width: u32, height: u32) -> Result<Self, LayoutError> {
        if width == 0 || height == 0 {
            return Err(LayoutError::ZeroSizedPhoto { index });
        }
        Ok(Self {
            index,
            natural: (width, height),
            aspect: width as f32 / height as f32,
            display: Size::ZERO,
            vertex: Size::ZERO,
        })
    }

    /// Overrides the vertex size directly, bypassing viewport sizing.
    pub fn with_vertex_size(mut self, vertex: Size) -> Self {
        self.vertex = vertex;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn natural_size(&self) -> (u32, u32) {
        self.natural
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn display_size(&self) -> Size {
        self.display
    }

    pub fn vertex_size(&self) -> Size {
        self.vertex
    }

    /// Recomputes display and vertex size for `columns` columns on `viewport`.
    ///
    /// Every photo gets the same column width, `viewport.width / (columns + 1)`,
    /// which leaves half a column of margin on either side of the row.
    pub fn resize(&mut self, viewport: Viewport, columns: usize) {
        let surface_w = viewport.width.max(1) as f32;
        let surface_h = viewport.height.max(1) as f32;
        let column_width = surface_w / (columns + 1) as f32;
        let column_height = column_width / self.aspect;
        self.display = Size::new(column_width, column_height);
        self.vertex = Size::new(column_width / surface_w, column_height / surface_h);
    }
}
