use glam::{Mat4, Vec3};
use serde::Serialize;

/// Half-extent of the orthographic volume in world units.
///
/// Vertex sizes are fractions of the viewport, so the visible region spans one
/// world unit on each axis.
const ORTHO_HALF_EXTENT: f32 = 0.5;
const ORTHO_DEPTH: f32 = 100.0;

/// Projection applied after the model transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Projection {
    Orthographic,
    Perspective {
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
}

impl Default for Projection {
    fn default() -> Self {
        Self::Orthographic
    }
}

impl Projection {
    /// Perspective with a 45° vertical field of view.
    pub fn perspective(aspect: f32) -> Self {
        Self::perspective_with_fov(std::f32::consts::FRAC_PI_4, aspect)
    }

    /// Perspective with `fov_y` in radians.
    pub fn perspective_with_fov(fov_y: f32, aspect: f32) -> Self {
        Self::Perspective {
            fov_y,
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        match *self {
            Projection::Orthographic => Mat4::orthographic_rh(
                -ORTHO_HALF_EXTENT,
                ORTHO_HALF_EXTENT,
                -ORTHO_HALF_EXTENT,
                ORTHO_HALF_EXTENT,
                -ORTHO_DEPTH,
                ORTHO_DEPTH,
            ),
            Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh(fov_y, aspect, near, far),
        }
    }
}

/// Pan/zoom state shared by every slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewTransform {
    pub offset: [f32; 3],
    /// Euler angles in radians, applied X then Y then Z.
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub projection: Projection,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            offset: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
            projection: Projection::Orthographic,
        }
    }
}

impl ViewTransform {
    /// Matrix for a cell centred at `position`.
    ///
    /// Cell positions are scaled with the view so zooming keeps the gaps in
    /// proportion, then shifted by the pan offset.
    pub fn slot_matrix(&self, position: [f32; 3]) -> Mat4 {
        let scale = Vec3::from(self.scale);
        let offset = Vec3::from(self.offset) + Vec3::from(position) * scale;
        build_transform(&self.projection, offset, self.rotation, self.scale)
    }
}

/// `projection * translate * rotate_x * rotate_y * rotate_z * scale`.
///
/// The composition order is fixed; swapping the rotation axes changes the result.
pub fn build_transform(
    projection: &Projection,
    offset: Vec3,
    rotation: [f32; 3],
    scale: [f32; 3],
) -> Mat4 {
    let model = Mat4::from_translation(offset)
        * Mat4::from_rotation_x(rotation[0])
        * Mat4::from_rotation_y(rotation[1])
        * Mat4::from_rotation_z(rotation[2])
        * Mat4::from_scale(Vec3::from(scale));
    projection.matrix() * model
}

/// Column-major array layout expected by GPU storage buffers.
pub fn to_columns(matrix: Mat4) -> [[f32; 4]; 4] {
    matrix.to_cols_array_2d()
}
