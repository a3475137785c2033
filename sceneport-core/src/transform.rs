//! Transform decomposition across the host/interchange coordinate
//! boundary.
//!
//! The host convention is Z-up, the interchange convention Y-up. The remap
//! is a fixed axis permutation with one sign flip, applied to every
//! position, rotation and scale crossing the boundary; it is a session-wide
//! constant, never configurable per call.

use glam::{Mat4, Quat, Vec3};

/// Rotation applied to the single import-side correction root: +90° about
/// X, the inverse of the export remap.
pub const AXIS_CORRECTION: Quat = Quat::from_xyzw(
    std::f32::consts::FRAC_1_SQRT_2,
    0.0,
    0.0,
    std::f32::consts::FRAC_1_SQRT_2,
);

/// How a local matrix is being decomposed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformRole {
    /// An ordinary node's local transform.
    Node,
    /// A duplication-group instancing node; translation comes from the
    /// negated, remapped group offset instead of the matrix.
    DuplicationOffset(Vec3),
}

/// Decomposed TRS in the interchange convention. A field equal to its
/// default is reported absent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Trs {
    pub translation: Option<[f32; 3]>,
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
}

/// Remaps a position or direction from host to interchange axes.
pub fn swizzle_translation(value: Vec3) -> Vec3 {
    Vec3::new(value.x, value.z, -value.y)
}

/// Remaps a rotation from host to interchange axes.
pub fn swizzle_rotation(value: Quat) -> Quat {
    Quat::from_xyzw(value.x, value.z, -value.y, value.w)
}

/// Remaps a scale from host to interchange axes. No sign flip: scale is
/// per-axis magnitude.
pub fn swizzle_scale(value: Vec3) -> Vec3 {
    Vec3::new(value.x, value.z, value.y)
}

/// Decomposes a local transform into interchange-convention TRS.
///
/// Comparisons against the defaults are exact, not tolerance-based: the
/// identity values are produced bit-exactly by the decomposition, and
/// epsilon matching would change which nodes carry explicit TRS fields.
pub fn decompose_transform(matrix: Mat4, role: TransformRole) -> Trs {
    let (scale, rotation, translation) = matrix.to_scale_rotation_translation();

    let translation = match role {
        TransformRole::Node => swizzle_translation(translation),
        TransformRole::DuplicationOffset(offset) => -swizzle_translation(offset),
    };
    let rotation = swizzle_rotation(rotation);
    let scale = swizzle_scale(scale);

    Trs {
        translation: (translation != Vec3::ZERO).then(|| translation.to_array()),
        rotation: (rotation != Quat::IDENTITY).then(|| rotation.to_array()),
        scale: (scale != Vec3::ONE).then(|| scale.to_array()),
    }
}
