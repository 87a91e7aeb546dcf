//! Rigid transform representation and math operations
//!
//! Provides [`RigidTransform`], a rotation matrix plus translation vector
//! with composition, inversion, validation and re-orthonormalization.
//! Everything is `f64`; rotations are stored as row-major 3x3 matrices so the
//! 4x4 wire form converts without loss.

use serde::{Deserialize, Serialize};

use crate::error::{TransformDefect, WrtResult};

/// Row-major 3x3 rotation matrix
pub type Rotation = [[f64; 3]; 3];

/// Row-major 4x4 homogeneous matrix
pub type Matrix4 = [[f64; 4]; 4];

pub const IDENTITY_ROTATION: Rotation = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Pose of a frame relative to another
///
/// Maps coordinates of the child frame into the parent frame:
/// `p_parent = rotation * p_child + translation`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    /// Rotation matrix (row-major)
    pub rotation: Rotation,
    /// Translation [x, y, z]
    pub translation: [f64; 3],
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl RigidTransform {
    /// Identity transform (no translation or rotation)
    pub const fn identity() -> Self {
        Self {
            rotation: IDENTITY_ROTATION,
            translation: [0.0, 0.0, 0.0],
        }
    }

    /// Create from a rotation matrix and translation, unchecked
    pub const fn new(rotation: Rotation, translation: [f64; 3]) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub const fn from_translation(translation: [f64; 3]) -> Self {
        Self {
            rotation: IDENTITY_ROTATION,
            translation,
        }
    }

    pub const fn from_rotation(rotation: Rotation) -> Self {
        Self {
            rotation,
            translation: [0.0, 0.0, 0.0],
        }
    }

    /// Create from translation and a rotation of `angle` radians about `axis`
    pub fn from_axis_angle(translation: [f64; 3], axis: [f64; 3], angle: f64) -> Self {
        Self {
            rotation: axis_angle_to_matrix(axis, angle),
            translation,
        }
    }

    /// Create from translation and Euler angles (roll, pitch, yaw) in radians
    ///
    /// Uses the `Rz(yaw) * Ry(pitch) * Rx(roll)` convention.
    pub fn from_euler(translation: [f64; 3], rpy: [f64; 3]) -> Self {
        let rx = axis_angle_to_matrix([1.0, 0.0, 0.0], rpy[0]);
        let ry = axis_angle_to_matrix([0.0, 1.0, 0.0], rpy[1]);
        let rz = axis_angle_to_matrix([0.0, 0.0, 1.0], rpy[2]);
        Self {
            rotation: mat_mul(&rz, &mat_mul(&ry, &rx)),
            translation,
        }
    }

    /// Create from translation and a unit quaternion [x, y, z, w]
    pub fn from_quaternion(translation: [f64; 3], q: [f64; 4]) -> Self {
        Self {
            rotation: quaternion_to_matrix(q),
            translation,
        }
    }

    /// Create from a 4x4 homogeneous matrix (row-major), validating it
    ///
    /// Rejects non-finite entries, a bottom row other than `[0, 0, 0, 1]`,
    /// and rotations that are not orthonormal with determinant +1 within
    /// `tolerance`.
    pub fn from_matrix(m: &Matrix4, tolerance: f64) -> WrtResult<Self> {
        if m.iter().flatten().any(|v| !v.is_finite()) {
            return Err(TransformDefect::NonFinite.into());
        }
        if m[3] != [0.0, 0.0, 0.0, 1.0] {
            return Err(TransformDefect::BadHomogeneousRow.into());
        }
        let tf = Self {
            rotation: [
                [m[0][0], m[0][1], m[0][2]],
                [m[1][0], m[1][1], m[1][2]],
                [m[2][0], m[2][1], m[2][2]],
            ],
            translation: [m[0][3], m[1][3], m[2][3]],
        };
        tf.validate(tolerance)?;
        Ok(tf)
    }

    /// Convert to a 4x4 homogeneous matrix (row-major)
    pub fn to_matrix(&self) -> Matrix4 {
        let r = &self.rotation;
        let t = &self.translation;
        [
            [r[0][0], r[0][1], r[0][2], t[0]],
            [r[1][0], r[1][1], r[1][2], t[1]],
            [r[2][0], r[2][1], r[2][2], t[2]],
            [0.0, 0.0, 0.0, 1.0],
        ]
    }

    /// Check that the rotation is a proper orthonormal matrix
    pub fn validate(&self, tolerance: f64) -> Result<(), TransformDefect> {
        if self
            .rotation
            .iter()
            .flatten()
            .chain(self.translation.iter())
            .any(|v| !v.is_finite())
        {
            return Err(TransformDefect::NonFinite);
        }

        let deviation = orthonormality_deviation(&self.rotation);
        if deviation > tolerance {
            return Err(TransformDefect::NotOrthonormal { deviation });
        }

        let determinant = determinant(&self.rotation);
        if (determinant - 1.0).abs() > tolerance {
            return Err(TransformDefect::NotProperRotation { determinant });
        }

        Ok(())
    }

    /// Compose two transforms: `self * other`
    ///
    /// If `self` is the pose of B in A and `other` the pose of C in B, the
    /// result is the pose of C in A.
    pub fn compose(&self, other: &RigidTransform) -> RigidTransform {
        let rotated = mat_vec(&self.rotation, &other.translation);
        RigidTransform {
            rotation: mat_mul(&self.rotation, &other.rotation),
            translation: [
                self.translation[0] + rotated[0],
                self.translation[1] + rotated[1],
                self.translation[2] + rotated[2],
            ],
        }
    }

    /// Invert transform (reverse direction)
    pub fn inverse(&self) -> RigidTransform {
        let rt = transpose(&self.rotation);
        let t = mat_vec(&rt, &self.translation);
        RigidTransform {
            rotation: rt,
            translation: [-t[0], -t[1], -t[2]],
        }
    }

    /// Left-multiply both components by `r`: `(r * R, r * t)`
    pub fn rotated_by(&self, r: &Rotation) -> RigidTransform {
        RigidTransform {
            rotation: mat_mul(r, &self.rotation),
            translation: mat_vec(r, &self.translation),
        }
    }

    /// Left-multiply both components by `r^T`, the inverse of [`rotated_by`]
    ///
    /// [`rotated_by`]: RigidTransform::rotated_by
    pub fn rotated_by_inverse(&self, r: &Rotation) -> RigidTransform {
        self.rotated_by(&transpose(r))
    }

    /// Apply transform to a 3D point
    pub fn transform_point(&self, point: [f64; 3]) -> [f64; 3] {
        let rotated = mat_vec(&self.rotation, &point);
        [
            rotated[0] + self.translation[0],
            rotated[1] + self.translation[1],
            rotated[2] + self.translation[2],
        ]
    }

    /// Apply transform to a vector (rotation only, no translation)
    pub fn transform_vector(&self, vector: [f64; 3]) -> [f64; 3] {
        mat_vec(&self.rotation, &vector)
    }

    /// Project the rotation back onto SO(3) (Gram-Schmidt on the rows)
    pub fn orthonormalize(&mut self) {
        self.rotation = orthonormalize(&self.rotation);
    }

    /// Replace components with magnitude below `epsilon` by exact zeros
    pub fn snap(&mut self, epsilon: f64) {
        for v in self
            .rotation
            .iter_mut()
            .flatten()
            .chain(self.translation.iter_mut())
        {
            if v.abs() < epsilon {
                *v = 0.0;
            }
        }
    }

    /// Rotation as a unit quaternion [x, y, z, w]
    pub fn to_quaternion(&self) -> [f64; 4] {
        matrix_to_quaternion(&self.rotation)
    }

    /// Component-wise comparison of the 4x4 matrices
    pub fn approx_eq(&self, other: &RigidTransform, epsilon: f64) -> bool {
        self.rotation
            .iter()
            .flatten()
            .zip(other.rotation.iter().flatten())
            .chain(self.translation.iter().zip(other.translation.iter()))
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }

    /// Check if transform is approximately identity
    pub fn is_identity(&self, epsilon: f64) -> bool {
        self.approx_eq(&RigidTransform::identity(), epsilon)
    }

    /// Get the distance (translation magnitude) of this transform
    pub fn translation_magnitude(&self) -> f64 {
        norm(&self.translation)
    }

    /// Get the rotation angle in radians
    pub fn rotation_angle(&self) -> f64 {
        let r = &self.rotation;
        let cos = ((r[0][0] + r[1][1] + r[2][2] - 1.0) / 2.0).clamp(-1.0, 1.0);
        cos.acos()
    }
}

impl From<RigidTransform> for Matrix4 {
    fn from(tf: RigidTransform) -> Self {
        tf.to_matrix()
    }
}

// Matrix helpers

pub fn mat_mul(a: &Rotation, b: &Rotation) -> Rotation {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
    out
}

pub fn mat_vec(m: &Rotation, v: &[f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

pub fn transpose(m: &Rotation) -> Rotation {
    [
        [m[0][0], m[1][0], m[2][0]],
        [m[0][1], m[1][1], m[2][1]],
        [m[0][2], m[1][2], m[2][2]],
    ]
}

fn determinant(m: &Rotation) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Frobenius norm of `R * R^T - I`
fn orthonormality_deviation(m: &Rotation) -> f64 {
    let rrt = mat_mul(m, &transpose(m));
    let mut sum = 0.0;
    for (i, row) in rrt.iter().enumerate() {
        for (j, v) in row.iter().enumerate() {
            let d = if i == j { v - 1.0 } else { *v };
            sum += d * d;
        }
    }
    sum.sqrt()
}

fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(v: &[f64; 3]) -> f64 {
    dot(v, v).sqrt()
}

fn normalized(v: [f64; 3]) -> [f64; 3] {
    let n = norm(&v);
    if n < 1e-12 {
        return v;
    }
    [v[0] / n, v[1] / n, v[2] / n]
}

fn orthonormalize(m: &Rotation) -> Rotation {
    let x = normalized(m[0]);
    let d = dot(&m[1], &x);
    let y = normalized([m[1][0] - d * x[0], m[1][1] - d * x[1], m[1][2] - d * x[2]]);
    let z = cross(&x, &y);
    [x, y, z]
}

fn axis_angle_to_matrix(axis: [f64; 3], angle: f64) -> Rotation {
    let n = norm(&axis);
    if n < 1e-10 {
        return IDENTITY_ROTATION;
    }
    let [x, y, z] = [axis[0] / n, axis[1] / n, axis[2] / n];
    let (s, c) = angle.sin_cos();
    let t = 1.0 - c;

    [
        [t * x * x + c, t * x * y - s * z, t * x * z + s * y],
        [t * x * y + s * z, t * y * y + c, t * y * z - s * x],
        [t * x * z - s * y, t * y * z + s * x, t * z * z + c],
    ]
}

fn quaternion_to_matrix(q: [f64; 4]) -> Rotation {
    let n = (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt();
    if n < 1e-10 {
        return IDENTITY_ROTATION;
    }
    let [x, y, z, w] = [q[0] / n, q[1] / n, q[2] / n, q[3] / n];

    let xx = x * x;
    let yy = y * y;
    let zz = z * z;
    let xy = x * y;
    let xz = x * z;
    let yz = y * z;
    let wx = w * x;
    let wy = w * y;
    let wz = w * z;

    [
        [1.0 - 2.0 * (yy + zz), 2.0 * (xy - wz), 2.0 * (xz + wy)],
        [2.0 * (xy + wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz - wx)],
        [2.0 * (xz - wy), 2.0 * (yz + wx), 1.0 - 2.0 * (xx + yy)],
    ]
}

fn matrix_to_quaternion(m: &Rotation) -> [f64; 4] {
    let trace = m[0][0] + m[1][1] + m[2][2];

    if trace > 0.0 {
        let s = 0.5 / (trace + 1.0).sqrt();
        [
            (m[2][1] - m[1][2]) * s,
            (m[0][2] - m[2][0]) * s,
            (m[1][0] - m[0][1]) * s,
            0.25 / s,
        ]
    } else if m[0][0] > m[1][1] && m[0][0] > m[2][2] {
        let s = 2.0 * (1.0 + m[0][0] - m[1][1] - m[2][2]).sqrt();
        [
            0.25 * s,
            (m[0][1] + m[1][0]) / s,
            (m[0][2] + m[2][0]) / s,
            (m[2][1] - m[1][2]) / s,
        ]
    } else if m[1][1] > m[2][2] {
        let s = 2.0 * (1.0 + m[1][1] - m[0][0] - m[2][2]).sqrt();
        [
            (m[0][1] + m[1][0]) / s,
            0.25 * s,
            (m[1][2] + m[2][1]) / s,
            (m[0][2] - m[2][0]) / s,
        ]
    } else {
        let s = 2.0 * (1.0 + m[2][2] - m[0][0] - m[1][1]).sqrt();
        [
            (m[0][2] + m[2][0]) / s,
            (m[1][2] + m[2][1]) / s,
            0.25 * s,
            (m[1][0] - m[0][1]) / s,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WrtError;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    const EPSILON: f64 = 1e-10;

    fn assert_vec_eq(a: [f64; 3], b: [f64; 3]) {
        for i in 0..3 {
            assert_abs_diff_eq!(a[i], b[i], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_identity() {
        let tf = RigidTransform::identity();
        assert!(tf.is_identity(EPSILON));
        assert!(tf.validate(EPSILON).is_ok());
    }

    #[test]
    fn test_rotation_about_z() {
        let tf = RigidTransform::from_axis_angle([0.0; 3], [0.0, 0.0, 1.0], FRAC_PI_2);
        assert_vec_eq(tf.transform_point([1.0, 0.0, 0.0]), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_rotation_about_x_matches_fixture() {
        let tf = RigidTransform::from_axis_angle([0.0; 3], [1.0, 0.0, 0.0], FRAC_PI_2);
        let expected = [[1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]];
        assert!(tf.approx_eq(&RigidTransform::from_rotation(expected), 1e-12));
    }

    #[test]
    fn test_compose_and_inverse() {
        let tf = RigidTransform::from_euler([1.0, 2.0, 3.0], [0.1, 0.2, 0.3]);
        assert!(tf.compose(&tf.inverse()).is_identity(1e-9));
        assert!(tf.inverse().compose(&tf).is_identity(1e-9));
    }

    #[test]
    fn test_compose_order() {
        // B in A: rotate 90deg about Z. C in B: 1m along B's x.
        let b_in_a = RigidTransform::from_axis_angle([0.0; 3], [0.0, 0.0, 1.0], FRAC_PI_2);
        let c_in_b = RigidTransform::from_translation([1.0, 0.0, 0.0]);
        let c_in_a = b_in_a.compose(&c_in_b);
        assert_vec_eq(c_in_a.translation, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_matrix_roundtrip_validates() {
        let tf = RigidTransform::from_euler([1.0, -2.0, 0.5], [0.3, -0.2, 1.1]);
        let back = RigidTransform::from_matrix(&tf.to_matrix(), 1e-9).unwrap();
        assert!(back.approx_eq(&tf, 1e-12));
    }

    #[test]
    fn test_from_matrix_rejects_scaled_rotation() {
        let mut m = RigidTransform::identity().to_matrix();
        m[0][0] = 2.0;
        let err = RigidTransform::from_matrix(&m, 1e-9).unwrap_err();
        assert!(matches!(
            err,
            WrtError::InvalidTransform(TransformDefect::NotOrthonormal { .. })
        ));
    }

    #[test]
    fn test_from_matrix_rejects_reflection() {
        let mut m = RigidTransform::identity().to_matrix();
        m[2][2] = -1.0;
        let err = RigidTransform::from_matrix(&m, 1e-9).unwrap_err();
        assert!(matches!(
            err,
            WrtError::InvalidTransform(TransformDefect::NotProperRotation { .. })
        ));
    }

    #[test]
    fn test_from_matrix_rejects_bottom_row() {
        let mut m = RigidTransform::identity().to_matrix();
        m[3][0] = 0.5;
        assert_eq!(
            RigidTransform::from_matrix(&m, 1e-9).unwrap_err(),
            WrtError::InvalidTransform(TransformDefect::BadHomogeneousRow)
        );

        let mut m = RigidTransform::identity().to_matrix();
        m[1][3] = f64::NAN;
        assert_eq!(
            RigidTransform::from_matrix(&m, 1e-9).unwrap_err(),
            WrtError::InvalidTransform(TransformDefect::NonFinite)
        );
    }

    #[test]
    fn test_orthonormalize_removes_drift() {
        let mut tf = RigidTransform::from_euler([0.0; 3], [0.4, 0.5, 0.6]);
        tf.rotation[0][1] += 1e-6;
        tf.rotation[2][0] -= 1e-6;
        assert!(tf.validate(1e-9).is_err());

        tf.orthonormalize();
        assert!(tf.validate(1e-12).is_ok());
    }

    #[test]
    fn test_snap() {
        let mut tf = RigidTransform::from_axis_angle([1.0, 1e-17, 0.0], [1.0, 0.0, 0.0], FRAC_PI_2);
        assert!(tf.rotation[1][1] != 0.0);
        tf.snap(f64::EPSILON);
        assert_eq!(tf.rotation[1][1], 0.0);
        assert_eq!(tf.translation[1], 0.0);
        assert_eq!(tf.translation[0], 1.0);
    }

    #[test]
    fn test_rotated_by_inverse_undoes_rotated_by() {
        let tf = RigidTransform::from_euler([1.0, 2.0, 3.0], [0.1, 0.2, 0.3]);
        let r = RigidTransform::from_euler([0.0; 3], [-0.7, 0.4, 2.0]).rotation;
        assert!(tf.rotated_by(&r).rotated_by_inverse(&r).approx_eq(&tf, 1e-12));
    }

    #[test]
    fn test_quaternion_roundtrip() {
        let tf = RigidTransform::from_axis_angle([0.0; 3], [0.0, 1.0, 0.0], PI / 3.0);
        let q = tf.to_quaternion();
        let back = RigidTransform::from_quaternion([0.0; 3], q);
        assert!(back.approx_eq(&tf, 1e-12));
        assert_abs_diff_eq!(tf.rotation_angle(), PI / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_translation_magnitude() {
        let tf = RigidTransform::from_translation([3.0, 4.0, 0.0]);
        assert_abs_diff_eq!(tf.translation_magnitude(), 5.0);
    }
}
