//! Tait-Bryan angle / rotation matrix conversions and translation
//! compensation.
//!
//! Angles are intrinsic z-y-x Tait-Bryan (yaw applied first, then pitch,
//! then roll), in degrees at the API surface. Near the gimbal pole the
//! matrix-to-angle recovery switches to an explicit saturating branch
//! instead of the ill-conditioned general formula.

/// Row-major 3x3 rotation matrix.
pub type Mat3 = [[f64; 3]; 3];

pub const IDENTITY: Mat3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Band around the pole where `asin`/`atan2` recovery goes unstable.
/// Entered when |R[0][2]| exceeds this.
const GIMBAL_BOUND: f64 = 1.0 - 2e-4;

pub fn mat_mul(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut out = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
    out
}

pub fn transpose(m: &Mat3) -> Mat3 {
    let mut out = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = m[j][i];
        }
    }
    out
}

pub fn mat_vec(m: &Mat3, v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Build a rotation matrix from Tait-Bryan angles in degrees.
///
/// Composition order is yaw, then pitch, then roll, combined by explicit
/// matrix multiplication. `matrix_to_euler` is its exact inverse away from
/// the gimbal band.
pub fn euler_to_matrix(yaw: f64, pitch: f64, roll: f64) -> Mat3 {
    let (s1, c1) = yaw.to_radians().sin_cos();
    let (s2, c2) = pitch.to_radians().sin_cos();
    let (s3, c3) = roll.to_radians().sin_cos();

    [
        [c1 * c2, c2 * s1, -s2],
        [c1 * s2 * s3 - c3 * s1, c1 * c3 + s1 * s2 * s3, c2 * s3],
        [s1 * s3 + c1 * c3 * s2, c3 * s1 * s2 - c1 * s3, c2 * c3],
    ]
}

/// Recover Tait-Bryan angles `[yaw, pitch, roll]` in degrees from a
/// rotation matrix.
///
/// Inside the gimbal band pitch saturates to exactly +-90, yaw collapses to
/// zero, and roll is recovered from the ratio of the two remaining
/// off-diagonal terms. The result is always finite.
pub fn matrix_to_euler(r: &Mat3) -> [f64; 3] {
    if r[0][2] < -GIMBAL_BOUND {
        let roll = (r[1][0] / r[2][0]).atan();
        return [0.0, 90.0, roll.to_degrees()];
    }
    if r[0][2] > GIMBAL_BOUND {
        let roll = (r[1][0] / r[2][0]).atan();
        return [0.0, -90.0, roll.to_degrees()];
    }
    let pitch = (-r[0][2]).asin();
    let roll = r[1][2].atan2(r[2][2]);
    let yaw = r[0][1].atan2(r[0][0]);
    [yaw.to_degrees(), pitch.to_degrees(), roll.to_degrees()]
}

/// Remap a translation vector into the frame implied by `r`.
///
/// The yaw axis physically corresponds to a different translation axis than
/// its channel index, so the input is permuted to `(z, -x, -y)` before the
/// multiply and un-permuted with sign flips on the way out. With `bypass_z`
/// the output z channel carries the raw input z unchanged.
pub fn compensate_translation(r: &Mat3, xyz: [f64; 3], bypass_z: bool) -> [f64; 3] {
    let tvec = [xyz[2], -xyz[0], -xyz[1]];
    let ret = mat_vec(r, tvec);
    [
        -ret[1],
        -ret[2],
        if bypass_z { xyz[2] } else { ret[0] },
    ]
}
