//! Small fixed-size vector helpers.
//!
//! Positions and directions are plain `[f64; 3]`; field amplitudes are
//! `[Complex64; 3]`. These helpers keep the per-dipole loops free of
//! temporary allocations.

use num_complex::Complex64;

pub type CVec3 = [Complex64; 3];

pub fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn norm(v: &[f64; 3]) -> f64 {
    dot(v, v).sqrt()
}

pub fn normalise(v: &[f64; 3]) -> [f64; 3] {
    let len = norm(v);
    [v[0] / len, v[1] / len, v[2] / len]
}

pub fn scale(v: &[f64; 3], a: f64) -> [f64; 3] {
    [a * v[0], a * v[1], a * v[2]]
}

pub fn sub(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Mirror image about the interface plane z = 0.
pub fn reflect_z(v: &[f64; 3]) -> [f64; 3] {
    [v[0], v[1], -v[2]]
}

/// Mirror image about the z axis, promoted to complex: `(-x, -y, z)`.
///
/// This is how the in-plane (p) polarisation vector transforms on reflection
/// with the sign convention of [`crate::beam::fresnel`].
pub fn inverse_reflect(v: &[f64; 3]) -> CVec3 {
    [
        Complex64::from(-v[0]),
        Complex64::from(-v[1]),
        Complex64::from(v[2]),
    ]
}

pub fn to_complex(v: &[f64; 3]) -> CVec3 {
    [Complex64::from(v[0]), Complex64::from(v[1]), Complex64::from(v[2])]
}

pub fn real_part(v: &CVec3) -> [f64; 3] {
    [v[0].re, v[1].re, v[2].re]
}

/// `a × b` for real `a` and complex `b`.
pub fn cross_rc(a: &[f64; 3], b: &CVec3) -> CVec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// `a · r` for complex `a` and real `r` (no conjugation).
pub fn dot_cr(a: &CVec3, r: &[f64; 3]) -> Complex64 {
    a[0] * r[0] + a[1] * r[1] + a[2] * r[2]
}

pub fn cscale(v: &CVec3, a: Complex64) -> CVec3 {
    [a * v[0], a * v[1], a * v[2]]
}

/// `a * v` for complex `a` and real `v`.
pub fn cscale_real(v: &[f64; 3], a: Complex64) -> CVec3 {
    [a * v[0], a * v[1], a * v[2]]
}

/// Squared Hermitian norm `|v_x|² + |v_y|² + |v_z|²`.
pub fn cnorm_sqr(v: &CVec3) -> f64 {
    v[0].norm_sqr() + v[1].norm_sqr() + v[2].norm_sqr()
}

/// `exp(i·phase)` for real `phase`.
pub fn im_exp(phase: f64) -> Complex64 {
    Complex64::from_polar(1.0, phase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_cross_is_right_handed() {
        let z = cross(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]);
        assert_eq!(z, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_mixed_cross_matches_real_cross() {
        let a = [0.3, -0.2, 0.9];
        let b = [1.0, 2.0, -0.5];
        let real = cross(&a, &b);
        let mixed = cross_rc(&a, &to_complex(&b));
        for c in 0..3 {
            assert_abs_diff_eq!(mixed[c].re, real[c], epsilon = 1e-15);
            assert_abs_diff_eq!(mixed[c].im, 0.0);
        }
    }

    #[test]
    fn test_reflections() {
        let v = [0.1, 0.2, -0.3];
        assert_eq!(reflect_z(&v), [0.1, 0.2, 0.3]);
        assert_eq!(real_part(&inverse_reflect(&v)), [-0.1, -0.2, -0.3]);
    }
}
