//! Fresnel coefficients at a planar interface.
//!
//! All coefficients are written in terms of the normal components of the
//! incident and transmitted wavevectors, `ki` and `kt` (any common factor,
//! usually $k_0$, cancels), and the ratio of refractive indices
//! $m_r = m_t / m_i$. With complex indices or beyond the critical angle both
//! `ki` and `kt` are complex.
//!
//! Sign convention for p polarisation: the reflected amplitude multiplies the
//! in-plane inverse reflection $(-e_x, -e_y, e_z)$ of the incident
//! polarisation axis, so that $r_p \to +1$ for a perfect conductor and
//! $r_p = -r_s$ at normal incidence.

use num_complex::Complex64;

/// Square root with the branch cut along the positive real axis.
///
/// Returns the root with non-negative imaginary part, so that a normal
/// wavevector component built from it describes a wave that decays (rather
/// than grows) away from the interface.
pub fn cut_sqrt(z: Complex64) -> Complex64 {
    let root = z.sqrt();
    if root.im < 0.0 || (root.im == 0.0 && root.re < 0.0) {
        -root
    } else {
        root
    }
}

/// Reflection and transmission amplitude ratios for one polarisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FresnelCoefficients {
    pub reflection: Complex64,
    pub transmission: Complex64,
}

impl FresnelCoefficients {
    /// s polarisation (E perpendicular to the plane of incidence).
    pub fn s_polarised(ki: Complex64, kt: Complex64) -> Self {
        let denom = ki + kt;
        Self {
            reflection: (ki - kt) / denom,
            transmission: 2.0 * ki / denom,
        }
    }

    /// p polarisation (E in the plane of incidence).
    pub fn p_polarised(ki: Complex64, kt: Complex64, mr: Complex64) -> Self {
        let mr2_ki = mr * mr * ki;
        let denom = mr2_ki + kt;
        Self {
            reflection: (mr2_ki - kt) / denom,
            transmission: 2.0 * mr * ki / denom,
        }
    }

    /// Reflectance $|r|^2$.
    pub fn reflectance(&self) -> f64 {
        self.reflection.norm_sqr()
    }

    /// Transmittance $\mathrm{Re}(k_t / k_i)\,|t|^2$ for real incident `ki`.
    pub fn transmittance(&self, ki: Complex64, kt: Complex64) -> f64 {
        (kt / ki).re * self.transmission.norm_sqr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_cut_sqrt_branch() {
        // Negative real argument → purely positive imaginary root
        let r = cut_sqrt(c(-4.0, 0.0));
        assert_abs_diff_eq!(r.re, 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(r.im, 2.0, epsilon = 1e-15);

        // Signed zero must not flip the branch
        let r = cut_sqrt(c(-4.0, -0.0));
        assert_abs_diff_eq!(r.im, 2.0, epsilon = 1e-15);

        // Lower half-plane argument → root moved to the upper half-plane
        let r = cut_sqrt(c(1.0, -1.0));
        assert!(r.im > 0.0);
        assert_abs_diff_eq!((r * r - c(1.0, -1.0)).norm(), 0.0, epsilon = 1e-14);

        // Positive reals keep the usual root
        assert_abs_diff_eq!(cut_sqrt(c(2.25, 0.0)).re, 1.5, epsilon = 1e-15);
    }

    #[test]
    fn test_normal_incidence_textbook_values() {
        let m = 1.5;
        let s = FresnelCoefficients::s_polarised(c(1.0, 0.0), c(m, 0.0));
        let p = FresnelCoefficients::p_polarised(c(1.0, 0.0), c(m, 0.0), c(m, 0.0));
        assert_abs_diff_eq!(s.reflection.re, (1.0 - m) / (1.0 + m), epsilon = 1e-14);
        assert_abs_diff_eq!(s.transmission.re, 2.0 / (1.0 + m), epsilon = 1e-14);
        assert_abs_diff_eq!(p.reflection.re, -s.reflection.re, epsilon = 1e-14);
        assert_abs_diff_eq!(p.transmission.re, s.transmission.re, epsilon = 1e-14);
    }

    #[test]
    fn test_energy_conservation_lossless() {
        let m = 1.7;
        for deg in [0.0_f64, 15.0, 40.0, 70.0, 89.0] {
            let sin_t = deg.to_radians().sin();
            let ki = c(deg.to_radians().cos(), 0.0);
            let kt = cut_sqrt(c(m * m - sin_t * sin_t, 0.0));
            let s = FresnelCoefficients::s_polarised(ki, kt);
            let p = FresnelCoefficients::p_polarised(ki, kt, c(m, 0.0));
            assert_abs_diff_eq!(s.reflectance() + s.transmittance(ki, kt), 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(p.reflectance() + p.transmittance(ki, kt), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_total_internal_reflection() {
        // From glass into vacuum beyond the critical angle: |r| = 1, no transmitted power.
        let m = 1.5;
        let sin_t: f64 = 0.9;
        let ki = c(m * (1.0 - sin_t * sin_t).sqrt(), 0.0);
        let kt = cut_sqrt(c(1.0 - m * m * sin_t * sin_t, 0.0));
        assert!(kt.im > 0.0);
        let s = FresnelCoefficients::s_polarised(ki, kt);
        let p = FresnelCoefficients::p_polarised(ki, kt, c(1.0 / m, 0.0));
        assert_abs_diff_eq!(s.reflectance(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.reflectance(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.transmittance(ki, kt), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_p_reflection_tends_to_one_for_large_contrast() {
        let p = FresnelCoefficients::p_polarised(c(0.8, 0.0), c(1e6, 0.0), c(1e6, 0.0));
        assert_abs_diff_eq!(p.reflection.re, 1.0, epsilon = 1e-5);
    }
}
