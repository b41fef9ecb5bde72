//! Fundamental Gaussian beam with paraxial corrections of increasing order.
//!
//! Coordinates are taken in the beam frame $(\hat{e}_x, \hat{e}_y, \hat{a})$
//! relative to the beam centre and scaled as
//! $x = x_0 / w_0$, $y = y_0 / w_0$, $z = z_0 / (k w_0^2)$, with the
//! confinement factor $s = 1/(k w_0)$. With $\rho^2 = x^2 + y^2$ and
//! $Q = 1/(2z - i)$ the zeroth-order amplitude is
//!
//! $$\psi_0 = -iQ \exp(iQ\rho^2)$$
//!
//! and the field is $e^{ikz_0}\psi_0 (t_1 \hat{e}_x + t_2 \hat{e}_y + t_3 \hat{a})$.
//!
//! # References
//! - L− approximation: G. Gouesbet, B. Maheu, G. Gréhan, *J. Opt. Soc. Am. A*
//!   **5**, 1427 (1988), Eq. (22), complex conjugate.
//! - 3rd order: L. W. Davis, *Phys. Rev. A* **19**, 1177 (1979),
//!   Eqs. (15a), (15b), complex conjugate; "Q" in (15a) read as "Q²".
//! - 5th order: J. P. Barton, D. R. Alexander, *J. Appl. Phys.* **66**, 2800
//!   (1989), Eqs. (25)–(28), complex conjugate.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::BeamError;
use crate::vector::{dot, im_exp, sub, CVec3};

const I: Complex64 = Complex64::new(0.0, 1.0);

/// Order of the paraxial expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GaussianOrder {
    /// Zeroth order (L− approximation).
    LMinus,
    /// Third order, after Davis.
    Davis3,
    /// Fifth order, after Barton and Alexander.
    Barton5,
}

impl GaussianOrder {
    pub fn label(&self) -> &'static str {
        match self {
            GaussianOrder::LMinus => "L- approximation",
            GaussianOrder::Davis3 => "3rd order approximation, by Davis",
            GaussianOrder::Barton5 => "5th order approximation, by Barton",
        }
    }
}

/// Derived constants of a Gaussian beam.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianBeam {
    pub order: GaussianOrder,
    /// Waist radius $w_0$.
    pub width: f64,
    /// Confinement factor $s = 1/(k w_0)$.
    pub confinement: f64,
    s2: f64,
    /// Transverse scale $1/w_0$.
    scale_x: f64,
    /// Longitudinal scale $s/w_0 = 1/(k w_0^2)$.
    scale_z: f64,
    /// Beam centre in the particle frame.
    pub center: [f64; 3],
}

impl GaussianBeam {
    pub fn new(
        order: GaussianOrder,
        width: f64,
        wavenumber: f64,
        center: [f64; 3],
    ) -> Result<Self, BeamError> {
        if !(width > 0.0 && width.is_finite()) {
            return Err(BeamError::NonPositiveWidth(width));
        }
        let s = 1.0 / (wavenumber * width);
        let scale_x = 1.0 / width;
        Ok(Self {
            order,
            width,
            confinement: s,
            s2: s * s,
            scale_x,
            scale_z: s * scale_x,
            center,
        })
    }

    /// Field at dipole `r` for the beam frame `(ex, ey, prop)`.
    pub fn field_at(
        &self,
        r: &[f64; 3],
        k: f64,
        ex: &[f64; 3],
        ey: &[f64; 3],
        prop: &[f64; 3],
    ) -> CVec3 {
        let r1 = sub(r, &self.center);
        let x = dot(&r1, ex) * self.scale_x;
        let y = dot(&r1, ey) * self.scale_x;
        let z0 = dot(&r1, prop);
        let z = z0 * self.scale_z;
        let ro2 = x * x + y * y;

        let q = Complex64::new(2.0 * z, -1.0).inv();
        let psi0 = -I * q * (I * q * ro2).exp();
        let amplitude = im_exp(k * z0) * psi0;

        let (t1, t2, t3) = self.corrections(x, y, q);
        [
            amplitude * (t1 * ex[0] + t2 * ey[0] + t3 * prop[0]),
            amplitude * (t1 * ex[1] + t2 * ey[1] + t3 * prop[1]),
            amplitude * (t1 * ex[2] + t2 * ey[2] + t3 * prop[2]),
        ]
    }

    /// Weights `(t1, t2, t3)` of `ex`, `ey` and `prop` at scaled
    /// transverse position `(x, y)`.
    pub(crate) fn corrections(&self, x: f64, y: f64, q: Complex64) -> (Complex64, Complex64, Complex64) {
        let one = Complex64::from(1.0);
        let zero = Complex64::from(0.0);
        let s = self.confinement;
        let s2 = self.s2;

        let ro2 = x * x + y * y;
        // Both ratios only appear multiplied by t4 ∝ ρ², which vanishes on the axis
        let (x2_s, xy_s) = if ro2 > 0.0 {
            (x * x / ro2, x * y / ro2)
        } else {
            (0.0, 0.0)
        };
        let q2 = q * q;
        let t4 = s2 * ro2 * q2; // (s ρ Q)²
        let t5 = I * ro2 * q; // iQρ²
        let t6 = ro2 * ro2 * q2; // ρ⁴Q²
        let t7 = x * s * q;

        match self.order {
            GaussianOrder::LMinus => (one, zero, zero),
            GaussianOrder::Davis3 => {
                let t1 = one - t4 * (4.0 * x2_s + t5);
                let t3 = 2.0 * t7 * (-one + I * q * s2 * (-4.0 * t5 + t6 - 2.0));
                (t1, zero, t3)
            }
            GaussianOrder::Barton5 => {
                let t8 = 8.0 + 2.0 * t5;
                let t1 = one
                    + t4 * (-1.0 - 2.0 * x2_s - t5 + t4 * (2.0 + 3.0 * t5 - 0.5 * t6 + x2_s * t8));
                let t2 = xy_s * t4 * (-2.0 + t4 * t8);
                let t3 = t7 * (-2.0 + t4 * (6.0 + 2.0 * t5 + t4 * (-20.0 - 10.0 * t5 + t6)));
                (t1, t2, t3)
            }
        }
    }
}
