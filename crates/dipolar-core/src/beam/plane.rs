//! Plane-wave illumination, optionally above a planar substrate.
//!
//! Without a substrate the field at dipole $\mathbf{r}$ is simply
//! $\hat{\mathbf{e}} \exp(i k\, \mathbf{r}\cdot\hat{\mathbf{a}})$.
//!
//! With a substrate (interface at $z = -h$ in the particle frame) two regimes
//! exist, decided by the sign of the normal propagation component $a_z$:
//!
//! - $a_z > 0$: the wave arrives through the substrate. Only the wave
//!   transmitted into the upper half-space reaches the particle.
//! - $a_z < 0$: the wave arrives from above. The particle sees the incident
//!   wave plus the wave reflected by the interface.
//!
//! Amplitude normalisation: the incident beam has the irradiance of a
//! unit-amplitude wave in vacuum. A wave incident from the substrate is
//! therefore $\exp(i k m\,\mathbf{r}\cdot\hat{\mathbf{a}})/\sqrt{\mathrm{Re}\,m}$.
//! All secondary-wave amplitudes carry their phase relative to the particle
//! origin, which sits at height $h$ above the interface.

use ndarray::Array2;
use num_complex::Complex64;

use dipolar_compute::ComputeBackend;

use super::fresnel::{cut_sqrt, FresnelCoefficients};
use super::{BeamError, SecondaryWaves};
use crate::context::{IncidentPolarization, ScatteringContext, Substrate};
use crate::vector::{
    cross_rc, cscale, cscale_real, dot, dot_cr, im_exp, inverse_reflect, normalise, real_part,
    reflect_z, to_complex, CVec3,
};

const I: Complex64 = Complex64::new(0.0, 1.0);

/// The wave transmitted across the interface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransmittedWave {
    /// Substrate refractive index.
    pub substrate_index: Complex64,
    /// Normal component of the transmitted wavevector, in units of $k_0$.
    pub kt: Complex64,
    /// Full transmitted wavevector, in units of $k_0$.
    pub wavevector: CVec3,
    /// Unit vector along the real part of `wavevector`.
    pub direction: [f64; 3],
}

impl TransmittedWave {
    fn new(substrate_index: Complex64, kt: Complex64, wavevector: CVec3) -> Self {
        Self {
            substrate_index,
            kt,
            wavevector,
            direction: normalise(&real_part(&wavevector)),
        }
    }
}

/// Side of the interface the incident wave comes from, with the normal
/// wavevector data of that regime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Incidence {
    /// Propagation has a positive z component: the wave crosses the substrate
    /// first and only the transmitted wave reaches the particle.
    FromSubstrate {
        /// Normal component of the incident wavevector in the substrate, in units of $k_0$.
        ki: Complex64,
        transmitted: TransmittedWave,
    },
    /// Propagation has a negative z component: the wave hits the particle first.
    FromAbove {
        /// Normal component of the incident wavevector, in units of $k_0$.
        ki: f64,
        /// `None` for a perfect conductor.
        transmitted: Option<TransmittedWave>,
    },
}

/// Wavevector data for a plane wave coupled to a substrate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubstrateCoupling {
    pub incidence: Incidence,
    pub height: f64,
    /// Mirror image of the propagation direction about the interface.
    pub reflected_direction: [f64; 3],
}

impl SubstrateCoupling {
    /// Derive the normal wavevector components for propagation `prop`.
    pub fn new(substrate: &Substrate, prop: &[f64; 3]) -> Result<Self, BeamError> {
        let transverse_sq = prop[0] * prop[0] + prop[1] * prop[1];

        let incidence = if prop[2] > 0.0 {
            let m = substrate
                .index()
                .ok_or(BeamError::IlluminationThroughConductor)?;
            let arg = Complex64::from(1.0) - m * m * transverse_sq;
            let kt = cut_sqrt(arg);
            if arg.re < 0.0 {
                log::warn!(
                    "Total internal reflection: transmitted wave is evanescent (kt = {kt:.4})"
                );
            }
            Incidence::FromSubstrate {
                ki: m * prop[2],
                transmitted: TransmittedWave::new(m, kt, [m * prop[0], m * prop[1], kt]),
            }
        } else if prop[2] < 0.0 {
            let transmitted = substrate.index().map(|m| {
                let kt = cut_sqrt(m * m - transverse_sq);
                let wavevector = [Complex64::from(prop[0]), Complex64::from(prop[1]), -kt];
                TransmittedWave::new(m, kt, wavevector)
            });
            Incidence::FromAbove {
                ki: -prop[2],
                transmitted,
            }
        } else {
            return Err(BeamError::PropagationAlongSurface);
        };

        Ok(Self {
            incidence,
            height: substrate.height,
            reflected_direction: reflect_z(prop),
        })
    }

    /// Whether this coupling still describes propagation `prop`.
    pub fn matches(&self, prop: &[f64; 3]) -> bool {
        match self.incidence {
            Incidence::FromSubstrate { .. } => prop[2] > 0.0,
            Incidence::FromAbove { .. } => prop[2] < 0.0,
        }
    }

    pub fn transmitted(&self) -> Option<&TransmittedWave> {
        match &self.incidence {
            Incidence::FromSubstrate { transmitted, .. } => Some(transmitted),
            Incidence::FromAbove { transmitted, .. } => transmitted.as_ref(),
        }
    }

    /// Reflected and transmitted amplitude vectors for one polarisation.
    pub fn secondary_waves(
        &self,
        k: f64,
        which: IncidentPolarization,
        ex: &[f64; 3],
        ey: &[f64; 3],
    ) -> SecondaryWaves {
        let h = self.height;
        let (reflected, transmitted) = match &self.incidence {
            Incidence::FromSubstrate { ki, transmitted: t } => {
                let ki = *ki;
                let m = t.substrate_index;
                let (refl, tran, fc) = match which {
                    IncidentPolarization::Y => (
                        to_complex(ex),
                        to_complex(ex),
                        FresnelCoefficients::s_polarised(ki, t.kt),
                    ),
                    IncidentPolarization::X => (
                        inverse_reflect(ex),
                        cross_rc(ey, &t.wavevector),
                        FresnelCoefficients::p_polarised(ki, t.kt, m.inv()),
                    ),
                };
                let norm = m.re.sqrt();
                let refl_phase = (-2.0 * I * k * ki * h).exp();
                let tran_phase = (I * k * (t.kt - ki) * h).exp();
                (
                    cscale(&refl, fc.reflection * refl_phase / norm),
                    Some(cscale(&tran, fc.transmission * tran_phase / norm)),
                )
            }
            Incidence::FromAbove { ki, transmitted } => {
                let ki_c = Complex64::from(*ki);
                let (refl, rc, tran) = match (which, transmitted) {
                    (IncidentPolarization::Y, Some(t)) => {
                        let fc = FresnelCoefficients::s_polarised(ki_c, t.kt);
                        let tran = cscale_real(ex, fc.transmission);
                        (to_complex(ex), fc.reflection, Some((tran, t.kt)))
                    }
                    (IncidentPolarization::X, Some(t)) => {
                        let m = t.substrate_index;
                        let fc = FresnelCoefficients::p_polarised(ki_c, t.kt, m);
                        // (wavevector, wavevector) = m², so dividing by m normalises ey × wavevector
                        let tran = cscale(&cross_rc(ey, &t.wavevector), fc.transmission / m);
                        (inverse_reflect(ex), fc.reflection, Some((tran, t.kt)))
                    }
                    // Perfect reflector
                    (IncidentPolarization::Y, None) => (to_complex(ex), Complex64::from(-1.0), None),
                    (IncidentPolarization::X, None) => {
                        (inverse_reflect(ex), Complex64::from(1.0), None)
                    }
                };
                (
                    cscale(&refl, rc * im_exp(2.0 * k * ki * h)),
                    tran.map(|(tran, kt)| cscale(&tran, (I * k * (ki_c - kt) * h).exp())),
                )
            }
        };

        SecondaryWaves {
            reflected,
            transmitted,
            reflected_direction: self.reflected_direction,
            transmitted_direction: self.transmitted().map(|t| t.direction),
        }
    }
}

/// Plane wave, with the substrate coupling derived at initialisation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneWave {
    pub substrate: Option<SubstrateCoupling>,
}

impl PlaneWave {
    pub(crate) fn initialize(ctx: &ScatteringContext) -> Result<Self, BeamError> {
        let substrate = match ctx.substrate() {
            Some(sub) => {
                let coupling = SubstrateCoupling::new(sub, ctx.frame().prop())?;
                log::debug!("Substrate coupling: {:?}", coupling.incidence);
                Some(coupling)
            }
            None => None,
        };
        Ok(Self { substrate })
    }

    pub(crate) fn generate(
        &self,
        ctx: &ScatteringContext,
        which: IncidentPolarization,
        coords: &[[f64; 3]],
        buffer: &mut Array2<Complex64>,
        backend: &dyn ComputeBackend,
    ) -> Result<Option<SecondaryWaves>, BeamError> {
        let k = ctx.wavenumber();
        let prop = *ctx.frame().prop();
        let (ex, ey) = ctx.frame().axes(which);

        let coupling = match &self.substrate {
            None => {
                backend.fill_rows(buffer, &|i| {
                    cscale_real(&ex, im_exp(k * dot(&coords[i], &prop)))
                })?;
                return Ok(None);
            }
            Some(coupling) => coupling,
        };

        if !coupling.matches(&prop) {
            return Err(BeamError::StaleInitialisation(format!(
                "substrate coupling does not match the current propagation {prop:?}"
            )));
        }

        let waves = coupling.secondary_waves(k, which, &ex, &ey);
        match (&coupling.incidence, waves.transmitted) {
            (Incidence::FromSubstrate { transmitted: t, .. }, Some(tran)) => {
                // Only the transmitted wave reaches the upper half-space
                let kvec = t.wavevector;
                backend.fill_rows(buffer, &|i| {
                    cscale(&tran, (I * k * dot_cr(&kvec, &coords[i])).exp())
                })?;
            }
            _ => {
                let refl = waves.reflected;
                let refl_dir = coupling.reflected_direction;
                backend.fill_rows(buffer, &|i| {
                    let r = &coords[i];
                    let inc = im_exp(k * dot(r, &prop));
                    let back = im_exp(k * dot(r, &refl_dir));
                    [
                        inc * ex[0] + refl[0] * back,
                        inc * ex[1] + refl[1] * back,
                        inc * ex[2] + refl[2] * back,
                    ]
                })?;
            }
        }
        Ok(Some(waves))
    }
}
