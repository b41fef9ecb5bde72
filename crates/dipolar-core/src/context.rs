//! Read-only physical state shared by beam initialisation and generation.
//!
//! A [`ScatteringContext`] bundles everything the beam code needs to know
//! about the current run: wavenumber, incident frame (already expressed in
//! the particle frame), particle orientation, optional substrate, and
//! whether this process coordinates logging. It is built once per
//! configuration (or orientation) and passed by reference.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::beam::BeamError;
use crate::orientation::Orientation;
use crate::vector::{cross, dot, norm, normalise, scale, sub};

/// Tolerance for the unit-length and orthogonality checks of a frame.
const FRAME_TOLERANCE: f64 = 1e-8;

/// Which of the two incident polarisations is being generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncidentPolarization {
    X,
    Y,
}

impl IncidentPolarization {
    pub fn both() -> [IncidentPolarization; 2] {
        [IncidentPolarization::Y, IncidentPolarization::X]
    }
}

impl std::fmt::Display for IncidentPolarization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IncidentPolarization::X => write!(f, "X"),
            IncidentPolarization::Y => write!(f, "Y"),
        }
    }
}

/// Right-handed orthonormal triple (pol_x, pol_y, prop).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IncidentFrame {
    prop: [f64; 3],
    pol_x: [f64; 3],
    pol_y: [f64; 3],
}

impl Default for IncidentFrame {
    fn default() -> Self {
        Self::along_z()
    }
}

impl IncidentFrame {
    /// Propagation along +z, X polarisation along +x.
    pub fn along_z() -> Self {
        Self {
            prop: [0.0, 0.0, 1.0],
            pol_x: [1.0, 0.0, 0.0],
            pol_y: [0.0, 1.0, 0.0],
        }
    }

    /// Build a frame from the propagation direction and the X polarisation.
    /// The Y polarisation is `prop × pol_x`.
    pub fn new(prop: [f64; 3], pol_x: [f64; 3]) -> Result<Self, BeamError> {
        for (name, v) in [("propagation", &prop), ("polarisation", &pol_x)] {
            let len = norm(v);
            if !len.is_finite() || (len - 1.0).abs() > FRAME_TOLERANCE {
                return Err(BeamError::InvalidFrame(format!(
                    "{name} vector {v:?} is not a unit vector (|v| = {len:.3e})"
                )));
            }
        }
        let overlap = dot(&prop, &pol_x);
        if overlap.abs() > FRAME_TOLERANCE {
            return Err(BeamError::InvalidFrame(format!(
                "polarisation is not orthogonal to propagation (dot = {overlap:.3e})"
            )));
        }
        Ok(Self {
            prop,
            pol_x,
            pol_y: cross(&prop, &pol_x),
        })
    }

    /// Frame for an arbitrary, not necessarily normalised, propagation
    /// direction. `pol_x` is the lab axis least aligned with `prop`, made
    /// orthogonal to it; for propagation along ±z that is the x axis.
    pub fn from_propagation(prop: [f64; 3]) -> Result<Self, BeamError> {
        let len = norm(&prop);
        if !(len.is_finite() && len > 0.0) {
            return Err(BeamError::InvalidFrame(format!(
                "propagation vector {prop:?} has no direction"
            )));
        }
        let prop = normalise(&prop);
        let axis = (0..3)
            .min_by(|&a, &b| prop[a].abs().total_cmp(&prop[b].abs()))
            .unwrap_or(0);
        let mut seed = [0.0; 3];
        seed[axis] = 1.0;
        let along = dot(&seed, &prop);
        let pol_x = normalise(&sub(&seed, &scale(&prop, along)));
        Self::new(prop, pol_x)
    }

    pub fn prop(&self) -> &[f64; 3] {
        &self.prop
    }

    pub fn pol_x(&self) -> &[f64; 3] {
        &self.pol_x
    }

    pub fn pol_y(&self) -> &[f64; 3] {
        &self.pol_y
    }

    /// Polarisation axis `ex` and its complement `ey` for the requested
    /// polarisation, such that `(ex, ey, prop)` is right-handed.
    pub fn axes(&self, which: IncidentPolarization) -> ([f64; 3], [f64; 3]) {
        match which {
            IncidentPolarization::X => (self.pol_x, self.pol_y),
            IncidentPolarization::Y => (
                self.pol_y,
                [-self.pol_x[0], -self.pol_x[1], -self.pol_x[2]],
            ),
        }
    }

    /// The same frame seen from a rotated particle.
    pub fn in_particle_frame(&self, orientation: &Orientation) -> Self {
        Self {
            prop: orientation.lab_to_particle(&self.prop),
            pol_x: orientation.lab_to_particle(&self.pol_x),
            pol_y: orientation.lab_to_particle(&self.pol_y),
        }
    }
}

/// Optical contrast of the substrate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SubstrateMedium {
    /// Complex refractive index relative to the upper half-space.
    Dielectric(Complex64),
    /// Infinite contrast: a perfect reflector.
    PerfectConductor,
}

/// Planar interface z = −height below the particle origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Substrate {
    pub medium: SubstrateMedium,
    /// Height of the particle-frame origin above the interface.
    pub height: f64,
}

impl Substrate {
    pub fn dielectric(index: Complex64, height: f64) -> Result<Self, BeamError> {
        if !index.re.is_finite() || !index.im.is_finite() || index.re <= 0.0 {
            return Err(BeamError::InvalidParameter(format!(
                "substrate refractive index must have a positive real part, got {index}"
            )));
        }
        Self::checked(SubstrateMedium::Dielectric(index), height)
    }

    pub fn perfect_conductor(height: f64) -> Result<Self, BeamError> {
        Self::checked(SubstrateMedium::PerfectConductor, height)
    }

    fn checked(medium: SubstrateMedium, height: f64) -> Result<Self, BeamError> {
        if !height.is_finite() {
            return Err(BeamError::InvalidParameter(format!(
                "substrate height must be finite, got {height}"
            )));
        }
        Ok(Self { medium, height })
    }

    /// Refractive index, or `None` for a perfect conductor.
    pub fn index(&self) -> Option<Complex64> {
        match self.medium {
            SubstrateMedium::Dielectric(m) => Some(m),
            SubstrateMedium::PerfectConductor => None,
        }
    }
}

/// Physical state of the current run, as seen by the beam code.
#[derive(Debug, Clone)]
pub struct ScatteringContext {
    wavenumber: f64,
    lab_frame: IncidentFrame,
    orientation: Orientation,
    frame: IncidentFrame,
    substrate: Option<Substrate>,
    coordinator: bool,
}

impl ScatteringContext {
    /// Context for a free-space run with an unrotated particle.
    pub fn new(wavenumber: f64, lab_frame: IncidentFrame) -> Result<Self, BeamError> {
        if !(wavenumber.is_finite() && wavenumber > 0.0) {
            return Err(BeamError::InvalidParameter(format!(
                "wavenumber must be positive and finite, got {wavenumber}"
            )));
        }
        Ok(Self {
            wavenumber,
            lab_frame,
            orientation: Orientation::identity(),
            frame: lab_frame,
            substrate: None,
            coordinator: true,
        })
    }

    /// Context from a vacuum wavelength.
    pub fn from_wavelength(wavelength: f64, lab_frame: IncidentFrame) -> Result<Self, BeamError> {
        Self::new(2.0 * std::f64::consts::PI / wavelength, lab_frame)
    }

    pub fn with_substrate(mut self, substrate: Substrate) -> Self {
        self.substrate = Some(substrate);
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self.frame = self.lab_frame.in_particle_frame(&orientation);
        self
    }

    /// Mark whether this process emits human-readable descriptions.
    pub fn with_coordinator(mut self, coordinator: bool) -> Self {
        self.coordinator = coordinator;
        self
    }

    pub fn wavenumber(&self) -> f64 {
        self.wavenumber
    }

    pub fn wavelength(&self) -> f64 {
        2.0 * std::f64::consts::PI / self.wavenumber
    }

    /// Incident frame in the particle reference frame.
    pub fn frame(&self) -> &IncidentFrame {
        &self.frame
    }

    pub fn lab_frame(&self) -> &IncidentFrame {
        &self.lab_frame
    }

    pub fn orientation(&self) -> &Orientation {
        &self.orientation
    }

    pub fn substrate(&self) -> Option<&Substrate> {
        self.substrate.as_ref()
    }

    pub fn is_coordinator(&self) -> bool {
        self.coordinator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_frame_is_right_handed_for_both_polarisations() {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let frame = IncidentFrame::new([s, 0.0, s], [s, 0.0, -s]).unwrap();
        for which in IncidentPolarization::both() {
            let (ex, ey) = frame.axes(which);
            let ez = cross(&ex, &ey);
            for c in 0..3 {
                assert_abs_diff_eq!(ez[c], frame.prop()[c], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_frame_rejects_non_orthogonal_polarisation() {
        let err = IncidentFrame::new([0.0, 0.0, 1.0], [0.6, 0.0, 0.8]).unwrap_err();
        assert!(matches!(err, BeamError::InvalidFrame(_)));
    }

    #[test]
    fn test_frame_rejects_non_unit_vectors() {
        assert!(IncidentFrame::new([0.0, 0.0, 2.0], [1.0, 0.0, 0.0]).is_err());
        assert!(IncidentFrame::new([0.0, 0.0, 1.0], [f64::NAN, 0.0, 0.0]).is_err());
    }

    #[test]
    fn test_frame_from_propagation() {
        let f = IncidentFrame::from_propagation([0.0, 0.0, -2.0]).unwrap();
        assert_eq!(*f.prop(), [0.0, 0.0, -1.0]);
        assert_eq!(*f.pol_x(), [1.0, 0.0, 0.0]);

        let f = IncidentFrame::from_propagation([1.0, 1.0, 1.0]).unwrap();
        assert!(dot(f.prop(), f.pol_x()).abs() < 1e-12);
        assert!((norm(f.pol_x()) - 1.0).abs() < 1e-12);

        assert!(IncidentFrame::from_propagation([0.0; 3]).is_err());
    }

    #[test]
    fn test_context_rejects_bad_wavenumber() {
        assert!(ScatteringContext::new(0.0, IncidentFrame::along_z()).is_err());
        assert!(ScatteringContext::new(-1.0, IncidentFrame::along_z()).is_err());
        assert!(ScatteringContext::new(f64::INFINITY, IncidentFrame::along_z()).is_err());
    }

    #[test]
    fn test_orientation_rotates_frame() {
        let ctx = ScatteringContext::new(1.0, IncidentFrame::along_z())
            .unwrap()
            .with_orientation(Orientation::from_euler_zyz_deg(0.0, 90.0, 0.0));
        // Lab +z is particle −x after a +90° tilt about y.
        assert_abs_diff_eq!(ctx.frame().prop()[0], -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ctx.lab_frame().prop()[2], 1.0);
    }

    #[test]
    fn test_substrate_validation() {
        assert!(Substrate::dielectric(Complex64::new(1.5, 0.01), 1.0).is_ok());
        assert!(Substrate::dielectric(Complex64::new(-1.5, 0.0), 1.0).is_err());
        assert!(Substrate::perfect_conductor(f64::NAN).is_err());
        assert_eq!(Substrate::perfect_conductor(0.5).unwrap().index(), None);
    }
}
