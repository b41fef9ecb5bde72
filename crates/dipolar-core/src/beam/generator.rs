//! Fills the incident-field buffer for an initialised [`Beam`].
//!
//! The per-dipole computation depends only on the dipole position and on the
//! read-only beam constants, so rows are filled through a
//! [`ComputeBackend`] that may split them across threads.

use std::sync::Arc;

use ndarray::Array2;
use num_complex::Complex64;

use dipolar_compute::{check_shape, ComputeBackend, CpuBackend};

use super::field_file::{FieldSource, TextFieldReader};
use super::{Beam, BeamError, BeamModel, SecondaryWaves};
use crate::context::{IncidentPolarization, ScatteringContext};

/// Incident-field generator.
pub struct BeamFieldGenerator {
    backend: Arc<dyn ComputeBackend>,
    field_source: Arc<dyn FieldSource>,
}

impl Default for BeamFieldGenerator {
    fn default() -> Self {
        Self {
            backend: Arc::new(CpuBackend::new()),
            field_source: Arc::new(TextFieldReader),
        }
    }
}

impl BeamFieldGenerator {
    pub fn new(backend: Arc<dyn ComputeBackend>) -> Self {
        Self {
            backend,
            field_source: Arc::new(TextFieldReader),
        }
    }

    /// Replace the reader used by file beams.
    pub fn with_field_source(mut self, source: Arc<dyn FieldSource>) -> Self {
        self.field_source = source;
        self
    }

    pub fn backend(&self) -> &dyn ComputeBackend {
        self.backend.as_ref()
    }

    /// Overwrite `buffer` (`N × 3`, one row per entry of `coords`) with the
    /// incident field for polarisation `which`.
    ///
    /// `ctx` must carry the same propagation frame and particle orientation
    /// `beam` was initialised with. Returns the reflected and transmitted waves when a plane wave
    /// meets a substrate, `None` otherwise.
    pub fn generate(
        &self,
        beam: &Beam,
        ctx: &ScatteringContext,
        which: IncidentPolarization,
        coords: &[[f64; 3]],
        buffer: &mut Array2<Complex64>,
    ) -> Result<Option<SecondaryWaves>, BeamError> {
        check_shape(buffer, coords.len())?;

        match beam.model() {
            BeamModel::Plane(plane) => {
                plane.generate(ctx, which, coords, buffer, self.backend.as_ref())
            }
            BeamModel::Gaussian(gaussian) => {
                if ctx.orientation() != beam.orientation() {
                    return Err(BeamError::StaleInitialisation(format!(
                        "beam centre was fixed for orientation {:?}, context has {:?}",
                        beam.orientation().euler_deg(),
                        ctx.orientation().euler_deg()
                    )));
                }
                let k = ctx.wavenumber();
                let prop = *ctx.frame().prop();
                let (ex, ey) = ctx.frame().axes(which);
                self.backend.fill_rows(buffer, &|i| {
                    gaussian.field_at(&coords[i], k, &ex, &ey, &prop)
                })?;
                Ok(None)
            }
            BeamModel::File(files) => {
                let path = files
                    .path_for(which)
                    .ok_or(BeamError::MissingFieldFile(which))?;
                self.field_source.read_field(path, which, buffer)?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beam::BeamConfig;
    use crate::context::IncidentFrame;
    use crate::symmetry::SymmetryFlags;
    use dipolar_compute::SerialBackend;

    #[test]
    fn test_buffer_shape_is_checked() {
        let ctx = ScatteringContext::new(1.0, IncidentFrame::along_z()).unwrap();
        let mut flags = SymmetryFlags::all();
        let beam = Beam::initialize(&BeamConfig::plane(), &ctx, &mut flags).unwrap();
        let generator = BeamFieldGenerator::new(Arc::new(SerialBackend));
        let coords = vec![[0.0; 3]; 4];
        let mut buffer = Array2::zeros((3, 3));
        let err = generator
            .generate(&beam, &ctx, IncidentPolarization::Y, &coords, &mut buffer)
            .unwrap_err();
        assert!(matches!(err, BeamError::Compute(_)));
    }

    #[test]
    fn test_lowest_order_at_origin_is_polarisation_axis() {
        let ctx = ScatteringContext::new(1.0, IncidentFrame::along_z()).unwrap();
        let mut flags = SymmetryFlags::all();
        let config = BeamConfig::gaussian(crate::beam::BeamKind::Lminus, vec![2.0]);
        let beam = Beam::initialize(&config, &ctx, &mut flags).unwrap();
        let generator = BeamFieldGenerator::new(Arc::new(SerialBackend));
        let mut buffer = Array2::zeros((1, 3));
        generator
            .generate(&beam, &ctx, IncidentPolarization::X, &[[0.0; 3]], &mut buffer)
            .unwrap();
        assert!((buffer[[0, 0]] - Complex64::new(1.0, 0.0)).norm() < 1e-14);
        assert!(buffer[[0, 1]].norm() < 1e-14);
        assert!(buffer[[0, 2]].norm() < 1e-14);
    }

    #[test]
    fn test_gaussian_rejects_changed_orientation() {
        use crate::beam::BeamKind;
        use crate::orientation::Orientation;

        let ctx = ScatteringContext::new(1.0, IncidentFrame::along_z()).unwrap();
        let mut flags = SymmetryFlags::all();
        let config = BeamConfig::gaussian(BeamKind::Lminus, vec![2.0, 0.5, 0.0, 0.0]);
        let beam = Beam::initialize(&config, &ctx, &mut flags).unwrap();

        let rotated = ctx.with_orientation(Orientation::from_euler_zyz_deg(0.0, 90.0, 0.0));
        let generator = BeamFieldGenerator::new(Arc::new(SerialBackend));
        let coords = vec![[0.0; 3]; 2];
        let mut buffer = Array2::zeros((2, 3));
        let err = generator
            .generate(&beam, &rotated, IncidentPolarization::Y, &coords, &mut buffer)
            .unwrap_err();
        assert!(matches!(err, BeamError::StaleInitialisation(_)));
    }
}
