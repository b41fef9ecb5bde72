//! Incident beam models.
//!
//! A [`Beam`] is initialised once per configuration from a [`BeamConfig`] and
//! the current [`ScatteringContext`]. Initialisation validates the beam
//! parameters, derives the constants used per dipole, and narrows the shared
//! [`SymmetryFlags`]. [`BeamFieldGenerator`] then fills the incident-field
//! buffer, one complex 3-vector per dipole, for either polarisation.
//!
//! | Kind      | Parameters                 | Model                             |
//! |-----------|----------------------------|-----------------------------------|
//! | `plane`   | none                       | plane wave, optional substrate    |
//! | `lminus`  | `w0 [x y z]`               | Gaussian beam, zeroth order       |
//! | `davis3`  | `w0 [x y z]`               | Gaussian beam, third order        |
//! | `barton5` | `w0 [x y z]`               | Gaussian beam, fifth order        |
//! | `read`    | none, 1 or 2 file names    | externally supplied field         |

pub mod field_file;
pub mod fresnel;
pub mod gaussian;
pub mod generator;
pub mod plane;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use dipolar_compute::ComputeError;

use crate::context::{IncidentPolarization, ScatteringContext};
use crate::orientation::Orientation;
use crate::symmetry::SymmetryFlags;
use crate::vector::CVec3;

pub use field_file::{FieldFileError, FieldSource, FileBeam, TextFieldReader};
pub use gaussian::{GaussianBeam, GaussianOrder};
pub use generator::BeamFieldGenerator;
pub use plane::PlaneWave;

/// Errors raised while initialising a beam or generating its field.
///
/// All of them are fatal for the run.
#[derive(Debug, Error)]
pub enum BeamError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Beam '{kind}' takes {expected} numeric parameter(s), got {got}")]
    ParameterCount {
        kind: BeamKind,
        expected: &'static str,
        got: usize,
    },

    #[error("Beam width must be positive, got {0}")]
    NonPositiveWidth(f64),

    #[error(
        "Ambiguous setting of beam propagating along the surface. Specify the incident \
         direction with a small positive or negative z-component"
    )]
    PropagationAlongSurface,

    #[error("Gaussian incident beam is not supported together with a substrate")]
    GaussianWithSubstrate,

    #[error("Cannot illuminate from inside a perfectly conducting substrate (propagation z > 0)")]
    IlluminationThroughConductor,

    #[error("Invalid incident frame: {0}")]
    InvalidFrame(String),

    #[error("No field file given for {0} polarisation")]
    MissingFieldFile(IncidentPolarization),

    #[error("Beam initialisation is stale: {0}")]
    StaleInitialisation(String),

    #[error(transparent)]
    FieldFile(#[from] FieldFileError),

    #[error("Compute error: {0}")]
    Compute(#[from] ComputeError),
}

/// Closed set of beam types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeamKind {
    Plane,
    Lminus,
    Davis3,
    Barton5,
    Read,
}

impl BeamKind {
    pub fn all() -> [BeamKind; 5] {
        [
            BeamKind::Plane,
            BeamKind::Lminus,
            BeamKind::Davis3,
            BeamKind::Barton5,
            BeamKind::Read,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            BeamKind::Plane => "plane",
            BeamKind::Lminus => "lminus",
            BeamKind::Davis3 => "davis3",
            BeamKind::Barton5 => "barton5",
            BeamKind::Read => "read",
        }
    }

    /// Usage line for the parameter list.
    pub fn usage(&self) -> &'static str {
        match self {
            BeamKind::Plane => "plane wave, no parameters",
            BeamKind::Lminus => "Gaussian beam (L- approximation): width [x y z]",
            BeamKind::Davis3 => "Gaussian beam (3rd order, Davis): width [x y z]",
            BeamKind::Barton5 => "Gaussian beam (5th order, Barton): width [x y z]",
            BeamKind::Read => "field read from files: fileY [fileX]",
        }
    }

    fn gaussian_order(&self) -> Option<GaussianOrder> {
        match self {
            BeamKind::Lminus => Some(GaussianOrder::LMinus),
            BeamKind::Davis3 => Some(GaussianOrder::Davis3),
            BeamKind::Barton5 => Some(GaussianOrder::Barton5),
            BeamKind::Plane | BeamKind::Read => None,
        }
    }
}

impl fmt::Display for BeamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parsed beam options, immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamConfig {
    #[serde(rename = "type")]
    pub kind: BeamKind,
    #[serde(default)]
    pub params: Vec<f64>,
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

impl BeamConfig {
    pub fn plane() -> Self {
        Self {
            kind: BeamKind::Plane,
            params: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn gaussian(kind: BeamKind, params: Vec<f64>) -> Self {
        Self {
            kind,
            params,
            files: Vec::new(),
        }
    }

    pub fn read(files: Vec<PathBuf>) -> Self {
        Self {
            kind: BeamKind::Read,
            params: Vec::new(),
            files,
        }
    }
}

/// Reflected and transmitted waves produced by a plane wave at a substrate.
///
/// Amplitudes carry their phase relative to the particle origin. They are
/// regenerated on every call and describe only the polarisation that call
/// was made for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SecondaryWaves {
    pub reflected: CVec3,
    /// `None` for a perfectly conducting substrate.
    pub transmitted: Option<CVec3>,
    pub reflected_direction: [f64; 3],
    pub transmitted_direction: Option<[f64; 3]>,
}

/// Beam model with its derived per-dipole constants.
#[derive(Debug, Clone, PartialEq)]
pub enum BeamModel {
    Plane(PlaneWave),
    Gaussian(GaussianBeam),
    File(FileBeam),
}

/// An initialised incident beam.
#[derive(Debug, Clone, PartialEq)]
pub struct Beam {
    kind: BeamKind,
    model: BeamModel,
    center: [f64; 3],
    asymmetric: bool,
    orientation: Orientation,
    description: Option<String>,
}

impl Beam {
    /// Validate `config` against `ctx`, derive the beam constants, and clear
    /// the symmetry flags the beam breaks.
    ///
    /// Flags are only ever cleared here. The description is produced only
    /// when `ctx` belongs to the coordinating process.
    pub fn initialize(
        config: &BeamConfig,
        ctx: &ScatteringContext,
        symmetry: &mut SymmetryFlags,
    ) -> Result<Self, BeamError> {
        if config.kind != BeamKind::Read && !config.files.is_empty() {
            return Err(BeamError::InvalidParameter(format!(
                "beam '{}' does not read field files",
                config.kind
            )));
        }
        if ctx.substrate().is_some() && !ctx.orientation().is_identity() {
            return Err(BeamError::InvalidParameter(
                "particle orientation cannot be combined with a substrate".into(),
            ));
        }
        let n_params = config.params.len();
        if let Some(bad) = config.params.iter().find(|p| !p.is_finite()) {
            return Err(BeamError::InvalidParameter(format!("non-finite beam parameter {bad}")));
        }

        let (model, center, asymmetric, description) = match config.kind {
            BeamKind::Plane => {
                if n_params != 0 {
                    return Err(BeamError::ParameterCount {
                        kind: config.kind,
                        expected: "0",
                        got: n_params,
                    });
                }
                let plane = PlaneWave::initialize(ctx)?;
                (BeamModel::Plane(plane), [0.0; 3], false, "plane wave".to_string())
            }
            BeamKind::Lminus | BeamKind::Davis3 | BeamKind::Barton5 => {
                if ctx.substrate().is_some() {
                    return Err(BeamError::GaussianWithSubstrate);
                }
                if n_params != 1 && n_params != 4 {
                    return Err(BeamError::ParameterCount {
                        kind: config.kind,
                        expected: "1 or 4",
                        got: n_params,
                    });
                }
                let order = config
                    .kind
                    .gaussian_order()
                    .ok_or_else(|| BeamError::InvalidParameter(config.kind.to_string()))?;
                let width = config.params[0];

                let lab_center = if n_params == 4 {
                    [config.params[1], config.params[2], config.params[3]]
                } else {
                    [0.0; 3]
                };
                let asymmetric = lab_center.iter().any(|&c| c != 0.0);
                if lab_center[0] != 0.0 {
                    symmetry.break_reflect_x();
                    symmetry.break_rotate_90();
                }
                if lab_center[1] != 0.0 {
                    symmetry.break_reflect_y();
                    symmetry.break_rotate_90();
                }
                if lab_center[2] != 0.0 {
                    symmetry.break_reflect_z();
                }

                let center = ctx.orientation().lab_to_particle(&lab_center);
                let gaussian = GaussianBeam::new(order, width, ctx.wavenumber(), center)?;
                if width < ctx.wavelength() {
                    log::warn!(
                        "Beam width {width} is below the wavelength {:.4}; the paraxial expansion is inaccurate",
                        ctx.wavelength()
                    );
                }
                log::debug!(
                    "Gaussian beam: s = {:.6}, s^2 = {:.6e}",
                    gaussian.confinement,
                    gaussian.confinement * gaussian.confinement
                );

                let mut text = format!(
                    "Gaussian beam ({})\n\tWidth={} (confinement factor s={})\n",
                    order.label(),
                    width,
                    gaussian.confinement
                );
                if asymmetric {
                    text.push_str(&format!(
                        "\tCenter position: {} {} {}",
                        lab_center[0], lab_center[1], lab_center[2]
                    ));
                } else {
                    text.push_str("\tCenter is in the origin");
                }
                (BeamModel::Gaussian(gaussian), center, asymmetric, text)
            }
            BeamKind::Read => {
                if n_params != 0 {
                    return Err(BeamError::ParameterCount {
                        kind: config.kind,
                        expected: "0",
                        got: n_params,
                    });
                }
                let (y_file, x_file) = match config.files.as_slice() {
                    [y] => (y.clone(), None),
                    [y, x] => (y.clone(), Some(x.clone())),
                    other => {
                        return Err(BeamError::InvalidParameter(format!(
                            "beam 'read' takes 1 or 2 file names, got {}",
                            other.len()
                        )))
                    }
                };
                symmetry.break_all();
                let text = match &x_file {
                    None => format!("specified by file '{}'", y_file.display()),
                    Some(x) => format!(
                        "specified by files '{}' and '{}'",
                        y_file.display(),
                        x.display()
                    ),
                };
                // The beam centre is undefined for a file beam
                (BeamModel::File(FileBeam { y_file, x_file }), [0.0; 3], false, text)
            }
        };

        let description = if ctx.is_coordinator() {
            log::info!("Incident beam: {}", description.replace("\n\t", ", "));
            Some(description)
        } else {
            None
        };

        Ok(Self {
            kind: config.kind,
            model,
            center,
            asymmetric,
            orientation: *ctx.orientation(),
            description,
        })
    }

    pub fn kind(&self) -> BeamKind {
        self.kind
    }

    pub fn model(&self) -> &BeamModel {
        &self.model
    }

    /// Beam centre in the particle frame.
    pub fn center(&self) -> [f64; 3] {
        self.center
    }

    /// Whether the beam centre is offset from the origin.
    pub fn is_asymmetric(&self) -> bool {
        self.asymmetric
    }

    /// Particle orientation the beam constants were derived for.
    pub fn orientation(&self) -> &Orientation {
        &self.orientation
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{IncidentFrame, Substrate};
    use num_complex::Complex64;

    fn ctx() -> ScatteringContext {
        ScatteringContext::new(1.0, IncidentFrame::along_z()).unwrap()
    }

    #[test]
    fn test_kind_display_matches_name() {
        for kind in BeamKind::all() {
            assert_eq!(kind.to_string(), kind.name());
        }
    }

    #[test]
    fn test_plane_keeps_all_symmetries() {
        let mut flags = SymmetryFlags::all();
        let beam = Beam::initialize(&BeamConfig::plane(), &ctx(), &mut flags).unwrap();
        assert_eq!(flags, SymmetryFlags::all());
        assert!(!beam.is_asymmetric());
        assert_eq!(beam.description(), Some("plane wave"));
    }

    #[test]
    fn test_plane_rejects_parameters() {
        let mut flags = SymmetryFlags::all();
        let config = BeamConfig::gaussian(BeamKind::Plane, vec![1.0]);
        let err = Beam::initialize(&config, &ctx(), &mut flags).unwrap_err();
        assert!(matches!(err, BeamError::ParameterCount { got: 1, .. }));
    }

    #[test]
    fn test_gaussian_centre_breaks_matching_symmetries() {
        let mut flags = SymmetryFlags::all();
        let config = BeamConfig::gaussian(BeamKind::Davis3, vec![2.0, 0.0, 0.5, 0.0]);
        let beam = Beam::initialize(&config, &ctx(), &mut flags).unwrap();
        assert!(beam.is_asymmetric());
        assert!(flags.reflect_x());
        assert!(!flags.reflect_y());
        assert!(flags.reflect_z());
        assert!(!flags.rotate_90());
        let text = beam.description().unwrap();
        assert!(text.starts_with("Gaussian beam (3rd order approximation, by Davis)"));
        assert!(text.contains("Center position: 0 0.5 0"));
    }

    #[test]
    fn test_gaussian_zero_offset_is_symmetric() {
        let mut flags = SymmetryFlags::all();
        let config = BeamConfig::gaussian(BeamKind::Barton5, vec![2.0, 0.0, 0.0, 0.0]);
        let beam = Beam::initialize(&config, &ctx(), &mut flags).unwrap();
        assert!(!beam.is_asymmetric());
        assert_eq!(flags, SymmetryFlags::all());
        assert!(beam.description().unwrap().ends_with("Center is in the origin"));
    }

    #[test]
    fn test_gaussian_parameter_count() {
        for params in [vec![], vec![1.0, 2.0], vec![1.0, 0.0, 0.0, 0.0, 0.0]] {
            let mut flags = SymmetryFlags::all();
            let config = BeamConfig::gaussian(BeamKind::Lminus, params);
            let err = Beam::initialize(&config, &ctx(), &mut flags).unwrap_err();
            assert!(matches!(err, BeamError::ParameterCount { .. }));
        }
    }

    #[test]
    fn test_gaussian_with_substrate_fails() {
        let sub = Substrate::dielectric(Complex64::new(1.5, 0.0), 1.0).unwrap();
        let ctx = ctx().with_substrate(sub);
        let mut flags = SymmetryFlags::all();
        let config = BeamConfig::gaussian(BeamKind::Lminus, vec![2.0]);
        let err = Beam::initialize(&config, &ctx, &mut flags).unwrap_err();
        assert!(matches!(err, BeamError::GaussianWithSubstrate));
    }

    #[test]
    fn test_read_breaks_everything() {
        let mut flags = SymmetryFlags::all();
        let config = BeamConfig::read(vec!["fy".into(), "fx".into()]);
        let beam = Beam::initialize(&config, &ctx(), &mut flags).unwrap();
        assert_eq!(flags, SymmetryFlags::none());
        assert_eq!(beam.description(), Some("specified by files 'fy' and 'fx'"));
    }

    #[test]
    fn test_read_needs_one_or_two_files() {
        let mut flags = SymmetryFlags::all();
        let err = Beam::initialize(&BeamConfig::read(vec![]), &ctx(), &mut flags).unwrap_err();
        assert!(matches!(err, BeamError::InvalidParameter(_)));
    }

    #[test]
    fn test_files_rejected_for_plane() {
        let mut flags = SymmetryFlags::all();
        let mut config = BeamConfig::plane();
        config.files.push("f".into());
        let err = Beam::initialize(&config, &ctx(), &mut flags).unwrap_err();
        assert!(matches!(err, BeamError::InvalidParameter(_)));
    }

    #[test]
    fn test_description_only_on_coordinator() {
        let mut flags = SymmetryFlags::all();
        let ctx = ctx().with_coordinator(false);
        let beam = Beam::initialize(&BeamConfig::plane(), &ctx, &mut flags).unwrap();
        assert_eq!(beam.description(), None);
    }
}
