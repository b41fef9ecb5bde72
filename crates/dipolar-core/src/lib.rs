//! # Dipolar Core
//!
//! Incident-beam generation for discrete-dipole scattering calculations.
//! Given the dipole lattice of a particle and the illumination state, this
//! crate builds the complex electric field illuminating every dipole.
//!
//! ## Architecture
//!
//! A [`beam::Beam`] is initialised once per configuration: it validates the
//! beam parameters, derives per-dipole constants, and narrows the shared
//! [`symmetry::SymmetryFlags`]. [`beam::BeamFieldGenerator`] then fills an
//! `N × 3` buffer for each incident polarisation. All physical state is
//! passed explicitly through a [`context::ScatteringContext`].
//!
//! ## Modules
//!
//! - [`beam`] — Beam types, initialisation, and field generation.
//! - [`context`] — Wavenumber, incident frame, substrate, orientation.
//! - [`orientation`] — Particle rotation by ZYZ Euler angles.
//! - [`symmetry`] — Reflection/rotation symmetry flags.
//! - [`vector`] — Small real and complex 3-vector helpers.

pub mod beam;
pub mod context;
pub mod orientation;
pub mod symmetry;
pub mod vector;

pub use beam::{
    Beam, BeamConfig, BeamError, BeamFieldGenerator, BeamKind, BeamModel, SecondaryWaves,
};
pub use context::{IncidentFrame, IncidentPolarization, ScatteringContext, Substrate, SubstrateMedium};
pub use orientation::Orientation;
pub use symmetry::SymmetryFlags;
