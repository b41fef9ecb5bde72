//! # Dipolar Geometry
//!
//! Particle shapes for discrete-dipole runs:
//!
//! - **Parametric primitives** ([`primitives`]) — Spheres, cuboids,
//!   ellipsoids, and z-axis cylinders, each reporting its symmetries.
//! - **Discretisation** ([`discretise`]) — Fills a shape with a cubic dipole
//!   lattice anchored at the origin.

use thiserror::Error;

pub mod discretise;
pub mod primitives;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Dipole spacing must be positive, got {0}")]
    InvalidSpacing(f64),

    #[error("Invalid {shape} dimension: {value}")]
    InvalidDimension { shape: &'static str, value: f64 },

    #[error("No dipole of the lattice (d = {spacing}) falls inside the {shape}")]
    Empty { shape: &'static str, spacing: f64 },

    #[error("Lattice would scan {sites} sites, limit is {limit}")]
    TooManySites { sites: usize, limit: usize },
}
