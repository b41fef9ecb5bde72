//! Discretisation of geometric shapes into dipole lattices.
//!
//! Dipoles sit on a cubic lattice of spacing $d$ anchored at the coordinate
//! origin, so a shape that is symmetric about the origin produces a dipole
//! set with the same symmetry. The spacing should satisfy
//! $d \ll \lambda / (2\pi |m|)$ for the discrete-dipole model to hold.

use crate::primitives::Primitive;
use crate::GeometryError;

/// Upper bound on the number of lattice sites scanned.
const MAX_SITES: usize = 50_000_000;

/// Discretise a primitive shape into dipole positions.
pub fn discretise_primitive(
    primitive: &Primitive,
    spacing: f64,
) -> Result<Vec<[f64; 3]>, GeometryError> {
    if !(spacing.is_finite() && spacing > 0.0) {
        return Err(GeometryError::InvalidSpacing(spacing));
    }
    primitive.validate()?;

    let (min, max) = primitive.bounding_box();
    let lo: Vec<i64> = min.iter().map(|v| (v / spacing).floor() as i64).collect();
    let hi: Vec<i64> = max.iter().map(|v| (v / spacing).ceil() as i64).collect();
    // Counted in f64 so that huge extents saturate instead of overflowing
    let sites: f64 = (0..3).map(|a| hi[a] as f64 - lo[a] as f64 + 1.0).product();
    if sites > MAX_SITES as f64 {
        return Err(GeometryError::TooManySites {
            sites: sites as usize,
            limit: MAX_SITES,
        });
    }

    let mut points = Vec::new();
    for i in lo[0]..=hi[0] {
        for j in lo[1]..=hi[1] {
            for l in lo[2]..=hi[2] {
                let p = [i as f64 * spacing, j as f64 * spacing, l as f64 * spacing];
                if primitive.contains(&p) {
                    points.push(p);
                }
            }
        }
    }

    if points.is_empty() {
        return Err(GeometryError::Empty {
            shape: primitive.name(),
            spacing,
        });
    }
    log::debug!("Discretised {} into {} dipoles (d = {spacing})", primitive.name(), points.len());
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{Cuboid, Sphere};

    #[test]
    fn test_sphere_discretisation_count() {
        let sphere = Primitive::Sphere(Sphere { centre: [0.0; 3], radius: 10.0 });
        let points = discretise_primitive(&sphere, 2.0).unwrap();

        // (4/3 π 10³) / 2³ ≈ 524 dipoles
        assert!(points.len() > 400, "Too few dipoles: {}", points.len());
        assert!(points.len() < 650, "Too many dipoles: {}", points.len());
    }

    #[test]
    fn test_ellipsoid_volume_converges() {
        use crate::primitives::Ellipsoid;
        use approx::assert_relative_eq;

        let semi_axes = [4.0, 3.0, 2.0];
        let e = Primitive::Ellipsoid(Ellipsoid { centre: [0.0; 3], semi_axes });
        let d = 0.1;
        let points = discretise_primitive(&e, d).unwrap();
        let exact = 4.0 / 3.0 * std::f64::consts::PI * semi_axes.iter().product::<f64>();
        assert_relative_eq!(points.len() as f64 * d.powi(3), exact, max_relative = 0.01);
    }

    #[test]
    fn test_lattice_is_mirror_symmetric() {
        let sphere = Primitive::Sphere(Sphere { centre: [0.0; 3], radius: 3.3 });
        let points = discretise_primitive(&sphere, 1.0).unwrap();
        for p in &points {
            for mirrored in [[-p[0], p[1], p[2]], [p[0], -p[1], p[2]], [p[0], p[1], -p[2]]] {
                assert!(points.contains(&mirrored), "missing mirror of {p:?}");
            }
        }
    }

    #[test]
    fn test_cuboid_count_is_exact() {
        let b = Primitive::Cuboid(Cuboid { centre: [0.0; 3], half_extents: [2.0, 1.0, 0.5] });
        let points = discretise_primitive(&b, 1.0).unwrap();
        assert_eq!(points.len(), 5 * 3);
    }

    #[test]
    fn test_invalid_spacing() {
        let sphere = Primitive::Sphere(Sphere { centre: [0.0; 3], radius: 1.0 });
        assert!(matches!(
            discretise_primitive(&sphere, 0.0),
            Err(GeometryError::InvalidSpacing(_))
        ));
    }

    #[test]
    fn test_shape_smaller_than_spacing_off_lattice_is_empty() {
        let sphere = Primitive::Sphere(Sphere { centre: [0.5, 0.5, 0.5], radius: 0.1 });
        assert!(matches!(
            discretise_primitive(&sphere, 1.0),
            Err(GeometryError::Empty { .. })
        ));
    }

    #[test]
    fn test_huge_lattice_is_rejected_without_overflow() {
        let sphere = Primitive::Sphere(Sphere { centre: [0.0; 3], radius: 1e7 });
        match discretise_primitive(&sphere, 1e-3) {
            Err(GeometryError::TooManySites { sites, limit }) => {
                assert_eq!(limit, MAX_SITES);
                assert_eq!(sites, usize::MAX);
            }
            other => panic!("expected TooManySites, got {other:?}"),
        }
    }

    #[test]
    fn test_lattice_just_over_limit_is_rejected() {
        let b = Primitive::Cuboid(Cuboid { centre: [0.0; 3], half_extents: [200.0; 3] });
        assert!(matches!(
            discretise_primitive(&b, 1.0),
            Err(GeometryError::TooManySites { sites: 64_481_201, .. })
        ));
    }
}
