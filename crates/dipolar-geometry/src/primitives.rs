//! Parametric particle shapes.
//!
//! Each primitive defines a closed volume that the
//! [`discretise`](crate::discretise) module fills with dipoles. Besides
//! containment, every shape reports which reflection and 90° rotation
//! symmetries about the origin it preserves, so the beam code can start
//! from the shape's flags and only narrow them further.

use serde::{Deserialize, Serialize};

use dipolar_core::SymmetryFlags;

use crate::GeometryError;

/// A geometric shape that can be discretised into dipoles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Primitive {
    Sphere(Sphere),
    Cuboid(Cuboid),
    Ellipsoid(Ellipsoid),
    Cylinder(Cylinder),
}

/// A sphere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    #[serde(default)]
    pub centre: [f64; 3],
    pub radius: f64,
}

/// An axis-aligned cuboid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cuboid {
    #[serde(default)]
    pub centre: [f64; 3],
    /// Half-extents along x, y, z.
    pub half_extents: [f64; 3],
}

/// An ellipsoid with semi-axes along x, y, z.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    #[serde(default)]
    pub centre: [f64; 3],
    pub semi_axes: [f64; 3],
}

/// A circular cylinder with its axis along z, centred on `centre`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cylinder {
    #[serde(default)]
    pub centre: [f64; 3],
    pub radius: f64,
    /// Full length along z.
    pub length: f64,
}

impl Primitive {
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Sphere(_) => "sphere",
            Primitive::Cuboid(_) => "cuboid",
            Primitive::Ellipsoid(_) => "ellipsoid",
            Primitive::Cylinder(_) => "cylinder",
        }
    }

    pub fn centre(&self) -> [f64; 3] {
        match self {
            Primitive::Sphere(s) => s.centre,
            Primitive::Cuboid(c) => c.centre,
            Primitive::Ellipsoid(e) => e.centre,
            Primitive::Cylinder(c) => c.centre,
        }
    }

    /// Reject non-positive or non-finite dimensions.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let dims: Vec<f64> = match self {
            Primitive::Sphere(s) => vec![s.radius],
            Primitive::Cuboid(c) => c.half_extents.to_vec(),
            Primitive::Ellipsoid(e) => e.semi_axes.to_vec(),
            Primitive::Cylinder(c) => vec![c.radius, c.length],
        };
        if let Some(bad) = dims.iter().find(|d| !(d.is_finite() && **d > 0.0)) {
            return Err(GeometryError::InvalidDimension {
                shape: self.name(),
                value: *bad,
            });
        }
        if self.centre().iter().any(|c| !c.is_finite()) {
            return Err(GeometryError::InvalidDimension {
                shape: self.name(),
                value: f64::NAN,
            });
        }
        Ok(())
    }

    /// Check whether a point lies inside this primitive.
    pub fn contains(&self, point: &[f64; 3]) -> bool {
        let c = self.centre();
        let (dx, dy, dz) = (point[0] - c[0], point[1] - c[1], point[2] - c[2]);
        match self {
            Primitive::Sphere(s) => dx * dx + dy * dy + dz * dz <= s.radius * s.radius,
            Primitive::Cuboid(b) => {
                dx.abs() <= b.half_extents[0]
                    && dy.abs() <= b.half_extents[1]
                    && dz.abs() <= b.half_extents[2]
            }
            Primitive::Ellipsoid(e) => {
                let (u, v, w) = (dx / e.semi_axes[0], dy / e.semi_axes[1], dz / e.semi_axes[2]);
                u * u + v * v + w * w <= 1.0
            }
            Primitive::Cylinder(cyl) => {
                dx * dx + dy * dy <= cyl.radius * cyl.radius && dz.abs() <= 0.5 * cyl.length
            }
        }
    }

    /// Axis-aligned bounding box: returns (min_corner, max_corner).
    pub fn bounding_box(&self) -> ([f64; 3], [f64; 3]) {
        let c = self.centre();
        let half = match self {
            Primitive::Sphere(s) => [s.radius; 3],
            Primitive::Cuboid(b) => b.half_extents,
            Primitive::Ellipsoid(e) => e.semi_axes,
            Primitive::Cylinder(cyl) => [cyl.radius, cyl.radius, 0.5 * cyl.length],
        };
        (
            [c[0] - half[0], c[1] - half[1], c[2] - half[2]],
            [c[0] + half[0], c[1] + half[1], c[2] + half[2]],
        )
    }

    /// Symmetries of the shape about the coordinate origin.
    ///
    /// A shifted centre breaks the reflection about each plane it is shifted
    /// across; any transverse shift also breaks the 90° rotation about z.
    pub fn symmetry(&self) -> SymmetryFlags {
        let mut flags = SymmetryFlags::all();
        let square_section = match self {
            Primitive::Sphere(_) | Primitive::Cylinder(_) => true,
            Primitive::Cuboid(b) => b.half_extents[0] == b.half_extents[1],
            Primitive::Ellipsoid(e) => e.semi_axes[0] == e.semi_axes[1],
        };
        if !square_section {
            flags.break_rotate_90();
        }

        let c = self.centre();
        if c[0] != 0.0 {
            flags.break_reflect_x();
            flags.break_rotate_90();
        }
        if c[1] != 0.0 {
            flags.break_reflect_y();
            flags.break_rotate_90();
        }
        if c[2] != 0.0 {
            flags.break_reflect_z();
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cylinder_containment() {
        let cyl = Primitive::Cylinder(Cylinder { centre: [0.0; 3], radius: 2.0, length: 4.0 });
        assert!(cyl.contains(&[1.9, 0.0, 1.9]));
        assert!(!cyl.contains(&[1.5, 1.5, 0.0]));
        assert!(!cyl.contains(&[0.0, 0.0, 2.1]));
    }

    #[test]
    fn test_bounding_box_follows_centre() {
        let e = Primitive::Ellipsoid(Ellipsoid { centre: [1.0, 0.0, -1.0], semi_axes: [2.0, 3.0, 4.0] });
        let (min, max) = e.bounding_box();
        assert_eq!(min, [-1.0, -3.0, -5.0]);
        assert_eq!(max, [3.0, 3.0, 3.0]);
    }

    #[test]
    fn test_symmetric_shapes_keep_all_flags() {
        let shapes = [
            Primitive::Sphere(Sphere { centre: [0.0; 3], radius: 1.0 }),
            Primitive::Cuboid(Cuboid { centre: [0.0; 3], half_extents: [1.0, 1.0, 3.0] }),
            Primitive::Cylinder(Cylinder { centre: [0.0; 3], radius: 1.0, length: 5.0 }),
        ];
        for shape in &shapes {
            assert_eq!(shape.symmetry(), SymmetryFlags::all(), "{}", shape.name());
        }
    }

    #[test]
    fn test_rectangular_section_breaks_rotation_only() {
        let b = Primitive::Cuboid(Cuboid { centre: [0.0; 3], half_extents: [1.0, 2.0, 3.0] });
        let flags = b.symmetry();
        assert!(flags.reflect_x() && flags.reflect_y() && flags.reflect_z());
        assert!(!flags.rotate_90());
    }

    #[test]
    fn test_shifted_centre_breaks_reflections() {
        let s = Primitive::Sphere(Sphere { centre: [0.0, 0.0, 1.0], radius: 1.0 });
        let flags = s.symmetry();
        assert!(!flags.reflect_z());
        assert!(flags.reflect_x() && flags.reflect_y() && flags.rotate_90());
    }

    #[test]
    fn test_validate_rejects_bad_dimensions() {
        let s = Primitive::Sphere(Sphere { centre: [0.0; 3], radius: -1.0 });
        assert!(matches!(s.validate(), Err(GeometryError::InvalidDimension { shape: "sphere", .. })));
        let c = Primitive::Cylinder(Cylinder { centre: [0.0; 3], radius: 1.0, length: 0.0 });
        assert!(c.validate().is_err());
    }
}
