//! Particle orientation relative to the laboratory frame.
//!
//! The particle is rotated by ZYZ Euler angles (α, β, γ):
//! $R = R_z(\alpha) R_y(\beta) R_z(\gamma)$. The beam is defined in the
//! laboratory frame, while dipole coordinates live in the particle frame, so
//! beam vectors are carried into the particle frame with $R^{T}$.

use nalgebra::{Rotation3, Vector3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    /// Euler angles (α, β, γ) in degrees.
    euler_deg: [f64; 3],
    rotation: Rotation3<f64>,
}

impl Default for Orientation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Orientation {
    pub fn identity() -> Self {
        Self {
            euler_deg: [0.0; 3],
            rotation: Rotation3::identity(),
        }
    }

    /// Build an orientation from ZYZ Euler angles in degrees.
    pub fn from_euler_zyz_deg(alpha: f64, beta: f64, gamma: f64) -> Self {
        let rz_a = Rotation3::from_axis_angle(&Vector3::z_axis(), alpha.to_radians());
        let ry_b = Rotation3::from_axis_angle(&Vector3::y_axis(), beta.to_radians());
        let rz_g = Rotation3::from_axis_angle(&Vector3::z_axis(), gamma.to_radians());
        Self {
            euler_deg: [alpha, beta, gamma],
            rotation: rz_a * ry_b * rz_g,
        }
    }

    pub fn euler_deg(&self) -> [f64; 3] {
        self.euler_deg
    }

    pub fn is_identity(&self) -> bool {
        self.euler_deg.iter().all(|&a| a == 0.0)
    }

    /// Express a laboratory-frame vector in the particle frame.
    pub fn lab_to_particle(&self, v: &[f64; 3]) -> [f64; 3] {
        let r = self
            .rotation
            .inverse_transform_vector(&Vector3::new(v[0], v[1], v[2]));
        [r.x, r.y, r.z]
    }

    /// Express a particle-frame vector in the laboratory frame.
    pub fn particle_to_lab(&self, v: &[f64; 3]) -> [f64; 3] {
        let r = self.rotation * Vector3::new(v[0], v[1], v[2]);
        [r.x, r.y, r.z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_identity_leaves_vectors_unchanged() {
        let o = Orientation::identity();
        let v = [0.3, -1.2, 2.5];
        assert_eq!(o.lab_to_particle(&v), v);
        assert!(o.is_identity());
    }

    #[test]
    fn test_beta_90_tilts_z_onto_x() {
        // Rotating the particle by +90° about y takes its z axis to lab +x,
        // so lab +x is the particle's +z.
        let o = Orientation::from_euler_zyz_deg(0.0, 90.0, 0.0);
        let p = o.lab_to_particle(&[1.0, 0.0, 0.0]);
        assert_abs_diff_eq!(p[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_round_trip() {
        let o = Orientation::from_euler_zyz_deg(30.0, 45.0, -60.0);
        let v = [0.2, 0.7, -0.4];
        let back = o.particle_to_lab(&o.lab_to_particle(&v));
        for c in 0..3 {
            assert_abs_diff_eq!(back[c], v[c], epsilon = 1e-12);
        }
    }
}
