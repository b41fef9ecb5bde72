//! Problem symmetries shared with grid construction.
//!
//! Four independent flags record whether the full problem (shape, beam,
//! substrate) is invariant under reflection about the planes perpendicular
//! to the x, y and z axes, and under a 90° rotation about the z axis.
//! Everything starts symmetric and every contributing factor may only
//! *break* a symmetry; no method sets a flag back.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SymmetryFlags {
    reflect_x: bool,
    reflect_y: bool,
    reflect_z: bool,
    rotate_90: bool,
}

impl Default for SymmetryFlags {
    fn default() -> Self {
        Self::all()
    }
}

impl SymmetryFlags {
    /// All four symmetries present.
    pub fn all() -> Self {
        Self {
            reflect_x: true,
            reflect_y: true,
            reflect_z: true,
            rotate_90: true,
        }
    }

    /// No symmetry at all.
    pub fn none() -> Self {
        Self {
            reflect_x: false,
            reflect_y: false,
            reflect_z: false,
            rotate_90: false,
        }
    }

    /// Reflection about the yz plane (x → −x).
    pub fn reflect_x(&self) -> bool {
        self.reflect_x
    }

    /// Reflection about the xz plane (y → −y).
    pub fn reflect_y(&self) -> bool {
        self.reflect_y
    }

    /// Reflection about the xy plane (z → −z).
    pub fn reflect_z(&self) -> bool {
        self.reflect_z
    }

    /// Rotation by 90° about the z axis.
    pub fn rotate_90(&self) -> bool {
        self.rotate_90
    }

    pub fn break_reflect_x(&mut self) {
        self.reflect_x = false;
    }

    pub fn break_reflect_y(&mut self) {
        self.reflect_y = false;
    }

    pub fn break_reflect_z(&mut self) {
        self.reflect_z = false;
    }

    pub fn break_rotate_90(&mut self) {
        self.rotate_90 = false;
    }

    pub fn break_all(&mut self) {
        *self = Self::none();
    }

    /// Keep only the symmetries present in both `self` and `other`.
    pub fn narrow(&mut self, other: &SymmetryFlags) {
        self.reflect_x &= other.reflect_x;
        self.reflect_y &= other.reflect_y;
        self.reflect_z &= other.reflect_z;
        self.rotate_90 &= other.rotate_90;
    }

    /// Number of symmetries still present.
    pub fn count(&self) -> usize {
        [self.reflect_x, self.reflect_y, self.reflect_z, self.rotate_90]
            .iter()
            .filter(|&&f| f)
            .count()
    }
}

impl std::fmt::Display for SymmetryFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mark = |b: bool| if b { '+' } else { '-' };
        write!(
            f,
            "X{} Y{} Z{} R{}",
            mark(self.reflect_x),
            mark(self.reflect_y),
            mark(self.reflect_z),
            mark(self.rotate_90)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrow_never_restores() {
        let mut flags = SymmetryFlags::all();
        flags.break_reflect_y();
        flags.narrow(&SymmetryFlags::all());
        assert!(!flags.reflect_y());
        assert_eq!(flags.count(), 3);

        let mut other = SymmetryFlags::all();
        other.break_rotate_90();
        flags.narrow(&other);
        assert!(!flags.rotate_90());
        assert!(flags.reflect_x());
        assert_eq!(flags.count(), 2);
    }

    #[test]
    fn test_display() {
        let mut flags = SymmetryFlags::all();
        flags.break_reflect_z();
        assert_eq!(flags.to_string(), "X+ Y+ Z- R+");
    }
}
