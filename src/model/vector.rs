use std::fmt;
use std::ops;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }
}

impl ops::Add for Vector3 {
    type Output = Self;

    fn add(self, o: Self) -> Self {
        Self::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl ops::Sub for Vector3 {
    type Output = Self;

    fn sub(self, o: Self) -> Self {
        Self::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl ops::Neg for Vector3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl ops::Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, k: f64) -> Self {
        Self::new(self.x * k, self.y * k, self.z * k)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.x, self.y, self.z)
    }
}

/// World-space basis of a block. Forward points out of the block's front face,
/// so the local backward axis is `-forward`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Orientation {
    pub right: Vector3,
    pub up: Vector3,
    pub forward: Vector3,
}

impl Default for Orientation {
    fn default() -> Self {
        Self {
            right: Vector3::new(1.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            forward: Vector3::new(0.0, 0.0, -1.0),
        }
    }
}

impl Orientation {
    /// Express a world-space vector in local (right, up, backward) coordinates.
    pub fn to_local(&self, world: Vector3) -> Vector3 {
        Vector3::new(world.dot(self.right), world.dot(self.up), -world.dot(self.forward))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_orientation_is_identity() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(Orientation::default().to_local(v), v);
    }

    #[test]
    fn rotated_orientation_projects_axes() {
        // Facing +x: right is +z, forward is +x.
        let o = Orientation {
            right: Vector3::new(0.0, 0.0, 1.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            forward: Vector3::new(1.0, 0.0, 0.0),
        };
        let local = o.to_local(Vector3::new(5.0, 0.0, 2.0));
        assert_eq!(local, Vector3::new(2.0, 0.0, -5.0));
    }
}
