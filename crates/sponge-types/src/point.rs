//! Cell-center coordinates.

use serde::{Deserialize, Serialize};

/// A point in the unit cube, used for cell centers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Point3 {
    /// The centroid of the unit cube, the root of every run.
    pub const CENTROID: Self = Self::new(0.5, 0.5, 0.5);

    /// Create a point from its three coordinates.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Return this point displaced by `offset * scale` along each axis.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn displaced(self, offset: [i8; 3], scale: f64) -> Self {
        let [dx, dy, dz] = offset;
        Self {
            x: f64::from(dx).mul_add(scale, self.x),
            y: f64::from(dy).mul_add(scale, self.y),
            z: f64::from(dz).mul_add(scale, self.z),
        }
    }

    /// Return the coordinates as an array.
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Whether all three coordinates are finite.
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f64; 3]> for Point3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<(f64, f64, f64)> for Point3 {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self { x, y, z }
    }
}
