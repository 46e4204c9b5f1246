// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Planar geometry primitives
//!
//! Vectors are `nalgebra` double-precision 2D vectors. This module adds the
//! handful of 2D helpers the rest of the crate needs (scalar cross products
//! and rotation by an angle), body shapes, and the static [`Wall`] boundary.

use nalgebra::{Rotation2, Vector2};

mod shape;
mod wall;

pub use shape::{Shape, WorldShape};
pub use wall::{Penetration, Wall};

/// Double-precision 2D vector used throughout the crate
pub type Vec2 = Vector2<f64>;

/// Scalar (z component) cross product of two planar vectors
#[inline]
pub fn cross(a: &Vec2, b: &Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Cross product of a scalar angular quantity with a planar vector (`ω × r`)
#[inline]
pub fn cross_scalar(w: f64, r: &Vec2) -> Vec2 {
    Vec2::new(-w * r.y, w * r.x)
}

/// Rotate a vector counter-clockwise by `angle` radians
#[inline]
pub fn rotate(v: &Vec2, angle: f64) -> Vec2 {
    Rotation2::new(angle) * v
}

/// Check that both components are finite
#[inline]
pub fn is_finite(v: &Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_cross_products() {
        let x = Vec2::new(1.0, 0.0);
        let y = Vec2::new(0.0, 1.0);
        assert_eq!(cross(&x, &y), 1.0);
        assert_eq!(cross(&y, &x), -1.0);

        // ω × r for counter-clockwise spin points along the tangent
        let v = cross_scalar(2.0, &x);
        assert_eq!(v, Vec2::new(0.0, 2.0));
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let v = rotate(&Vec2::new(1.0, 0.0), FRAC_PI_2);
        assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_is_finite() {
        assert!(is_finite(&Vec2::new(1.0, -2.0)));
        assert!(!is_finite(&Vec2::new(f64::NAN, 0.0)));
        assert!(!is_finite(&Vec2::new(0.0, f64::INFINITY)));
    }
}
