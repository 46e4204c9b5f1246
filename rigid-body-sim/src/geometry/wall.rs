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
//! Static walls
//!
//! A wall is an infinite line that splits the plane into a free half-space
//! (the side its normal points into) and a solid half-space. Walls never
//! move and have no state beyond their construction parameters, so every
//! query here is a pure function.

use crate::error::ConfigError;
use crate::geometry::{is_finite, Vec2, WorldShape};
use smallvec::{smallvec, SmallVec};

/// Polygon vertices closer than this to the deepest vertex share the contact
const CONTACT_MERGE_DISTANCE: f64 = 1e-6;

/// Immovable boundary with a fixed outward normal
///
/// # Examples
///
/// ```
/// use rigid_body_sim::geometry::{Vec2, Wall};
///
/// let floor = Wall::floor(0.0);
/// assert_eq!(floor.signed_distance(&Vec2::new(3.0, 2.0)), 2.0);
/// assert!(floor.signed_distance(&Vec2::new(0.0, -1.0)) < 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wall {
    anchor: Vec2,
    normal: Vec2,
}

impl Wall {
    /// Create a wall through `anchor` whose free side faces `normal`
    ///
    /// The normal is normalised; a zero-length or non-finite normal is a
    /// configuration error.
    pub fn new(anchor: Vec2, normal: Vec2) -> Result<Self, ConfigError> {
        if !is_finite(&anchor) {
            return Err(ConfigError::InvalidWallAnchor);
        }
        let length = normal.norm();
        if !is_finite(&normal) || !length.is_finite() || length <= f64::EPSILON {
            return Err(ConfigError::DegenerateWallNormal);
        }
        Ok(Wall {
            anchor,
            normal: normal / length,
        })
    }

    /// Create a wall whose normal points at `angle` radians from the +x axis
    pub fn from_angle(anchor: Vec2, angle: f64) -> Result<Self, ConfigError> {
        Wall::new(anchor, Vec2::new(angle.cos(), angle.sin()))
    }

    /// Horizontal wall at height `y` with free space above it
    pub fn floor(y: f64) -> Self {
        Wall {
            anchor: Vec2::new(0.0, y),
            normal: Vec2::new(0.0, 1.0),
        }
    }

    /// Horizontal wall at height `y` with free space below it
    pub fn ceiling(y: f64) -> Self {
        Wall {
            anchor: Vec2::new(0.0, y),
            normal: Vec2::new(0.0, -1.0),
        }
    }

    /// Vertical wall at `x` with free space to its right
    pub fn left(x: f64) -> Self {
        Wall {
            anchor: Vec2::new(x, 0.0),
            normal: Vec2::new(1.0, 0.0),
        }
    }

    /// Vertical wall at `x` with free space to its left
    pub fn right(x: f64) -> Self {
        Wall {
            anchor: Vec2::new(x, 0.0),
            normal: Vec2::new(-1.0, 0.0),
        }
    }

    /// The four walls of an axis-aligned box, facing inwards
    ///
    /// Order: floor, right, ceiling, left.
    pub fn enclosure(min: Vec2, max: Vec2) -> Result<[Wall; 4], ConfigError> {
        if !is_finite(&min) || !is_finite(&max) || min.x >= max.x || min.y >= max.y {
            return Err(ConfigError::DegenerateEnclosure);
        }
        Ok([
            Wall::floor(min.y),
            Wall::right(max.x),
            Wall::ceiling(max.y),
            Wall::left(min.x),
        ])
    }

    /// A point on the wall line
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// Unit normal pointing into the free half-space
    pub fn normal(&self) -> Vec2 {
        self.normal
    }

    /// Signed distance from the wall line; positive on the free side
    #[inline]
    pub fn signed_distance(&self, point: &Vec2) -> f64 {
        (point - self.anchor).dot(&self.normal)
    }

    /// Penetration of a world-space shape into the solid side of the wall
    ///
    /// The returned normal is always the wall normal, i.e. the direction in
    /// which the body must move to separate.
    pub fn penetration(&self, shape: &WorldShape) -> Penetration {
        match shape {
            WorldShape::Circle { centre, radius } => Penetration {
                depth: radius - self.signed_distance(centre),
                normal: self.normal,
                point: centre - self.normal * *radius,
            },
            WorldShape::Polygon { vertices } => {
                let deepest = vertices
                    .iter()
                    .map(|v| -self.signed_distance(v))
                    .fold(f64::NEG_INFINITY, f64::max);

                // Average the vertices of a face lying flat against the wall
                let mut point = Vec2::zeros();
                let mut count = 0usize;
                for v in vertices {
                    if deepest + self.signed_distance(v) <= CONTACT_MERGE_DISTANCE {
                        point += v;
                        count += 1;
                    }
                }
                Penetration {
                    depth: deepest,
                    normal: self.normal,
                    point: point / count.max(1) as f64,
                }
            }
        }
    }

    /// One contact per polygon vertex, or the single contact of a circle
    ///
    /// A face lying against the wall yields a contact at each end, which is
    /// what lets impulses there balance torque. Depths follow the
    /// [`Wall::penetration`] sign convention.
    pub fn contact_points(&self, shape: &WorldShape) -> SmallVec<[Penetration; 8]> {
        match shape {
            WorldShape::Circle { .. } => smallvec![self.penetration(shape)],
            WorldShape::Polygon { vertices } => vertices
                .iter()
                .map(|v| Penetration {
                    depth: -self.signed_distance(v),
                    normal: self.normal,
                    point: *v,
                })
                .collect(),
        }
    }
}

/// Result of a wall or body overlap query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    /// Overlap distance; negative outside, zero touching, positive overlapping
    pub depth: f64,
    /// Unit separation direction for the queried body
    pub normal: Vec2,
    /// World-space contact point
    pub point: Vec2,
}
