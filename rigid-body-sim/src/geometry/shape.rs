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
//! Body shapes in local and world coordinates

use crate::error::ConfigError;
use crate::geometry::{cross, is_finite, rotate, Penetration, Vec2};
use smallvec::SmallVec;
use std::f64::consts::TAU;

/// Polygons below this area are rejected as degenerate
const MIN_POLYGON_AREA: f64 = 1e-12;

/// Collision shape of a rigid body, expressed in body coordinates
///
/// The body origin is the centre of mass: circles are centred on it and
/// polygons built through [`Shape::polygon`] are translated so that their
/// centroid sits on it, with counter-clockwise winding.
///
/// # Examples
///
/// ```
/// use rigid_body_sim::geometry::Shape;
///
/// let ball = Shape::circle(0.5).unwrap();
/// assert_eq!(ball.bounding_radius(), 0.5);
///
/// let crate_box = Shape::rectangle(2.0, 1.0).unwrap();
/// assert!((crate_box.area() - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Disc of the given radius
    Circle {
        /// Radius in metres
        radius: f64,
    },
    /// Convex polygon, counter-clockwise, centroid at the origin
    Polygon {
        /// Vertices in body coordinates
        vertices: Vec<Vec2>,
    },
}

impl Shape {
    /// Create a circle
    pub fn circle(radius: f64) -> Result<Self, ConfigError> {
        if radius > 0.0 && radius.is_finite() {
            Ok(Shape::Circle { radius })
        } else {
            Err(ConfigError::InvalidRadius(radius))
        }
    }

    /// Create an axis-aligned rectangle centred on the body origin
    pub fn rectangle(width: f64, height: f64) -> Result<Self, ConfigError> {
        let valid = |v: f64| v > 0.0 && v.is_finite();
        if !valid(width) || !valid(height) {
            return Err(ConfigError::InvalidExtents { width, height });
        }
        let (hw, hh) = (0.5 * width, 0.5 * height);
        Ok(Shape::Polygon {
            vertices: vec![
                Vec2::new(-hw, -hh),
                Vec2::new(hw, -hh),
                Vec2::new(hw, hh),
                Vec2::new(-hw, hh),
            ],
        })
    }

    /// Create a convex polygon from vertices in any winding
    ///
    /// The vertices are re-ordered counter-clockwise if necessary and
    /// translated so that the polygon centroid lies on the body origin.
    /// Collinear vertices are accepted; reflex ones are not.
    pub fn polygon(vertices: Vec<Vec2>) -> Result<Self, ConfigError> {
        if vertices.len() < 3 {
            return Err(ConfigError::TooFewVertices(vertices.len()));
        }
        if !vertices.iter().all(is_finite) {
            return Err(ConfigError::DegeneratePolygon);
        }

        let mut vertices = vertices;
        let mut area = signed_area(&vertices);
        if area.abs() < MIN_POLYGON_AREA {
            return Err(ConfigError::DegeneratePolygon);
        }
        if let Some(vertex) = reflex_vertex(&vertices, area.signum()) {
            return Err(ConfigError::NonConvexPolygon(vertex));
        }
        if area < 0.0 {
            vertices.reverse();
            area = -area;
        }

        let mut centroid = Vec2::zeros();
        for (a, b) in edges(&vertices) {
            centroid += (a + b) * cross(a, b);
        }
        centroid /= 6.0 * area;

        for v in &mut vertices {
            *v -= centroid;
        }
        Ok(Shape::Polygon { vertices })
    }

    /// Re-check the invariants of a shape that may have been built by hand
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Shape::Circle { radius } => Shape::circle(*radius).map(|_| ()),
            Shape::Polygon { vertices } => {
                if vertices.len() < 3 {
                    return Err(ConfigError::TooFewVertices(vertices.len()));
                }
                if !vertices.iter().all(is_finite) || signed_area(vertices) < MIN_POLYGON_AREA {
                    return Err(ConfigError::DegeneratePolygon);
                }
                match reflex_vertex(vertices, 1.0) {
                    Some(vertex) => Err(ConfigError::NonConvexPolygon(vertex)),
                    None => Ok(()),
                }
            }
        }
    }

    /// Area enclosed by the shape
    pub fn area(&self) -> f64 {
        match self {
            Shape::Circle { radius } => std::f64::consts::PI * radius * radius,
            Shape::Polygon { vertices } => signed_area(vertices).abs(),
        }
    }

    /// Moment of inertia about the origin for a body of unit mass
    ///
    /// Multiply by the body mass to get the actual inertia. Polygons are
    /// integrated as a fan of signed triangles around the origin.
    pub fn unit_inertia(&self) -> f64 {
        match self {
            Shape::Circle { radius } => 0.5 * radius * radius,
            Shape::Polygon { vertices } => {
                let mut numerator = 0.0;
                let mut denominator = 0.0;
                for (a, b) in edges(vertices) {
                    let c = cross(a, b);
                    numerator += c * (a.dot(a) + a.dot(b) + b.dot(b));
                    denominator += c;
                }
                numerator / (6.0 * denominator)
            }
        }
    }

    /// Distance from the origin to the farthest point of the shape
    pub fn bounding_radius(&self) -> f64 {
        match self {
            Shape::Circle { radius } => *radius,
            Shape::Polygon { vertices } => vertices.iter().map(|v| v.norm()).fold(0.0, f64::max),
        }
    }

    /// Transform the shape to a world pose
    pub fn to_world(&self, position: &Vec2, orientation: f64) -> WorldShape {
        match self {
            Shape::Circle { radius } => WorldShape::Circle {
                centre: *position,
                radius: *radius,
            },
            Shape::Polygon { vertices } => WorldShape::Polygon {
                vertices: vertices
                    .iter()
                    .map(|v| position + rotate(v, orientation))
                    .collect(),
            },
        }
    }
}

/// A shape placed in the world, ready for intersection tests
#[derive(Debug, Clone, PartialEq)]
pub enum WorldShape {
    /// Disc in world coordinates
    Circle {
        /// World-space centre
        centre: Vec2,
        /// Radius in metres
        radius: f64,
    },
    /// Polygon with world-space vertices in counter-clockwise order
    Polygon {
        /// World-space vertices
        vertices: SmallVec<[Vec2; 8]>,
    },
}

impl WorldShape {
    /// Overlap of two shapes, from the point of view of `self`
    ///
    /// The normal points from `other` toward `self`. Only circle pairs are
    /// supported; any pair involving a polygon returns `None`.
    pub fn penetration_with(&self, other: &WorldShape) -> Option<Penetration> {
        match (self, other) {
            (
                WorldShape::Circle { centre, radius },
                WorldShape::Circle {
                    centre: other_centre,
                    radius: other_radius,
                },
            ) => {
                let offset = centre - other_centre;
                let distance = offset.norm();
                // Coincident centres have no preferred direction; separate vertically
                let normal = if distance > f64::EPSILON {
                    offset / distance
                } else {
                    Vec2::new(0.0, 1.0)
                };
                let surface = centre - normal * *radius;
                let other_surface = other_centre + normal * *other_radius;
                Some(Penetration {
                    depth: radius + other_radius - distance,
                    normal,
                    point: (surface + other_surface) * 0.5,
                })
            }
            _ => None,
        }
    }
}

fn signed_area(vertices: &[Vec2]) -> f64 {
    0.5 * edges(vertices).map(|(a, b)| cross(a, b)).sum::<f64>()
}

/// First vertex where the boundary turns against `winding` (+1 for CCW),
/// or vertex 0 when the boundary winds around more than once
fn reflex_vertex(vertices: &[Vec2], winding: f64) -> Option<usize> {
    let n = vertices.len();
    let mut turning = 0.0;
    for i in 0..n {
        let incoming = vertices[i] - vertices[(i + n - 1) % n];
        let outgoing = vertices[(i + 1) % n] - vertices[i];
        let turn = cross(&incoming, &outgoing);
        if winding * turn < -MIN_POLYGON_AREA {
            return Some(i);
        }
        turning += turn.atan2(incoming.dot(&outgoing));
    }
    // A star turns the same way at every vertex but goes round twice
    if (turning.abs() - TAU).abs() > 1e-6 {
        Some(0)
    } else {
        None
    }
}

fn edges<'a>(vertices: &'a [Vec2]) -> impl Iterator<Item = (&'a Vec2, &'a Vec2)> + 'a {
    vertices.iter().zip(vertices.iter().cycle().skip(1))
}
