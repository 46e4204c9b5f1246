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
//! Error types
//!
//! Configuration problems are reported when walls, bodies and worlds are
//! built. Simulation errors are reported by [`World::simulate`](crate::World::simulate)
//! and always leave the world in the state it had before the failing call.

use thiserror::Error;

/// Invalid wall, body or world configuration
///
/// These are raised at construction time only; a successfully constructed
/// [`World`](crate::World) never produces a `ConfigError`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Mass was negative, NaN or infinite
    #[error("mass must be non-negative and finite, got {0}")]
    InvalidMass(f64),

    /// Moment of inertia was negative, NaN or infinite
    #[error("moment of inertia must be non-negative and finite, got {0}")]
    InvalidInertia(f64),

    /// Circle radius was zero, negative or not finite
    #[error("circle radius must be positive and finite, got {0}")]
    InvalidRadius(f64),

    /// Rectangle extents were zero, negative or not finite
    #[error("rectangle extents must be positive and finite, got {width} x {height}")]
    InvalidExtents {
        /// Requested width
        width: f64,
        /// Requested height
        height: f64,
    },

    /// Polygon had fewer than three vertices
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// Polygon vertices enclose no area or are not finite
    #[error("polygon is degenerate (zero area or non-finite vertices)")]
    DegeneratePolygon,

    /// Polygon turns clockwise at the given vertex after counter-clockwise winding
    #[error("polygon is not convex at vertex {0}")]
    NonConvexPolygon(usize),

    /// Wall normal was zero-length or not finite
    #[error("wall normal must be non-zero and finite")]
    DegenerateWallNormal,

    /// Wall anchor point was not finite
    #[error("wall anchor must be finite")]
    InvalidWallAnchor,

    /// Enclosure corners do not describe a box with positive extent
    #[error("enclosure minimum corner must lie strictly below and left of the maximum corner")]
    DegenerateEnclosure,

    /// Drag coefficients were negative or not finite
    #[error("drag coefficients must be non-negative and finite, got {linear} and {angular}")]
    InvalidDrag {
        /// Linear coefficient in N·s/m
        linear: f64,
        /// Angular coefficient in N·m·s
        angular: f64,
    },

    /// Restitution outside the closed unit interval
    #[error("restitution must lie in [0, 1], got {0}")]
    InvalidRestitution(f64),

    /// A body was configured with a NaN or infinite kinematic value
    #[error("body {body} has a non-finite {field}")]
    NonFiniteBody {
        /// Index of the offending body in the world's body list
        body: usize,
        /// Name of the offending field
        field: &'static str,
    },

    /// A world setting is out of range
    #[error("invalid world setting `{name}`: {reason}")]
    InvalidSetting {
        /// Name of the setting
        name: &'static str,
        /// Human readable explanation
        reason: String,
    },
}

/// Failure of a single [`World::simulate`](crate::World::simulate) call
///
/// `InvalidTimeStep` is an input rejection. The remaining variants are
/// invariant violations that should never occur with a sane configuration;
/// the caller decides whether to halt or reset the simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// The requested time step was negative, NaN or infinite
    #[error("time step must be finite and non-negative, got {0}")]
    InvalidTimeStep(f64),

    /// Positional correction failed to separate a body from a wall or body
    #[error("body {body} still penetrates by {depth:.3e} after positional correction")]
    UnresolvedPenetration {
        /// Index of the penetrating body
        body: usize,
        /// Remaining penetration depth
        depth: f64,
    },

    /// Integration or collision response produced NaN or infinite state
    #[error("body {body} reached a non-finite state")]
    NonFiniteState {
        /// Index of the offending body
        body: usize,
    },

    /// The sub-step loop did not consume the time budget in time
    #[error("time step did not converge within {attempts} sub-step attempts ({remaining:.3e}s left)")]
    IterationLimit {
        /// Number of sub-step attempts made
        attempts: usize,
        /// Unconsumed part of the time budget
        remaining: f64,
    },
}
