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
//! # Rigid Body Sim
//!
//! A 2D rigid-body simulation of circles and convex polygons bouncing off
//! static walls and each other.
//!
//! ## Features
//!
//! - **Semi-implicit Euler**: velocity first, then pose, for every body
//! - **Time-of-impact bisection**: overshooting sub-steps are halved until the
//!   contact is found, with positional correction as a numerical floor
//! - **Impulse response**: sequential impulses with per-body restitution;
//!   resting contacts are held against gravity instead of re-colliding
//! - **Parallelization**: optional Rayon integration for large body counts
//! - **Scenes**: worlds can be described in versioned JSON
//!
//! ## Example
//!
//! ```rust
//! use rigid_body_sim::{RigidBody2D, Vec2, Wall, World};
//!
//! let ball = RigidBody2D::circle(1.0, 0.5)
//!     .unwrap()
//!     .with_position(Vec2::new(0.0, 10.0))
//!     .with_restitution(0.5);
//! let mut world = World::new(vec![Wall::floor(0.0)], vec![ball]).unwrap();
//!
//! let report = world.simulate(1.0 / 60.0).unwrap();
//! assert_eq!(report.sub_steps, 1);
//! assert!(world.bodies()[0].position().y < 10.0);
//! ```

#![warn(missing_docs)]

/// Bodies, mass properties and force providers
pub mod dynamics;

/// Error types
pub mod error;

/// Vectors, shapes and walls
pub mod geometry;

/// Time integration of body state
pub mod integration;

/// JSON scene loading
pub mod scene;

/// The world and its stepping loop
pub mod world;

pub use dynamics::{ConstantForce, ForceProvider, LinearDrag, RigidBody2D};
pub use error::{ConfigError, SimulationError};
pub use geometry::{Shape, Vec2, Wall};
pub use scene::{SceneDescription, SceneError};
pub use world::{CollisionState, Renderer2D, StepReport, World, WorldConfig, WorldSnapshot};
