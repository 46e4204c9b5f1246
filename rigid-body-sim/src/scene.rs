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
//! Scene descriptions loaded from JSON
//!
//! A scene lists walls and bodies together with optional world settings:
//!
//! ```json
//! {
//!   "format_version": "0.1.0",
//!   "settings": { "gravity": [0.0, -9.8] },
//!   "forces": [ { "type": "linear_drag", "linear": 0.1, "angular": 0.05 } ],
//!   "walls": [
//!     { "type": "enclosure", "min": [-5.0, 0.0], "max": [5.0, 10.0] }
//!   ],
//!   "bodies": [
//!     { "shape": { "type": "circle", "radius": 0.5 }, "mass": 1.0, "position": [0.0, 8.0] },
//!     { "shape": { "type": "rectangle", "width": 2.0, "height": 0.2 }, "position": [0.0, 3.0] }
//!   ]
//! }
//! ```
//!
//! A body without `mass` is fixed in place. Forces are registered in
//! addition to gravity, in the listed order.

use crate::dynamics::{ConstantForce, LinearDrag, RigidBody2D, DEFAULT_RESTITUTION};
use crate::error::ConfigError;
use crate::geometry::{Shape, Vec2, Wall};
use crate::world::{World, WorldConfig};
use log::info;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::io::Read;
use thiserror::Error;

/// Scene format version understood by this crate
pub const SCENE_FORMAT_VERSION: &str = "0.1.0";

/// Failure to load or build a scene
#[derive(Debug, Error)]
pub enum SceneError {
    /// The document is not valid scene JSON
    #[error("failed to parse scene: {0}")]
    Parse(#[from] serde_json::Error),

    /// `format_version` is not a semantic version
    #[error("invalid scene format version '{0}'")]
    InvalidVersion(String),

    /// `format_version` is newer than, or breaking with, this crate
    #[error("scene format version {found} is not compatible with {supported}")]
    IncompatibleVersion {
        /// Version declared by the scene
        found: String,
        /// Version supported by this crate
        supported: &'static str,
    },

    /// A wall, body or setting was rejected
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Top-level scene document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    /// Semantic version of the document layout
    pub format_version: String,
    /// Overrides for the default [`WorldConfig`]
    #[serde(default)]
    pub settings: SceneSettings,
    /// Walls in index order
    #[serde(default)]
    pub walls: Vec<WallDescription>,
    /// Bodies in index order
    #[serde(default)]
    pub bodies: Vec<BodyDescription>,
    /// Environmental forces applied on top of gravity
    #[serde(default)]
    pub forces: Vec<ForceDescription>,
}

/// World settings; anything left out keeps its default
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneSettings {
    /// See [`WorldConfig::gravity`]
    pub gravity: Option<[f64; 2]>,
    /// See [`WorldConfig::penetration_tolerance`]
    pub penetration_tolerance: Option<f64>,
    /// See [`WorldConfig::min_sub_step`]
    pub min_sub_step: Option<f64>,
    /// See [`WorldConfig::resting_speed_threshold`]
    pub resting_speed_threshold: Option<f64>,
    /// See [`WorldConfig::approach_epsilon`]
    pub approach_epsilon: Option<f64>,
    /// See [`WorldConfig::correction_slop`]
    pub correction_slop: Option<f64>,
    /// See [`WorldConfig::max_correction_passes`]
    pub max_correction_passes: Option<usize>,
    /// See [`WorldConfig::shallow_overlap_ratio`]
    pub shallow_overlap_ratio: Option<f64>,
    /// See [`WorldConfig::solver_iterations`]
    pub solver_iterations: Option<usize>,
    /// See [`WorldConfig::max_sub_step_attempts`]
    pub max_sub_step_attempts: Option<usize>,
    /// See [`WorldConfig::max_force_magnitude`]
    pub max_force_magnitude: Option<f64>,
    /// See [`WorldConfig::body_collisions`]
    pub body_collisions: Option<bool>,
}

/// One wall, or the four walls of a box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WallDescription {
    /// Half-space through `point`, free on the side `normal` points to
    HalfSpace {
        /// Any point on the wall line
        point: [f64; 2],
        /// Outward normal; normalised on load
        normal: [f64; 2],
    },
    /// Axis-aligned box; expands to floor, right, ceiling and left walls
    Enclosure {
        /// Lower-left corner
        min: [f64; 2],
        /// Upper-right corner
        max: [f64; 2],
    },
}

/// A force provider registered with the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ForceDescription {
    /// The same force, in Newtons, on every movable body
    Constant {
        /// Force vector
        force: [f64; 2],
    },
    /// Drag opposing linear and angular velocity
    LinearDrag {
        /// Linear coefficient in N·s/m
        linear: f64,
        /// Angular coefficient in N·m·s
        #[serde(default)]
        angular: f64,
    },
}

/// Body shape in body coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeDescription {
    /// Disc
    Circle {
        /// Radius in metres
        radius: f64,
    },
    /// Axis-aligned box centred on the body origin
    Rectangle {
        /// Extent along x
        width: f64,
        /// Extent along y
        height: f64,
    },
    /// Convex polygon; recentred on its centroid when loaded
    Polygon {
        /// Vertices in either winding
        vertices: Vec<[f64; 2]>,
    },
}

/// One rigid body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDescription {
    /// Collision shape
    pub shape: ShapeDescription,
    /// Mass in kilograms; `None` makes the body immovable
    #[serde(default)]
    pub mass: Option<f64>,
    /// Initial centre of mass position
    #[serde(default)]
    pub position: [f64; 2],
    /// Initial orientation in radians
    #[serde(default)]
    pub orientation: f64,
    /// Initial linear velocity
    #[serde(default)]
    pub velocity: [f64; 2],
    /// Initial angular velocity in radians per second
    #[serde(default)]
    pub angular_velocity: f64,
    /// Coefficient of restitution in `[0, 1]`
    #[serde(default = "default_restitution")]
    pub restitution: f64,
}

fn default_restitution() -> f64 {
    DEFAULT_RESTITUTION
}

fn vec2(v: [f64; 2]) -> Vec2 {
    Vec2::new(v[0], v[1])
}

impl SceneDescription {
    /// Parse a scene from a JSON string and check its version
    pub fn from_json_str(json: &str) -> Result<Self, SceneError> {
        let scene: SceneDescription = serde_json::from_str(json)?;
        scene.check_version()?;
        Ok(scene)
    }

    /// Parse a scene from any reader, e.g. an open file
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SceneError> {
        let scene: SceneDescription = serde_json::from_reader(reader)?;
        scene.check_version()?;
        Ok(scene)
    }

    /// Serialise the scene back to pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn check_version(&self) -> Result<(), SceneError> {
        let found = Version::parse(&self.format_version)
            .map_err(|_| SceneError::InvalidVersion(self.format_version.clone()))?;
        let supported = Version::parse(SCENE_FORMAT_VERSION)
            .map_err(|_| SceneError::InvalidVersion(SCENE_FORMAT_VERSION.to_string()))?;
        if is_version_compatible(&found, &supported) {
            Ok(())
        } else {
            Err(SceneError::IncompatibleVersion {
                found: self.format_version.clone(),
                supported: SCENE_FORMAT_VERSION,
            })
        }
    }

    /// Settings applied on top of [`WorldConfig::default`]
    pub fn config(&self) -> WorldConfig {
        let s = &self.settings;
        let mut config = WorldConfig::default();
        if let Some(gravity) = s.gravity {
            config.gravity = vec2(gravity);
        }
        if let Some(tolerance) = s.penetration_tolerance {
            config.penetration_tolerance = tolerance;
        }
        if let Some(min_sub_step) = s.min_sub_step {
            config.min_sub_step = min_sub_step;
        }
        if let Some(threshold) = s.resting_speed_threshold {
            config.resting_speed_threshold = threshold;
        }
        if let Some(epsilon) = s.approach_epsilon {
            config.approach_epsilon = epsilon;
        }
        if let Some(slop) = s.correction_slop {
            config.correction_slop = slop;
        }
        if let Some(passes) = s.max_correction_passes {
            config.max_correction_passes = passes;
        }
        if let Some(ratio) = s.shallow_overlap_ratio {
            config.shallow_overlap_ratio = ratio;
        }
        if let Some(iterations) = s.solver_iterations {
            config.solver_iterations = iterations;
        }
        if let Some(attempts) = s.max_sub_step_attempts {
            config.max_sub_step_attempts = attempts;
        }
        if let Some(magnitude) = s.max_force_magnitude {
            config.max_force_magnitude = magnitude;
        }
        if let Some(enabled) = s.body_collisions {
            config.body_collisions = enabled;
        }
        config
    }

    /// Construct the described world
    pub fn build_world(&self) -> Result<World, SceneError> {
        let mut walls = Vec::with_capacity(self.walls.len());
        for wall in &self.walls {
            match wall {
                WallDescription::HalfSpace { point, normal } => {
                    walls.push(Wall::new(vec2(*point), vec2(*normal))?);
                }
                WallDescription::Enclosure { min, max } => {
                    walls.extend(Wall::enclosure(vec2(*min), vec2(*max))?);
                }
            }
        }

        let bodies = self
            .bodies
            .iter()
            .map(BodyDescription::build)
            .collect::<Result<Vec<_>, _>>()?;

        let mut world = World::with_config(walls, bodies, self.config())?;
        for force in &self.forces {
            world = match force {
                ForceDescription::Constant { force } => {
                    world.with_force_provider(ConstantForce::new(vec2(*force)))
                }
                ForceDescription::LinearDrag { linear, angular } => {
                    world.with_force_provider(LinearDrag::new(*linear, *angular)?)
                }
            };
        }
        info!(
            "Loaded scene with {} walls, {} bodies and {} extra forces",
            world.walls().len(),
            world.bodies().len(),
            world.force_provider_count()
        );
        Ok(world)
    }
}

impl BodyDescription {
    fn build(&self) -> Result<RigidBody2D, ConfigError> {
        let shape = match &self.shape {
            ShapeDescription::Circle { radius } => Shape::circle(*radius)?,
            ShapeDescription::Rectangle { width, height } => Shape::rectangle(*width, *height)?,
            ShapeDescription::Polygon { vertices } => {
                Shape::polygon(vertices.iter().copied().map(vec2).collect())?
            }
        };
        let body = match self.mass {
            Some(mass) => RigidBody2D::with_shape(shape, mass)?,
            None => RigidBody2D::fixed(shape)?,
        };
        Ok(body
            .with_position(vec2(self.position))
            .with_orientation(self.orientation)
            .with_velocity(vec2(self.velocity))
            .with_angular_velocity(self.angular_velocity)
            .with_restitution(self.restitution))
    }
}

/// Same major version; for 0.x the minor must match, otherwise the scene's
/// minor may not be newer than ours
fn is_version_compatible(scene: &Version, supported: &Version) -> bool {
    if scene.major != supported.major {
        return false;
    }
    if scene.major != 0 {
        scene.minor <= supported.minor
    } else {
        scene.minor == supported.minor
    }
}
