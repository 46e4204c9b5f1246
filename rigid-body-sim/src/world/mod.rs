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
//! The simulation world
//!
//! A [`World`] owns a fixed set of walls and bodies and advances them with
//! [`World::simulate`]. Both collections are plain vectors addressed by
//! index; nothing is added or removed after construction.
//!
//! # Example
//!
//! ```
//! use rigid_body_sim::{RigidBody2D, Wall, World};
//! use rigid_body_sim::geometry::Vec2;
//!
//! let ball = RigidBody2D::circle(1.0, 0.5)
//!     .unwrap()
//!     .with_position(Vec2::new(0.0, 3.0));
//! let mut world = World::new(vec![Wall::floor(0.0)], vec![ball]).unwrap();
//!
//! for _ in 0..120 {
//!     world.simulate(1.0 / 60.0).unwrap();
//! }
//! assert!(world.max_penetration() <= world.config().penetration_tolerance);
//! ```

mod collision;
mod config;
mod render;
mod step;

pub use collision::{CollisionState, Contact, ContactTarget};
pub use config::WorldConfig;
pub use render::{BodySnapshot, Renderer2D, WorldSnapshot};
pub use step::StepReport;

use crate::dynamics::{ForceProvider, ForceRegistry, RigidBody2D};
use crate::error::ConfigError;
use crate::geometry::Wall;
use crate::integration::total_kinetic_energy;
use log::debug;

/// Container for walls, bodies and the stepping configuration
pub struct World {
    walls: Vec<Wall>,
    bodies: Vec<RigidBody2D>,
    config: WorldConfig,
    forces: ForceRegistry,
}

impl World {
    /// Create a world with the default configuration
    pub fn new(walls: Vec<Wall>, bodies: Vec<RigidBody2D>) -> Result<Self, ConfigError> {
        World::with_config(walls, bodies, WorldConfig::default())
    }

    /// Create a world with a custom configuration
    ///
    /// Every body is validated (shape, restitution, finite state) together
    /// with the configuration itself.
    pub fn with_config(
        walls: Vec<Wall>,
        bodies: Vec<RigidBody2D>,
        config: WorldConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        for (index, body) in bodies.iter().enumerate() {
            body.validate(index)?;
        }
        debug!(
            "Created world with {} walls and {} bodies",
            walls.len(),
            bodies.len()
        );
        Ok(World {
            walls,
            bodies,
            forces: ForceRegistry::new(config.gravity, config.max_force_magnitude),
            config,
        })
    }

    /// Register an additional environmental force
    pub fn with_force_provider<P: ForceProvider + 'static>(mut self, provider: P) -> Self {
        self.forces.register_provider(Box::new(provider));
        self
    }

    /// Walls in construction order
    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    /// Bodies in construction order
    pub fn bodies(&self) -> &[RigidBody2D] {
        &self.bodies
    }

    /// Get a body by index
    pub fn body(&self, index: usize) -> Option<&RigidBody2D> {
        self.bodies.get(index)
    }

    /// Stepping configuration
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Number of registered force providers, not counting gravity
    pub fn force_provider_count(&self) -> usize {
        self.forces.provider_count()
    }

    /// Sum of the kinetic energy of every body
    pub fn total_kinetic_energy(&self) -> f64 {
        total_kinetic_energy(&self.bodies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::LinearDrag;
    use crate::geometry::{Shape, Vec2};

    #[test]
    fn test_world_creation() {
        let world = World::new(vec![Wall::floor(0.0)], vec![]).unwrap();
        assert_eq!(world.walls().len(), 1);
        assert!(world.bodies().is_empty());
        assert_eq!(world.max_penetration(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_world_rejects_invalid_bodies() {
        let body = RigidBody2D::circle(1.0, 0.5).unwrap().with_restitution(-0.1);
        let result = World::new(vec![], vec![body]);
        assert!(matches!(result, Err(ConfigError::InvalidRestitution(_))));

        let body = RigidBody2D::circle(1.0, 0.5)
            .unwrap()
            .with_position(Vec2::new(f64::NAN, 0.0));
        let result = World::new(vec![], vec![RigidBody2D::circle(1.0, 0.5).unwrap(), body]);
        assert!(matches!(
            result,
            Err(ConfigError::NonFiniteBody { body: 1, field: "position" })
        ));
    }

    #[test]
    fn test_world_rejects_invalid_config() {
        let config = WorldConfig::default().with_min_sub_step(-1.0);
        assert!(World::with_config(vec![], vec![], config).is_err());
    }

    #[test]
    fn test_accessors() {
        let ball = RigidBody2D::circle(2.0, 0.5)
            .unwrap()
            .with_velocity(Vec2::new(1.0, 0.0));
        let world = World::new(vec![Wall::floor(0.0)], vec![ball])
            .unwrap()
            .with_force_provider(LinearDrag::new(0.1, 0.0).unwrap());

        assert_eq!(world.force_provider_count(), 1);
        assert_eq!(world.body(0).unwrap().mass().value(), 2.0);
        assert!(world.body(1).is_none());
        assert_eq!(world.total_kinetic_energy(), 1.0);
    }

    #[test]
    fn test_max_penetration_ignores_fixed_bodies() {
        let sunk = RigidBody2D::fixed(Shape::circle(1.0).unwrap()).unwrap();
        let world = World::new(vec![Wall::floor(0.0)], vec![sunk]).unwrap();
        assert_eq!(world.max_penetration(), f64::NEG_INFINITY);
    }
}
