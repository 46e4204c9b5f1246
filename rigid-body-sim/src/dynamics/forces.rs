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
//! Force accumulation
//!
//! Every sub-step starts by clearing each body's accumulators and rebuilding
//! them from uniform gravity plus any registered [`ForceProvider`]s.
//! Providers are pure functions of body state, so the pass can run over the
//! body arena in parallel without changing results.

use crate::dynamics::RigidBody2D;
use crate::error::ConfigError;
use crate::geometry::{cross, is_finite, Vec2};
use log::warn;

/// A force contribution for one body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedForce {
    /// Force in Newtons
    pub force: Vec2,
    /// World-space application point; `None` acts through the centre of mass
    pub point: Option<Vec2>,
    /// Additional pure torque in N·m
    pub torque: f64,
}

impl AppliedForce {
    /// Force through the centre of mass
    pub fn central(force: Vec2) -> Self {
        AppliedForce {
            force,
            point: None,
            torque: 0.0,
        }
    }

    /// Force applied at a world-space point
    pub fn at_point(force: Vec2, point: Vec2) -> Self {
        AppliedForce {
            force,
            point: Some(point),
            torque: 0.0,
        }
    }

    /// Add a pure torque to this contribution
    pub fn with_torque(mut self, torque: f64) -> Self {
        self.torque = torque;
        self
    }

    /// Check if the force is valid (all components finite)
    pub fn is_valid(&self) -> bool {
        is_finite(&self.force)
            && self.torque.is_finite()
            && self.point.as_ref().map_or(true, is_finite)
    }
}

/// Source of environmental forces
///
/// Providers see the body at the start of the sub-step and return the force
/// to add, or `None` when they do not apply to it.
pub trait ForceProvider: Send + Sync {
    /// Compute the force to apply to a body
    fn force(&self, body: &RigidBody2D) -> Option<AppliedForce>;

    /// Get a descriptive name for this force provider
    fn name(&self) -> &str;
}

/// Same force on every movable body, e.g. a steady wind
#[derive(Debug, Clone, Copy)]
pub struct ConstantForce {
    force: Vec2,
}

impl ConstantForce {
    /// Create a constant force provider
    pub fn new(force: Vec2) -> Self {
        ConstantForce { force }
    }
}

impl ForceProvider for ConstantForce {
    fn force(&self, _body: &RigidBody2D) -> Option<AppliedForce> {
        Some(AppliedForce::central(self.force))
    }

    fn name(&self) -> &str {
        "constant"
    }
}

/// Viscous drag opposing linear and angular velocity
#[derive(Debug, Clone, Copy)]
pub struct LinearDrag {
    linear: f64,
    angular: f64,
}

impl LinearDrag {
    /// Create a drag provider with coefficients in N·s/m and N·m·s
    ///
    /// Both coefficients must be non-negative and finite.
    pub fn new(linear: f64, angular: f64) -> Result<Self, ConfigError> {
        let valid = |c: f64| c >= 0.0 && c.is_finite();
        if !valid(linear) || !valid(angular) {
            return Err(ConfigError::InvalidDrag { linear, angular });
        }
        Ok(LinearDrag { linear, angular })
    }
}

impl ForceProvider for LinearDrag {
    fn force(&self, body: &RigidBody2D) -> Option<AppliedForce> {
        Some(
            AppliedForce::central(-self.linear * body.linear_velocity())
                .with_torque(-self.angular * body.angular_velocity()),
        )
    }

    fn name(&self) -> &str {
        "linear_drag"
    }
}

/// Gravity plus registered providers, with an overflow clamp
pub struct ForceRegistry {
    gravity: Vec2,
    providers: Vec<Box<dyn ForceProvider>>,
    max_force_magnitude: f64,
}

impl ForceRegistry {
    /// Create a registry with uniform gravitational acceleration
    pub fn new(gravity: Vec2, max_force_magnitude: f64) -> Self {
        ForceRegistry {
            gravity,
            providers: Vec::new(),
            max_force_magnitude,
        }
    }

    /// Register a force provider
    pub fn register_provider(&mut self, provider: Box<dyn ForceProvider>) {
        self.providers.push(provider);
    }

    /// Get the number of registered providers
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Gravitational acceleration applied to every movable body
    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    /// Rebuild the accumulators of one body
    ///
    /// Clears the accumulators, then adds `m·g` and every valid provider
    /// contribution. Immovable bodies end up with empty accumulators. `index`
    /// only labels log messages.
    pub fn accumulate(&self, index: usize, body: &mut RigidBody2D) {
        body.clear_accumulators();
        if body.is_immovable() {
            return;
        }

        let mut total = self.gravity * body.mass().value();
        let mut torque = 0.0;
        for provider in &self.providers {
            let Some(applied) = provider.force(body) else {
                continue;
            };
            if !applied.is_valid() {
                warn!(
                    "Force provider '{}' produced invalid force (NaN/Inf) for body {}",
                    provider.name(),
                    index
                );
                continue;
            }
            total += applied.force;
            torque += applied.torque;
            if let Some(point) = applied.point {
                torque += cross(&(point - body.position()), &applied.force);
            }
        }

        let magnitude = total.norm();
        if magnitude > self.max_force_magnitude {
            warn!(
                "Total force magnitude {:.2e} exceeds limit {:.2e} for body {}",
                magnitude, self.max_force_magnitude, index
            );
            total *= self.max_force_magnitude / magnitude;
        }

        body.apply_force(total);
        body.apply_torque(torque);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Shape;
    use approx::assert_abs_diff_eq;

    struct Broken;

    impl ForceProvider for Broken {
        fn force(&self, _body: &RigidBody2D) -> Option<AppliedForce> {
            Some(AppliedForce::central(Vec2::new(f64::NAN, 0.0)))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[test]
    fn test_gravity_scales_with_mass() {
        let registry = ForceRegistry::new(Vec2::new(0.0, -9.8), 1e10);
        let mut body = RigidBody2D::circle(2.0, 0.5).unwrap();
        registry.accumulate(0, &mut body);
        assert_abs_diff_eq!(body.accumulated_force().y, -19.6);
    }

    #[test]
    fn test_accumulate_resets_previous_forces() {
        let registry = ForceRegistry::new(Vec2::zeros(), 1e10);
        let mut body = RigidBody2D::circle(1.0, 0.5).unwrap();
        body.apply_force(Vec2::new(100.0, 0.0));
        body.apply_torque(3.0);
        registry.accumulate(0, &mut body);
        assert_eq!(body.accumulated_force(), Vec2::zeros());
        assert_eq!(body.accumulated_torque(), 0.0);
    }

    #[test]
    fn test_providers_are_summed() {
        let mut registry = ForceRegistry::new(Vec2::zeros(), 1e10);
        registry.register_provider(Box::new(ConstantForce::new(Vec2::new(1.0, 0.0))));
        registry.register_provider(Box::new(LinearDrag::new(0.5, 0.25).unwrap()));
        assert_eq!(registry.provider_count(), 2);

        let mut body = RigidBody2D::circle(1.0, 0.5)
            .unwrap()
            .with_velocity(Vec2::new(4.0, 0.0))
            .with_angular_velocity(2.0);
        registry.accumulate(0, &mut body);

        assert_abs_diff_eq!(body.accumulated_force().x, 1.0 - 2.0);
        assert_abs_diff_eq!(body.accumulated_torque(), -0.5);
    }

    #[test]
    fn test_invalid_provider_output_is_skipped() {
        let mut registry = ForceRegistry::new(Vec2::new(0.0, -1.0), 1e10);
        registry.register_provider(Box::new(Broken));

        let mut body = RigidBody2D::circle(1.0, 0.5).unwrap();
        registry.accumulate(0, &mut body);
        assert_eq!(body.accumulated_force(), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_force_overflow_is_clamped() {
        let mut registry = ForceRegistry::new(Vec2::zeros(), 100.0);
        registry.register_provider(Box::new(ConstantForce::new(Vec2::new(1000.0, 0.0))));

        let mut body = RigidBody2D::circle(1.0, 0.5).unwrap();
        registry.accumulate(0, &mut body);
        assert!(body.accumulated_force().norm() <= 100.0 + 1e-9);
    }

    #[test]
    fn test_immovable_bodies_get_no_force() {
        let registry = ForceRegistry::new(Vec2::new(0.0, -9.8), 1e10);
        let mut body = RigidBody2D::fixed(Shape::circle(1.0).unwrap()).unwrap();
        registry.accumulate(0, &mut body);
        assert_eq!(body.accumulated_force(), Vec2::zeros());
    }

    #[test]
    fn test_force_at_point_adds_torque() {
        let mut registry = ForceRegistry::new(Vec2::zeros(), 1e10);
        struct Push;
        impl ForceProvider for Push {
            fn force(&self, body: &RigidBody2D) -> Option<AppliedForce> {
                Some(AppliedForce::at_point(
                    Vec2::new(0.0, 1.0),
                    body.position() + Vec2::new(2.0, 0.0),
                ))
            }
            fn name(&self) -> &str {
                "push"
            }
        }
        registry.register_provider(Box::new(Push));

        let mut body = RigidBody2D::circle(1.0, 0.5).unwrap();
        registry.accumulate(0, &mut body);
        assert_abs_diff_eq!(body.accumulated_torque(), 2.0);
    }

    #[test]
    fn test_invalid_drag_is_rejected() {
        assert!(matches!(
            LinearDrag::new(-1.0, 0.0),
            Err(ConfigError::InvalidDrag { linear, .. }) if linear == -1.0
        ));
        assert!(LinearDrag::new(0.1, f64::NAN).is_err());
        assert!(LinearDrag::new(0.0, 0.0).is_ok());
    }
}
