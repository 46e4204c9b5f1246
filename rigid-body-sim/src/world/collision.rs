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
//! Contact detection, classification and response

use super::World;
use crate::dynamics::RigidBody2D;
use crate::error::SimulationError;
use crate::geometry::{Penetration, Vec2};
use log::trace;

/// Outcome of classifying a candidate configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionState {
    /// Some contact overlaps by more than the tolerance
    Penetrating,
    /// Some contact is within the tolerance band and closing
    Colliding,
    /// Nothing needs attention
    Clear,
}

/// The second participant of a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactTarget {
    /// Index into [`World::walls`]
    Wall(usize),
    /// Index into [`World::bodies`]; always greater than the contact's body
    Body(usize),
}

/// A body touching, or about to touch, a wall or another body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Index of the body the normal points toward
    pub body: usize,
    /// Wall or body on the other side of the contact
    pub target: ContactTarget,
    /// Unit normal, from the target toward the body
    pub normal: Vec2,
    /// World-space contact point
    pub point: Vec2,
    /// Signed overlap; positive means overlapping
    pub depth: f64,
}

impl Contact {
    fn from_penetration(body: usize, target: ContactTarget, hit: Penetration) -> Self {
        Contact {
            body,
            target,
            normal: hit.normal,
            point: hit.point,
            depth: hit.depth,
        }
    }
}

/// One contact inside the impulse solver
struct ImpulseRow {
    contact: Contact,
    /// Effective inverse mass along the normal
    k: f64,
    /// Added to the measured normal velocity
    bias: f64,
    /// Normal velocity the row drives toward
    target: f64,
    /// Impulse applied so far; never negative
    accumulated: f64,
}

impl World {
    /// Every pair that can touch, in resolution order
    ///
    /// Walls against movable bodies first, wall by wall, then body pairs
    /// `(i, j)` with `i < j` when body collisions are enabled. Pairs of two
    /// immovable bodies are skipped.
    fn contact_pairs(&self) -> Vec<(usize, ContactTarget)> {
        let mut pairs = Vec::new();
        for wall in 0..self.walls.len() {
            for (index, body) in self.bodies.iter().enumerate() {
                if !body.is_immovable() {
                    pairs.push((index, ContactTarget::Wall(wall)));
                }
            }
        }
        if self.config.body_collisions {
            for i in 0..self.bodies.len() {
                for j in (i + 1)..self.bodies.len() {
                    if self.bodies[i].is_immovable() && self.bodies[j].is_immovable() {
                        continue;
                    }
                    pairs.push((i, ContactTarget::Body(j)));
                }
            }
        }
        pairs
    }

    /// Current overlap of one pair; `None` for unsupported shape pairs
    fn measure(&self, body: usize, target: ContactTarget) -> Option<Penetration> {
        let shape = self.bodies[body].world_shape();
        match target {
            ContactTarget::Wall(wall) => Some(self.walls[wall].penetration(&shape)),
            ContactTarget::Body(other) => {
                shape.penetration_with(&self.bodies[other].world_shape())
            }
        }
    }

    /// Contacts whose depth is at least `-penetration_tolerance`
    ///
    /// A polygon yields one contact per vertex against each wall; every
    /// other pair yields at most one.
    pub fn contacts(&self) -> Vec<Contact> {
        let tolerance = self.config.penetration_tolerance;
        let mut contacts = Vec::new();
        for (body, target) in self.contact_pairs() {
            match target {
                ContactTarget::Wall(wall) => {
                    let shape = self.bodies[body].world_shape();
                    contacts.extend(
                        self.walls[wall]
                            .contact_points(&shape)
                            .into_iter()
                            .map(|hit| Contact::from_penetration(body, target, hit)),
                    );
                }
                ContactTarget::Body(_) => {
                    if let Some(hit) = self.measure(body, target) {
                        contacts.push(Contact::from_penetration(body, target, hit));
                    }
                }
            }
        }
        contacts.retain(|contact| contact.depth >= -tolerance);
        contacts
    }

    /// Deepest overlap over every pair that can touch
    ///
    /// Returns negative infinity when there is nothing to compare.
    pub fn max_penetration(&self) -> f64 {
        self.contact_pairs()
            .into_iter()
            .filter_map(|(body, target)| self.measure(body, target))
            .map(|hit| hit.depth)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Classify the current configuration
    pub fn check_for_collisions(&self) -> CollisionState {
        let mut state = CollisionState::Clear;
        for contact in self.contacts() {
            if contact.depth > self.config.penetration_tolerance {
                return CollisionState::Penetrating;
            }
            if self.normal_velocity(&contact) < -self.config.approach_epsilon {
                state = CollisionState::Colliding;
            }
        }
        state
    }

    /// Relative velocity of the body along the contact normal
    ///
    /// Negative values mean the participants are approaching each other.
    pub fn normal_velocity(&self, contact: &Contact) -> f64 {
        let mut relative = self.bodies[contact.body].velocity_at(&contact.point);
        if let ContactTarget::Body(other) = contact.target {
            relative -= self.bodies[other].velocity_at(&contact.point);
        }
        relative.dot(&contact.normal)
    }

    /// Closing speed below which a contact is treated as resting
    ///
    /// This is the speed gravity alone adds along the normal over `dt`,
    /// raised to `resting_speed_threshold`. A contact closing slower than
    /// that is not bouncing, only being pressed together.
    fn resting_speed(&self, contact: &Contact, dt: f64) -> f64 {
        let gravity = |index: usize| {
            if self.bodies[index].is_immovable() {
                Vec2::zeros()
            } else {
                self.config.gravity
            }
        };
        let mut relative = gravity(contact.body);
        if let ContactTarget::Body(other) = contact.target {
            relative -= gravity(other);
        }
        let closing = -relative.dot(&contact.normal) * dt;
        closing.max(self.config.resting_speed_threshold)
    }

    /// Change in normal velocity the pending forces would cause over `dt`
    fn normal_velocity_change(&self, contact: &Contact, dt: f64) -> f64 {
        let mut change = self.bodies[contact.body].velocity_change_at(&contact.point, dt);
        if let ContactTarget::Body(other) = contact.target {
            change -= self.bodies[other].velocity_change_at(&contact.point, dt);
        }
        change.dot(&contact.normal)
    }

    fn effective_inverse_mass(&self, contact: &Contact) -> f64 {
        let mut k = self.bodies[contact.body].inverse_mass_along(&contact.normal, &contact.point);
        if let ContactTarget::Body(other) = contact.target {
            k += self.bodies[other].inverse_mass_along(&contact.normal, &contact.point);
        }
        k
    }

    /// Body restitution against walls, the mean of both for body pairs
    fn restitution(&self, contact: &Contact) -> f64 {
        let restitution = self.bodies[contact.body].restitution();
        match contact.target {
            ContactTarget::Wall(_) => restitution,
            ContactTarget::Body(other) => 0.5 * (restitution + self.bodies[other].restitution()),
        }
    }

    fn apply_contact_impulse(&mut self, contact: &Contact, magnitude: f64) {
        let impulse = contact.normal * magnitude;
        match contact.target {
            ContactTarget::Wall(_) => {
                self.bodies[contact.body].apply_impulse(impulse, &contact.point);
            }
            ContactTarget::Body(other) => {
                let (first, second) = pair_mut(&mut self.bodies, contact.body, other);
                first.apply_impulse(impulse, &contact.point);
                second.apply_impulse(-impulse, &contact.point);
            }
        }
    }

    /// Sequential impulses with clamped accumulation
    ///
    /// Each pass drives every row's normal velocity toward its target while
    /// keeping the total impulse on the row non-negative, so later rows can
    /// take back what earlier ones over-applied. Returns the number of rows
    /// left pushing.
    fn solve(&mut self, rows: &mut [ImpulseRow]) -> usize {
        for _ in 0..self.config.solver_iterations {
            let mut changed = false;
            for row in rows.iter_mut() {
                let vn = self.normal_velocity(&row.contact) + row.bias;
                let previous = row.accumulated;
                row.accumulated = (previous + (row.target - vn) / row.k).max(0.0);
                let delta = row.accumulated - previous;
                if delta != 0.0 {
                    self.apply_contact_impulse(&row.contact, delta);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        rows.iter().filter(|row| row.accumulated > 0.0).count()
    }

    /// Cancel the pending forces at contacts that are resting
    ///
    /// Runs before integration over `dt`. Every contact in the tolerance
    /// band that is not closing faster than the resting speed gets
    /// the impulse that stops the accumulated forces from pushing it
    /// further in. Integration then leaves those contacts where they are
    /// instead of overshooting into penetration. Returns the number of
    /// contacts held.
    pub(crate) fn hold_resting_contacts(&mut self, dt: f64) -> usize {
        let epsilon = self.config.approach_epsilon;
        let mut rows = Vec::new();
        for contact in self.contacts() {
            if self.normal_velocity(&contact) < -(epsilon + self.resting_speed(&contact, dt)) {
                continue;
            }
            let k = self.effective_inverse_mass(&contact);
            if k <= 0.0 {
                continue;
            }
            rows.push(ImpulseRow {
                bias: self.normal_velocity_change(&contact, dt),
                contact,
                k,
                target: 0.0,
                accumulated: 0.0,
            });
        }
        if rows.is_empty() {
            return 0;
        }
        let held = self.solve(&mut rows);
        trace!("Holding {held} of {} resting contacts", rows.len());
        held
    }

    /// Apply restitution impulses at the contacts of a committed sub-step
    ///
    /// Contacts closing faster than the resting speed for `dt`
    /// rebound with the contact's restitution; every other contact in the
    /// band is only kept from closing. All contacts are solved together.
    /// Returns the number of contacts that received an impulse, zero when
    /// nothing was closing.
    pub(crate) fn resolve_collisions(&mut self, dt: f64) -> usize {
        let epsilon = self.config.approach_epsilon;
        let mut closing = false;
        let mut rows = Vec::new();
        for contact in self.contacts() {
            let k = self.effective_inverse_mass(&contact);
            if k <= 0.0 {
                continue;
            }
            let vn = self.normal_velocity(&contact);
            let mut target = 0.0;
            if vn < -epsilon {
                closing = true;
                if -vn > self.resting_speed(&contact, dt) {
                    target = -self.restitution(&contact) * vn;
                }
            }
            rows.push(ImpulseRow {
                contact,
                k,
                bias: 0.0,
                target,
                accumulated: 0.0,
            });
        }
        if !closing {
            return 0;
        }
        let resolved = self.solve(&mut rows);
        trace!("Resolved {resolved} of {} contacts", rows.len());
        resolved
    }

    /// Push overlapping participants apart along their contact normals
    ///
    /// Each pass moves every contact deeper than the tolerance to a gap of
    /// `correction_slop * penetration_tolerance`, sharing the displacement by
    /// inverse mass. Returns the number of displacements made, or
    /// [`SimulationError::UnresolvedPenetration`] if some pair still overlaps
    /// after the last pass.
    pub(crate) fn correct_penetrations(&mut self) -> Result<usize, SimulationError> {
        let tolerance = self.config.penetration_tolerance;
        let target_depth = -self.config.correction_slop * tolerance;
        let pairs = self.contact_pairs();
        let mut corrections = 0;

        for _ in 0..self.config.max_correction_passes {
            let mut moved = false;
            for &(body, target) in &pairs {
                // Depth is re-measured since earlier corrections may have moved the body
                let Some(hit) = self.measure(body, target) else {
                    continue;
                };
                if hit.depth <= tolerance {
                    continue;
                }

                let push = hit.depth - target_depth;
                match target {
                    ContactTarget::Wall(_) => {
                        self.bodies[body].translate(hit.normal * push);
                    }
                    ContactTarget::Body(other) => {
                        let (first, second) = pair_mut(&mut self.bodies, body, other);
                        let inv_first = first.mass().inverse();
                        let inv_second = second.mass().inverse();
                        let total = inv_first + inv_second;
                        if total <= 0.0 {
                            continue;
                        }
                        first.translate(hit.normal * (push * inv_first / total));
                        second.translate(-hit.normal * (push * inv_second / total));
                    }
                }
                moved = true;
                corrections += 1;
            }
            if !moved {
                break;
            }
        }

        for &(body, target) in &pairs {
            if let Some(hit) = self.measure(body, target) {
                if hit.depth > tolerance {
                    return Err(SimulationError::UnresolvedPenetration {
                        body,
                        depth: hit.depth,
                    });
                }
            }
        }
        Ok(corrections)
    }
}

/// Two distinct mutable bodies; requires `first < second`
fn pair_mut(
    bodies: &mut [RigidBody2D],
    first: usize,
    second: usize,
) -> (&mut RigidBody2D, &mut RigidBody2D) {
    let (head, tail) = bodies.split_at_mut(second);
    (&mut head[first], &mut tail[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Shape, Wall};
    use crate::world::WorldConfig;
    use approx::assert_abs_diff_eq;

    const DT: f64 = 1.0 / 60.0;

    fn ball(x: f64, y: f64) -> RigidBody2D {
        RigidBody2D::circle(1.0, 0.5)
            .unwrap()
            .with_position(Vec2::new(x, y))
    }

    #[test]
    fn test_clear_when_far_from_walls() {
        let world = World::new(vec![Wall::floor(0.0)], vec![ball(0.0, 5.0)]).unwrap();
        assert!(world.contacts().is_empty());
        assert_eq!(world.check_for_collisions(), CollisionState::Clear);
    }

    #[test]
    fn test_penetrating_beyond_tolerance() {
        let world = World::new(vec![Wall::floor(0.0)], vec![ball(0.0, 0.49)]).unwrap();
        assert_eq!(world.check_for_collisions(), CollisionState::Penetrating);
        assert_abs_diff_eq!(world.max_penetration(), 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_colliding_requires_approach() {
        let resting = ball(0.0, 0.5);
        let world = World::new(vec![Wall::floor(0.0)], vec![resting.clone()]).unwrap();
        assert_eq!(world.check_for_collisions(), CollisionState::Clear);

        let falling = resting.with_velocity(Vec2::new(0.0, -1.0));
        let world = World::new(vec![Wall::floor(0.0)], vec![falling]).unwrap();
        assert_eq!(world.check_for_collisions(), CollisionState::Colliding);

        let leaving = ball(0.0, 0.5).with_velocity(Vec2::new(0.0, 1.0));
        let world = World::new(vec![Wall::floor(0.0)], vec![leaving]).unwrap();
        assert_eq!(world.check_for_collisions(), CollisionState::Clear);
    }

    #[test]
    fn test_contact_order_is_walls_then_pairs() {
        let walls = vec![Wall::floor(0.0), Wall::left(-1.0)];
        let bodies = vec![ball(-0.5, 0.5), ball(0.5, 0.5)];
        let world = World::new(walls, bodies).unwrap();

        let targets: Vec<_> = world
            .contacts()
            .iter()
            .map(|c| (c.body, c.target))
            .collect();
        assert_eq!(
            targets,
            vec![
                (0, ContactTarget::Wall(0)),
                (1, ContactTarget::Wall(0)),
                (0, ContactTarget::Wall(1)),
                (0, ContactTarget::Body(1)),
            ]
        );
    }

    #[test]
    fn test_flat_face_touches_at_both_corners() {
        let slab = RigidBody2D::rectangle(1.0, 2.0, 1.0)
            .unwrap()
            .with_position(Vec2::new(0.0, 0.5));
        let world = World::new(vec![Wall::floor(0.0)], vec![slab]).unwrap();

        let contacts = world.contacts();
        assert_eq!(contacts.len(), 2);
        let mut xs: Vec<f64> = contacts.iter().map(|c| c.point.x).collect();
        xs.sort_by(f64::total_cmp);
        assert_abs_diff_eq!(xs[0], -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(xs[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_resting_contact_is_held_through_integration() {
        let mut world = World::new(vec![Wall::floor(0.0)], vec![ball(0.0, 0.5)]).unwrap();
        world.compute_forces();
        assert_eq!(world.hold_resting_contacts(DT), 1);
        world.integrate(DT);

        let body = &world.bodies()[0];
        assert_abs_diff_eq!(body.linear_velocity().y, 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(body.position().y, 0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_fast_approach_is_not_held() {
        let falling = ball(0.0, 0.5).with_velocity(Vec2::new(0.0, -1.0));
        let mut world = World::new(vec![Wall::floor(0.0)], vec![falling]).unwrap();
        world.compute_forces();
        assert_eq!(world.hold_resting_contacts(DT), 0);
        assert_eq!(world.bodies()[0].linear_velocity(), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_stack_is_held_as_a_whole() {
        let bodies = vec![ball(0.0, 0.5), ball(0.0, 1.5)];
        let mut world = World::new(vec![Wall::floor(0.0)], bodies).unwrap();
        world.compute_forces();
        assert_eq!(world.hold_resting_contacts(DT), 2);
        world.integrate(DT);

        // The iterations leave a residue well below one step of gravity
        let kick = 9.8 * DT;
        for body in world.bodies() {
            assert!(body.linear_velocity().norm() < 0.01 * kick);
        }
    }

    #[test]
    fn test_body_collisions_can_be_disabled() {
        let config = WorldConfig::default().with_body_collisions(false);
        let world =
            World::with_config(vec![], vec![ball(0.0, 0.0), ball(0.5, 0.0)], config).unwrap();
        assert!(world.contacts().is_empty());
        assert_eq!(world.max_penetration(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_wall_impulse_reverses_fast_approach() {
        let body = ball(0.0, 0.5)
            .with_velocity(Vec2::new(0.0, -4.0))
            .with_restitution(0.5);
        let mut world = World::new(vec![Wall::floor(0.0)], vec![body]).unwrap();

        assert_eq!(world.resolve_collisions(DT), 1);
        assert_abs_diff_eq!(world.bodies()[0].linear_velocity().y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_approach_slower_than_gravity_is_inelastic() {
        // Gravity adds 9.8 / 60 m/s per sub-step, more than this approach
        let body = ball(0.0, 0.5)
            .with_velocity(Vec2::new(1.0, -0.1))
            .with_restitution(1.0);
        let mut world = World::new(vec![Wall::floor(0.0)], vec![body]).unwrap();

        assert_eq!(world.resolve_collisions(DT), 1);
        let velocity = world.bodies()[0].linear_velocity();
        assert_abs_diff_eq!(velocity.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(velocity.x, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_slow_approach_bounces_without_gravity() {
        let body = ball(0.0, 0.5)
            .with_velocity(Vec2::new(0.0, -0.1))
            .with_restitution(1.0);
        let config = WorldConfig::default().with_gravity(Vec2::zeros());
        let mut world = World::with_config(vec![Wall::floor(0.0)], vec![body], config).unwrap();

        world.resolve_collisions(DT);
        assert_abs_diff_eq!(world.bodies()[0].linear_velocity().y, 0.1, epsilon = 1e-12);

        let body = ball(0.0, 0.5)
            .with_velocity(Vec2::new(0.0, -0.1))
            .with_restitution(1.0);
        let config = WorldConfig::default()
            .with_gravity(Vec2::zeros())
            .with_resting_speed_threshold(0.5);
        let mut world = World::with_config(vec![Wall::floor(0.0)], vec![body], config).unwrap();

        world.resolve_collisions(DT);
        assert_abs_diff_eq!(world.bodies()[0].linear_velocity().y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_equal_mass_head_on_exchange() {
        let a = ball(0.0, 0.0)
            .with_velocity(Vec2::new(2.0, 0.0))
            .with_restitution(1.0);
        let b = ball(1.0, 0.0)
            .with_velocity(Vec2::new(-2.0, 0.0))
            .with_restitution(1.0);
        let mut world = World::with_config(
            vec![],
            vec![a, b],
            WorldConfig::default().with_gravity(Vec2::zeros()),
        )
        .unwrap();

        assert_eq!(world.resolve_collisions(DT), 1);
        assert_abs_diff_eq!(world.bodies()[0].linear_velocity().x, -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(world.bodies()[1].linear_velocity().x, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fixed_body_keeps_velocity_in_pair() {
        let post = RigidBody2D::fixed(Shape::circle(0.5).unwrap()).unwrap();
        let incoming = ball(0.0, 1.0).with_velocity(Vec2::new(0.0, -3.0));
        let mut world = World::new(vec![], vec![post, incoming]).unwrap();

        world.resolve_collisions(DT);
        assert_eq!(world.bodies()[0].linear_velocity(), Vec2::zeros());
        assert!(world.bodies()[1].linear_velocity().y > 0.0);
    }

    #[test]
    fn test_positional_correction_leaves_gap() {
        let mut world = World::new(vec![Wall::floor(0.0)], vec![ball(0.0, 0.3)]).unwrap();
        let corrections = world.correct_penetrations().unwrap();

        assert_eq!(corrections, 1);
        let expected = -world.config().correction_slop * world.config().penetration_tolerance;
        assert_abs_diff_eq!(world.max_penetration(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_positional_correction_splits_by_mass() {
        let light = RigidBody2D::circle(1.0, 0.5).unwrap();
        let heavy = RigidBody2D::circle(3.0, 0.5)
            .unwrap()
            .with_position(Vec2::new(0.8, 0.0));
        let mut world = World::new(vec![], vec![light, heavy]).unwrap();

        world.correct_penetrations().unwrap();
        let moved_light = -world.bodies()[0].position().x;
        let moved_heavy = world.bodies()[1].position().x - 0.8;
        assert_abs_diff_eq!(moved_light, 3.0 * moved_heavy, epsilon = 1e-12);
    }

    #[test]
    fn test_impossible_correction_is_reported() {
        // Two walls squeezing a ball thinner than its diameter
        let walls = vec![Wall::floor(0.0), Wall::ceiling(0.5)];
        let mut world = World::new(walls, vec![ball(0.0, 0.25)]).unwrap();

        let result = world.correct_penetrations();
        assert!(matches!(
            result,
            Err(SimulationError::UnresolvedPenetration { body: 0, .. })
        ));
    }
}
