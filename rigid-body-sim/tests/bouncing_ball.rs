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
//! The bouncing-ball scenario
//!
//! A 1 kg ball of radius 0.5 m is dropped from a centre height of 10 m onto
//! a floor with restitution 0.5 and stepped at 60 Hz.

use rigid_body_sim::{RigidBody2D, Vec2, Wall, World};

const DT: f64 = 1.0 / 60.0;
const RADIUS: f64 = 0.5;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn drop_ball() -> World {
    let ball = RigidBody2D::circle(1.0, RADIUS)
        .unwrap()
        .with_position(Vec2::new(0.0, 10.0))
        .with_restitution(0.5);
    World::new(vec![Wall::floor(0.0)], vec![ball]).unwrap()
}

/// Height of the lowest point of the ball above the floor
fn clearance(world: &World) -> f64 {
    world.bodies()[0].position().y - RADIUS
}

#[test]
fn test_monotonic_fall_before_first_contact() {
    init_logger();
    let mut world = drop_ball();
    let mut previous = world.bodies()[0].position().y;

    for _ in 0..600 {
        let report = world.simulate(DT).unwrap();
        if report.collisions_resolved > 0 || report.positional_corrections > 0 {
            return;
        }
        let y = world.bodies()[0].position().y;
        assert!(y < previous, "ball rose before touching the floor");
        previous = y;
    }
    panic!("ball never reached the floor");
}

#[test]
fn test_peaks_shrink_by_restitution_squared() {
    init_logger();
    let mut world = drop_ball();
    let mut peaks = vec![clearance(&world)];
    let mut rising = false;
    let mut highest = 0.0_f64;

    for _ in 0..600 {
        world.simulate(DT).unwrap();
        let vy = world.bodies()[0].linear_velocity().y;
        if vy > 0.0 {
            rising = true;
            highest = highest.max(clearance(&world));
        } else if rising {
            highest = highest.max(clearance(&world));
            peaks.push(highest);
            rising = false;
            highest = 0.0;
        }
    }

    assert!(peaks.len() >= 3, "expected at least two rebounds, got {peaks:?}");
    for pair in peaks.windows(2).take(2) {
        let ratio = pair[1] / pair[0];
        assert!(
            (0.2..0.3).contains(&ratio),
            "peak ratio {ratio} outside expected range, peaks {peaks:?}"
        );
    }
}

#[test]
fn test_never_penetrates_and_comes_to_rest() {
    init_logger();
    let mut world = drop_ball();
    let tolerance = world.config().penetration_tolerance;

    for frame in 0..600 {
        world.simulate(DT).unwrap();
        let depth = world.max_penetration();
        assert!(depth <= tolerance, "frame {frame}: penetration {depth}");
    }

    let ball = &world.bodies()[0];
    assert!(ball.linear_velocity().norm() < 1e-9);
    assert!(clearance(&world).abs() <= tolerance);
    assert_eq!(ball.angular_velocity(), 0.0);
}
