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
//! Bouncing Ball Example
//!
//! Drops a ball onto the floor and prints every rebound peak, showing the
//! height shrinking by the square of the restitution coefficient until the
//! ball comes to rest.
//!
//! # Running
//!
//! ```bash
//! cargo run --example bouncing_ball
//!
//! # Livelier ball, with sub-step logging
//! RUST_LOG=rigid_body_sim=debug cargo run --example bouncing_ball -- --restitution 0.8
//! ```

use rigid_body_sim::{RigidBody2D, Vec2, Wall, World};

const RADIUS: f64 = 0.5;
const TIMESTEP: f64 = 1.0 / 60.0;

fn main() {
    env_logger::init();

    println!("==========================================================");
    println!("                 Bouncing Ball Simulation");
    println!("==========================================================");
    println!();

    let args: Vec<String> = std::env::args().collect();
    let mut restitution = 0.5;
    let mut height = 10.0;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--restitution" | "--height" if i + 1 < args.len() => {
                match args[i + 1].parse::<f64>() {
                    Ok(value) if args[i] == "--restitution" => restitution = value,
                    Ok(value) => height = value,
                    Err(_) => eprintln!("Warning: ignoring invalid value '{}'", args[i + 1]),
                }
                i += 2;
            }
            other => {
                eprintln!("Error: unknown or incomplete argument '{}'", other);
                std::process::exit(1);
            }
        }
    }

    let ball = match RigidBody2D::circle(1.0, RADIUS) {
        Ok(ball) => ball
            .with_position(Vec2::new(0.0, height))
            .with_restitution(restitution),
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };
    let mut world = match World::new(vec![Wall::floor(0.0)], vec![ball]) {
        Ok(world) => world,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };

    println!("Configuration:");
    println!("  Drop height:  {:.2} m", height);
    println!("  Restitution:  {:.2}", restitution);
    println!("  Timestep:     {:.4} s", TIMESTEP);
    println!();

    let mut previous_peak = height - RADIUS;
    let mut highest = 0.0_f64;
    let mut rising = false;
    let mut bounces = 0;

    for frame in 1..=1200 {
        if let Err(err) = world.simulate(TIMESTEP) {
            eprintln!("Simulation failed at frame {}: {}", frame, err);
            std::process::exit(1);
        }

        let body = &world.bodies()[0];
        let clearance = body.position().y - RADIUS;
        let vy = body.linear_velocity().y;
        if vy > 0.0 {
            rising = true;
            highest = highest.max(clearance);
        } else if rising {
            bounces += 1;
            println!(
                "  Bounce {:>2} at t={:>6.3} s: peak {:.4} m (ratio {:.3})",
                bounces,
                frame as f64 * TIMESTEP,
                highest,
                highest / previous_peak
            );
            previous_peak = highest;
            highest = 0.0;
            rising = false;
        }

        if frame > 1 && vy == 0.0 && !rising && bounces > 0 {
            println!();
            println!("Ball at rest after {:.3} s", frame as f64 * TIMESTEP);
            println!("  Final clearance: {:.2e} m", clearance);
            return;
        }
    }

    println!();
    println!("Ball still moving after {:.1} s", 1200.0 * TIMESTEP);
}
