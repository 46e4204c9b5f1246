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
//! Box of Bodies Example
//!
//! A mix of circles and polygons thrown around inside a closed box, with
//! optional air drag. Prints energy and step statistics once per simulated
//! second.
//!
//! # Running
//!
//! ```bash
//! cargo run --example box_of_bodies --release
//!
//! # More balls, no gravity, some drag
//! cargo run --example box_of_bodies --release -- --balls 40 --zero-gravity --drag 0.2
//! ```

use rigid_body_sim::{LinearDrag, RigidBody2D, StepReport, Vec2, Wall, World, WorldConfig};
use std::time::Instant;

const TIMESTEP: f64 = 1.0 / 60.0;

struct DemoConfig {
    balls: usize,
    duration: f64,
    drag: f64,
    zero_gravity: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        DemoConfig {
            balls: 12,
            duration: 10.0,
            drag: 0.0,
            zero_gravity: false,
        }
    }
}

fn parse_args() -> DemoConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = DemoConfig::default();
    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match (args[i].as_str(), value) {
            ("--balls", Some(v)) => {
                config.balls = v.parse().unwrap_or_else(|_| {
                    eprintln!("Warning: Invalid ball count '{}', using default 12", v);
                    12
                });
                i += 2;
            }
            ("--duration", Some(v)) => {
                config.duration = v.parse().unwrap_or_else(|_| {
                    eprintln!("Warning: Invalid duration '{}', using default 10.0 s", v);
                    10.0
                });
                i += 2;
            }
            ("--drag", Some(v)) => {
                config.drag = v.parse().unwrap_or_else(|_| {
                    eprintln!("Warning: Invalid drag '{}', using no drag", v);
                    0.0
                });
                i += 2;
            }
            ("--zero-gravity", _) => {
                config.zero_gravity = true;
                i += 1;
            }
            (other, _) => {
                eprintln!("Error: unknown or incomplete argument '{}'", other);
                std::process::exit(1);
            }
        }
    }
    config
}

fn build_world(config: &DemoConfig) -> Result<World, rigid_body_sim::ConfigError> {
    let walls = Wall::enclosure(Vec2::new(-6.0, 0.0), Vec2::new(6.0, 12.0))?.to_vec();

    let mut bodies = Vec::new();
    for i in 0..config.balls {
        let column = (i % 8) as f64;
        let row = (i / 8) as f64;
        let radius = 0.25 + 0.05 * (i % 3) as f64;
        bodies.push(
            RigidBody2D::circle(radius * radius * 4.0, radius)?
                .with_position(Vec2::new(-5.0 + column * 1.3, 10.5 - row * 1.2))
                .with_velocity(Vec2::new(2.0 - 0.5 * column, 1.0 - row))
                .with_restitution(0.8),
        );
    }
    bodies.push(
        RigidBody2D::rectangle(3.0, 1.6, 0.6)?
            .with_position(Vec2::new(-2.0, 3.0))
            .with_orientation(0.4)
            .with_angular_velocity(-1.0),
    );
    bodies.push(
        RigidBody2D::polygon(
            2.0,
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.3, 0.8),
                Vec2::new(0.5, 1.3),
                Vec2::new(-0.3, 0.8),
            ],
        )?
        .with_position(Vec2::new(2.5, 4.0))
        .with_velocity(Vec2::new(-1.0, 2.0)),
    );

    let mut world_config = WorldConfig::default();
    if config.zero_gravity {
        world_config = world_config.with_gravity(Vec2::zeros());
    }
    let world = World::with_config(walls, bodies, world_config)?;
    Ok(if config.drag > 0.0 {
        world.with_force_provider(LinearDrag::new(config.drag, config.drag)?)
    } else {
        world
    })
}

fn main() {
    env_logger::init();

    println!("==========================================================");
    println!("                    Box of Bodies");
    println!("==========================================================");
    println!();

    let config = parse_args();
    let mut world = match build_world(&config) {
        Ok(world) => world,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };

    println!("Configuration:");
    println!("  Bodies:       {}", world.bodies().len());
    println!("  Duration:     {:.1} s", config.duration);
    println!("  Drag:         {:.2}", config.drag);
    println!("  Gravity:      {}", if config.zero_gravity { "off" } else { "on" });
    println!();

    let frames = (config.duration / TIMESTEP).round() as usize;
    let frames_per_report = (1.0 / TIMESTEP).round() as usize;
    let mut totals = StepReport::default();
    let start = Instant::now();

    for frame in 1..=frames {
        let report = match world.simulate(TIMESTEP) {
            Ok(report) => report,
            Err(err) => {
                eprintln!("Simulation failed at frame {}: {}", frame, err);
                std::process::exit(1);
            }
        };
        totals.sub_steps += report.sub_steps;
        totals.bisections += report.bisections;
        totals.collisions_resolved += report.collisions_resolved;
        totals.positional_corrections += report.positional_corrections;
        totals.resting_contacts += report.resting_contacts;
        totals.time_advanced += report.time_advanced;

        if frame % frames_per_report == 0 {
            println!(
                "  t={:>5.1} s  KE={:>9.4} J  deepest={:>10.3e} m  sub-steps={:>6}  impulses={:>5}",
                totals.time_advanced,
                world.total_kinetic_energy(),
                world.max_penetration(),
                totals.sub_steps,
                totals.collisions_resolved
            );
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("Summary:");
    println!("  Simulated:              {:.2} s", totals.time_advanced);
    println!("  Wall clock:             {:.2?}", elapsed);
    println!("  Bisections:             {}", totals.bisections);
    println!("  Positional corrections: {}", totals.positional_corrections);
    println!("  Resting contacts held:  {}", totals.resting_contacts);
}
