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
//! Scene File Example
//!
//! Loads a world from a JSON scene description and renders it as text after
//! a few seconds of simulation, using a small [`Renderer2D`] implementation.
//!
//! # Running
//!
//! ```bash
//! cargo run --example scene_file
//! cargo run --example scene_file -- path/to/scene.json
//! ```

use rigid_body_sim::{Renderer2D, SceneDescription, Vec2};
use std::fs::File;
use std::io::BufReader;

const DEFAULT_SCENE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/scenes/pachinko.json");
const TIMESTEP: f64 = 1.0 / 60.0;

/// Prints one line per draw call
struct TextRenderer {
    calls: usize,
}

impl Renderer2D for TextRenderer {
    fn draw_wall(&mut self, anchor: Vec2, normal: Vec2) {
        self.calls += 1;
        println!(
            "  wall    through ({:>6.2}, {:>6.2}) facing ({:>5.2}, {:>5.2})",
            anchor.x, anchor.y, normal.x, normal.y
        );
    }

    fn draw_circle(&mut self, centre: Vec2, radius: f64, orientation: f64, wireframe: bool) {
        self.calls += 1;
        println!(
            "  circle  at ({:>6.2}, {:>6.2}) r={:.2} angle={:>6.2}{}",
            centre.x,
            centre.y,
            radius,
            orientation,
            if wireframe { " [wire]" } else { "" }
        );
    }

    fn draw_polygon(&mut self, vertices: &[Vec2], wireframe: bool) {
        self.calls += 1;
        let points: Vec<String> = vertices
            .iter()
            .map(|v| format!("({:.2}, {:.2})", v.x, v.y))
            .collect();
        println!(
            "  polygon {}{}",
            points.join(" "),
            if wireframe { " [wire]" } else { "" }
        );
    }
}

fn main() {
    env_logger::init();

    println!("==========================================================");
    println!("                   Scene File Loader");
    println!("==========================================================");
    println!();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SCENE.to_string());
    let scene = match File::open(&path).map_err(|err| err.to_string()).and_then(|file| {
        SceneDescription::from_reader(BufReader::new(file)).map_err(|err| err.to_string())
    }) {
        Ok(scene) => scene,
        Err(err) => {
            eprintln!("Error: could not load '{}': {}", path, err);
            std::process::exit(1);
        }
    };
    let mut world = match scene.build_world() {
        Ok(world) => world,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };

    println!("Loaded '{}' (format {})", path, scene.format_version);
    println!("  Walls:  {}", world.walls().len());
    println!("  Bodies: {}", world.bodies().len());
    println!();

    for frame in 1..=180 {
        if let Err(err) = world.simulate(TIMESTEP) {
            eprintln!("Simulation failed at frame {}: {}", frame, err);
            std::process::exit(1);
        }
    }

    // Hand the frame to the renderer the way a render thread would
    let snapshot = world.snapshot();
    let mut renderer = TextRenderer { calls: 0 };
    println!("Frame after {:.1} s:", 180.0 * TIMESTEP);
    snapshot.render(&mut renderer, false);
    println!();
    println!("{} draw calls", renderer.calls);
}
