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
//! Read-only views of the world for drawing

use super::World;
use crate::geometry::{Shape, Vec2, Wall, WorldShape};

/// Drawing backend driven by [`World::render`]
///
/// Calls arrive walls first, then bodies, both in index order.
pub trait Renderer2D {
    /// Draw the boundary line of a wall; `normal` points into free space
    fn draw_wall(&mut self, anchor: Vec2, normal: Vec2);

    /// Draw a disc; `orientation` lets the backend mark rotation
    fn draw_circle(&mut self, centre: Vec2, radius: f64, orientation: f64, wireframe: bool);

    /// Draw a polygon from world-space vertices in counter-clockwise order
    fn draw_polygon(&mut self, vertices: &[Vec2], wireframe: bool);
}

/// Pose and shape of one body at snapshot time
#[derive(Debug, Clone, PartialEq)]
pub struct BodySnapshot {
    /// Shape in body coordinates
    pub shape: Shape,
    /// Centre of mass position
    pub position: Vec2,
    /// Orientation in radians
    pub orientation: f64,
}

/// Owned copy of everything needed to draw a frame
///
/// Taken between [`World::simulate`] calls, it can be sent to a render
/// thread while the world keeps stepping.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSnapshot {
    /// Walls in index order
    pub walls: Vec<Wall>,
    /// Bodies in index order
    pub bodies: Vec<BodySnapshot>,
}

impl WorldSnapshot {
    /// Replay the snapshot into a renderer
    pub fn render<R: Renderer2D>(&self, renderer: &mut R, wireframe: bool) {
        for wall in &self.walls {
            renderer.draw_wall(wall.anchor(), wall.normal());
        }
        for body in &self.bodies {
            draw_shape(
                renderer,
                &body.shape.to_world(&body.position, body.orientation),
                body.orientation,
                wireframe,
            );
        }
    }
}

impl World {
    /// Issue draw calls for every wall and body at its committed pose
    pub fn render<R: Renderer2D>(&self, renderer: &mut R, wireframe: bool) {
        for wall in &self.walls {
            renderer.draw_wall(wall.anchor(), wall.normal());
        }
        for body in &self.bodies {
            draw_shape(renderer, &body.world_shape(), body.orientation(), wireframe);
        }
    }

    /// Copy the current poses and shapes out of the world
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            walls: self.walls.clone(),
            bodies: self
                .bodies
                .iter()
                .map(|body| BodySnapshot {
                    shape: body.shape().clone(),
                    position: body.position(),
                    orientation: body.orientation(),
                })
                .collect(),
        }
    }
}

fn draw_shape<R: Renderer2D>(renderer: &mut R, shape: &WorldShape, orientation: f64, wireframe: bool) {
    match shape {
        WorldShape::Circle { centre, radius } => {
            renderer.draw_circle(*centre, *radius, orientation, wireframe)
        }
        WorldShape::Polygon { vertices } => renderer.draw_polygon(vertices, wireframe),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::RigidBody2D;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Renderer2D for Recorder {
        fn draw_wall(&mut self, anchor: Vec2, normal: Vec2) {
            self.calls
                .push(format!("wall {} {} {} {}", anchor.x, anchor.y, normal.x, normal.y));
        }

        fn draw_circle(&mut self, centre: Vec2, radius: f64, _orientation: f64, wireframe: bool) {
            self.calls
                .push(format!("circle {} {} {} {}", centre.x, centre.y, radius, wireframe));
        }

        fn draw_polygon(&mut self, vertices: &[Vec2], wireframe: bool) {
            self.calls
                .push(format!("polygon {} {}", vertices.len(), wireframe));
        }
    }

    fn sample_world() -> World {
        let ball = RigidBody2D::circle(1.0, 0.5)
            .unwrap()
            .with_position(Vec2::new(1.0, 2.0));
        let crate_box = RigidBody2D::rectangle(2.0, 1.0, 1.0)
            .unwrap()
            .with_position(Vec2::new(-1.0, 2.0));
        World::new(vec![Wall::floor(0.0)], vec![ball, crate_box]).unwrap()
    }

    #[test]
    fn test_render_order() {
        let world = sample_world();
        let mut recorder = Recorder::default();
        world.render(&mut recorder, true);

        assert_eq!(
            recorder.calls,
            vec!["wall 0 0 0 1", "circle 1 2 0.5 true", "polygon 4 true"]
        );
    }

    #[test]
    fn test_snapshot_renders_like_world() {
        let mut world = sample_world();
        world.simulate(1.0 / 60.0).unwrap();
        let snapshot = world.snapshot();

        let mut direct = Recorder::default();
        let mut replayed = Recorder::default();
        world.render(&mut direct, false);
        snapshot.render(&mut replayed, false);
        assert_eq!(direct.calls, replayed.calls);
    }

    #[test]
    fn test_snapshot_is_send() {
        fn assert_send<T: Send + 'static>(_: &T) {}
        assert_send(&sample_world().snapshot());
    }
}
