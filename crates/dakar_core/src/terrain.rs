//! Seam-continuous procedural ground.
//!
//! Tiles are thin rectangles rotated by a random angle whose envelope grows
//! linearly along the strip, so the track starts flat and gets steeper.
//! Each tile starts at a corner of the previous one.

use crate::config::TerrainConfig;
use crate::error::Result;
use crate::physics::PhysicsWorld;
use dakar_data::{
    BodyDef, BodyHandle, BodyKind, CollisionFilter, FixtureDef, Shape, TerrainStrip,
    TilePlacement, Vec2,
};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Builds ground strips from a seed.
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    config: TerrainConfig,
}

impl TerrainGenerator {
    #[must_use]
    pub fn new(config: TerrainConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Generates `tile_count` tiles from `seed`. Pure: the same inputs always
    /// produce the same placements.
    #[must_use]
    pub fn generate(&self, seed: u64, tile_count: usize) -> TerrainStrip {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut tiles = Vec::with_capacity(tile_count);
        let mut position = self.config.start_position;

        for k in 0..tile_count {
            let angle = self.tile_angle(rng.gen::<f64>(), k, tile_count);
            let tile = self.place_tile(position, angle);
            position = tile.seam_point();
            tiles.push(tile);
        }

        tracing::debug!(seed, tiles = tiles.len(), "Terrain generated");
        TerrainStrip { seed, tiles }
    }

    /// Rotation of tile `k`; the reachable range scales with `k / tile_count`.
    fn tile_angle(&self, draw: f64, k: usize, tile_count: usize) -> f64 {
        let spread = self.config.angle_spread;
        (draw * spread - spread * 0.5) * self.config.max_angle_factor * k as f64
            / tile_count as f64
    }

    fn place_tile(&self, position: Vec2, angle: f64) -> TilePlacement {
        let (w, h) = (self.config.tile_width, self.config.tile_height);
        let corners = [
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, h),
            Vec2::new(w, h),
            Vec2::new(w, 0.0),
        ]
        .map(|c| c.rotated(angle));
        let vertices = hull_order(corners);

        // Slot 3 is the local origin for angles in [0, pi/2]; slot 0 then
        // holds the far-bottom corner. Past a quarter turn slot 3 is a top
        // corner.
        let seam_vertex = if vertices[3] == Vec2::ZERO { 0 } else { 3 };

        TilePlacement {
            position,
            angle,
            vertices,
            seam_vertex,
        }
    }
}

/// Registers every tile as a static body. Returns the handles in strip order.
pub fn register_terrain<W: PhysicsWorld + ?Sized>(
    world: &mut W,
    strip: &TerrainStrip,
    friction: f64,
) -> Result<Vec<BodyHandle>> {
    strip
        .tiles
        .iter()
        .map(|tile| {
            world.create_body(&BodyDef {
                kind: BodyKind::Static,
                position: tile.position,
                angle: 0.0,
                fixtures: vec![FixtureDef {
                    shape: Shape::Polygon {
                        vertices: tile.vertices.to_vec(),
                    },
                    density: 0.0,
                    friction,
                    restitution: 0.0,
                    filter: CollisionFilter::default(),
                }],
            })
        })
        .collect()
}

/// Orders a quadrilateral the way the engine stores convex polygons:
/// gift wrapping from the right-most point (lowest on ties), counter-clockwise.
fn hull_order(points: [Vec2; 4]) -> [Vec2; 4] {
    let n = points.len();
    let mut i0 = 0;
    for i in 1..n {
        let (x, x0) = (points[i].x, points[i0].x);
        if x > x0 || (x == x0 && points[i].y < points[i0].y) {
            i0 = i;
        }
    }

    let mut hull = [i0; 4];
    let mut m = 0;
    let mut ih = i0;
    loop {
        hull[m] = ih;
        let mut ie = 0;
        for j in 1..n {
            if ie == ih {
                ie = j;
                continue;
            }
            let r = points[ie] - points[hull[m]];
            let v = points[j] - points[hull[m]];
            let c = r.cross(v);
            if c < 0.0 || (c == 0.0 && v.length_squared() > r.length_squared()) {
                ie = j;
            }
        }
        m += 1;
        ih = ie;
        if ie == i0 || m == n {
            break;
        }
    }

    hull.map(|i| points[i])
}
