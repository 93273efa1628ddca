use crate::Vec2;
use serde::{Deserialize, Serialize};

/// One ground tile: a rotated rectangle placed in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilePlacement {
    /// Position of the tile's local origin in world space.
    pub position: Vec2,
    /// Rotation already applied to `vertices`, in radians.
    pub angle: f64,
    /// Rotated corners in body-local coordinates, in convex-hull order
    /// (counter-clockwise, starting at the right-most corner).
    pub vertices: [Vec2; 4],
    /// Index into `vertices` of the corner the next tile is attached to.
    pub seam_vertex: usize,
}

impl TilePlacement {
    /// Maps a tile-local point into world space.
    #[must_use]
    pub fn world_point(&self, local: Vec2) -> Vec2 {
        self.position + local
    }

    #[must_use]
    pub fn world_vertices(&self) -> [Vec2; 4] {
        self.vertices.map(|v| self.world_point(v))
    }

    /// World-space corner the following tile starts from.
    #[must_use]
    pub fn seam_point(&self) -> Vec2 {
        self.world_point(self.vertices[self.seam_vertex])
    }
}

/// The full ground, ordered left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainStrip {
    pub seed: u64,
    pub tiles: Vec<TilePlacement>,
}

impl TerrainStrip {
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// World x of the furthest seam, i.e. where the ground ends.
    #[must_use]
    pub fn end_x(&self) -> Option<f64> {
        self.tiles.last().map(|t| t.seam_point().x)
    }
}
