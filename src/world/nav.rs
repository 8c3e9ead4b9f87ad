//! Navigation graph
//!
//! Sizes and centers a grid-shaped pathfinding graph over the finished map
//! and rescans it. Each grid cell edge is split into four graph nodes.

use crate::ecs::{Position, WorldPosition};
use crate::world::generation::services::PathfindingGraph;
use crate::world::grid::GridState;

/// World units covered by one grid cell
pub const CELL_WORLD_SIZE: f32 = 0.16;

/// Graph nodes along each grid cell edge
pub const NODES_PER_CELL: usize = 4;

/// World units covered by one graph node
pub const NODE_SIZE: f32 = CELL_WORLD_SIZE / NODES_PER_CELL as f32;

/// Graph layout derived from map dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavLayout {
    pub nodes_x: usize,
    pub nodes_y: usize,
    pub node_size: f32,
    pub center: WorldPosition,
}

impl NavLayout {
    /// Layout spanning cell centers `0..width-1` by `0..height-1`
    pub fn for_map(width: i32, height: i32) -> Self {
        let span_x = (width - 1).max(0);
        let span_y = (height - 1).max(0);
        // half of the world-space extent on each axis
        let radius_x = CELL_WORLD_SIZE * span_x as f32 / 2.0;
        let radius_y = CELL_WORLD_SIZE * span_y as f32 / 2.0;

        Self {
            nodes_x: span_x as usize * NODES_PER_CELL,
            nodes_y: span_y as usize * NODES_PER_CELL,
            node_size: NODE_SIZE,
            center: WorldPosition::new(radius_x, radius_y),
        }
    }
}

/// Point `graph` at the map's extent without rescanning
pub fn configure<G>(graph: &mut G, width: i32, height: i32) -> NavLayout
where
    G: PathfindingGraph + ?Sized,
{
    let layout = NavLayout::for_map(width, height);
    graph.set_dimensions(layout.nodes_x, layout.nodes_y, layout.node_size);
    graph.set_center(layout.center);
    layout
}

/// Resize, recenter and fully rescan `graph` against the frozen grid
pub fn rebuild<G: PathfindingGraph + ?Sized>(graph: &mut G, grid: &GridState) -> NavLayout {
    let layout = configure(graph, grid.width(), grid.height());
    graph.rescan(grid);
    log::info!(
        "Rebuilt nav graph: {}x{} nodes at {:.2}, centered on ({:.2}, {:.2})",
        layout.nodes_x,
        layout.nodes_y,
        layout.node_size,
        layout.center.x,
        layout.center.y
    );
    layout
}

/// Grid graph whose nodes are walkable when the cell under them is floor
#[derive(Debug, Clone, Default)]
pub struct GridGraph {
    nodes_x: usize,
    nodes_y: usize,
    node_size: f32,
    center: WorldPosition,
    walkable: Vec<bool>,
    scans: u32,
}

impl GridGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.nodes_x, self.nodes_y)
    }

    pub fn node_size(&self) -> f32 {
        self.node_size
    }

    pub fn center(&self) -> WorldPosition {
        self.center
    }

    /// How many rescans have completed
    pub fn scans(&self) -> u32 {
        self.scans
    }

    fn origin(&self) -> WorldPosition {
        WorldPosition::new(
            self.center.x - self.nodes_x as f32 * self.node_size / 2.0,
            self.center.y - self.nodes_y as f32 * self.node_size / 2.0,
        )
    }

    /// World-space center of node `(i, j)`
    pub fn node_center(&self, i: usize, j: usize) -> WorldPosition {
        let origin = self.origin();
        WorldPosition::new(
            origin.x + (i as f32 + 0.5) * self.node_size,
            origin.y + (j as f32 + 0.5) * self.node_size,
        )
    }

    /// Node containing a world point, if the point is on the graph
    pub fn node_at(&self, at: WorldPosition) -> Option<(usize, usize)> {
        if self.node_size <= 0.0 {
            return None;
        }
        let origin = self.origin();
        let fx = ((at.x - origin.x) / self.node_size).floor();
        let fy = ((at.y - origin.y) / self.node_size).floor();
        if fx < 0.0 || fy < 0.0 {
            return None;
        }
        let (i, j) = (fx as usize, fy as usize);
        (i < self.nodes_x && j < self.nodes_y).then_some((i, j))
    }

    pub fn is_walkable(&self, at: WorldPosition) -> bool {
        self.node_at(at)
            .and_then(|(i, j)| self.walkable.get(j * self.nodes_x + i).copied())
            .unwrap_or(false)
    }

    pub fn walkable_nodes(&self) -> usize {
        self.walkable.iter().filter(|w| **w).count()
    }
}

impl PathfindingGraph for GridGraph {
    fn set_dimensions(&mut self, nodes_x: usize, nodes_y: usize, node_size: f32) {
        self.nodes_x = nodes_x;
        self.nodes_y = nodes_y;
        self.node_size = node_size;
        self.walkable.clear();
    }

    fn set_center(&mut self, center: WorldPosition) {
        self.center = center;
    }

    fn rescan(&mut self, grid: &GridState) {
        let mut walkable = Vec::with_capacity(self.nodes_x * self.nodes_y);
        for j in 0..self.nodes_y {
            for i in 0..self.nodes_x {
                let cell: Position = self.node_center(i, j).to_cell();
                walkable.push(grid.is_walkable(cell));
            }
        }
        self.walkable = walkable;
        self.scans += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::tile::Tile;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_layout_formula() {
        for (w, h) in [(3, 3), (10, 10), (40, 25), (97, 13)] {
            let layout = NavLayout::for_map(w, h);
            assert_eq!(layout.nodes_x, 4 * (w as usize - 1));
            assert_eq!(layout.nodes_y, 4 * (h as usize - 1));
            assert!(approx(layout.node_size, 0.04));
            assert!(approx(layout.center.x, 0.08 * (w - 1) as f32));
            assert!(approx(layout.center.y, 0.08 * (h - 1) as f32));
        }
    }

    #[test]
    fn test_graph_spans_cell_centers() {
        let mut graph = GridGraph::new();
        configure(&mut graph, 10, 10);
        let first = graph.node_center(0, 0);
        assert!(approx(first.x, 0.02));
        assert!(approx(first.y, 0.02));
        assert_eq!(graph.node_at(WorldPosition::new(-0.01, 0.5)), None);
        assert_eq!(graph.node_at(WorldPosition::new(0.05, 0.01)), Some((1, 0)));
    }

    #[test]
    fn test_rescan_tracks_floor() {
        let mut grid = GridState::new(5, 5).unwrap();
        grid.set_tile(Position::new(2, 2), Tile::Floor).unwrap();
        grid.set_tile(Position::new(3, 2), Tile::Obstacle).unwrap();

        let mut graph = GridGraph::new();
        rebuild(&mut graph, &grid);

        assert_eq!(graph.scans(), 1);
        assert!(graph.is_walkable(Position::new(2, 2).to_world()));
        assert!(!graph.is_walkable(Position::new(3, 2).to_world()));
        assert!(!graph.is_walkable(Position::new(1, 1).to_world()));
        // a floor cell's square covers 4x4 nodes
        assert_eq!(graph.walkable_nodes(), 16);
    }
}
