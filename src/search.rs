use std::cmp::Reverse;
use std::collections::VecDeque;

use priority_queue::PriorityQueue;
use strum_macros::Display;

use crate::config::{EngineKind, RouterConfig};
use crate::grid::Grid;
use crate::tile::{Node, TileState};

// Useful references and reading material:
//  https://www.redblobgames.com/pathfinding/a-star/introduction.html
//  https://www.redblobgames.com/pathfinding/a-star/implementation.html

pub type NodeCost = i64;
const NODE_COST_ZERO: NodeCost = 0;
const NODE_COST_INFINITE: NodeCost = NodeCost::MAX;

pub type Path = Vec<Node>;

#[derive(Debug, PartialEq, Eq)]
pub enum SearchResult {
    PathFound(Path),
    PathNotFound,
}

impl SearchResult {
    pub fn into_path(self) -> Option<Path> {
        match self {
            Self::PathFound(path) => Some(path),
            Self::PathNotFound => None,
        }
    }
}

// ----------------------------------------------
// Heuristic
// ----------------------------------------------

// A* uses the Manhattan-plus-via-penalty heuristic, Dijkstra is A* with
// h == 0, BFS ignores weights entirely and is handled by a dedicated code
// path since it has no notion of edge cost.
pub trait Heuristic {
    fn estimate_cost_to_goal(&self, node: Node, goal: Node) -> NodeCost;
    fn movement_cost(&self, from: Node, to: Node) -> NodeCost;
}

pub struct AStarHeuristic {
    pub via_cost: NodeCost,
    pub astar_via_weight: NodeCost,
}

impl Heuristic for AStarHeuristic {
    #[inline]
    fn estimate_cost_to_goal(&self, node: Node, goal: Node) -> NodeCost {
        let d = node.cell.manhattan_distance(goal.cell) as NodeCost;
        d + self.astar_via_weight * (node.layer - goal.layer).unsigned_abs() as NodeCost
    }

    #[inline]
    fn movement_cost(&self, from: Node, to: Node) -> NodeCost {
        if from.layer != to.layer { self.via_cost } else { 1 }
    }
}

pub struct DijkstraHeuristic {
    pub via_cost: NodeCost,
}

impl Heuristic for DijkstraHeuristic {
    #[inline]
    fn estimate_cost_to_goal(&self, _node: Node, _goal: Node) -> NodeCost {
        NODE_COST_ZERO // Estimating 0 turns A* into Dijkstra's.
    }

    #[inline]
    fn movement_cost(&self, from: Node, to: Node) -> NodeCost {
        if from.layer != to.layer { self.via_cost } else { 1 }
    }
}

// ----------------------------------------------
// Engine
// ----------------------------------------------

// Tagged variant dispatched by the orchestrator rather than a deep
// inheritance tree.
pub struct Engine {
    kind: EngineKind,
    via_cost: NodeCost,
    astar_via_weight: NodeCost,
    emit_progress: bool,
}

impl Engine {
    pub fn new(config: &RouterConfig) -> Self {
        Self {
            kind: config.engine,
            via_cost: config.via_cost as NodeCost,
            astar_via_weight: config.astar_via_weight as NodeCost,
            emit_progress: false,
        }
    }

    pub fn enable_graphics_updates(&mut self) {
        self.emit_progress = true;
    }

    pub fn disable_graphics_updates(&mut self) {
        self.emit_progress = false;
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            EngineKind::AStar => "A* Router",
            EngineKind::Dijkstra => "Dijkstra Router",
            EngineKind::Bfs => "Maze Router",
        }
    }

    #[inline]
    pub fn is_weighted(&self) -> bool {
        !matches!(self.kind, EngineKind::Bfs)
    }

    // Cost of a path under this engine's metric: via_cost per layer
    // change for weighted engines, plain length for BFS.
    pub fn path_cost(&self, path: &[Node]) -> NodeCost {
        if !self.is_weighted() {
            return path.len() as NodeCost;
        }
        let mut total = NODE_COST_ZERO;
        for window in path.windows(2) {
            total += if window[0].layer != window[1].layer { self.via_cost } else { 1 };
        }
        total
    }

    // Single-source/single-sink shortest path. Returns PathNotFound if
    // source/sink are invalid, or the frontier empties before reaching
    // the sink. The source may itself already be a committed barrier
    // tile — a fan-out branch point grows off already-committed net
    // geometry, it doesn't route through it — only the sink and
    // mid-path traversal respect barrier state.
    pub fn route(&self, grid: &mut Grid, source: Node, sink: Node) -> SearchResult {
        if !grid.is_node_within_bounds(source) || !grid.is_node_within_bounds(sink) {
            return SearchResult::PathNotFound;
        }
        if grid.tile(sink).is_barrier() {
            return SearchResult::PathNotFound;
        }

        let result = match self.kind {
            EngineKind::AStar => {
                let heuristic = AStarHeuristic { via_cost: self.via_cost, astar_via_weight: self.astar_via_weight };
                self.weighted_search(grid, &heuristic, source, sink)
            }
            EngineKind::Dijkstra => {
                let heuristic = DijkstraHeuristic { via_cost: self.via_cost };
                self.weighted_search(grid, &heuristic, source, sink)
            }
            EngineKind::Bfs => self.bfs_search(grid, source, sink),
        };

        grid.idlize_tiles();
        result
    }

    fn weighted_search(&self, grid: &mut Grid, heuristic: &impl Heuristic, source: Node, sink: Node) -> SearchResult {
        let capacity = grid.capacity();
        let mut came_from: Vec<Option<Node>> = vec![None; capacity];
        let mut cost_so_far: Vec<NodeCost> = vec![NODE_COST_INFINITE; capacity];

        // PriorityQueue pops the highest priority first; we want the
        // smallest cost first, so store the cost reversed.
        let mut frontier: PriorityQueue<Node, Reverse<NodeCost>> = PriorityQueue::new();

        let source_index = grid.index_of(source).unwrap();
        cost_so_far[source_index] = NODE_COST_ZERO;
        frontier.push(source, Reverse(NODE_COST_ZERO));

        if grid.tile(source).state != TileState::Start {
            grid.tile_mut(source).state = TileState::Start;
        }

        while let Some((current, _)) = frontier.pop() {
            if current == sink {
                return Self::reconstruct_path(&came_from, grid, source, sink);
            }

            let neighbors = grid.tile(current).neighbors.clone();
            let current_index = grid.index_of(current).unwrap();
            let current_cost = cost_so_far[current_index];

            for neighbor in neighbors {
                let new_cost = current_cost + heuristic.movement_cost(current, neighbor);
                let neighbor_index = grid.index_of(neighbor).unwrap();

                if new_cost < cost_so_far[neighbor_index] {
                    cost_so_far[neighbor_index] = new_cost;
                    came_from[neighbor_index] = Some(current);

                    let priority = new_cost + heuristic.estimate_cost_to_goal(neighbor, sink);
                    frontier.push(neighbor, Reverse(priority));

                    if neighbor != sink && grid.tile(neighbor).state == TileState::Idle {
                        grid.tile_mut(neighbor).state = TileState::Open;
                    }
                }
            }

            if current != source && grid.tile(current).state == TileState::Open {
                grid.tile_mut(current).state = TileState::Closed;
            }

            if self.emit_progress {
                emit_progress(current);
            }
        }

        SearchResult::PathNotFound
    }

    fn bfs_search(&self, grid: &mut Grid, source: Node, sink: Node) -> SearchResult {
        let capacity = grid.capacity();
        let mut came_from: Vec<Option<Node>> = vec![None; capacity];
        let mut visited: Vec<bool> = vec![false; capacity];

        let mut queue: VecDeque<Node> = VecDeque::new();
        queue.push_back(source);
        visited[grid.index_of(source).unwrap()] = true;

        if grid.tile(source).state != TileState::Start {
            grid.tile_mut(source).state = TileState::Start;
        }

        while let Some(current) = queue.pop_front() {
            if current == sink {
                return Self::reconstruct_path(&came_from, grid, source, sink);
            }

            let neighbors = grid.tile(current).neighbors.clone();
            for neighbor in neighbors {
                let neighbor_index = grid.index_of(neighbor).unwrap();
                if !visited[neighbor_index] {
                    visited[neighbor_index] = true;
                    came_from[neighbor_index] = Some(current);
                    queue.push_back(neighbor);

                    if neighbor != sink && grid.tile(neighbor).state == TileState::Idle {
                        grid.tile_mut(neighbor).state = TileState::Open;
                    }
                }
            }

            if current != source && grid.tile(current).state == TileState::Open {
                grid.tile_mut(current).state = TileState::Closed;
            }

            if self.emit_progress {
                emit_progress(current);
            }
        }

        SearchResult::PathNotFound
    }

    fn reconstruct_path(came_from: &[Option<Node>], grid: &Grid, source: Node, sink: Node) -> SearchResult {
        let mut path = vec![sink];
        let mut current = sink;

        while current != source {
            let index = grid.index_of(current).unwrap();
            match came_from[index] {
                Some(previous) => {
                    current = previous;
                    path.push(current);
                }
                None => return SearchResult::PathNotFound,
            }
        }

        path.reverse();
        SearchResult::PathFound(path)
    }
}

#[derive(Debug, Display)]
pub enum EngineError {
    InvalidEndpoint,
}

// The progress hook is pure presentation: it must never mutate tile state.
// This crate has no renderer, so the default is a no-op; a caller wiring
// up a real front end would replace this function pointer with one that
// repaints and flips a display buffer.
fn emit_progress(_current: Node) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouterConfig;

    fn engine(kind: EngineKind) -> Engine {
        let config = RouterConfig { engine: kind, ..RouterConfig::default() };
        Engine::new(&config)
    }

    fn prepared_grid(rows: i32, layers: i32) -> Grid {
        let config = RouterConfig { rows, layers, ..RouterConfig::default() };
        let mut grid = Grid::new(&config);
        grid.update_all_neighbors();
        grid
    }

    #[test]
    fn astar_finds_straight_horizontal_path() {
        let mut grid = prepared_grid(10, 2);
        let source = Node::new(0, 0, 0);
        let sink = Node::new(0, 5, 0);

        let engine = engine(EngineKind::AStar);
        let path = engine.route(&mut grid, source, sink).into_path().expect("path");

        assert_eq!(path.len(), 6);
        assert_eq!(engine.path_cost(&path), 5);
        assert!(path.iter().all(|n| n.layer == 0));
    }

    #[test]
    fn astar_routes_via_layer_change_when_same_layer_path_impossible() {
        // Layer 0 is horizontal, so (0,0,0) -> (5,0,0) requires a detour
        // via the vertical layer 1.
        let mut grid = prepared_grid(10, 2);
        let config = RouterConfig::default();
        let source = Node::new(0, 0, 0);
        let sink = Node::new(5, 0, 0);

        let engine = engine(EngineKind::AStar);
        let path = engine.route(&mut grid, source, sink).into_path().expect("path");

        assert_eq!(path.first().copied(), Some(source));
        assert_eq!(path.last().copied(), Some(sink));
        assert_eq!(engine.path_cost(&path), 2 * config.via_cost as NodeCost + 5);
    }

    #[test]
    fn astar_and_dijkstra_agree_on_cost_when_heuristic_is_admissible() {
        let mut grid_a = prepared_grid(10, 2);
        let mut grid_d = prepared_grid(10, 2);
        let source = Node::new(0, 0, 0);
        let sink = Node::new(7, 0, 0);

        let astar = engine(EngineKind::AStar);
        let dijkstra = engine(EngineKind::Dijkstra);

        let path_a = astar.route(&mut grid_a, source, sink).into_path().expect("path");
        let path_d = dijkstra.route(&mut grid_d, source, sink).into_path().expect("path");

        assert_eq!(astar.path_cost(&path_a), dijkstra.path_cost(&path_d));
    }

    #[test]
    fn bfs_finds_a_path_ignoring_via_cost() {
        let mut grid = prepared_grid(10, 2);
        let source = Node::new(0, 0, 0);
        let sink = Node::new(0, 5, 0);

        let engine = engine(EngineKind::Bfs);
        let path = engine.route(&mut grid, source, sink).into_path().expect("path");
        assert_eq!(engine.path_cost(&path), path.len() as NodeCost);
    }

    #[test]
    fn route_around_a_barrier_wall_never_crosses_it() {
        // Barrier wall at every (r, 3, 0).
        let mut grid = prepared_grid(10, 2);
        for row in 0..10 {
            grid.tile_mut(Node::new(row, 3, 0)).state = TileState::Barrier;
        }
        grid.update_all_neighbors();

        let source = Node::new(0, 0, 0);
        let sink = Node::new(0, 9, 0);
        let engine = engine(EngineKind::AStar);
        let path = engine.route(&mut grid, source, sink).into_path().expect("path");

        assert!(!path.iter().any(|n| n.layer == 0 && n.cell.col == 3));
    }

    #[test]
    fn disconnected_sink_returns_no_path() {
        // Sink surrounded by barriers on all sides.
        let mut grid = prepared_grid(10, 1);
        let sink = Node::new(5, 5, 0);
        for (dr, dc) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            grid.tile_mut(Node::new(5 + dr, 5 + dc, 0)).state = TileState::Barrier;
        }
        grid.update_all_neighbors();

        let engine = engine(EngineKind::AStar);
        let source = Node::new(0, 0, 0);
        let result = engine.route(&mut grid, source, sink);
        assert_eq!(result, SearchResult::PathNotFound);
    }

    #[test]
    fn every_returned_path_has_no_repeated_tile_and_valid_neighbor_chain() {
        let mut grid = prepared_grid(10, 2);
        let source = Node::new(0, 0, 0);
        let sink = Node::new(9, 0, 0);
        let engine = engine(EngineKind::AStar);
        let path = engine.route(&mut grid, source, sink).into_path().expect("path");

        let mut seen = std::collections::HashSet::new();
        for node in &path {
            assert!(seen.insert(*node), "tile repeated in path: {node}");
        }

        grid.update_all_neighbors();
        for window in path.windows(2) {
            assert!(
                grid.tile(window[0]).neighbors.contains(&window[1]),
                "{} and {} are not neighbors",
                window[0],
                window[1]
            );
        }
    }
}
