use crate::config::RouterConfig;
use crate::error::{RouteError, RouteResult};
use crate::grid::Grid;
use crate::log;
use crate::search::{Engine, Path};
use crate::tile::{Node, TileState, TileType};

// ----------------------------------------------
// Router
// ----------------------------------------------

// Fan-out orchestrator: owns the grid and drives one search engine over it
// to connect a single source to N sinks. The engine itself knows nothing
// about fan-out — it only answers single source/sink queries.
pub struct Router {
    grid: Grid,
    engine: Engine,
    config: RouterConfig,
}

impl Router {
    pub fn new(grid: Grid, config: RouterConfig) -> Self {
        let engine = Engine::new(&config);
        Self { grid, engine, config }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn is_weighted(&self) -> bool {
        self.engine.is_weighted()
    }

    pub fn enable_graphics_updates(&mut self) {
        self.engine.enable_graphics_updates();
    }

    pub fn disable_graphics_updates(&mut self) {
        self.engine.disable_graphics_updates();
    }

    fn is_valid_endpoint(&self, node: Node) -> bool {
        self.grid.is_node_within_bounds(node) && !self.grid.tile(node).is_barrier()
    }

    // Connects `source` to every tile in `sinks` with a single committed
    // net. Invalid or unreachable sinks are skipped and logged rather
    // than aborting the whole fan-out; only EmptyInput (nothing left to
    // route) and InvalidEndpoint (bad source) are returned as Err.
    pub fn fan_out_route(&mut self, source: Node, sinks: &[Node]) -> RouteResult<Vec<Path>> {
        if sinks.is_empty() {
            log::warn!(log::channel!("router"), "fan_out_route called with no sinks");
            return Err(RouteError::EmptyInput);
        }

        if !self.is_valid_endpoint(source) {
            log::warn!(log::channel!("router"), "source {source} is out of bounds or a barrier");
            return Err(RouteError::InvalidEndpoint);
        }

        let valid_sinks: Vec<Node> = sinks
            .iter()
            .copied()
            .filter(|&sink| {
                let ok = self.is_valid_endpoint(sink);
                if !ok {
                    log::warn!(log::channel!("router"), "skipping invalid sink {sink}");
                }
                ok
            })
            .collect();

        if valid_sinks.is_empty() {
            log::warn!(log::channel!("router"), "no valid sinks remain after filtering");
            return Err(RouteError::EmptyInput);
        }

        // Step 0: neighbor lists must be current before any search runs.
        self.grid.update_all_neighbors();

        if self.grid.tile(source).state != TileState::Start {
            self.grid.tile_mut(source).state = TileState::Start;
        }
        for &sink in &valid_sinks {
            if self.grid.tile(sink).state != TileState::End {
                self.grid.tile_mut(sink).state = TileState::End;
            }
        }

        // Step 1: seed path is the cheapest direct route to any sink.
        let mut candidates: Vec<(Node, Path)> = Vec::new();
        for &sink in &valid_sinks {
            match self.engine.route(&mut self.grid, source, sink).into_path() {
                Some(path) => candidates.push((sink, path)),
                None => log::warn!(log::channel!("router"), "no path from {source} to {sink}"),
            }
        }

        let Some((seed_index, seed_path)) = self.best_candidate(&candidates) else {
            log::warn!(log::channel!("router"), "no sink reachable from {source}");
            return Err(RouteError::NoPath);
        };
        let seed_sink = candidates[seed_index].0;

        let mut committed_paths: Vec<Path> = vec![seed_path.clone()];
        let mut fan_out_set: Vec<Node> = seed_path;
        let mut routed_sinks: Vec<Node> = vec![seed_sink];

        // Step 2: grow the fan-out, one remaining sink at a time. Each
        // sink is connected from the cheapest tile currently anywhere in
        // the growing net, not necessarily from the original source. Each
        // chosen branch is committed to barriers immediately and the
        // grid's neighbor lists are refreshed before the next sink is
        // routed, so later branches cannot cross already-committed metal.
        for &sink in &valid_sinks {
            if sink == seed_sink {
                continue;
            }

            let mut growth_candidates: Vec<(Node, Path)> = Vec::new();
            for &branch_point in &fan_out_set {
                if let Some(path) = self.engine.route(&mut self.grid, branch_point, sink).into_path() {
                    growth_candidates.push((branch_point, path));
                }
            }

            let Some((best_index, best_path)) = self.best_candidate(&growth_candidates) else {
                log::warn!(log::channel!("router"), "no path from the growing net to {sink}");
                continue;
            };

            let branch_point = growth_candidates[best_index].0;
            self.grid.tile_mut(branch_point).kind = TileType::Contact;
            self.build_path_tiles(&best_path);
            self.grid.update_all_neighbors();

            fan_out_set.extend(best_path.iter().copied());
            committed_paths.push(best_path);
            routed_sinks.push(sink);
        }

        // Step 3: every terminal's physical pin lands on the top nominal
        // layer, one layer above where its own metal is capped. Uses
        // `config.layers - 1`, the nominal top, not the padded
        // `grid.layer_count() - 1`.
        let top = self.config.layers - 1;
        self.mark_top_layer_contact(source, top);
        for &sink in &routed_sinks {
            self.mark_top_layer_contact(sink, top);
        }

        // Step 4: finalize geometry. The seed path is committed here for
        // the first time; every growth branch was already committed as
        // it was selected above, so re-committing it here is a no-op.
        for path in &committed_paths {
            self.build_path_tiles(path);
        }

        Ok(committed_paths)
    }

    fn mark_top_layer_contact(&mut self, terminal: Node, top: i32) {
        let top_node = Node::new(terminal.cell.row, terminal.cell.col, top);
        let under_node = Node::new(terminal.cell.row, terminal.cell.col, top - 1);

        if self.grid.is_node_within_bounds(top_node) {
            self.grid.tile_mut(top_node).kind = TileType::Contact;
        }
        if top - 1 >= 0 && self.grid.is_node_within_bounds(under_node) {
            self.grid.tile_mut(under_node).kind = TileType::Metal;
        }
    }

    // Picks the lowest-cost candidate, first index wins on a tie.
    fn best_candidate(&self, candidates: &[(Node, Path)]) -> Option<(usize, Path)> {
        candidates
            .iter()
            .enumerate()
            .min_by_key(|(_, (_, path))| self.engine.path_cost(path))
            .map(|(index, (_, path))| (index, path.clone()))
    }

    // Promotes a committed path's tiles in place: endpoints that are
    // still bare metal become contacts, every layer-change pair
    // becomes a via on both sides of the boundary, and every tile on the
    // path becomes an impassable barrier so later searches route around
    // it instead of through it.
    fn build_path_tiles(&mut self, path: &[Node]) {
        let Some((&first, rest)) = path.split_first() else {
            return;
        };
        let &last = rest.last().unwrap_or(&first);

        if self.grid.tile(first).kind == TileType::Metal {
            self.grid.tile_mut(first).kind = TileType::Contact;
        }
        if self.grid.tile(last).kind == TileType::Metal {
            self.grid.tile_mut(last).kind = TileType::Contact;
        }

        for i in 0..path.len() {
            if i > 0 && path[i].layer != path[i - 1].layer {
                self.grid.tile_mut(path[i]).kind = TileType::Via;
                self.grid.tile_mut(path[i - 1]).kind = TileType::Via;
            }
            self.grid.tile_mut(path[i]).state = TileState::Barrier;
        }
    }
}
