#![allow(dead_code)]

mod config;
mod coords;
mod error;
mod grid;
mod loader;
mod log;
mod router;
mod search;
mod tile;

use config::RouterConfig;
use grid::Grid;
use loader::{NamedRoute, RouteLoader};
use router::Router;
use tile::{Node, TileType};

// ----------------------------------------------
// main()
// ----------------------------------------------

// Headless demo: builds a grid from config, loads a route file (or falls
// back to a small built-in cross-shaped demo net), fans each route out
// through the configured search engine, and prints a per-layer census of
// the resulting tile types. There is no renderer in this crate — this
// binary exists to exercise the router end to end.
fn main() {
    let args: Vec<String> = std::env::args().collect();
    let config_path = arg_value(&args, "--config").unwrap_or("router_config.json");
    let routes_path = arg_value(&args, "--routes");

    let config = RouterConfig::load_file(config_path);
    log::set_level(config.log_level);

    let routes = match routes_path {
        Some(path) => {
            let loaded = RouteLoader::load_file(path, &config);
            if loaded.is_empty() { demo_routes(&config) } else { loaded }
        }
        None => demo_routes(&config),
    };

    log::info!(log::channel!("main"), "Loaded {} route(s)", routes.len());

    for route in routes {
        let grid = Grid::new(&config);
        let mut router = Router::new(grid, config.clone());

        log::info!(log::channel!("main"), "Routing '{}' with {}", route.name, router.name());

        match router.fan_out_route(route.source, &route.sinks) {
            Ok(paths) => {
                log::info!(log::channel!("main"), "Committed {} path(s) for '{}'", paths.len(), route.name);
                print_tile_census(&router, &route.name);
            }
            Err(err) => {
                log::warn!(log::channel!("main"), "Route '{}' failed: {err}", route.name);
            }
        }
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter().position(|arg| arg == flag).and_then(|index| args.get(index + 1)).map(String::as_str)
}

// A small cross-shaped net on layer 0: one source fanning out to three
// sinks, used when no route file is given.
fn demo_routes(config: &RouterConfig) -> Vec<NamedRoute> {
    let mid = config.rows / 2;
    vec![NamedRoute {
        name: "demo_net".to_string(),
        source: Node::new(mid, mid, 0),
        sinks: vec![
            Node::new(0, mid, 0),
            Node::new(config.rows - 1, mid, 0),
            Node::new(mid, config.rows - 1, 0),
        ],
    }]
}

fn print_tile_census(router: &Router, route_name: &str) {
    let grid = router.grid();
    for layer in 0..grid.layer_count() {
        let mut metal = 0;
        let mut via = 0;
        let mut contact = 0;

        for node in grid.all_nodes() {
            if node.layer != layer {
                continue;
            }
            match grid.tile(node).kind {
                TileType::Metal => metal += 1,
                TileType::Via => via += 1,
                TileType::Contact => contact += 1,
            }
        }

        log::info!(
            log::channel!("main"),
            "[{route_name}] layer {layer}: metal={metal} via={via} contact={contact}"
        );
    }
}
