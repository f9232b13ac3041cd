use std::path::Path;

use serde::Deserialize;

use crate::config::RouterConfig;
use crate::log;
use crate::tile::Node;

// ----------------------------------------------
// Wire format
// ----------------------------------------------

#[derive(Deserialize)]
struct RoutesFile {
    routes: Vec<std::collections::HashMap<String, Vec<JsonPoint>>>,
}

#[derive(Deserialize)]
struct JsonPoint {
    x: i32,
    y: i32,
    z: i32,
}

impl JsonPoint {
    fn into_node(self) -> Node {
        Node::new(self.x, self.y, self.z)
    }
}

// ----------------------------------------------
// NamedRoute
// ----------------------------------------------

// One entry from the route file: a fan-out net's first point is the
// source, every remaining point is a sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedRoute {
    pub name: String,
    pub source: Node,
    pub sinks: Vec<Node>,
}

// ----------------------------------------------
// RouteLoader
// ----------------------------------------------

pub struct RouteLoader;

impl RouteLoader {
    // Parses and validates a route file. Malformed JSON, a missing file,
    // or a route with no valid points is logged and dropped rather than
    // aborting the whole load.
    pub fn load_file<P: AsRef<Path>>(path: P, config: &RouterConfig) -> Vec<NamedRoute> {
        let path = path.as_ref();

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                log::warn!(log::channel!("loader"), "Failed to read route file {path:?}: {err}");
                return Vec::new();
            }
        };

        let parsed: RoutesFile = match serde_json::from_str(&contents) {
            Ok(parsed) => parsed,
            Err(err) => {
                log::warn!(log::channel!("loader"), "Failed to parse route file {path:?}: {err}");
                return Vec::new();
            }
        };

        let mut validated = Vec::new();
        for route in parsed.routes {
            for (name, points) in route {
                match Self::validate_route(&name, points, config) {
                    Some(route) => validated.push(route),
                    None => log::warn!(log::channel!("loader"), "Route {name} is invalid, skipping"),
                }
            }
        }

        validated
    }

    fn validate_route(name: &str, points: Vec<JsonPoint>, config: &RouterConfig) -> Option<NamedRoute> {
        if points.len() < 2 {
            log::warn!(log::channel!("loader"), "Route {name} has fewer than 2 points");
            return None;
        }

        let mut nodes = Vec::with_capacity(points.len());
        for point in points {
            let node = point.into_node();
            if node.cell.row < 0 || node.cell.row >= config.rows
                || node.cell.col < 0 || node.cell.col >= config.rows
                || node.layer < 0 || node.layer >= config.layers
            {
                log::warn!(log::channel!("loader"), "Point {node} in route {name} is out of bounds");
                return None;
            }
            nodes.push(node);
        }

        let (&source, sinks) = nodes.split_first().expect("length checked above");
        Some(NamedRoute { name: name.to_string(), source, sinks: sinks.to_vec() })
    }
}
