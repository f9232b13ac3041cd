use std::path::Path;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::log;

// ----------------------------------------------
// EngineKind
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum EngineKind {
    AStar,
    Dijkstra,
    Bfs,
}

impl Default for EngineKind {
    fn default() -> Self {
        EngineKind::AStar
    }
}

// ----------------------------------------------
// RouterConfig
// ----------------------------------------------

// Explicit configuration value, constructed once by the caller (CLI binary
// or a test) and passed into Grid::new / Router::new. Never a process-wide
// static.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub rows: i32,
    pub layers: i32,
    pub via_cost: i32,
    // A* heuristic's per-layer weight. Defaults to `via_cost` so the
    // heuristic stays admissible (heuristic per-step cost <= true edge
    // cost).
    pub astar_via_weight: i32,
    pub engine: EngineKind,
    pub log_level: log::Level,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            rows: 10,
            layers: 2,
            via_cost: 2,
            astar_via_weight: 2,
            engine: EngineKind::AStar,
            log_level: log::Level::Info,
        }
    }
}

impl RouterConfig {
    // Either succeeds loading the config file or returns a default config.
    // A missing or malformed file is a recoverable error: it is logged and
    // the default is returned rather than propagated.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                log::warn!(log::channel!("config"), "Failed to read config file {path:?}: {err}. Using defaults.");
                return Self::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                log::warn!(log::channel!("config"), "Failed to parse config file {path:?}: {err}. Using defaults.");
                Self::default()
            }
        }
    }

    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref();

        let contents = match serde_json::to_string_pretty(self) {
            Ok(contents) => contents,
            Err(err) => {
                log::error!(log::channel!("config"), "Failed to serialize config: {err}");
                return false;
            }
        };

        if let Err(err) = std::fs::write(path, contents) {
            log::error!(log::channel!("config"), "Failed to write config file {path:?}: {err}");
            return false;
        }

        true
    }
}
