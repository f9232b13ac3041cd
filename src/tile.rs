use arrayvec::ArrayVec;
use strum_macros::Display;

use crate::coords::Cell;

// ----------------------------------------------
// Node
// ----------------------------------------------

// Handle identifying a single grid cell: (row, col) plus the layer it sits
// on. Tiles never hold references to their neighbors, only Nodes — the
// Grid is the sole owner of the Tile arena (see Grid::tile/tile_mut).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Node {
    pub cell: Cell,
    pub layer: i32,
}

impl Node {
    #[inline]
    pub const fn new(row: i32, col: i32, layer: i32) -> Self {
        Self { cell: Cell::new(row, col), layer }
    }

    #[inline]
    pub fn manhattan_distance(self, other: Node) -> i32 {
        self.cell.manhattan_distance(other.cell) + (self.layer - other.layer).abs()
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}@L{}", self.cell, self.layer)
    }
}

// ----------------------------------------------
// LayerOrientation / Layer
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
pub enum LayerOrientation {
    Horizontal,
    Vertical,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Layer {
    pub index: i32,
    pub orientation: LayerOrientation,
}

impl Layer {
    #[inline]
    pub const fn new(index: i32, orientation: LayerOrientation) -> Self {
        Self { index, orientation }
    }
}

// ----------------------------------------------
// TileState
// ----------------------------------------------

// Search scratch state plus the two semantic marks (Start/End) that must
// survive Grid::idlize_tiles between searches.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Display)]
pub enum TileState {
    #[default]
    Idle,
    Open,
    Closed,
    Barrier,
    Start,
    End,
}

// ----------------------------------------------
// TileType
// ----------------------------------------------

// Net geometry role. Every tile starts out Metal; committing a path
// promotes endpoints to Contact and layer-change tiles to Via.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Display)]
pub enum TileType {
    #[default]
    Metal,
    Via,
    Contact,
}

// ----------------------------------------------
// Tile
// ----------------------------------------------

#[derive(Clone, Debug)]
pub struct Tile {
    pub node: Node,
    pub state: TileState,
    pub kind: TileType,
    pub neighbors: ArrayVec<Node, 4>,
}

impl Tile {
    pub fn new(node: Node) -> Self {
        Self {
            node,
            state: TileState::default(),
            kind: TileType::default(),
            neighbors: ArrayVec::new(),
        }
    }

    #[inline]
    pub fn is_barrier(&self) -> bool {
        self.state == TileState::Barrier
    }

    // Idles the tile if it is mid-search scratch state (Open/Closed),
    // leaving Barrier/Start/End untouched. See Grid::idlize_tiles.
    #[inline]
    pub fn idlize(&mut self) {
        if matches!(self.state, TileState::Open | TileState::Closed) {
            self.state = TileState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idlize_only_clears_search_scratch_state() {
        for (state, should_clear) in [
            (TileState::Open, true),
            (TileState::Closed, true),
            (TileState::Idle, false),
            (TileState::Barrier, false),
            (TileState::Start, false),
            (TileState::End, false),
        ] {
            let mut tile = Tile::new(Node::new(0, 0, 0));
            tile.state = state;
            tile.idlize();
            if should_clear {
                assert_eq!(tile.state, TileState::Idle);
            } else {
                assert_eq!(tile.state, state);
            }
        }
    }

    #[test]
    fn node_manhattan_distance_includes_layer_delta() {
        let a = Node::new(0, 0, 0);
        let b = Node::new(3, 4, 2);
        assert_eq!(a.manhattan_distance(b), 3 + 4 + 2);
    }
}
