//! The corridor layout and a breadth-first route search over it.

use std::collections::VecDeque;

use anyhow::{Result, bail};
use st_core::{GridId, PathError, TileCoord};
use st_world::{MemoryWorld, PathRequest, Route};

/// `#` is a wall, anything else is floor.  Row 0 is the top line.
pub const LAYOUT: &str = "\
####################
#..................#
#..######..######..#
#.......#..#.......#
#..######..######..#
#..................#
####################";

const NEIGHBOURS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

pub struct Corridor {
    width:  i32,
    height: i32,
    walls:  Vec<bool>,
}

impl Corridor {
    pub fn from_layout(layout: &str) -> Result<Self> {
        let rows: Vec<&str> = layout.lines().collect();
        let Some(first) = rows.first() else { bail!("empty layout") };
        let width = first.len();
        if rows.iter().any(|r| r.len() != width) {
            bail!("layout rows must all be {width} characters wide");
        }
        let walls = rows.iter().flat_map(|r| r.bytes().map(|b| b == b'#')).collect();
        Ok(Self { width: width as i32, height: rows.len() as i32, walls })
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        let inside = (0..self.width).contains(&tile.x) && (0..self.height).contains(&tile.y);
        inside.then(|| (tile.y * self.width + tile.x) as usize)
    }

    pub fn is_open(&self, tile: TileCoord) -> bool {
        self.index(tile).is_some_and(|i| !self.walls[i])
    }

    /// Floor tiles whose column lies in `columns`.
    pub fn open_tiles_in(&self, columns: std::ops::RangeInclusive<i32>) -> Vec<TileCoord> {
        (0..self.height)
            .flat_map(|y| columns.clone().map(move |x| TileCoord::new(x, y)))
            .filter(|&t| self.is_open(t))
            .collect()
    }

    /// Block every wall tile of the layout on `grid`.
    pub fn install(&self, world: &mut MemoryWorld, grid: GridId) {
        for y in 0..self.height {
            for x in 0..self.width {
                let tile = TileCoord::new(x, y);
                if !self.is_open(tile) {
                    world.block_tile(grid, tile);
                }
            }
        }
    }

    /// Shortest 4-connected route from `start` to the first floor tile
    /// within `proximity` of `end`, both endpoints included.
    pub fn search(&self, req: &PathRequest) -> Result<Route, PathError> {
        let start = self.index(req.start).ok_or(PathError::NoStart)?;
        if self.index(req.end).is_none() {
            return Err(PathError::NoEnd);
        }

        let mut parent: Vec<Option<usize>> = vec![None; self.walls.len()];
        let mut seen = vec![false; self.walls.len()];
        let mut frontier = VecDeque::from([req.start]);
        seen[start] = true;

        while let Some(tile) = frontier.pop_front() {
            if tile.octile_distance(req.end) <= req.proximity {
                return Ok(self.unwind(&parent, tile));
            }
            for (dx, dy) in NEIGHBOURS {
                let next = TileCoord::new(tile.x + dx, tile.y + dy);
                let Some(i) = self.index(next) else { continue };
                if seen[i] || self.walls[i] {
                    continue;
                }
                seen[i] = true;
                parent[i] = self.index(tile);
                frontier.push_back(next);
            }
        }
        Err(PathError::Failed(format!("{} is unreachable from {}", req.end, req.start)))
    }

    fn unwind(&self, parent: &[Option<usize>], goal: TileCoord) -> Route {
        let mut route = vec![goal];
        let mut cursor = self.index(goal).and_then(|i| parent[i]);
        while let Some(i) = cursor {
            let i = i as i32;
            route.push(TileCoord::new(i % self.width, i / self.width));
            cursor = parent[i as usize];
        }
        route.reverse();
        route
    }
}
