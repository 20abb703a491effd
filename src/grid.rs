// Torus geometry and board occupancy
//
// The wire board is row-major (`board[y][x]`) while coordinates are `(x, y)` with
// x as the column. Every conversion between the two happens in this module.

use crate::error::SnapshotError;
use crate::types::{Coord, Direction};

/// Pure torus arithmetic over a `width` x `height` grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: i32,
    pub height: i32,
}

impl Geometry {
    pub fn new(width: i32, height: i32) -> Self {
        Geometry { width, height }
    }

    /// Geometry of a row-major board, `None` for an empty or ragged board
    pub fn of_board(board: &[Vec<u8>]) -> Option<Geometry> {
        let height = board.len();
        let width = board.first().map(|row| row.len()).unwrap_or(0);
        if height == 0 || width == 0 || board.iter().any(|row| row.len() != width) {
            return None;
        }
        Some(Geometry::new(width as i32, height as i32))
    }

    pub fn cell_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    pub fn wrap(&self, x: i32, y: i32) -> Coord {
        Coord::new(x.rem_euclid(self.width), y.rem_euclid(self.height))
    }

    pub fn contains(&self, c: Coord) -> bool {
        c.x >= 0 && c.x < self.width && c.y >= 0 && c.y < self.height
    }

    /// One step in `direction`, wrapping around the edges
    pub fn step(&self, from: Coord, direction: Direction) -> Coord {
        let (dx, dy) = direction.delta();
        self.wrap(from.x + dx, from.y + dy)
    }

    /// The four adjacent cells in canonical order (UP, RIGHT, DOWN, LEFT)
    pub fn neighbors(&self, p: Coord) -> [Coord; 4] {
        Direction::CANONICAL.map(|d| self.step(p, d))
    }

    /// Manhattan distance on the wrapped grid
    pub fn torus_distance(&self, a: Coord, b: Coord) -> i32 {
        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();
        dx.min(self.width - dx) + dy.min(self.height - dy)
    }

    /// Row-major index of an in-range coordinate
    pub fn index(&self, c: Coord) -> usize {
        (c.y as usize) * (self.width as usize) + (c.x as usize)
    }
}

/// Board occupancy: a geometry plus one flag per cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    geometry: Geometry,
    occupied: Vec<bool>,
}

impl Grid {
    /// An empty grid
    pub fn new(width: i32, height: i32) -> Self {
        let geometry = Geometry::new(width, height);
        Grid {
            geometry,
            occupied: vec![false; geometry.cell_count()],
        }
    }

    /// Builds a grid from a wire board. Any non-zero cell is occupied.
    pub fn from_board(board: &[Vec<u8>]) -> Result<Self, SnapshotError> {
        let geometry = Geometry::of_board(board).ok_or_else(|| {
            SnapshotError::Malformed("board must be a non-empty rectangle".to_string())
        })?;
        let occupied = board
            .iter()
            .flat_map(|row| row.iter().map(|&cell| cell != 0))
            .collect();
        Ok(Grid { geometry, occupied })
    }

    /// Renders the grid back to a row-major 0/1 board
    pub fn to_board(&self) -> Vec<Vec<u8>> {
        self.occupied
            .chunks(self.geometry.width as usize)
            .map(|row| row.iter().map(|&o| o as u8).collect())
            .collect()
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn width(&self) -> i32 {
        self.geometry.width
    }

    pub fn height(&self) -> i32 {
        self.geometry.height
    }

    /// Free means inside the grid and unoccupied
    pub fn is_free(&self, c: Coord) -> bool {
        self.geometry.contains(c) && !self.occupied[self.geometry.index(c)]
    }

    pub fn mark(&mut self, c: Coord) -> Result<(), SnapshotError> {
        if !self.geometry.contains(c) {
            return Err(SnapshotError::Malformed(format!(
                "coordinate {} outside {}x{} board",
                c, self.geometry.width, self.geometry.height
            )));
        }
        let idx = self.geometry.index(c);
        self.occupied[idx] = true;
        Ok(())
    }

    /// Marks the cell `c` lands on after wrapping, so it cannot fail
    pub fn mark_wrapped(&mut self, c: Coord) {
        let c = self.geometry.wrap(c.x, c.y);
        let idx = self.geometry.index(c);
        self.occupied[idx] = true;
    }

    /// Marks every cell of a trail as occupied
    pub fn mark_trail(&mut self, trail: &[Coord]) -> Result<(), SnapshotError> {
        trail.iter().try_for_each(|&c| self.mark(c))
    }

    pub fn free_cells(&self) -> usize {
        self.occupied.iter().filter(|&&o| !o).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_is_idempotent() {
        let geom = Geometry::new(7, 5);
        for x in -20..20 {
            for y in -20..20 {
                let once = geom.wrap(x, y);
                assert_eq!(geom.wrap(once.x, once.y), once);
                assert!(geom.contains(once));
            }
        }
    }

    #[test]
    fn test_neighbors_are_distinct_on_small_grids() {
        for (w, h) in [(3, 3), (3, 8), (10, 4)] {
            let geom = Geometry::new(w, h);
            for x in 0..w {
                for y in 0..h {
                    let n = geom.neighbors(Coord::new(x, y));
                    for i in 0..4 {
                        for j in (i + 1)..4 {
                            assert_ne!(n[i], n[j], "duplicate neighbour on {}x{}", w, h);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_neighbors_order_and_wrap() {
        let geom = Geometry::new(10, 10);
        let n = geom.neighbors(Coord::new(0, 0));
        assert_eq!(
            n,
            [
                Coord::new(0, 9), // up
                Coord::new(1, 0), // right
                Coord::new(0, 1), // down
                Coord::new(9, 0), // left
            ]
        );
    }

    #[test]
    fn test_torus_distance() {
        let geom = Geometry::new(10, 8);
        assert_eq!(geom.torus_distance(Coord::new(0, 0), Coord::new(9, 0)), 1);
        assert_eq!(geom.torus_distance(Coord::new(0, 0), Coord::new(5, 4)), 9);
        assert_eq!(geom.torus_distance(Coord::new(2, 1), Coord::new(2, 7)), 2);
        assert_eq!(geom.torus_distance(Coord::new(3, 3), Coord::new(3, 3)), 0);
    }

    #[test]
    fn test_board_round_trip_uses_row_major_layout() {
        // Cell (x=2, y=0) is board[0][2]
        let board = vec![vec![0, 0, 1], vec![0, 0, 0]];
        let grid = Grid::from_board(&board).unwrap();
        assert!(!grid.is_free(Coord::new(2, 0)));
        assert!(grid.is_free(Coord::new(0, 0)));
        assert!(grid.is_free(Coord::new(2, 1)));
        assert_eq!(grid.to_board(), board);
        assert_eq!(grid.free_cells(), 5);
    }

    #[test]
    fn test_ragged_board_is_malformed() {
        let board = vec![vec![0, 0, 0], vec![0, 0]];
        assert!(matches!(
            Grid::from_board(&board),
            Err(SnapshotError::Malformed(_))
        ));
        assert!(Grid::from_board(&[]).is_err());
    }

    #[test]
    fn test_mark_rejects_out_of_range() {
        let mut grid = Grid::new(4, 4);
        assert!(grid.mark(Coord::new(3, 3)).is_ok());
        assert!(grid.mark(Coord::new(4, 0)).is_err());
        assert!(!grid.is_free(Coord::new(3, 3)));
    }

    #[test]
    fn test_mark_wrapped_lands_inside() {
        let mut grid = Grid::new(4, 4);
        grid.mark_wrapped(Coord::new(4, -1));
        assert!(!grid.is_free(Coord::new(0, 3)));
        assert_eq!(grid.free_cells(), 15);
    }
}
