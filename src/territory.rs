// Space estimation: bounded flood fill and Voronoi territory counting

use std::collections::VecDeque;

use crate::grid::Grid;
use crate::types::Coord;

/// Counts the free cells reachable from `start` (inclusive), stopping at `limit`.
/// Returns 0 when `start` itself is occupied.
pub fn reachable_area(grid: &Grid, start: Coord, limit: usize) -> usize {
    if limit == 0 || !grid.is_free(start) {
        return 0;
    }

    let geometry = grid.geometry();
    let mut visited = vec![false; geometry.cell_count()];
    let mut queue = VecDeque::new();

    visited[geometry.index(start)] = true;
    queue.push_back(start);
    let mut count = 1;
    if count >= limit {
        return count;
    }

    while let Some(cell) = queue.pop_front() {
        for next in geometry.neighbors(cell) {
            let idx = geometry.index(next);
            if visited[idx] || !grid.is_free(next) {
                continue;
            }
            visited[idx] = true;
            count += 1;
            if count >= limit {
                return count;
            }
            queue.push_back(next);
        }
    }

    count
}

/// Counts free cells strictly closer (torus distance) to `my_head` than to
/// `opp_head`. Free cells are scanned row-major and the scan stops after `cap`
/// of them have been inspected, whatever the count at that point.
pub fn territory_count(grid: &Grid, my_head: Coord, opp_head: Coord, cap: usize) -> usize {
    let geometry = grid.geometry();
    let mut inspected = 0;
    let mut mine = 0;

    for y in 0..geometry.height {
        for x in 0..geometry.width {
            let cell = Coord::new(x, y);
            if !grid.is_free(cell) {
                continue;
            }
            if inspected >= cap {
                return mine;
            }
            inspected += 1;
            if geometry.torus_distance(cell, my_head) < geometry.torus_distance(cell, opp_head) {
                mine += 1;
            }
        }
    }

    mine
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_grid_is_fully_reachable() {
        let grid = Grid::new(12, 9);
        assert_eq!(reachable_area(&grid, Coord::new(4, 4), usize::MAX), 12 * 9);
    }

    #[test]
    fn test_occupied_start_has_no_area() {
        let mut grid = Grid::new(5, 5);
        grid.mark(Coord::new(2, 2)).unwrap();
        assert_eq!(reachable_area(&grid, Coord::new(2, 2), usize::MAX), 0);
    }

    #[test]
    fn test_area_respects_limit() {
        let grid = Grid::new(20, 20);
        assert_eq!(reachable_area(&grid, Coord::new(0, 0), 37), 37);
        assert_eq!(reachable_area(&grid, Coord::new(0, 0), 1), 1);
        assert_eq!(reachable_area(&grid, Coord::new(0, 0), 0), 0);
    }

    #[test]
    fn test_wall_splits_regions() {
        // A full vertical wall at x=3 and x=7 on a 10-wide torus leaves two
        // pockets: columns 4..=6 and the wrapped band 8,9,0,1,2
        let mut grid = Grid::new(10, 4);
        for y in 0..4 {
            grid.mark(Coord::new(3, y)).unwrap();
            grid.mark(Coord::new(7, y)).unwrap();
        }
        assert_eq!(reachable_area(&grid, Coord::new(5, 0), usize::MAX), 3 * 4);
        assert_eq!(reachable_area(&grid, Coord::new(0, 2), usize::MAX), 5 * 4);
    }

    #[test]
    fn test_area_is_independent_of_start_inside_region() {
        let mut grid = Grid::new(8, 8);
        for x in 0..8 {
            grid.mark(Coord::new(x, 4)).unwrap();
        }
        let a = reachable_area(&grid, Coord::new(0, 0), usize::MAX);
        let b = reachable_area(&grid, Coord::new(7, 3), usize::MAX);
        let c = reachable_area(&grid, Coord::new(3, 7), usize::MAX);
        assert_eq!(a, b);
        // rows 5,6,7 and wrapped rows 0..=3 form one band through the torus edge
        assert_eq!(a, c);
        assert_eq!(a, 7 * 8);
    }

    #[test]
    fn test_same_head_owns_nothing() {
        let grid = Grid::new(10, 10);
        let head = Coord::new(3, 3);
        assert_eq!(territory_count(&grid, head, head, usize::MAX), 0);
    }

    #[test]
    fn test_territory_splits_open_grid() {
        let grid = Grid::new(10, 1);
        let mine = territory_count(&grid, Coord::new(0, 0), Coord::new(5, 0), usize::MAX);
        // x=0,1,2,8,9 are strictly closer to x=0; x=3..=7 are closer to 5 or tied
        assert_eq!(mine, 5);
    }

    #[test]
    fn test_territory_cap_is_an_inspection_budget() {
        let grid = Grid::new(10, 1);
        // Only x=0 and x=1 are inspected; both are mine
        assert_eq!(
            territory_count(&grid, Coord::new(0, 0), Coord::new(5, 0), 2),
            2
        );
        // Inspecting x=0..=3 gives three of mine (x=3 is distance 3 vs 2)
        assert_eq!(
            territory_count(&grid, Coord::new(0, 0), Coord::new(5, 0), 4),
            3
        );
    }

    #[test]
    fn test_territory_skips_occupied_cells() {
        let mut grid = Grid::new(10, 1);
        grid.mark(Coord::new(1, 0)).unwrap();
        grid.mark(Coord::new(2, 0)).unwrap();
        assert_eq!(
            territory_count(&grid, Coord::new(0, 0), Coord::new(5, 0), usize::MAX),
            3
        );
    }
}
