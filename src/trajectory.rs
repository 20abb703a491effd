// Heading inference and opponent prediction

use crate::config::RushConfig;
use crate::grid::{Geometry, Grid};
use crate::types::{Coord, Direction};

/// Heading implied by the last two cells of a trail.
///
/// A delta of magnitude > 1 can only come from crossing the torus edge, so it is
/// read as the opposite unit step: `(9,5) -> (0,5)` on a 10-wide grid is RIGHT.
/// Returns `None` for trails shorter than two cells or non-adjacent endings.
pub fn infer_heading(trail: &[Coord], geometry: Geometry) -> Option<Direction> {
    let [.., prev, last] = trail else {
        return None;
    };
    let normalize = |d: i32| if d.abs() > 1 { -d.signum() } else { d };
    let (dx, dy) = (normalize(last.x - prev.x), normalize(last.y - prev.y));
    // a normalised delta is only trusted if it really lands on `last`
    let direction = Direction::from_delta(dx, dy)?;
    (geometry.step(*prev, direction) == *last).then_some(direction)
}

/// Cells the opponent can occupy next turn, assuming only that it will not
/// reverse. With an unknown heading all four neighbours are candidates.
pub fn predicted_next_cells(
    geometry: Geometry,
    head: Coord,
    heading: Option<Direction>,
) -> Vec<Coord> {
    Direction::CANONICAL
        .iter()
        .filter(|&&d| heading.map_or(true, |h| d != h.opposite()))
        .map(|&d| geometry.step(head, d))
        .collect()
}

/// Directions that reduce the torus distance from `from` to `to`.
/// When `from == to` every direction qualifies.
pub fn directions_toward(geometry: Geometry, from: Coord, to: Coord) -> Vec<Direction> {
    let mut dirs = Vec::with_capacity(2);

    let right = (to.x - from.x).rem_euclid(geometry.width);
    let left = (from.x - to.x).rem_euclid(geometry.width);
    if right < left {
        dirs.push(Direction::Right);
    } else if left < right {
        dirs.push(Direction::Left);
    }

    let down = (to.y - from.y).rem_euclid(geometry.height);
    let up = (from.y - to.y).rem_euclid(geometry.height);
    if down < up {
        dirs.push(Direction::Down);
    } else if up < down {
        dirs.push(Direction::Up);
    }

    if dirs.is_empty() {
        Direction::CANONICAL.to_vec()
    } else {
        dirs
    }
}

/// Number of consecutive free cells met walking straight from `from`
/// (exclusive) in `direction`, at most `max_steps`.
pub fn straight_clear_run(
    grid: &Grid,
    from: Coord,
    direction: Direction,
    max_steps: usize,
) -> usize {
    let geometry = grid.geometry();
    let mut probe = from;
    let mut steps = 0;
    while steps < max_steps {
        probe = geometry.step(probe, direction);
        if !grid.is_free(probe) {
            break;
        }
        steps += 1;
    }
    steps
}

/// Detects an opponent charging straight at us: close, heading toward us, and
/// with a clear lane in front of it.
pub fn rush_detected(
    grid: &Grid,
    opp_head: Coord,
    opp_heading: Option<Direction>,
    my_head: Coord,
    cfg: &RushConfig,
) -> bool {
    let Some(heading) = opp_heading else {
        return false;
    };
    let geometry = grid.geometry();
    if geometry.torus_distance(opp_head, my_head) > cfg.near_distance {
        return false;
    }
    if !directions_toward(geometry, opp_head, my_head).contains(&heading) {
        return false;
    }
    straight_clear_run(grid, opp_head, heading, cfg.probe_steps) >= cfg.min_clear_run
}
