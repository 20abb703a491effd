// Heuristic move evaluation
//
// One evaluator, parameterised by StrategyConfig. A decision goes through
// candidate generation, parallel scoring, selection and the boost policy.

use log::debug;
use rayon::prelude::*;

use crate::config::{PhaseMode, PhaseWeights, StrategyConfig};
use crate::error::SnapshotError;
use crate::grid::Grid;
use crate::territory::{reachable_area, territory_count};
use crate::trajectory::{infer_heading, predicted_next_cells, rush_detected, straight_clear_run};
use crate::types::{Coord, Direction, GameStateSnapshot, Move, Seat, StateUpdate};

/// Match phase, selects the weight table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Early,
    Mid,
    Late,
}

impl Phase {
    pub fn resolve(strategy: &StrategyConfig, turn: u32, free_cells: usize) -> Phase {
        let cfg = &strategy.phase;
        match cfg.mode {
            PhaseMode::Turns if turn <= cfg.early_turn_end => Phase::Early,
            PhaseMode::Turns if turn <= cfg.mid_turn_end => Phase::Mid,
            PhaseMode::Turns => Phase::Late,
            PhaseMode::Spaces if free_cells >= cfg.early_free_min => Phase::Early,
            PhaseMode::Spaces if free_cells >= cfg.mid_free_min => Phase::Mid,
            PhaseMode::Spaces => Phase::Late,
        }
    }

    pub fn weights(self, strategy: &StrategyConfig) -> PhaseWeights {
        match self {
            Phase::Early => strategy.early,
            Phase::Mid => strategy.mid,
            Phase::Late => strategy.late,
        }
    }
}

/// The board as seen by one player: occupancy of board and both trails, plus
/// the two heads and headings
#[derive(Debug, Clone)]
pub struct PlayerView {
    pub grid: Grid,
    pub seat: Seat,
    pub my_head: Coord,
    pub my_heading: Option<Direction>,
    /// `None` when the opponent trail is empty
    pub opp_head: Option<Coord>,
    pub opp_heading: Option<Direction>,
    pub boosts: u32,
    pub my_length: u32,
    pub opp_length: u32,
    pub turn: u32,
}

impl PlayerView {
    pub fn from_snapshot(snapshot: &GameStateSnapshot, seat: Seat) -> Result<Self, SnapshotError> {
        let mut grid = Grid::from_board(&snapshot.board)?;
        let mine = snapshot.trail(seat);
        let theirs = snapshot.trail(seat.other());
        grid.mark_trail(mine)?;
        grid.mark_trail(theirs)?;

        let my_head = *mine.last().ok_or(match seat {
            Seat::One => SnapshotError::MissingField("agent1_trail"),
            Seat::Two => SnapshotError::MissingField("agent2_trail"),
        })?;
        let geometry = grid.geometry();

        Ok(PlayerView {
            my_heading: infer_heading(mine, geometry),
            opp_head: theirs.last().copied(),
            opp_heading: infer_heading(theirs, geometry),
            boosts: snapshot.boosts(seat),
            my_length: snapshot.length(seat),
            opp_length: snapshot.length(seat.other()),
            turn: snapshot.turn_count,
            grid,
            seat,
            my_head,
        })
    }

    /// A head-on collision on an unequal pair of trails only kills the shorter one
    fn head_on_is_dangerous(&self, length_aware: bool) -> bool {
        !length_aware || self.my_length <= self.opp_length
    }
}

/// Outcome of one evaluation, with the per-candidate scores for logging
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub mv: Move,
    pub score: f64,
    pub phase: Phase,
    pub rush: bool,
    pub scores: Vec<(Direction, f64)>,
}

pub struct MoveEvaluator {
    strategy: StrategyConfig,
}

impl MoveEvaluator {
    pub fn new(strategy: StrategyConfig) -> Self {
        MoveEvaluator { strategy }
    }

    /// Decides from the agent's cached state. `player_hint` (the query
    /// parameter of the move request) wins over the cached player number;
    /// with neither, the agent plays as player 1.
    pub fn decide(
        &self,
        state: &StateUpdate,
        player_hint: Option<u8>,
    ) -> Result<Decision, SnapshotError> {
        let number = player_hint.or(state.player_number).unwrap_or(1);
        let seat = Seat::from_number(number)
            .ok_or_else(|| SnapshotError::Malformed(format!("unknown player number {}", number)))?;
        let snapshot = state.to_snapshot(seat)?;
        let view = PlayerView::from_snapshot(&snapshot, seat)?;
        Ok(self.evaluate(&view))
    }

    /// Pure evaluation of one position
    pub fn evaluate(&self, view: &PlayerView) -> Decision {
        let phase = Phase::resolve(&self.strategy, view.turn, view.grid.free_cells());
        let rush = phase == Phase::Early
            && view.opp_head.map_or(false, |opp| {
                rush_detected(&view.grid, opp, view.opp_heading, view.my_head, &self.strategy.rush)
            });

        let candidates = Self::candidates(view.my_heading);
        let scores: Vec<(Direction, f64)> = candidates
            .par_iter()
            .map(|&d| (d, self.score_candidate(view, d, phase, rush)))
            .collect();

        for (d, s) in &scores {
            debug!("turn {} candidate {}: {:.1}", view.turn, d, s);
        }

        // strict comparison keeps the earliest candidate in canonical order
        let (direction, score) = scores
            .iter()
            .copied()
            .fold(None, |best: Option<(Direction, f64)>, (d, s)| match best {
                Some((_, b)) if s <= b => best,
                _ => Some((d, s)),
            })
            .unwrap_or((Direction::Up, self.strategy.crash_score));

        let boost = self.should_boost(view, direction, score, rush);
        Decision {
            mv: Move { direction, boost },
            score,
            phase,
            rush,
            scores,
        }
    }

    /// Canonical order minus the reverse of the heading. Never empty.
    pub fn candidates(heading: Option<Direction>) -> Vec<Direction> {
        Direction::CANONICAL
            .into_iter()
            .filter(|d| heading.map_or(true, |h| *d != h.opposite()))
            .collect()
    }

    fn score_candidate(&self, view: &PlayerView, d: Direction, phase: Phase, rush: bool) -> f64 {
        let cfg = &self.strategy;
        let geometry = view.grid.geometry();
        let dest = geometry.step(view.my_head, d);
        if !view.grid.is_free(dest) {
            return cfg.crash_score;
        }

        let weights = phase.weights(cfg);
        let mut score = weights.area * reachable_area(&view.grid, dest, cfg.flood_limit) as f64;

        if let Some(opp) = view.opp_head {
            let territory = territory_count(&view.grid, dest, opp, cfg.territory_cap);
            score += weights.territory * territory as f64;

            if view.head_on_is_dangerous(cfg.length_aware_head_on)
                && predicted_next_cells(geometry, opp, view.opp_heading).contains(&dest)
            {
                let mut penalty = weights.head_on_penalty;
                if view.seat == Seat::One {
                    penalty *= cfg.player_one_head_on_scale;
                }
                if rush {
                    penalty += cfg.rush.extra_head_on_penalty;
                }
                score += penalty;
            }

            if rush {
                score += cfg.rush.evasion_weight * geometry.torus_distance(dest, opp) as f64;
            }
            if view.my_length > view.opp_length {
                score -= cfg.chase_weight * geometry.torus_distance(dest, opp) as f64;
            }
        }

        if view.my_heading == Some(d) {
            score += cfg.straight_bonus;
        }
        score
    }

    fn should_boost(
        &self,
        view: &PlayerView,
        direction: Direction,
        score: f64,
        rush: bool,
    ) -> bool {
        let cfg = &self.strategy.boost;
        if view.boosts <= cfg.reserve {
            return false;
        }
        let geometry = view.grid.geometry();

        if let Some(opp) = view.opp_head {
            if geometry.torus_distance(view.my_head, opp) <= cfg.min_safe_distance {
                return false;
            }
        }

        let clear = straight_clear_run(&view.grid, view.my_head, direction, cfg.lookahead);
        // free cells beyond the plain destination
        let runway = clear.saturating_sub(1);
        if runway == 0 {
            return false;
        }

        let in_window = (cfg.window_start_turn..=cfg.window_end_turn).contains(&view.turn);
        let open = runway >= cfg.open_runway_min && in_window;
        let cramped = score < cfg.cramped_score;
        if !(open || cramped) {
            return false;
        }

        match (rush, view.opp_head) {
            (true, Some(opp)) => {
                let plain = geometry.step(view.my_head, direction);
                let boosted = geometry.step(plain, direction);
                geometry.torus_distance(boosted, opp) > geometry.torus_distance(plain, opp)
            }
            _ => true,
        }
    }
}
