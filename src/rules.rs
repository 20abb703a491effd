// Rules engine interface and the reference light-cycle rules
//
// The judge only ever talks to `RulesEngine`. `StandardRules` is the engine the
// judge binary plays real matches with.

use log::debug;

use crate::config::RulesConfig;
use crate::error::RulesError;
use crate::grid::Grid;
use crate::types::{Coord, Direction, GameStateSnapshot, MatchResult, Move, Seat};

/// Narrow interface to whatever mutates board, trail and boost state
pub trait RulesEngine {
    /// Current state, as pushed to the agents
    fn snapshot(&self) -> GameStateSnapshot;

    /// Applies both moves simultaneously. Returns the result once the match is
    /// decided.
    fn step(&mut self, agent1: Move, agent2: Move) -> Option<MatchResult>;

    fn turn_count(&self) -> u32;
}

#[derive(Debug, Clone)]
struct Cycle {
    trail: Vec<Coord>,
    heading: Direction,
    boosts: u32,
    alive: bool,
}

impl Cycle {
    fn head(&self) -> Coord {
        // trails start with two cells and only grow
        self.trail[self.trail.len() - 1]
    }
}

/// Torus light-cycle rules: trails are permanent walls, a boost moves two
/// cells, running into any occupied cell is fatal
#[derive(Debug, Clone)]
pub struct StandardRules {
    grid: Grid,
    cycles: [Cycle; 2],
    turns: u32,
}

impl StandardRules {
    pub fn new(config: &RulesConfig) -> Result<Self, RulesError> {
        config.validate()?;
        let (w, h) = (config.width, config.height);
        let mut grid = Grid::new(w, h);
        let geometry = grid.geometry();

        let p1 = vec![geometry.wrap(1, 2), geometry.wrap(2, 2)];
        let p2 = vec![geometry.wrap(w - 3, h - 3), geometry.wrap(w - 4, h - 3)];
        for &c in p1.iter().chain(p2.iter()) {
            grid.mark_wrapped(c);
        }

        Ok(StandardRules {
            grid,
            cycles: [
                Cycle {
                    trail: p1,
                    heading: Direction::Right,
                    boosts: config.initial_boosts,
                    alive: true,
                },
                Cycle {
                    trail: p2,
                    heading: Direction::Left,
                    boosts: config.initial_boosts,
                    alive: true,
                },
            ],
            turns: 0,
        })
    }

    pub fn heading(&self, seat: Seat) -> Direction {
        self.cycles[seat.index()].heading
    }

    /// Direction actually taken and number of sub-steps for a requested move
    fn plan(cycle: &mut Cycle, requested: Move) -> usize {
        if requested.direction != cycle.heading.opposite() {
            cycle.heading = requested.direction;
        }
        if requested.boost && cycle.boosts > 0 {
            cycle.boosts -= 1;
            2
        } else {
            1
        }
    }
}

impl RulesEngine for StandardRules {
    fn snapshot(&self) -> GameStateSnapshot {
        let [a, b] = &self.cycles;
        GameStateSnapshot {
            board: self.grid.to_board(),
            agent1_trail: a.trail.clone(),
            agent2_trail: b.trail.clone(),
            agent1_length: a.trail.len() as u32,
            agent2_length: b.trail.len() as u32,
            agent1_alive: a.alive,
            agent2_alive: b.alive,
            agent1_boosts: a.boosts,
            agent2_boosts: b.boosts,
            turn_count: self.turns,
        }
    }

    fn step(&mut self, agent1: Move, agent2: Move) -> Option<MatchResult> {
        let steps = [
            Self::plan(&mut self.cycles[0], agent1),
            Self::plan(&mut self.cycles[1], agent2),
        ];
        let geometry = self.grid.geometry();

        for sub in 0..2 {
            let targets: [Option<Coord>; 2] = [0, 1].map(|i| {
                let cycle = &self.cycles[i];
                (cycle.alive && steps[i] > sub).then(|| geometry.step(cycle.head(), cycle.heading))
            });
            if targets.iter().all(Option::is_none) {
                break;
            }

            let mut dies = targets.map(|t| t.map_or(false, |c| !self.grid.is_free(c)));
            if let [Some(a), Some(b)] = targets {
                if a == b {
                    dies = [true, true];
                }
            }

            for i in 0..2 {
                let Some(target) = targets[i] else { continue };
                if dies[i] {
                    debug!("player {} crashed at {}", i + 1, target);
                    self.cycles[i].alive = false;
                } else {
                    self.grid.mark_wrapped(target);
                    self.cycles[i].trail.push(target);
                }
            }
        }

        self.turns += 1;
        match (self.cycles[0].alive, self.cycles[1].alive) {
            (true, true) => None,
            (false, false) => Some(MatchResult::Draw),
            (true, false) => Some(MatchResult::Agent1Win),
            (false, true) => Some(MatchResult::Agent2Win),
        }
    }

    fn turn_count(&self) -> u32 {
        self.turns
    }
}
