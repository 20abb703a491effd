// Match orchestration
//
// CONNECT -> (PUSH_STATE -> REQUEST_MOVES -> VALIDATE -> RESOLVE)* -> END.
// One turn is in flight at a time; the two move fetches of a turn run
// concurrently and both finish before the rules engine is stepped.

pub mod client;
pub mod match_log;

use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

use crate::config::JudgeConfig;
use crate::error::MatchError;
use crate::evaluator::MoveEvaluator;
use crate::grid::Geometry;
use crate::rules::RulesEngine;
use crate::trajectory::infer_heading;
use crate::types::{
    AgentIdentity, Direction, EndPayload, GameStateSnapshot, MatchResult, Move, MoveQuery, Seat,
    StatePayload,
};

pub use client::{AgentClient, HttpAgentClient};
pub use match_log::MatchLog;

/// Why the match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The rules engine returned a terminal result
    Rules,
    /// This seat forfeited
    Forfeit(Seat),
    /// `max_turns` was reached
    TurnCeiling,
}

/// Everything known about a finished match
#[derive(Debug, Clone)]
pub struct MatchReport {
    pub result: MatchResult,
    pub reason: EndReason,
    pub turns: u32,
    pub move_log: String,
    pub agents: [AgentIdentity; 2],
    pub random_moves_left: [u32; 2],
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl MatchReport {
    pub fn duration(&self) -> Duration {
        self.finished_at - self.started_at
    }

    /// Human-readable one-line outcome with the start time and wall-clock duration
    pub fn summary(&self) -> String {
        format!(
            "{} [started {}, took {} ms]",
            self.outcome(),
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.duration().num_milliseconds()
        )
    }

    fn outcome(&self) -> String {
        let name = |seat: Seat| {
            let agent = &self.agents[seat.index()];
            format!("Player {} ({} / {})", seat, agent.participant, agent.agent_name)
        };
        match (self.result.winner(), self.reason) {
            (Some(winner), EndReason::Forfeit(loser)) => format!(
                "{} wins after {} turns: {} forfeited",
                name(winner),
                self.turns,
                name(loser)
            ),
            (Some(winner), _) => format!("{} wins after {} turns", name(winner), self.turns),
            (None, EndReason::TurnCeiling) => {
                format!("Draw: turn ceiling reached after {} turns", self.turns)
            }
            (None, _) => format!("Draw after {} turns", self.turns),
        }
    }
}

/// Outcome of fetching one agent's move for a turn
#[derive(Debug)]
enum Fetched {
    /// An answer arrived; the token is not validated yet
    Accepted(String),
    /// Every attempt failed
    Exhausted,
}

/// Referee for one match between two agents
pub struct Judge<C: AgentClient, R: RulesEngine> {
    agents: [C; 2],
    rules: R,
    config: JudgeConfig,
    rng: StdRng,
    random_moves_left: [u32; 2],
    log: MatchLog,
}

impl<C: AgentClient, R: RulesEngine> Judge<C, R> {
    pub fn new(agent1: C, agent2: C, rules: R, config: JudgeConfig) -> Self {
        let allowance = config.random_moves;
        Judge {
            agents: [agent1, agent2],
            rules,
            config,
            rng: StdRng::from_os_rng(),
            random_moves_left: [allowance, allowance],
            log: MatchLog::new(),
        }
    }

    /// Replaces the random fallback source, for reproducible matches
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Plays the match to the end
    pub async fn run(mut self) -> Result<MatchReport, MatchError> {
        let agents = self.connect().await?;

        loop {
            let snapshot = self.rules.snapshot();
            let turn = snapshot.turn_count;
            info!("=== Turn {} ===", turn + 1);

            self.push_state(&snapshot).await;

            let (first, second) = tokio::join!(
                self.fetch_move(Seat::One, turn),
                self.fetch_move(Seat::Two, turn)
            );

            // player 1 is settled first, so its forfeit ends the match before
            // player 2's move is looked at
            let mut moves = [Move::plain(Direction::Up); 2];
            for (seat, fetched) in Seat::BOTH.into_iter().zip([first, second]) {
                match self.settle(seat, fetched, &snapshot) {
                    Some(mv) => moves[seat.index()] = mv,
                    None => {
                        let result = MatchResult::win_for(seat.other());
                        return Ok(self.finish(result, EndReason::Forfeit(seat), agents).await);
                    }
                }
            }

            if let Some(result) = self.rules.step(moves[0], moves[1]) {
                return Ok(self.finish(result, EndReason::Rules, agents).await);
            }
            if self.rules.turn_count() >= self.config.max_turns {
                info!("Maximum turns reached");
                return Ok(self
                    .finish(MatchResult::Draw, EndReason::TurnCeiling, agents)
                    .await);
            }
        }
    }

    async fn connect(&self) -> Result<[AgentIdentity; 2], MatchError> {
        let first = self.probe(Seat::One).await?;
        let second = self.probe(Seat::Two).await?;
        Ok([first, second])
    }

    async fn probe(&self, seat: Seat) -> Result<AgentIdentity, MatchError> {
        let identity = self.agents[seat.index()]
            .identity(seat)
            .await
            .map_err(|source| MatchError::Connectivity { seat, source })?;
        info!(
            "Player {}: {} / {} (latency {} ms)",
            seat,
            identity.participant,
            identity.agent_name,
            identity.latency.as_millis()
        );
        Ok(identity)
    }

    async fn push_state(&self, snapshot: &GameStateSnapshot) {
        let payload = |seat: Seat| StatePayload {
            snapshot: snapshot.clone(),
            player_number: seat.number(),
        };
        let (p1, p2) = (payload(Seat::One), payload(Seat::Two));
        let (r1, r2) = tokio::join!(
            self.agents[0].push_state(&p1),
            self.agents[1].push_state(&p2)
        );
        for (seat, result) in Seat::BOTH.into_iter().zip([r1, r2]) {
            if let Err(e) = result {
                warn!("Failed to send state to player {}: {}", seat, e);
            }
        }
    }

    async fn fetch_move(&self, seat: Seat, turn: u32) -> Fetched {
        let agent = &self.agents[seat.index()];
        for attempt in 1..=self.config.max_attempts {
            let query = MoveQuery {
                player_number: seat.number(),
                attempt_number: attempt,
                random_moves_left: self.random_moves_left[seat.index()],
                turn_count: turn,
            };
            match agent.request_move(&query).await {
                Ok(token) => return Fetched::Accepted(token),
                Err(e) => warn!("Player {} attempt {} failed: {}", seat, attempt, e),
            }
        }
        Fetched::Exhausted
    }

    /// Validates (or substitutes) a seat's move. `None` means the seat forfeits.
    fn settle(
        &mut self,
        seat: Seat,
        fetched: Fetched,
        snapshot: &GameStateSnapshot,
    ) -> Option<Move> {
        let heading = Geometry::of_board(&snapshot.board)
            .and_then(|geometry| infer_heading(snapshot.trail(seat), geometry));

        let (mut mv, random) = match fetched {
            Fetched::Accepted(token) => match token.parse::<Move>() {
                Ok(mv) => (mv, false),
                Err(e) => {
                    error!("Invalid move by player {}: {}. Forfeiting.", seat, e);
                    return None;
                }
            },
            Fetched::Exhausted => {
                let left = &mut self.random_moves_left[seat.index()];
                if *left == 0 {
                    error!("Player {} has no random moves left. Forfeiting.", seat);
                    return None;
                }
                *left -= 1;
                info!("Using random move for player {} ({} random moves left)", seat, *left);
                (Move::plain(self.random_direction(heading)), true)
            }
        };

        if let Some(heading) = heading {
            if mv.direction == heading.opposite() {
                warn!(
                    "Player {} attempted to reverse ({}). Using {} instead.",
                    seat, mv.direction, heading
                );
                mv.direction = heading;
            }
        }
        if mv.boost && snapshot.boosts(seat) == 0 {
            debug!("Player {} has no boosts left, boost ignored", seat);
            mv.boost = false;
        }

        info!(
            "Player {}'s move: {}{}",
            seat,
            mv,
            if random { " (RANDOM)" } else { "" }
        );
        self.log.record(seat, mv, random);
        Some(mv)
    }

    /// Uniform choice among the directions that do not reverse `heading`
    fn random_direction(&mut self, heading: Option<Direction>) -> Direction {
        MoveEvaluator::candidates(heading)
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Direction::Up)
    }

    async fn finish(
        mut self,
        result: MatchResult,
        reason: EndReason,
        agents: [AgentIdentity; 2],
    ) -> MatchReport {
        let payload = EndPayload {
            snapshot: self.rules.snapshot(),
            result: result.as_str().to_string(),
        };
        let (r1, r2) = tokio::join!(self.agents[0].end(&payload), self.agents[1].end(&payload));
        for (seat, r) in Seat::BOTH.into_iter().zip([r1, r2]) {
            if let Err(e) = r {
                debug!("Final state not delivered to player {}: {}", seat, e);
            }
        }

        let finished_at = self.log.finalize();
        let report = MatchReport {
            result,
            reason,
            turns: self.rules.turn_count(),
            move_log: self.log.as_game_string().to_string(),
            agents,
            random_moves_left: self.random_moves_left,
            started_at: self.log.started_at(),
            finished_at,
        };
        info!("{}", report.summary());
        info!("Game string: {}", report.move_log);
        report
    }
}
