//! Scripted agents and rules engines for driving the judge in tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use lightcycle_arena::config::{Config, JudgeConfig};
use lightcycle_arena::error::ClientError;
use lightcycle_arena::judge::AgentClient;
use lightcycle_arena::rules::RulesEngine;
use lightcycle_arena::types::{
    AgentIdentity, Coord, EndPayload, GameStateSnapshot, MatchResult, Move, MoveQuery, Seat,
    StatePayload,
};

#[derive(Default)]
struct AgentScript {
    identity_error: Option<ClientError>,
    delivery_error: Option<ClientError>,
    replies: Mutex<VecDeque<Result<String, ClientError>>>,
    fallback: Option<Result<String, ClientError>>,
    move_queries: Mutex<Vec<MoveQuery>>,
    states: Mutex<Vec<StatePayload>>,
    ends: Mutex<Vec<EndPayload>>,
}

/// In-memory agent answering from a script. Clones share the script and the
/// recorded calls, so a test keeps one clone to inspect after the match.
#[derive(Clone)]
pub struct ScriptedAgent {
    script: Arc<AgentScript>,
}

impl ScriptedAgent {
    fn with(script: AgentScript) -> Self {
        ScriptedAgent {
            script: Arc::new(script),
        }
    }

    /// Answers every move request with `token`
    pub fn always(token: &str) -> Self {
        Self::with(AgentScript {
            fallback: Some(Ok(token.to_string())),
            ..Default::default()
        })
    }

    /// Fails every move request with `error`
    pub fn failing(error: ClientError) -> Self {
        Self::with(AgentScript {
            fallback: Some(Err(error)),
            ..Default::default()
        })
    }

    /// Plays `replies` in order, then answers `then` forever
    pub fn scripted(replies: Vec<Result<&str, ClientError>>, then: &str) -> Self {
        Self::with(AgentScript {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string))
                    .collect(),
            ),
            fallback: Some(Ok(then.to_string())),
            ..Default::default()
        })
    }

    /// Fails the identity probe
    pub fn unreachable() -> Self {
        Self::with(AgentScript {
            identity_error: Some(ClientError::Timeout),
            fallback: Some(Ok("UP".to_string())),
            ..Default::default()
        })
    }

    /// Answers every move request with `token` but rejects every state push
    /// and the final payload
    pub fn undeliverable(token: &str) -> Self {
        Self::with(AgentScript {
            delivery_error: Some(ClientError::Status(503)),
            fallback: Some(Ok(token.to_string())),
            ..Default::default()
        })
    }

    fn delivered(&self) -> Result<(), ClientError> {
        match &self.script.delivery_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    pub fn move_requests(&self) -> Vec<MoveQuery> {
        self.script.move_queries.lock().clone()
    }

    pub fn states(&self) -> Vec<StatePayload> {
        self.script.states.lock().clone()
    }

    pub fn ends(&self) -> Vec<EndPayload> {
        self.script.ends.lock().clone()
    }
}

impl AgentClient for ScriptedAgent {
    async fn identity(&self, seat: Seat) -> Result<AgentIdentity, ClientError> {
        if let Some(e) = &self.script.identity_error {
            return Err(e.clone());
        }
        Ok(AgentIdentity {
            participant: format!("Participant{}", seat),
            agent_name: format!("Scripted{}", seat),
            latency: Duration::from_millis(1),
        })
    }

    async fn push_state(&self, payload: &StatePayload) -> Result<(), ClientError> {
        self.script.states.lock().push(payload.clone());
        self.delivered()
    }

    async fn request_move(&self, query: &MoveQuery) -> Result<String, ClientError> {
        self.script.move_queries.lock().push(*query);
        let next = self.script.replies.lock().pop_front();
        next.or_else(|| self.script.fallback.clone())
            .unwrap_or(Err(ClientError::Status(500)))
    }

    async fn end(&self, payload: &EndPayload) -> Result<(), ClientError> {
        self.script.ends.lock().push(payload.clone());
        self.delivered()
    }
}

/// Rules engine that never moves anything: a fixed 10x10 position with
/// player 1 heading RIGHT and player 2 heading LEFT. Records every applied
/// pair of moves and ends the match at a chosen turn.
#[derive(Clone)]
pub struct ScriptedRules {
    snapshot: GameStateSnapshot,
    ends_at: Option<(u32, MatchResult)>,
    applied: Arc<Mutex<Vec<(Move, Move)>>>,
}

impl ScriptedRules {
    pub fn new(boosts: u32) -> Self {
        let agent1_trail = vec![Coord::new(1, 5), Coord::new(2, 5)];
        let agent2_trail = vec![Coord::new(8, 5), Coord::new(7, 5)];
        let mut board = vec![vec![0u8; 10]; 10];
        for c in agent1_trail.iter().chain(agent2_trail.iter()) {
            board[c.y as usize][c.x as usize] = 1;
        }
        ScriptedRules {
            snapshot: GameStateSnapshot {
                board,
                agent1_trail,
                agent2_trail,
                agent1_length: 2,
                agent2_length: 2,
                agent1_alive: true,
                agent2_alive: true,
                agent1_boosts: boosts,
                agent2_boosts: boosts,
                turn_count: 0,
            },
            ends_at: None,
            applied: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns `result` from the step that reaches `turn`
    pub fn ending_at(mut self, turn: u32, result: MatchResult) -> Self {
        self.ends_at = Some((turn, result));
        self
    }

    pub fn applied(&self) -> Vec<(Move, Move)> {
        self.applied.lock().clone()
    }
}

impl RulesEngine for ScriptedRules {
    fn snapshot(&self) -> GameStateSnapshot {
        self.snapshot.clone()
    }

    fn step(&mut self, agent1: Move, agent2: Move) -> Option<MatchResult> {
        self.applied.lock().push((agent1, agent2));
        self.snapshot.turn_count += 1;
        match self.ends_at {
            Some((turn, result)) if self.snapshot.turn_count >= turn => Some(result),
            _ => None,
        }
    }

    fn turn_count(&self) -> u32 {
        self.snapshot.turn_count
    }
}

/// Judge settings for tests: no startup delay, a short ceiling
pub fn judge_config(random_moves: u32, max_turns: u32) -> JudgeConfig {
    JudgeConfig {
        random_moves,
        max_turns,
        startup_delay_ms: 0,
        ..Config::default_hardcoded().judge
    }
}
