// Light-cycle agent with OOP-style API
//
// Bot owns static configuration, the move evaluator and one per-session state
// object. The state object is the only shared mutable data and sits behind a
// single lock; move computation works on a clone taken under that lock.

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::error::SnapshotError;
use crate::evaluator::MoveEvaluator;
use crate::types::{Direction, Move, StateUpdate};

/// What the agent remembers between requests of one match
#[derive(Debug, Default)]
struct Session {
    state: StateUpdate,
    last_good: Option<Direction>,
}

/// Agent with methods corresponding to API endpoints
pub struct Bot {
    config: Config,
    evaluator: Arc<MoveEvaluator>,
    session: Mutex<Session>,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration
    ///
    /// # Arguments
    /// * `config` - Static configuration that does not change during the bot's lifetime
    pub fn new(config: Config) -> Self {
        let strategy = config.effective_strategy();
        info!("Using strategy preset '{}'", config.agent.strategy);
        Bot {
            evaluator: Arc::new(MoveEvaluator::new(strategy)),
            session: Mutex::new(Session::default()),
            config,
        }
    }

    /// Returns agent identity
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");

        json!({
            "participant": self.config.agent.participant,
            "agent_name": self.config.agent.agent_name,
        })
    }

    /// Merges a pushed state into the session
    /// Corresponds to POST /send-state; returns false for a push with no known field
    pub fn receive_state(&self, update: StateUpdate) -> bool {
        if update.is_empty() {
            return false;
        }
        debug!("state push for turn {:?}", update.turn_count);
        self.session.lock().state.merge(update);
        true
    }

    /// Computes the next move within the configured budget
    /// Corresponds to GET /send-move
    pub async fn get_move(&self, player_number: Option<u8>, turn_count: Option<u32>) -> Value {
        let mv = self.choose_move(player_number).await;
        info!("Turn {}: Chose {}", turn_count.unwrap_or_default(), mv);
        json!({ "move": mv.to_string() })
    }

    /// Runs the evaluator on a blocking thread; any failure or budget overrun
    /// gives the fallback move
    pub async fn choose_move(&self, player_number: Option<u8>) -> Move {
        let start_time = Instant::now();
        let state = self.session.lock().state.clone();
        let evaluator = Arc::clone(&self.evaluator);

        let task = tokio::task::spawn_blocking(move || evaluator.decide(&state, player_number));

        match tokio::time::timeout(self.config.agent.move_budget(), task).await {
            Ok(Ok(Ok(decision))) => {
                debug!(
                    "scores {:?} (phase {:?}, rush {}, {}ms)",
                    decision.scores,
                    decision.phase,
                    decision.rush,
                    start_time.elapsed().as_millis()
                );
                self.session.lock().last_good = Some(decision.mv.direction);
                decision.mv
            }
            Ok(Ok(Err(SnapshotError::MissingField(field)))) => {
                debug!("no usable state yet ({} missing)", field);
                self.fallback()
            }
            Ok(Ok(Err(e))) => {
                error!("{}", e);
                self.fallback()
            }
            Ok(Err(e)) => {
                error!("move computation failed: {}", e);
                self.fallback()
            }
            Err(_) => {
                warn!(
                    "move budget of {}ms exceeded",
                    self.config.agent.move_budget_ms
                );
                self.fallback()
            }
        }
    }

    /// Last known-good direction, else the configured default. Never boosts.
    fn fallback(&self) -> Move {
        let direction = self
            .session
            .lock()
            .last_good
            .unwrap_or(self.config.agent.default_direction);
        Move::plain(direction)
    }

    /// Called when a match ends; forgets the session
    /// Corresponds to POST /end
    pub fn end(&self, result: Option<&str>) {
        info!("GAME OVER: {}", result.unwrap_or("unknown result"));
        *self.session.lock() = Session::default();
    }
}
