// Configuration module for reading Arena.toml
// This module provides OOP-style configuration management for the judge and the agent

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::RulesError;
use crate::types::Direction;

/// Smallest board on which both start trails fit without wrapping or overlapping
pub const MIN_BOARD_WIDTH: i32 = 7;
pub const MIN_BOARD_HEIGHT: i32 = 3;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub judge: JudgeConfig,
    pub agent: AgentConfig,
    pub rules: RulesConfig,
    pub strategy: StrategyConfig,
}

/// Match orchestration settings
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct JudgeConfig {
    pub player1_url: String,
    pub player2_url: String,
    pub request_timeout_ms: u64,
    pub max_turns: u32,
    pub random_moves: u32,
    pub max_attempts: u32,
    pub startup_delay_ms: u64,
}

impl JudgeConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Agent server identity and time budget
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AgentConfig {
    pub participant: String,
    pub agent_name: String,
    /// Name of the strategy preset; "custom" uses the `[strategy]` table as is
    pub strategy: String,
    pub move_budget_ms: u64,
    pub default_direction: Direction,
}

impl AgentConfig {
    pub fn move_budget(&self) -> Duration {
        Duration::from_millis(self.move_budget_ms)
    }
}

/// Reference rules engine settings
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RulesConfig {
    pub width: i32,
    pub height: i32,
    pub initial_boosts: u32,
}

impl RulesConfig {
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.width < MIN_BOARD_WIDTH || self.height < MIN_BOARD_HEIGHT {
            return Err(RulesError::BoardTooSmall {
                width: self.width,
                height: self.height,
                min_width: MIN_BOARD_WIDTH,
                min_height: MIN_BOARD_HEIGHT,
            });
        }
        Ok(())
    }
}

/// How the match phase is decided
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PhaseMode {
    /// By turn count
    Turns,
    /// By number of free cells left on the board
    Spaces,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PhaseConfig {
    pub mode: PhaseMode,
    pub early_turn_end: u32,
    pub mid_turn_end: u32,
    pub early_free_min: usize,
    pub mid_free_min: usize,
}

/// Scoring weights for one match phase
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct PhaseWeights {
    pub area: f64,
    pub territory: f64,
    pub head_on_penalty: f64,
}

/// Opening-phase rush (kamikaze) detection
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RushConfig {
    pub near_distance: i32,
    pub min_clear_run: usize,
    pub probe_steps: usize,
    pub evasion_weight: f64,
    pub extra_head_on_penalty: f64,
}

/// Boost (dash) policy
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BoostConfig {
    pub lookahead: usize,
    pub open_runway_min: usize,
    pub window_start_turn: u32,
    pub window_end_turn: u32,
    pub cramped_score: f64,
    pub min_safe_distance: i32,
    /// Boosts that are never spent
    pub reserve: u32,
}

/// Everything the move evaluator is parameterised by
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StrategyConfig {
    pub phase: PhaseConfig,
    pub early: PhaseWeights,
    pub mid: PhaseWeights,
    pub late: PhaseWeights,
    pub straight_bonus: f64,
    pub crash_score: f64,
    pub flood_limit: usize,
    pub territory_cap: usize,
    pub player_one_head_on_scale: f64,
    /// Only penalise a head-on cell when the opponent's trail is at least as long
    pub length_aware_head_on: bool,
    /// Reward per cell of distance closed on the opponent while our trail is longer
    pub chase_weight: f64,
    pub rush: RushConfig,
    pub boost: BoostConfig,
}

impl Default for StrategyConfig {
    /// Stage-weighted flood fill plus Voronoi territory
    fn default() -> Self {
        StrategyConfig {
            phase: PhaseConfig {
                mode: PhaseMode::Turns,
                early_turn_end: 28,
                mid_turn_end: 120,
                early_free_min: 220,
                mid_free_min: 120,
            },
            early: PhaseWeights {
                area: 1.6,
                territory: 2.1,
                head_on_penalty: -900.0,
            },
            mid: PhaseWeights {
                area: 2.0,
                territory: 2.0,
                head_on_penalty: -550.0,
            },
            late: PhaseWeights {
                area: 3.0,
                territory: 0.8,
                head_on_penalty: -450.0,
            },
            straight_bonus: 10.0,
            crash_score: -1e9,
            flood_limit: 320,
            territory_cap: 240,
            player_one_head_on_scale: 0.82,
            length_aware_head_on: false,
            chase_weight: 0.0,
            rush: RushConfig {
                near_distance: 3,
                min_clear_run: 2,
                probe_steps: 6,
                evasion_weight: 12.0,
                extra_head_on_penalty: -400.0,
            },
            boost: BoostConfig {
                lookahead: 5,
                open_runway_min: 2,
                window_start_turn: 24,
                window_end_turn: 120,
                cramped_score: 80.0,
                min_safe_distance: 2,
                reserve: 0,
            },
        }
    }
}

impl StrategyConfig {
    /// Pure space maximisation: no territory seeking, strong head-on avoidance
    pub fn survivalist() -> Self {
        let pure_area = |head_on_penalty| PhaseWeights {
            area: 3.0,
            territory: 0.0,
            head_on_penalty,
        };
        StrategyConfig {
            early: pure_area(-1200.0),
            mid: pure_area(-1000.0),
            late: pure_area(-800.0),
            player_one_head_on_scale: 1.0,
            length_aware_head_on: true,
            ..StrategyConfig::default()
        }
    }

    /// Hunts the opponent while its own trail is longer, keeps one boost back
    pub fn aggressive() -> Self {
        let base = StrategyConfig::default();
        StrategyConfig {
            early: PhaseWeights {
                area: 1.4,
                territory: 1.5,
                head_on_penalty: -600.0,
            },
            mid: PhaseWeights {
                area: 1.8,
                territory: 1.5,
                head_on_penalty: -450.0,
            },
            player_one_head_on_scale: 0.5,
            length_aware_head_on: true,
            chase_weight: 15.0,
            boost: BoostConfig {
                reserve: 1,
                ..base.boost.clone()
            },
            ..base
        }
    }

    /// Looks up a named preset
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "balanced" => Some(StrategyConfig::default()),
            "survivalist" => Some(StrategyConfig::survivalist()),
            "aggressive" => Some(StrategyConfig::aggressive()),
            _ => None,
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Arena.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: Config =
            toml::from_str(&contents).map_err(|e| format!("Failed to parse config file: {}", e))?;
        config
            .rules
            .validate()
            .map_err(|e| format!("Invalid [rules] section: {}", e))?;
        Ok(config)
    }

    /// Loads default configuration from Arena.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Arena.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Arena.toml
    pub fn default_hardcoded() -> Self {
        Config {
            judge: JudgeConfig {
                player1_url: "http://localhost:5008".to_string(),
                player2_url: "http://localhost:5009".to_string(),
                request_timeout_ms: 100,
                max_turns: 500,
                random_moves: 5,
                max_attempts: 2,
                startup_delay_ms: 5000,
            },
            agent: AgentConfig {
                participant: "SampleParticipant".to_string(),
                agent_name: "FloodVoronoi".to_string(),
                strategy: "balanced".to_string(),
                move_budget_ms: 80,
                default_direction: Direction::Right,
            },
            rules: RulesConfig {
                width: 20,
                height: 18,
                initial_boosts: 3,
            },
            strategy: StrategyConfig::default(),
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            eprintln!(
                "Warning: Could not load Arena.toml ({}), using hardcoded defaults",
                e
            );
            Self::default_hardcoded()
        })
    }

    /// Applies the deployment environment on top of the file values:
    /// PLAYER1_URL, PLAYER2_URL, PARTICIPANT, AGENT_NAME and AGENT_STRATEGY
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("PLAYER1_URL") {
            self.judge.player1_url = url;
        }
        if let Ok(url) = env::var("PLAYER2_URL") {
            self.judge.player2_url = url;
        }
        if let Ok(participant) = env::var("PARTICIPANT") {
            self.agent.participant = participant;
        }
        if let Ok(name) = env::var("AGENT_NAME") {
            self.agent.agent_name = name;
        }
        if let Ok(strategy) = env::var("AGENT_STRATEGY") {
            self.agent.strategy = strategy;
        }
    }

    /// The strategy the agent should play with: the named preset, or the
    /// `[strategy]` table for "custom" and unknown names
    pub fn effective_strategy(&self) -> StrategyConfig {
        if self.agent.strategy.eq_ignore_ascii_case("custom") {
            return self.strategy.clone();
        }
        StrategyConfig::preset(&self.agent.strategy).unwrap_or_else(|| {
            log::warn!(
                "Unknown strategy preset '{}', using the [strategy] table",
                self.agent.strategy
            );
            self.strategy.clone()
        })
    }
}
