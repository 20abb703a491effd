// In-memory move log of one match

use chrono::{DateTime, Utc};

use crate::types::{Move, Seat};

/// Accumulates one token per applied move:
/// `{player}{U|D|L|R}{B if boosted}{R if random}-`
#[derive(Debug, Clone)]
pub struct MatchLog {
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    moves: String,
}

impl MatchLog {
    pub fn new() -> Self {
        MatchLog {
            started_at: Utc::now(),
            finished_at: None,
            moves: String::new(),
        }
    }

    pub fn record(&mut self, seat: Seat, mv: Move, random: bool) {
        self.moves.push_str(&seat.number().to_string());
        self.moves.push(mv.direction.abbrev());
        if mv.boost {
            self.moves.push('B');
        }
        if random {
            self.moves.push('R');
        }
        self.moves.push('-');
    }

    pub fn as_game_string(&self) -> &str {
        &self.moves
    }

    /// Stamps the end time once and returns it
    pub fn finalize(&mut self) -> DateTime<Utc> {
        *self.finished_at.get_or_insert_with(Utc::now)
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

impl Default for MatchLog {
    fn default() -> Self {
        Self::new()
    }
}
