// Light-cycle wire and domain types
// Field names follow the judge/agent JSON contract (snake_case, `agent1_*` / `agent2_*`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{MoveTokenError, SnapshotError};

/// 2D coordinate on the torus. `x` is the column, `y` is the row.
/// Serialized as a two-element `[x, y]` array.
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Coord { x, y }
    }
}

impl From<Coord> for (i32, i32) {
    fn from(c: Coord) -> Self {
        (c.x, c.y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The four movement directions of a light cycle
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Canonical order, also used to break ties between equal scores
    pub const CANONICAL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Converts direction to its wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        }
    }

    /// Single-letter form used in the match log
    pub fn abbrev(&self) -> char {
        match self {
            Direction::Up => 'U',
            Direction::Down => 'D',
            Direction::Left => 'L',
            Direction::Right => 'R',
        }
    }

    /// Unit step (dx, dy); y grows downwards
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        match (dx, dy) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = MoveTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UP" => Ok(Direction::Up),
            "DOWN" => Ok(Direction::Down),
            "LEFT" => Ok(Direction::Left),
            "RIGHT" => Ok(Direction::Right),
            _ => Err(MoveTokenError::UnknownDirection(s.to_string())),
        }
    }
}

/// A direction plus the boost flag. Wire form is `DIR` or `DIR:BOOST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub direction: Direction,
    pub boost: bool,
}

impl Move {
    pub fn plain(direction: Direction) -> Self {
        Move {
            direction,
            boost: false,
        }
    }

    pub fn boosted(direction: Direction) -> Self {
        Move {
            direction,
            boost: true,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.boost {
            write!(f, "{}:BOOST", self.direction)
        } else {
            write!(f, "{}", self.direction)
        }
    }
}

impl FromStr for Move {
    type Err = MoveTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let mut parts = token.split(':');
        let direction = match parts.next() {
            Some(d) if !d.is_empty() => d.parse::<Direction>()?,
            _ => return Err(MoveTokenError::Malformed(s.to_string())),
        };
        let boost = match parts.next() {
            None => false,
            Some(flag) if flag.eq_ignore_ascii_case("BOOST") => true,
            Some(_) => return Err(MoveTokenError::Malformed(s.to_string())),
        };
        if parts.next().is_some() {
            return Err(MoveTokenError::Malformed(s.to_string()));
        }
        Ok(Move { direction, boost })
    }
}

/// One of the two participants of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seat {
    One,
    Two,
}

impl Seat {
    pub const BOTH: [Seat; 2] = [Seat::One, Seat::Two];

    pub fn from_number(n: u8) -> Option<Seat> {
        match n {
            1 => Some(Seat::One),
            2 => Some(Seat::Two),
            _ => None,
        }
    }

    /// `player_number` on the wire
    pub fn number(&self) -> u8 {
        match self {
            Seat::One => 1,
            Seat::Two => 2,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Seat::One => 0,
            Seat::Two => 1,
        }
    }

    pub fn other(&self) -> Seat {
        match self {
            Seat::One => Seat::Two,
            Seat::Two => Seat::One,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Final outcome of a match
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    #[serde(rename = "AGENT1_WIN")]
    Agent1Win,
    #[serde(rename = "AGENT2_WIN")]
    Agent2Win,
    #[serde(rename = "DRAW")]
    Draw,
}

impl MatchResult {
    pub fn win_for(seat: Seat) -> Self {
        match seat {
            Seat::One => MatchResult::Agent1Win,
            Seat::Two => MatchResult::Agent2Win,
        }
    }

    pub fn winner(&self) -> Option<Seat> {
        match self {
            MatchResult::Agent1Win => Some(Seat::One),
            MatchResult::Agent2Win => Some(Seat::Two),
            MatchResult::Draw => None,
        }
    }

    /// Result tag sent in the final payload
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchResult::Agent1Win => "AGENT1_WIN",
            MatchResult::Agent2Win => "AGENT2_WIN",
            MatchResult::Draw => "DRAW",
        }
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is behind an agent endpoint, captured once at the connectivity check
#[derive(Debug, Clone, PartialEq)]
pub struct AgentIdentity {
    pub participant: String,
    pub agent_name: String,
    pub latency: Duration,
}

/// Complete game state as produced by the rules engine
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct GameStateSnapshot {
    pub board: Vec<Vec<u8>>,
    pub agent1_trail: Vec<Coord>,
    pub agent2_trail: Vec<Coord>,
    pub agent1_length: u32,
    pub agent2_length: u32,
    pub agent1_alive: bool,
    pub agent2_alive: bool,
    pub agent1_boosts: u32,
    pub agent2_boosts: u32,
    pub turn_count: u32,
}

impl GameStateSnapshot {
    pub fn trail(&self, seat: Seat) -> &[Coord] {
        match seat {
            Seat::One => &self.agent1_trail,
            Seat::Two => &self.agent2_trail,
        }
    }

    pub fn boosts(&self, seat: Seat) -> u32 {
        match seat {
            Seat::One => self.agent1_boosts,
            Seat::Two => self.agent2_boosts,
        }
    }

    pub fn length(&self, seat: Seat) -> u32 {
        match seat {
            Seat::One => self.agent1_length,
            Seat::Two => self.agent2_length,
        }
    }
}

/// Body of `POST /send-state`
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct StatePayload {
    #[serde(flatten)]
    pub snapshot: GameStateSnapshot,
    pub player_number: u8,
}

/// Body of `POST /end`
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EndPayload {
    #[serde(flatten)]
    pub snapshot: GameStateSnapshot,
    pub result: String,
}

/// Query string of `GET /send-move`
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveQuery {
    pub player_number: u8,
    pub attempt_number: u32,
    pub random_moves_left: u32,
    pub turn_count: u32,
}

/// Agent-side mirror of a pushed state. Every field is optional; pushes merge
/// field by field so a partial push only overwrites what it carries.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub board: Option<Vec<Vec<u8>>>,
    pub agent1_trail: Option<Vec<Coord>>,
    pub agent2_trail: Option<Vec<Coord>>,
    pub agent1_length: Option<u32>,
    pub agent2_length: Option<u32>,
    pub agent1_alive: Option<bool>,
    pub agent2_alive: Option<bool>,
    pub agent1_boosts: Option<u32>,
    pub agent2_boosts: Option<u32>,
    pub turn_count: Option<u32>,
    pub player_number: Option<u8>,
}

impl StateUpdate {
    /// True when the push carried no recognised field at all
    pub fn is_empty(&self) -> bool {
        *self == StateUpdate::default()
    }

    pub fn merge(&mut self, other: StateUpdate) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            board,
            agent1_trail,
            agent2_trail,
            agent1_length,
            agent2_length,
            agent1_alive,
            agent2_alive,
            agent1_boosts,
            agent2_boosts,
            turn_count,
            player_number
        );
    }

    /// Builds a full snapshot as seen by `seat`. Only `board` and the seat's
    /// own trail are required; a missing opponent trail is empty and the
    /// remaining fields fall back to neutral values (no boosts, alive, turn 0).
    pub fn to_snapshot(&self, seat: Seat) -> Result<GameStateSnapshot, SnapshotError> {
        let board = self
            .board
            .clone()
            .ok_or(SnapshotError::MissingField("board"))?;
        let (own_trail, field) = match seat {
            Seat::One => (&self.agent1_trail, "agent1_trail"),
            Seat::Two => (&self.agent2_trail, "agent2_trail"),
        };
        if own_trail.is_none() {
            return Err(SnapshotError::MissingField(field));
        }
        let agent1_trail = self.agent1_trail.clone().unwrap_or_default();
        let agent2_trail = self.agent2_trail.clone().unwrap_or_default();

        Ok(GameStateSnapshot {
            agent1_length: self.agent1_length.unwrap_or(agent1_trail.len() as u32),
            agent2_length: self.agent2_length.unwrap_or(agent2_trail.len() as u32),
            agent1_alive: self.agent1_alive.unwrap_or(true),
            agent2_alive: self.agent2_alive.unwrap_or(true),
            agent1_boosts: self.agent1_boosts.unwrap_or(0),
            agent2_boosts: self.agent2_boosts.unwrap_or(0),
            turn_count: self.turn_count.unwrap_or(0),
            board,
            agent1_trail,
            agent2_trail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_parsing() {
        assert_eq!("UP".parse::<Move>().unwrap(), Move::plain(Direction::Up));
        assert_eq!("left".parse::<Move>().unwrap(), Move::plain(Direction::Left));
        assert_eq!(
            "RIGHT:BOOST".parse::<Move>().unwrap(),
            Move::boosted(Direction::Right)
        );
        assert_eq!(
            " down:boost ".parse::<Move>().unwrap(),
            Move::boosted(Direction::Down)
        );

        assert!("SIDEWAYS".parse::<Move>().is_err());
        assert!("UP:TURBO".parse::<Move>().is_err());
        assert!("UP:BOOST:BOOST".parse::<Move>().is_err());
        assert!("".parse::<Move>().is_err());
        assert!(":BOOST".parse::<Move>().is_err());
    }

    #[test]
    fn test_move_display_matches_wire_form() {
        assert_eq!(Move::plain(Direction::Up).to_string(), "UP");
        assert_eq!(Move::boosted(Direction::Left).to_string(), "LEFT:BOOST");
    }

    #[test]
    fn test_coord_serializes_as_pair() {
        let json = serde_json::to_string(&Coord::new(3, 7)).unwrap();
        assert_eq!(json, "[3,7]");
        let back: Coord = serde_json::from_str("[4,1]").unwrap();
        assert_eq!(back, Coord::new(4, 1));
    }

    #[test]
    fn test_match_result_tags() {
        assert_eq!(MatchResult::Agent1Win.to_string(), "AGENT1_WIN");
        assert_eq!(
            serde_json::to_string(&MatchResult::Agent2Win).unwrap(),
            "\"AGENT2_WIN\""
        );
        assert_eq!(MatchResult::win_for(Seat::Two), MatchResult::Agent2Win);
        assert_eq!(MatchResult::Draw.winner(), None);
    }

    #[test]
    fn test_state_update_merge_keeps_unsent_fields() {
        let mut cached = StateUpdate {
            board: Some(vec![vec![0; 3]; 3]),
            agent1_boosts: Some(3),
            turn_count: Some(4),
            ..Default::default()
        };
        cached.merge(StateUpdate {
            turn_count: Some(5),
            ..Default::default()
        });

        assert_eq!(cached.turn_count, Some(5));
        assert_eq!(cached.agent1_boosts, Some(3));
        assert!(cached.board.is_some());
    }

    #[test]
    fn test_to_snapshot_reports_missing_board() {
        let update = StateUpdate {
            agent1_trail: Some(vec![Coord::new(0, 0)]),
            ..Default::default()
        };
        match update.to_snapshot(Seat::One) {
            Err(SnapshotError::MissingField(field)) => assert_eq!(field, "board"),
            other => panic!("expected missing board, got {:?}", other),
        }
    }

    #[test]
    fn test_to_snapshot_requires_only_own_trail() {
        let update = StateUpdate {
            board: Some(vec![vec![0; 4]; 4]),
            agent1_trail: Some(vec![Coord::new(0, 0), Coord::new(1, 0)]),
            ..Default::default()
        };

        let snapshot = update.to_snapshot(Seat::One).unwrap();
        assert!(snapshot.agent2_trail.is_empty());
        assert_eq!(snapshot.agent1_length, 2);
        assert_eq!(snapshot.agent2_length, 0);

        assert_eq!(
            update.to_snapshot(Seat::Two),
            Err(SnapshotError::MissingField("agent2_trail"))
        );
    }

    #[test]
    fn test_state_payload_is_flat() {
        let payload = StatePayload {
            snapshot: GameStateSnapshot {
                board: vec![vec![0, 1]],
                agent1_trail: vec![Coord::new(1, 0)],
                agent2_trail: vec![],
                agent1_length: 1,
                agent2_length: 0,
                agent1_alive: true,
                agent2_alive: false,
                agent1_boosts: 3,
                agent2_boosts: 0,
                turn_count: 2,
            },
            player_number: 2,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["player_number"], 2);
        assert_eq!(value["agent1_trail"][0][0], 1);
        assert_eq!(value["turn_count"], 2);

        let update: StateUpdate = serde_json::from_value(value).unwrap();
        assert_eq!(update.player_number, Some(2));
        assert_eq!(update.agent2_alive, Some(false));
    }
}
