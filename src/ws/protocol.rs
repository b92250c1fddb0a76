//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::player::{InputFlags, Role, SessionId};
use crate::game::r#match::MatchPhase;

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Request a role in a match
    Join {
        /// Preferred player color, role default when absent
        #[serde(default)]
        color: Option<String>,
        /// Match length in seconds, only honored when this join opens a new match
        #[serde(default)]
        time_limit: Option<f32>,
    },

    /// Currently held keys. Absent keys are treated as released.
    Input {
        #[serde(default)]
        left: bool,
        #[serde(default)]
        right: bool,
        #[serde(default)]
        jump: bool,
        #[serde(default)]
        down: bool,
    },

    /// Ping for latency measurement
    Ping {
        /// Client timestamp
        t: u64,
    },

    /// Leave current match
    Leave,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Welcome message after connection
    Welcome {
        session_id: SessionId,
        server_time: u64,
    },

    /// Confirmation of role assignment
    RoleAssigned {
        match_id: Uuid,
        role: Role,
    },

    /// Both roles are filled and the tick loop is live
    MatchStarted {
        match_id: Uuid,
    },

    /// A role was released mid-match
    PlayerLeft {
        role: Role,
    },

    /// Game state snapshot (sent at regular intervals)
    Snapshot {
        /// Server tick number
        tick: u64,
        state: MatchSnapshot,
        /// Events that occurred since last snapshot
        events: Vec<GameEvent>,
    },

    /// Match has ended
    MatchEnd {
        result: MatchResult,
    },

    /// Error message
    Error {
        code: String,
        message: String,
    },

    /// Pong response
    Pong {
        /// Echo back client timestamp
        t: u64,
    },
}

/// Read-only view of a match after a whole tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub match_id: Uuid,
    pub phase: MatchPhase,
    pub elapsed: f32,
    pub time_limit: f32,
    pub finished: bool,
    /// Seconds the first role has been "it"
    pub first_it_time: f32,
    /// Seconds the second role has been "it"
    pub second_it_time: f32,
    pub players: Vec<PlayerSnapshot>,
}

/// Player state in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub role: Role,
    pub session_id: SessionId,
    pub color: String,
    /// Hitbox top-left X
    pub x: f32,
    /// Hitbox top-left Y
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub on_ground: bool,
    pub jumps_remaining: u8,
    pub is_it: bool,
    /// Seconds until this player can tag or be tagged again
    pub tag_cooldown: f32,
    /// Held keys as last received
    pub input: InputFlags,
}

/// Game events (tags, respawns)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GameEvent {
    /// "It" changed hands
    Tagged { tagger: Role, tagged: Role },

    /// Player fell off-stage and was put back at the top
    Respawned { role: Role },
}

/// Final match outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_id: Uuid,
    pub elapsed: f32,
    pub first_it_time: f32,
    pub second_it_time: f32,
    /// Role that spent less time "it"; `None` on a tie or when abandoned
    pub winner: Option<Role>,
    /// A role was vacated before the timer ran out
    pub abandoned: bool,
}
