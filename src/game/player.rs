//! Player state, roles and input flags

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::arena::{PLAYER_HEIGHT, PLAYER_WIDTH};

/// Jumps available after touching ground
pub const MAX_JUMPS: u8 = 2;

/// Opaque handle for one connected client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One of the two participant slots in a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    First,
    Second,
}

impl Role {
    pub fn other(self) -> Self {
        match self {
            Role::First => Role::Second,
            Role::Second => Role::First,
        }
    }

    /// Spawn position (top-left of the hitbox)
    pub fn spawn_point(self) -> (f32, f32) {
        match self {
            Role::First => (140.0, 420.0),
            Role::Second => (760.0, 420.0),
        }
    }

    pub fn default_color(self) -> &'static str {
        match self {
            Role::First => "#9b59b6",
            Role::Second => "#f1c40f",
        }
    }

    /// The first role starts the match as "it"
    pub fn starts_it(self) -> bool {
        self == Role::First
    }
}

/// Held keys as last reported by the client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputFlags {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub down: bool,
}

/// Edge detector for the jump key.
///
/// `Released -> Held` when a jump fires, `Held -> Released` as soon as the key
/// is reported up. A jump only fires from `Released`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JumpLatch {
    #[default]
    Released,
    Held,
}

/// Authoritative player state
#[derive(Debug, Clone)]
pub struct Player {
    pub session: SessionId,
    pub color: String,

    // Hitbox top-left and velocity (units/second)
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,

    // Movement
    pub on_ground: bool,
    pub jumps_remaining: u8,
    pub jump_latch: JumpLatch,
    pub input: InputFlags,

    // Tag
    pub is_it: bool,
    pub tag_cooldown: f32,
}

impl Player {
    pub fn new(session: SessionId, color: String, x: f32, y: f32) -> Self {
        Self {
            session,
            color,
            x,
            y,
            vel_x: 0.0,
            vel_y: 0.0,
            on_ground: false,
            jumps_remaining: MAX_JUMPS,
            jump_latch: JumpLatch::Released,
            input: InputFlags::default(),
            is_it: false,
            tag_cooldown: 0.0,
        }
    }

    /// Spawn a player for the given role
    pub fn spawn(session: SessionId, role: Role, color: Option<String>) -> Self {
        let (x, y) = role.spawn_point();
        let color = color.unwrap_or_else(|| role.default_color().to_string());
        let mut player = Self::new(session, color, x, y);
        player.is_it = role.starts_it();
        player
    }

    pub fn bottom(&self) -> f32 {
        self.y + PLAYER_HEIGHT
    }

    pub fn right_edge(&self) -> f32 {
        self.x + PLAYER_WIDTH
    }
}

/// Fixed two-slot storage keyed by role
#[derive(Debug, Clone, Default)]
pub struct RoleSlots {
    first: Option<Player>,
    second: Option<Player>,
}

impl RoleSlots {
    pub fn get(&self, role: Role) -> Option<&Player> {
        match role {
            Role::First => self.first.as_ref(),
            Role::Second => self.second.as_ref(),
        }
    }

    pub fn get_mut(&mut self, role: Role) -> Option<&mut Player> {
        match role {
            Role::First => self.first.as_mut(),
            Role::Second => self.second.as_mut(),
        }
    }

    pub fn insert(&mut self, role: Role, player: Player) {
        match role {
            Role::First => self.first = Some(player),
            Role::Second => self.second = Some(player),
        }
    }

    pub fn remove(&mut self, role: Role) -> Option<Player> {
        match role {
            Role::First => self.first.take(),
            Role::Second => self.second.take(),
        }
    }

    pub fn contains(&self, role: Role) -> bool {
        self.get(role).is_some()
    }

    /// First vacant slot in role order
    pub fn vacant_role(&self) -> Option<Role> {
        [Role::First, Role::Second]
            .into_iter()
            .find(|role| !self.contains(*role))
    }

    /// Mutable access to both players, only when both slots are filled
    pub fn both_mut(&mut self) -> Option<(&mut Player, &mut Player)> {
        match (self.first.as_mut(), self.second.as_mut()) {
            (Some(first), Some(second)) => Some((first, second)),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &Player)> {
        [(Role::First, &self.first), (Role::Second, &self.second)]
            .into_iter()
            .filter_map(|(role, slot)| slot.as_ref().map(|p| (role, p)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none() && self.second.is_none()
    }
}
