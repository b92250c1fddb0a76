//! Platform collision, grounding and world bounds

use rand::Rng;

use super::arena::{Arena, Platform, PLAYER_HEIGHT, PLAYER_WIDTH};
use super::player::{Player, MAX_JUMPS};

/// Slack allowed between the pre-step edge and a platform face.
/// Arbitrary tuning value kept for compatibility.
pub const LANDING_TOLERANCE: f32 = 5.0;

/// Respawn height after falling off-stage
pub const RESPAWN_Y: f32 = 40.0;

/// How a platform contact was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Landed,
    Ceiling,
}

/// Collision resolution against static arena geometry
pub struct CollisionSystem;

impl CollisionSystem {
    /// Correct platform penetration after integration and recompute `on_ground`.
    ///
    /// This is a swept heuristic, not continuous collision: the pre-step edge is
    /// reconstructed from the current velocity and platforms are visited in
    /// list order with no depth sorting. At the configured speeds and tick rate
    /// it does not tunnel.
    pub fn resolve_platforms(player: &mut Player, dt: f32, arena: &Arena) -> Option<Contact> {
        player.on_ground = false;
        let mut last_contact = None;

        for platform in arena.platforms() {
            if !platform.overlaps(player.x, player.y, PLAYER_WIDTH, PLAYER_HEIGHT) {
                continue;
            }
            if let Some(contact) = Self::resolve_platform(player, dt, platform) {
                last_contact = Some(contact);
            }
        }

        last_contact
    }

    fn resolve_platform(player: &mut Player, dt: f32, platform: &Platform) -> Option<Contact> {
        if player.vel_y > 0.0 {
            let prev_bottom = player.bottom() - player.vel_y * dt;
            if prev_bottom <= platform.top() + LANDING_TOLERANCE {
                player.y = platform.top() - PLAYER_HEIGHT;
                player.vel_y = 0.0;
                player.on_ground = true;
                player.jumps_remaining = MAX_JUMPS;
                return Some(Contact::Landed);
            }
        } else if player.vel_y < 0.0 {
            let prev_top = player.y - player.vel_y * dt;
            if prev_top >= platform.bottom() - LANDING_TOLERANCE {
                player.y = platform.bottom();
                player.vel_y = 0.0;
                return Some(Contact::Ceiling);
            }
        }
        None
    }

    /// Clamp to the canvas horizontally and respawn players that fell off-stage.
    /// Returns true when the player was respawned.
    pub fn enforce_bounds<R: Rng>(player: &mut Player, arena: &Arena, rng: &mut R) -> bool {
        let max_x = arena.max_x();
        if player.x < 0.0 {
            player.x = 0.0;
            player.vel_x = 0.0;
        }
        if player.x > max_x {
            player.x = max_x;
            player.vel_x = 0.0;
        }

        if player.y > arena.kill_line() {
            player.x = if max_x > 0.0 { rng.gen_range(0.0..=max_x) } else { 0.0 };
            player.y = RESPAWN_Y;
            player.vel_x = 0.0;
            player.vel_y = 0.0;
            player.jumps_remaining = MAX_JUMPS;
            return true;
        }

        false
    }
}
