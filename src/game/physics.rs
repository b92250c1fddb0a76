//! Player kinematics: input-driven velocity and explicit Euler integration

use super::player::{InputFlags, JumpLatch, Player};

/// Movement tuning constants
#[derive(Debug, Clone, Copy)]
pub struct MovementStats {
    /// Downward acceleration (units/s²)
    pub gravity: f32,
    /// Gravity multiplier while airborne with `down` held
    pub fast_fall_mult: f32,
    /// Horizontal target speed with a direction held
    pub move_speed: f32,
    /// Horizontal acceleration toward the target speed
    pub accel: f32,
    /// Horizontal decay with no direction held
    pub friction: f32,
    /// Upward speed applied by a jump
    pub jump_speed: f32,
}

impl Default for MovementStats {
    fn default() -> Self {
        Self {
            gravity: 1800.0,
            fast_fall_mult: 2.5,
            move_speed: 360.0,
            accel: 2800.0,
            friction: 2400.0,
            jump_speed: 650.0,
        }
    }
}

/// Physics system for advancing a single player by one tick
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Advance velocity, position, jump budget and tag cooldown by `dt`.
    ///
    /// Platform collision and world bounds are handled afterwards by
    /// `CollisionSystem`.
    pub fn integrate(player: &mut Player, dt: f32, stats: &MovementStats) {
        let input = player.input;

        Self::apply_jump(player, &input, stats);

        player.vel_x = Self::horizontal_velocity(player.vel_x, &input, dt, stats);
        player.x += player.vel_x * dt;

        let mut gravity = stats.gravity;
        if input.down && !player.on_ground {
            gravity *= stats.fast_fall_mult;
        }
        player.vel_y += gravity * dt;
        player.y += player.vel_y * dt;

        player.tag_cooldown = Self::update_cooldown(player.tag_cooldown, dt);
    }

    /// Fire a jump on the press edge of the jump key
    pub fn apply_jump(player: &mut Player, input: &InputFlags, stats: &MovementStats) {
        if !input.jump {
            player.jump_latch = JumpLatch::Released;
            return;
        }

        if player.jumps_remaining > 0 && player.jump_latch == JumpLatch::Released {
            player.vel_y = -stats.jump_speed;
            player.jumps_remaining -= 1;
            player.jump_latch = JumpLatch::Held;
        }
    }

    /// Compute the next horizontal velocity.
    ///
    /// Velocity moves toward the target at `accel`, including the slowdown
    /// toward 0 when no direction is held. Friction only applies once the
    /// velocity already sits on an idle target.
    ///
    /// With both directions held `right` wins. This tie-break is arbitrary
    /// tuning kept for compatibility with existing clients.
    pub fn horizontal_velocity(vel_x: f32, input: &InputFlags, dt: f32, stats: &MovementStats) -> f32 {
        let idle = !input.left && !input.right;
        let target = if input.right {
            stats.move_speed
        } else if input.left {
            -stats.move_speed
        } else {
            0.0
        };

        let step = stats.accel * dt;
        if vel_x < target {
            (vel_x + step).min(target)
        } else if vel_x > target {
            (vel_x - step).max(target)
        } else if idle {
            Self::apply_friction(vel_x, dt, stats)
        } else {
            vel_x
        }
    }

    /// Friction toward zero, never past it
    fn apply_friction(vel_x: f32, dt: f32, stats: &MovementStats) -> f32 {
        let decay = stats.friction * dt;
        if vel_x.abs() < decay {
            0.0
        } else {
            vel_x - decay.copysign(vel_x)
        }
    }

    /// Linear cooldown decay, clamped at zero
    pub fn update_cooldown(cooldown: f32, dt: f32) -> f32 {
        (cooldown - dt).max(0.0)
    }
}
