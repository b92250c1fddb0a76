//! Tag resolution - hitbox overlap, cooldowns and the "it" hand-off

use super::player::{Player, Role};

/// Tag tuning constants
#[derive(Debug, Clone, Copy)]
pub struct TagStats {
    /// Seconds both players are immune after a tag
    pub cooldown: f32,
    /// Upward bounce for the player who just handed off "it"
    pub tagger_bounce: f32,
    /// Upward bounce for the player who is now "it"
    pub tagged_bounce: f32,
}

impl Default for TagStats {
    fn default() -> Self {
        Self {
            cooldown: 0.4,
            tagger_bounce: 150.0,
            tagged_bounce: 220.0,
        }
    }
}

/// Result of a tag transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagResult {
    /// Role that was "it" and made the tag
    pub tagger: Role,
    /// Role that is "it" now
    pub tagged: Role,
}

/// Tag system for resolving "it" transitions
pub struct TagSystem;

impl TagSystem {
    /// Strict AABB overlap of two player hitboxes; touching edges do not count
    pub fn hitboxes_overlap(a: &Player, b: &Player) -> bool {
        a.x < b.right_edge() && a.right_edge() > b.x && a.y < b.bottom() && a.bottom() > b.y
    }

    /// Both players must be off cooldown
    pub fn can_tag(a: &Player, b: &Player) -> bool {
        a.tag_cooldown <= 0.0 && b.tag_cooldown <= 0.0
    }

    /// Run tag resolution once for this tick. At most one transition happens.
    pub fn resolve(first: &mut Player, second: &mut Player, stats: &TagStats) -> Option<TagResult> {
        let (tagger_role, tagger, target) = if first.is_it {
            (Role::First, first, second)
        } else if second.is_it {
            (Role::Second, second, first)
        } else {
            return None;
        };

        if !Self::hitboxes_overlap(tagger, target) || !Self::can_tag(tagger, target) {
            return None;
        }

        tagger.is_it = false;
        target.is_it = true;
        tagger.tag_cooldown = stats.cooldown;
        target.tag_cooldown = stats.cooldown;
        tagger.vel_y = -stats.tagger_bounce;
        target.vel_y = -stats.tagged_bounce;

        Some(TagResult {
            tagger: tagger_role,
            tagged: tagger_role.other(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::arena::{PLAYER_HEIGHT, PLAYER_WIDTH};
    use crate::game::player::SessionId;

    fn pair() -> (Player, Player) {
        let mut first = Player::spawn(SessionId::new(), Role::First, None);
        let mut second = Player::spawn(SessionId::new(), Role::Second, None);
        first.x = 100.0;
        first.y = 100.0;
        second.x = 110.0;
        second.y = 100.0;
        first.vel_x = 200.0;
        second.vel_x = -120.0;
        (first, second)
    }

    #[test]
    fn test_tag_transfers_it() {
        let stats = TagStats::default();
        let (mut first, mut second) = pair();

        let result = TagSystem::resolve(&mut first, &mut second, &stats);
        assert_eq!(
            result,
            Some(TagResult {
                tagger: Role::First,
                tagged: Role::Second
            })
        );
        assert!(!first.is_it);
        assert!(second.is_it);
        assert_eq!(first.tag_cooldown, 0.4);
        assert_eq!(second.tag_cooldown, 0.4);
        assert_eq!(first.vel_y, -150.0);
        assert_eq!(second.vel_y, -220.0);
        // Horizontal velocity untouched
        assert_eq!(first.vel_x, 200.0);
        assert_eq!(second.vel_x, -120.0);
    }

    #[test]
    fn test_second_can_tag_back() {
        let stats = TagStats::default();
        let (mut first, mut second) = pair();
        first.is_it = false;
        second.is_it = true;

        let result = TagSystem::resolve(&mut first, &mut second, &stats);
        assert_eq!(result.map(|r| r.tagged), Some(Role::First));
        assert!(first.is_it && !second.is_it);
    }

    #[test]
    fn test_cooldown_blocks_ping_pong() {
        let stats = TagStats::default();
        let (mut first, mut second) = pair();

        assert!(TagSystem::resolve(&mut first, &mut second, &stats).is_some());
        // Still overlapping on the next tick
        assert!(TagSystem::resolve(&mut first, &mut second, &stats).is_none());
        assert!(second.is_it);

        second.tag_cooldown = 0.0;
        assert!(TagSystem::resolve(&mut first, &mut second, &stats).is_none());
        first.tag_cooldown = 0.0;
        assert!(TagSystem::resolve(&mut first, &mut second, &stats).is_some());
        assert!(first.is_it);
    }

    #[test]
    fn test_touching_edges_do_not_tag() {
        let stats = TagStats::default();
        let (mut first, mut second) = pair();
        second.x = first.x + PLAYER_WIDTH;

        assert!(!TagSystem::hitboxes_overlap(&first, &second));
        assert!(TagSystem::resolve(&mut first, &mut second, &stats).is_none());
        assert!(first.is_it);

        second.x = first.x;
        second.y = first.y + PLAYER_HEIGHT;
        assert!(!TagSystem::hitboxes_overlap(&first, &second));
    }

    #[test]
    fn test_exactly_one_it_after_resolution() {
        let stats = TagStats::default();
        let (mut first, mut second) = pair();

        for _ in 0..10 {
            TagSystem::resolve(&mut first, &mut second, &stats);
            assert!(first.is_it ^ second.is_it);
            first.tag_cooldown = 0.0;
            second.tag_cooldown = 0.0;
        }
    }
}
