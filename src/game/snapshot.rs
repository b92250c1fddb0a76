//! Snapshot building and throttling

use crate::ws::protocol::{GameEvent, MatchSnapshot, PlayerSnapshot, ServerMsg};

use super::player::{Player, Role};
use super::r#match::MatchState;

/// Builds snapshots for network transmission
pub struct SnapshotBuilder {
    /// Tick counter since last snapshot
    ticks_since_snapshot: u32,
    /// Snapshot interval in ticks
    snapshot_interval: u32,
    /// Events buffered until the next snapshot goes out
    pending_events: Vec<GameEvent>,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            ticks_since_snapshot: 0,
            snapshot_interval: snapshot_interval.max(1),
            pending_events: Vec::new(),
        }
    }

    /// Check if it's time to send a snapshot
    pub fn should_send(&mut self) -> bool {
        self.ticks_since_snapshot += 1;
        if self.ticks_since_snapshot >= self.snapshot_interval {
            self.ticks_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force snapshot on next check (used for important events)
    pub fn force_next(&mut self) {
        self.ticks_since_snapshot = self.snapshot_interval;
    }

    /// Buffer events; any event forces the next snapshot
    pub fn record(&mut self, events: Vec<GameEvent>) {
        if !events.is_empty() {
            self.pending_events.extend(events);
            self.force_next();
        }
    }

    /// Build a snapshot message, draining buffered events
    pub fn build(&mut self, state: &MatchState) -> ServerMsg {
        ServerMsg::Snapshot {
            tick: state.tick,
            state: state.snapshot(),
            events: std::mem::take(&mut self.pending_events),
        }
    }
}

impl PlayerSnapshot {
    pub fn from_player(role: Role, player: &Player) -> Self {
        Self {
            role,
            session_id: player.session,
            color: player.color.clone(),
            x: player.x,
            y: player.y,
            vel_x: player.vel_x,
            vel_y: player.vel_y,
            on_ground: player.on_ground,
            jumps_remaining: player.jumps_remaining,
            is_it: player.is_it,
            tag_cooldown: player.tag_cooldown,
            input: player.input,
        }
    }
}

impl MatchState {
    /// Read-only view of the match. Only ever called between ticks, so it never
    /// observes a half-applied step.
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            match_id: self.id,
            phase: self.phase,
            elapsed: self.elapsed,
            time_limit: self.time_limit,
            finished: self.is_finished(),
            first_it_time: self.first_it_time,
            second_it_time: self.second_it_time,
            players: self
                .players
                .iter()
                .map(|(role, p)| PlayerSnapshot::from_player(role, p))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::player::SessionId;
    use uuid::Uuid;

    #[test]
    fn test_interval_throttles() {
        let mut builder = SnapshotBuilder::new(3);
        assert!(!builder.should_send());
        assert!(!builder.should_send());
        assert!(builder.should_send());
        assert!(!builder.should_send());
    }

    #[test]
    fn test_events_force_and_drain() {
        let mut builder = SnapshotBuilder::new(3);
        let mut state = MatchState::new(Uuid::new_v4(), 1, 90.0);
        state.assign_role(SessionId::new(), None).unwrap();

        builder.record(vec![GameEvent::Respawned { role: Role::First }]);
        assert!(builder.should_send());

        match builder.build(&state) {
            ServerMsg::Snapshot { state, events, .. } => {
                assert_eq!(events.len(), 1);
                assert_eq!(state.players.len(), 1);
                assert_eq!(state.players[0].role, Role::First);
            }
            other => panic!("unexpected message: {other:?}"),
        }

        match builder.build(&state) {
            ServerMsg::Snapshot { events, .. } => assert!(events.is_empty()),
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
