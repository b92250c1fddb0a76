//! Match state and authoritative tick loop

use dashmap::DashMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::interval;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::util::time::{tick_duration, TickClock, SIMULATION_TPS, SNAPSHOT_TPS};
use crate::ws::protocol::{GameEvent, MatchResult, MatchSnapshot, ServerMsg};

use super::arena::Arena;
use super::collision::CollisionSystem;
use super::physics::{MovementStats, PhysicsSystem};
use super::player::{InputFlags, Player, Role, RoleSlots, SessionId};
use super::snapshot::SnapshotBuilder;
use super::tag::{TagStats, TagSystem};
use super::MatchCommand;

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    /// Fewer than two roles filled
    Waiting,
    /// Both roles filled, tick loop active
    Running,
    /// Time limit reached (terminal)
    Finished,
}

/// Role assignment failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JoinError {
    #[error("Match is full")]
    MatchFull,

    #[error("Session already holds a role in this match")]
    AlreadyJoined,

    #[error("Match is no longer accepting players")]
    MatchClosed,
}

impl JoinError {
    /// Stable code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            JoinError::MatchFull => "match_full",
            JoinError::AlreadyJoined => "already_joined",
            JoinError::MatchClosed => "match_closed",
        }
    }
}

/// What a single `step` did
#[derive(Debug, Default)]
pub struct TickOutcome {
    /// False when the tick was a no-op (not running, or a role is vacant)
    pub stepped: bool,
    pub events: Vec<GameEvent>,
    /// True on the tick the match transitioned to `Finished`
    pub finished: bool,
}

/// Match state (owned by match task)
pub struct MatchState {
    pub id: Uuid,
    pub phase: MatchPhase,
    pub tick: u64,
    pub elapsed: f32,
    pub time_limit: f32,
    pub first_it_time: f32,
    pub second_it_time: f32,
    pub players: RoleSlots,
    pub sessions: HashMap<SessionId, Role>,
    pub arena: Arena,
    pub movement: MovementStats,
    pub tag: TagStats,
    pub rng: ChaCha8Rng,
}

impl MatchState {
    pub fn new(id: Uuid, seed: u64, time_limit: f32) -> Self {
        Self::with_arena(id, seed, time_limit, Arena::default())
    }

    pub fn with_arena(id: Uuid, seed: u64, time_limit: f32, arena: Arena) -> Self {
        Self {
            id,
            phase: MatchPhase::Waiting,
            tick: 0,
            elapsed: 0.0,
            time_limit,
            first_it_time: 0.0,
            second_it_time: 0.0,
            players: RoleSlots::default(),
            sessions: HashMap::new(),
            arena,
            movement: MovementStats::default(),
            tag: TagStats::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase == MatchPhase::Finished
    }

    pub fn role_of(&self, session: &SessionId) -> Option<Role> {
        self.sessions.get(session).copied()
    }

    /// Give the session the first vacant role. Filling the second role starts
    /// the match.
    pub fn assign_role(&mut self, session: SessionId, color: Option<String>) -> Result<Role, JoinError> {
        if self.sessions.contains_key(&session) {
            return Err(JoinError::AlreadyJoined);
        }
        if self.phase != MatchPhase::Waiting {
            return Err(JoinError::MatchClosed);
        }
        let role = self.players.vacant_role().ok_or(JoinError::MatchFull)?;

        self.players.insert(role, Player::spawn(session, role, color));
        self.sessions.insert(session, role);

        if self.players.vacant_role().is_none() {
            self.phase = MatchPhase::Running;
        }

        Ok(role)
    }

    /// Remove the session's player record. A running match with a vacant role
    /// is abandoned and no longer steps.
    pub fn release_role(&mut self, session: &SessionId) -> Option<Role> {
        let role = self.sessions.remove(session)?;
        self.players.remove(role);
        Some(role)
    }

    /// Latest-wins write of the session's held keys
    pub fn set_input(&mut self, session: &SessionId, input: InputFlags) -> bool {
        let Some(role) = self.role_of(session) else {
            return false;
        };
        match self.players.get_mut(role) {
            Some(player) => {
                player.input = input;
                true
            }
            None => false,
        }
    }

    /// Role currently "it"
    pub fn it_role(&self) -> Option<Role> {
        self.players
            .iter()
            .find(|(_, p)| p.is_it)
            .map(|(role, _)| role)
    }

    /// Run one simulation step of `dt` seconds
    pub fn step(&mut self, dt: f32) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if self.phase != MatchPhase::Running {
            return outcome;
        }
        let Some((first, second)) = self.players.both_mut() else {
            return outcome;
        };

        for (role, player) in [(Role::First, &mut *first), (Role::Second, &mut *second)] {
            PhysicsSystem::integrate(player, dt, &self.movement);
            if let Some(contact) = CollisionSystem::resolve_platforms(player, dt, &self.arena) {
                trace!(match_id = %self.id, role = ?role, contact = ?contact, "Platform contact");
            }
            if CollisionSystem::enforce_bounds(player, &self.arena, &mut self.rng) {
                outcome.events.push(GameEvent::Respawned { role });
            }
        }

        if let Some(tag) = TagSystem::resolve(first, second, &self.tag) {
            outcome.events.push(GameEvent::Tagged {
                tagger: tag.tagger,
                tagged: tag.tagged,
            });
        }

        self.tick += 1;
        self.elapsed += dt;
        match self.it_role() {
            Some(Role::First) => self.first_it_time += dt,
            Some(Role::Second) => self.second_it_time += dt,
            None => {}
        }

        if self.elapsed >= self.time_limit {
            self.phase = MatchPhase::Finished;
            outcome.finished = true;
        }

        outcome.stepped = true;
        outcome
    }

    /// Running with a vacant role
    pub fn is_abandoned(&self) -> bool {
        self.phase == MatchPhase::Running && self.players.len() < 2
    }

    /// Final standings; the role with less time as "it" wins
    pub fn result(&self) -> MatchResult {
        let abandoned = self.is_abandoned();
        let winner = if abandoned {
            None
        } else if self.first_it_time < self.second_it_time {
            Some(Role::First)
        } else if self.second_it_time < self.first_it_time {
            Some(Role::Second)
        } else {
            None
        };

        MatchResult {
            match_id: self.id,
            elapsed: self.elapsed,
            first_it_time: self.first_it_time,
            second_it_time: self.second_it_time,
            winner,
            abandoned,
        }
    }
}

/// Handle to a running match
#[derive(Clone, Debug)]
pub struct MatchHandle {
    pub id: Uuid,
    pub command_tx: mpsc::Sender<MatchCommand>,
    pub snapshot_tx: broadcast::Sender<ServerMsg>,
    pub player_count: Arc<AtomicUsize>,
}

impl MatchHandle {
    pub fn player_count(&self) -> usize {
        self.player_count.load(Ordering::Relaxed)
    }

    /// True once the match task has exited
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerMsg> {
        self.snapshot_tx.subscribe()
    }

    pub async fn assign_role(&self, session: SessionId, color: Option<String>) -> Result<Role, JoinError> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(MatchCommand::AssignRole {
                session,
                color,
                reply,
            })
            .await
            .map_err(|_| JoinError::MatchClosed)?;
        rx.await.map_err(|_| JoinError::MatchClosed)?
    }

    pub async fn release_role(&self, session: SessionId) {
        if self
            .command_tx
            .send(MatchCommand::ReleaseRole { session })
            .await
            .is_err()
        {
            debug!(match_id = %self.id, session = %session, "Release after match closed");
        }
    }

    /// Returns false if the match task is gone
    pub async fn set_input(&self, session: SessionId, input: InputFlags) -> bool {
        self.command_tx
            .send(MatchCommand::SetInput { session, input })
            .await
            .is_ok()
    }

    pub async fn snapshot(&self) -> Option<MatchSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(MatchCommand::Snapshot { reply })
            .await
            .ok()?;
        rx.await.ok()
    }
}

/// Registry of all active matches
pub struct MatchRegistry {
    matches: DashMap<Uuid, MatchHandle>,
}

impl MatchRegistry {
    pub fn new() -> Self {
        Self {
            matches: DashMap::new(),
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<MatchHandle> {
        self.matches.get(id).map(|m| m.value().clone())
    }

    pub fn insert(&self, handle: MatchHandle) {
        self.matches.insert(handle.id, handle);
    }

    pub fn remove(&self, id: &Uuid) -> Option<MatchHandle> {
        self.matches.remove(id).map(|(_, h)| h)
    }

    pub fn active_matches(&self) -> usize {
        self.matches.len()
    }

    pub fn total_players(&self) -> usize {
        self.matches
            .iter()
            .map(|m| m.value().player_count())
            .sum()
    }
}

impl Default for MatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The authoritative game match
pub struct GameMatch {
    state: MatchState,
    command_rx: mpsc::Receiver<MatchCommand>,
    snapshot_tx: broadcast::Sender<ServerMsg>,
    snapshot_builder: SnapshotBuilder,
    player_count: Arc<AtomicUsize>,
    clock: TickClock,
    vacated: bool,
}

impl GameMatch {
    /// Create a new match
    pub fn new(id: Uuid, seed: u64, time_limit: f32) -> (Self, MatchHandle) {
        Self::from_state(MatchState::new(id, seed, time_limit))
    }

    pub fn from_state(state: MatchState) -> (Self, MatchHandle) {
        let (command_tx, command_rx) = mpsc::channel(256);
        let (snapshot_tx, _) = broadcast::channel(64);
        let player_count = Arc::new(AtomicUsize::new(0));

        let handle = MatchHandle {
            id: state.id,
            command_tx,
            snapshot_tx: snapshot_tx.clone(),
            player_count: player_count.clone(),
        };

        let snapshot_interval = SIMULATION_TPS / SNAPSHOT_TPS;
        let game_match = Self {
            state,
            command_rx,
            snapshot_tx,
            snapshot_builder: SnapshotBuilder::new(snapshot_interval),
            player_count,
            clock: TickClock::new(),
            vacated: false,
        };

        (game_match, handle)
    }

    /// Run the authoritative tick loop until the match finishes or every role
    /// is vacated
    pub async fn run(mut self) {
        info!(
            match_id = %self.state.id,
            time_limit = self.state.time_limit,
            "Match created"
        );

        let mut tick_interval = interval(tick_duration());
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tick_interval.tick().await;

            if !self.process_commands() {
                info!(match_id = %self.state.id, "All handles dropped, closing match");
                break;
            }

            if self.vacated {
                info!(match_id = %self.state.id, "All players left, closing match");
                break;
            }

            if self.state.is_abandoned() {
                warn!(match_id = %self.state.id, "Match abandoned with a vacant role");
                break;
            }

            if self.state.phase == MatchPhase::Running {
                if let Some(dt) = self.clock.advance(Instant::now()) {
                    let outcome = self.state.step(dt);
                    self.snapshot_builder.record(outcome.events);
                    if outcome.finished {
                        self.snapshot_builder.force_next();
                    }
                } else {
                    debug!(match_id = %self.state.id, "Tick skipped");
                }
            }

            if self.snapshot_builder.should_send() {
                let snapshot = self.snapshot_builder.build(&self.state);
                let _ = self.snapshot_tx.send(snapshot);
            }

            if self.state.is_finished() {
                break;
            }
        }

        if self.state.is_finished() || self.state.is_abandoned() {
            let result = self.state.result();
            info!(
                match_id = %self.state.id,
                elapsed = result.elapsed,
                first_it_time = result.first_it_time,
                second_it_time = result.second_it_time,
                winner = ?result.winner,
                abandoned = result.abandoned,
                "Match finished"
            );
            let _ = self.snapshot_tx.send(ServerMsg::MatchEnd { result });
        }
    }

    /// Drain pending commands in arrival order. Returns false when every
    /// sender is gone.
    fn process_commands(&mut self) -> bool {
        loop {
            match self.command_rx.try_recv() {
                Ok(command) => self.handle_command(command),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn handle_command(&mut self, command: MatchCommand) {
        match command {
            MatchCommand::AssignRole {
                session,
                color,
                reply,
            } => {
                let result = self.handle_assign(session, color);
                let _ = reply.send(result);
            }
            MatchCommand::ReleaseRole { session } => {
                self.handle_release(session);
            }
            MatchCommand::SetInput { session, input } => {
                if !self.state.set_input(&session, input) {
                    debug!(match_id = %self.state.id, session = %session, "Input for unknown session");
                }
            }
            MatchCommand::Snapshot { reply } => {
                let _ = reply.send(self.state.snapshot());
            }
        }
    }

    fn handle_assign(&mut self, session: SessionId, color: Option<String>) -> Result<Role, JoinError> {
        let role = match self.state.assign_role(session, color) {
            Ok(role) => role,
            Err(e) => {
                warn!(match_id = %self.state.id, session = %session, error = %e, "Role assignment rejected");
                return Err(e);
            }
        };

        // A join drained in the same batch as the last release keeps the match alive
        self.vacated = false;
        self.player_count
            .store(self.state.players.len(), Ordering::Relaxed);
        self.snapshot_builder.force_next();

        info!(
            match_id = %self.state.id,
            session = %session,
            role = ?role,
            "Player joined match"
        );

        if self.state.phase == MatchPhase::Running && !self.clock.is_started() {
            self.clock.start(Instant::now());
            let _ = self.snapshot_tx.send(ServerMsg::MatchStarted {
                match_id: self.state.id,
            });
            info!(match_id = %self.state.id, "Match started");
        }

        Ok(role)
    }

    fn handle_release(&mut self, session: SessionId) {
        let Some(role) = self.state.release_role(&session) else {
            return;
        };

        self.player_count
            .store(self.state.players.len(), Ordering::Relaxed);
        let _ = self.snapshot_tx.send(ServerMsg::PlayerLeft { role });
        self.snapshot_builder.force_next();

        info!(
            match_id = %self.state.id,
            session = %session,
            role = ?role,
            "Player left match"
        );

        if self.state.players.is_empty() {
            self.vacated = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_test::{assert_err, assert_ok};

    const DT: f32 = 1.0 / 60.0;

    fn running_state(time_limit: f32) -> (MatchState, SessionId, SessionId) {
        let mut state = MatchState::new(Uuid::new_v4(), 99, time_limit);
        let a = SessionId::new();
        let b = SessionId::new();
        assert_eq!(state.assign_role(a, None), Ok(Role::First));
        assert_eq!(state.phase, MatchPhase::Waiting);
        assert_eq!(state.assign_role(b, None), Ok(Role::Second));
        assert_eq!(state.phase, MatchPhase::Running);
        (state, a, b)
    }

    #[test]
    fn test_role_assignment() {
        let (mut state, a, _) = running_state(90.0);
        assert_eq!(state.assign_role(a, None), Err(JoinError::AlreadyJoined));
        assert_eq!(
            state.assign_role(SessionId::new(), None),
            Err(JoinError::MatchClosed)
        );
        assert_eq!(state.it_role(), Some(Role::First));

        let mut waiting = MatchState::new(Uuid::new_v4(), 1, 90.0);
        waiting.assign_role(SessionId::new(), None).unwrap();
        waiting.players.insert(
            Role::Second,
            Player::spawn(SessionId::new(), Role::Second, None),
        );
        assert_eq!(
            waiting.assign_role(SessionId::new(), None),
            Err(JoinError::MatchFull)
        );
    }

    #[test]
    fn test_waiting_match_does_not_step() {
        let mut state = MatchState::new(Uuid::new_v4(), 1, 90.0);
        state.assign_role(SessionId::new(), None).unwrap();
        let outcome = state.step(DT);
        assert!(!outcome.stepped);
        assert_eq!(state.elapsed, 0.0);
    }

    #[test]
    fn test_vacant_role_skips_tick() {
        let (mut state, a, _) = running_state(90.0);
        assert_eq!(state.release_role(&a), Some(Role::First));
        assert_eq!(state.release_role(&a), None);
        assert!(!state.set_input(&a, InputFlags::default()));

        let outcome = state.step(DT);
        assert!(!outcome.stepped);
        assert_eq!(state.elapsed, 0.0);
        assert_eq!(state.phase, MatchPhase::Running);

        assert!(state.is_abandoned());
        let result = state.result();
        assert!(result.abandoned);
        assert_eq!(result.winner, None);
    }

    #[test]
    fn test_jump_from_spawn() {
        let (mut state, a, _) = running_state(90.0);
        let jump = InputFlags {
            jump: true,
            ..Default::default()
        };
        assert!(state.set_input(&a, jump));

        state.step(DT);
        let first = state.players.get(Role::First).unwrap();
        assert_eq!(first.jumps_remaining, 1);
        assert!((first.vel_y - (-650.0 + 1800.0 * DT)).abs() < 1e-3);
    }

    #[test]
    fn test_finishes_at_time_limit() {
        let (mut state, _, _) = running_state(90.0);
        state.elapsed = 89.98;

        let outcome = state.step(0.05);
        assert!(outcome.finished);
        assert!((state.elapsed - 90.03).abs() < 1e-3);
        assert!(state.is_finished());

        // Terminal: further steps are no-ops
        let outcome = state.step(DT);
        assert!(!outcome.stepped);
        assert!((state.elapsed - 90.03).abs() < 1e-3);
        assert!(state.snapshot().finished);
    }

    #[test]
    fn test_it_time_accumulates_for_it_role() {
        let (mut state, _, _) = running_state(90.0);
        for _ in 0..30 {
            state.step(DT);
        }
        // Spawns are far apart, so no tag happens
        assert!((state.first_it_time - 0.5).abs() < 1e-3);
        assert_eq!(state.second_it_time, 0.0);
        assert!((state.elapsed - 0.5).abs() < 1e-3);
        assert_eq!(state.result().winner, Some(Role::Second));
    }

    #[test]
    fn test_tags_respect_cooldown_and_exclusion() {
        let (mut state, _, _) = running_state(90.0);
        let mut tag_times = Vec::new();

        for _ in 0..300 {
            // Keep the two hitboxes on top of each other
            let (x, y) = {
                let first = state.players.get(Role::First).unwrap();
                (first.x, first.y)
            };
            let second = state.players.get_mut(Role::Second).unwrap();
            second.x = x;
            second.y = y;

            let outcome = state.step(DT);
            if outcome
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::Tagged { .. }))
            {
                tag_times.push(state.elapsed);
            }

            let first_it = state.players.get(Role::First).unwrap().is_it;
            let second_it = state.players.get(Role::Second).unwrap().is_it;
            assert!(first_it ^ second_it);
        }

        assert!(tag_times.len() > 2);
        for pair in tag_times.windows(2) {
            assert!(pair[1] - pair[0] >= 0.4 - 1e-3);
        }
    }

    #[test]
    fn test_players_stay_in_bounds() {
        let (mut state, a, b) = running_state(90.0);
        state.set_input(
            &a,
            InputFlags {
                left: true,
                ..Default::default()
            },
        );
        state.set_input(
            &b,
            InputFlags {
                right: true,
                jump: true,
                ..Default::default()
            },
        );

        let max_x = state.arena.max_x();
        for _ in 0..400 {
            state.step(DT);
            for (_, p) in state.players.iter() {
                assert!(p.x >= 0.0 && p.x <= max_x);
            }
        }
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = || {
            let (mut state, a, _) = running_state(90.0);
            state.set_input(
                &a,
                InputFlags {
                    right: true,
                    ..Default::default()
                },
            );
            for _ in 0..240 {
                state.step(DT);
            }
            state.snapshot()
        };

        let (left, right) = (run(), run());
        assert_eq!(
            left.players.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>(),
            right.players.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>()
        );
        assert_eq!(left.elapsed, right.elapsed);
    }

    #[tokio::test]
    async fn test_match_task_lifecycle() {
        let (game_match, handle) = GameMatch::new(Uuid::new_v4(), 5, 90.0);
        let task = tokio::spawn(game_match.run());
        let mut rx = handle.subscribe();

        let a = SessionId::new();
        let b = SessionId::new();
        assert_eq!(assert_ok!(handle.assign_role(a, None).await), Role::First);
        assert_eq!(
            assert_ok!(handle.assign_role(b, Some("#123456".into())).await),
            Role::Second
        );
        assert_err!(handle.assign_role(SessionId::new(), None).await);
        assert_eq!(handle.player_count(), 2);

        let started = timeout(Duration::from_secs(2), async {
            loop {
                if let Ok(ServerMsg::MatchStarted { .. }) = rx.recv().await {
                    return true;
                }
            }
        })
        .await;
        assert_ok!(started);

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.phase, MatchPhase::Running);
        assert_eq!(snapshot.players.len(), 2);
        assert!(snapshot.players.iter().any(|p| p.color == "#123456"));

        handle.release_role(a).await;
        handle.release_role(b).await;
        assert_ok!(timeout(Duration::from_secs(2), task).await);
        assert!(handle.is_closed());
    }

    #[tokio::test]
    async fn test_match_task_reports_end() {
        let (game_match, handle) = GameMatch::new(Uuid::new_v4(), 5, 0.2);
        let task = tokio::spawn(game_match.run());
        let mut rx = handle.subscribe();

        assert_ok!(handle.assign_role(SessionId::new(), None).await);
        assert_ok!(handle.assign_role(SessionId::new(), None).await);

        let result = timeout(Duration::from_secs(10), async {
            loop {
                match rx.recv().await {
                    Ok(ServerMsg::MatchEnd { result }) => return Some(result),
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .await;

        let result = assert_ok!(result).expect("match end message");
        assert!(result.elapsed >= 0.2);
        assert_eq!(result.winner, Some(Role::Second));
        assert_ok!(timeout(Duration::from_secs(2), task).await);
    }

    #[tokio::test]
    async fn test_player_leaving_ends_running_match() {
        let (game_match, handle) = GameMatch::new(Uuid::new_v4(), 5, 90.0);
        let task = tokio::spawn(game_match.run());
        let mut rx = handle.subscribe();

        let a = SessionId::new();
        assert_ok!(handle.assign_role(a, None).await);
        assert_ok!(handle.assign_role(SessionId::new(), None).await);
        handle.release_role(a).await;

        let mut saw_left = false;
        let result = timeout(Duration::from_secs(2), async {
            loop {
                match rx.recv().await {
                    Ok(ServerMsg::PlayerLeft { role }) => saw_left = role == Role::First,
                    Ok(ServerMsg::MatchEnd { result }) => return Some(result),
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .await;

        let result = assert_ok!(result).expect("match end message");
        assert!(saw_left);
        assert!(result.abandoned);
        assert_eq!(result.winner, None);
        assert!(result.elapsed < 90.0);

        // The remaining player's seat is released with the task
        assert_ok!(timeout(Duration::from_secs(2), task).await);
        assert!(handle.is_closed());
    }
}
