//! Matchmaking service - pairs sessions into two-player matches

use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

use crate::game::{GameMatch, JoinError, MatchHandle, MatchRegistry, Role, SessionId};
use crate::ws::protocol::ServerMsg;

/// Longest match a client may request, in seconds
pub const MAX_TIME_LIMIT_SECS: f32 = 3600.0;

/// A session's seat in a match
#[derive(Debug)]
pub struct JoinedMatch {
    pub handle: MatchHandle,
    pub role: Role,
    /// Subscribed before the role was assigned, so nothing is missed
    pub updates: broadcast::Receiver<ServerMsg>,
}

/// Matchmaking service
pub struct MatchmakingService {
    registry: Arc<MatchRegistry>,
    /// Match still waiting for its second player
    open_match: Mutex<Option<MatchHandle>>,
    default_time_limit: f32,
}

impl MatchmakingService {
    pub fn new(registry: Arc<MatchRegistry>, default_time_limit: f32) -> Self {
        Self {
            registry,
            open_match: Mutex::new(None),
            default_time_limit,
        }
    }

    /// Seat a session in the open match, or open a new one.
    ///
    /// `time_limit` only applies when this call creates the match.
    pub async fn join(
        &self,
        session: SessionId,
        color: Option<String>,
        time_limit: Option<f32>,
    ) -> Result<JoinedMatch, JoinError> {
        let mut open = self.open_match.lock().await;

        if let Some(handle) = open.take().filter(|h| !h.is_closed()) {
            let updates = handle.subscribe();
            match handle.assign_role(session, color.clone()).await {
                Ok(role) => {
                    if role == Role::First {
                        *open = Some(handle.clone());
                    }
                    info!(match_id = %handle.id, session = %session, role = ?role, "Seated in open match");
                    return Ok(JoinedMatch {
                        handle,
                        role,
                        updates,
                    });
                }
                Err(JoinError::AlreadyJoined) => {
                    *open = Some(handle);
                    return Err(JoinError::AlreadyJoined);
                }
                Err(e) => {
                    debug!(match_id = %handle.id, error = %e, "Open match unavailable, creating a new one");
                }
            }
        }

        let handle = self.create_match(sanitize_time_limit(time_limit, self.default_time_limit));
        let updates = handle.subscribe();
        let role = handle.assign_role(session, color).await?;
        *open = Some(handle.clone());

        Ok(JoinedMatch {
            handle,
            role,
            updates,
        })
    }

    /// Release the session's role in the given match
    pub async fn leave(&self, session: SessionId, handle: &MatchHandle) {
        handle.release_role(session).await;
        info!(match_id = %handle.id, session = %session, "Session left match");
    }

    /// Create a match and spawn its tick task
    fn create_match(&self, time_limit: f32) -> MatchHandle {
        let match_id = Uuid::new_v4();
        let seed = rand::random::<u64>();

        let (game_match, handle) = GameMatch::new(match_id, seed, time_limit);
        self.registry.insert(handle.clone());

        info!(match_id = %match_id, time_limit, "Created new match");

        let registry = self.registry.clone();
        tokio::spawn(async move {
            game_match.run().await;

            registry.remove(&match_id);
            info!(match_id = %match_id, "Match removed from registry");
        });

        handle
    }
}

/// Accept a client-requested limit only when it is a sane number of seconds
pub fn sanitize_time_limit(requested: Option<f32>, default: f32) -> f32 {
    requested
        .filter(|t| t.is_finite() && *t > 0.0 && *t <= MAX_TIME_LIMIT_SECS)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    fn service() -> (MatchmakingService, Arc<MatchRegistry>) {
        let registry = Arc::new(MatchRegistry::new());
        (MatchmakingService::new(registry.clone(), 90.0), registry)
    }

    #[test]
    fn test_sanitize_time_limit() {
        assert_eq!(sanitize_time_limit(None, 90.0), 90.0);
        assert_eq!(sanitize_time_limit(Some(30.0), 90.0), 30.0);
        assert_eq!(sanitize_time_limit(Some(-1.0), 90.0), 90.0);
        assert_eq!(sanitize_time_limit(Some(f32::NAN), 90.0), 90.0);
        assert_eq!(sanitize_time_limit(Some(1e9), 90.0), 90.0);
    }

    #[tokio::test]
    async fn test_pairs_sessions() {
        let (service, registry) = service();

        let a = assert_ok!(service.join(SessionId::new(), None, Some(45.0)).await);
        let b = assert_ok!(service.join(SessionId::new(), None, None).await);
        assert_eq!(a.role, Role::First);
        assert_eq!(b.role, Role::Second);
        assert_eq!(a.handle.id, b.handle.id);

        let snapshot = a.handle.snapshot().await.unwrap();
        assert_eq!(snapshot.time_limit, 45.0);

        // Third session opens a fresh match
        let c = assert_ok!(service.join(SessionId::new(), None, None).await);
        assert_eq!(c.role, Role::First);
        assert_ne!(c.handle.id, a.handle.id);
        assert_eq!(registry.active_matches(), 2);
        assert_eq!(registry.total_players(), 3);
    }

    #[tokio::test]
    async fn test_rejoin_same_session_rejected() {
        let (service, _) = service();
        let session = SessionId::new();

        assert_ok!(service.join(session, None, None).await);
        let rejoin = service.join(session, None, None).await;
        assert!(matches!(rejoin, Err(JoinError::AlreadyJoined)));
    }

    #[tokio::test]
    async fn test_vacated_open_match_is_replaced() {
        let (service, _) = service();
        let session = SessionId::new();

        let first = assert_ok!(service.join(session, None, None).await);
        service.leave(session, &first.handle).await;

        let next = assert_ok!(service.join(SessionId::new(), None, None).await);
        assert_eq!(next.role, Role::First);
    }
}
