//! Game simulation modules

pub mod arena;
pub mod collision;
pub mod r#match;
pub mod physics;
pub mod player;
pub mod snapshot;
pub mod tag;

pub use player::{InputFlags, Role, SessionId};
pub use r#match::{GameMatch, JoinError, MatchHandle, MatchRegistry};

use tokio::sync::oneshot;

use crate::ws::protocol::MatchSnapshot;

/// Commands from the networking side, drained by the match task at the start
/// of each tick
#[derive(Debug)]
pub enum MatchCommand {
    AssignRole {
        session: SessionId,
        color: Option<String>,
        reply: oneshot::Sender<Result<Role, JoinError>>,
    },
    ReleaseRole {
        session: SessionId,
    },
    SetInput {
        session: SessionId,
        input: InputFlags,
    },
    Snapshot {
        reply: oneshot::Sender<MatchSnapshot>,
    },
}
