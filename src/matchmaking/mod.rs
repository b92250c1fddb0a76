//! Matchmaking - pairs sessions into matches

pub mod service;

pub use service::{JoinedMatch, MatchmakingService};
