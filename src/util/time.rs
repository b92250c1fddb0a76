//! Time utilities for game simulation

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Get current Unix timestamp in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Server start time for uptime tracking
static SERVER_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Tick rate configuration
pub const SIMULATION_TPS: u32 = 60; // 60 ticks per second
pub const SNAPSHOT_TPS: u32 = 20; // 20 snapshots per second

/// Longest wall-clock step (seconds) the simulation will integrate
pub const MAX_TICK_DT: f32 = 0.05;

/// Nominal duration of one simulation tick
pub fn tick_duration() -> Duration {
    Duration::from_micros(1_000_000 / SIMULATION_TPS as u64)
}

/// Wall-clock reference for per-tick `dt`.
///
/// The reference always advances, so a stalled tick does not inflate the
/// next one.
#[derive(Debug, Clone, Default)]
pub struct TickClock {
    last: Option<Instant>,
}

impl TickClock {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Set the reference without producing a step
    pub fn start(&mut self, now: Instant) {
        self.last = Some(now);
    }

    pub fn is_started(&self) -> bool {
        self.last.is_some()
    }

    /// Seconds since the previous call, or `None` when the clock has not
    /// started or the gap exceeds [`MAX_TICK_DT`].
    pub fn advance(&mut self, now: Instant) -> Option<f32> {
        let last = self.last.replace(now)?;
        let dt = now.saturating_duration_since(last).as_secs_f32();
        (dt <= MAX_TICK_DT).then_some(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_measures_delta() {
        let t0 = Instant::now();
        let mut clock = TickClock::new();
        assert_eq!(clock.advance(t0), None);
        assert!(clock.is_started());

        let dt = clock.advance(t0 + Duration::from_millis(16)).unwrap();
        assert!((dt - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_clock_skips_stall_but_advances() {
        let t0 = Instant::now();
        let mut clock = TickClock::new();
        clock.start(t0);

        assert_eq!(clock.advance(t0 + Duration::from_millis(120)), None);
        let dt = clock.advance(t0 + Duration::from_millis(137)).unwrap();
        assert!((dt - 0.017).abs() < 1e-6);
    }

    #[test]
    fn test_clock_accepts_ceiling_exactly() {
        let t0 = Instant::now();
        let mut clock = TickClock::new();
        clock.start(t0);
        assert!(clock.advance(t0 + Duration::from_millis(50)).is_some());
    }
}
