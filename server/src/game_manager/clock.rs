use crate::game_manager::session::MatchSession;
use std::sync::Weak;
use std::time::Duration;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

pub const TURN_SECONDS: u32 = 10;
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Idle,
    Running,
    Cancelled,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The tick belongs to a clock that was cancelled or replaced.
    Stale,
    Counted(u32),
    Expired,
}

/// Per-match turn countdown.
///
/// The clock only keeps bookkeeping; the one-second ticks come from a tokio
/// task that locks the owning match and calls [`MatchSession::on_clock_tick`].
/// Every tick carries the epoch it was started with, so once `cancel` or
/// `start` bumps the epoch under the match lock, older ticks are ignored.
#[derive(Debug)]
pub struct TurnClock {
    state: ClockState,
    remaining: u32,
    epoch: u64,
    task: Option<JoinHandle<()>>,
}

impl Default for TurnClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnClock {
    pub const fn new() -> Self {
        Self {
            state: ClockState::Idle,
            remaining: TURN_SECONDS,
            epoch: 0,
            task: None,
        }
    }

    #[cfg(test)]
    pub const fn state(&self) -> ClockState {
        self.state
    }

    #[cfg(test)]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    #[cfg(test)]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Starts a full countdown, replacing any clock still running.
    pub fn start(&mut self, session: Weak<Mutex<MatchSession>>) {
        self.cancel();
        self.epoch += 1;
        self.remaining = TURN_SECONDS;
        self.state = ClockState::Running;
        let first_tick = Instant::now() + TICK_PERIOD;
        self.task = Some(tokio::spawn(run(session, self.epoch, first_tick)));
    }

    /// Stops a running clock. Returns false if it was not running.
    pub fn cancel(&mut self) -> bool {
        if self.state != ClockState::Running {
            return false;
        }
        self.state = ClockState::Cancelled;
        self.epoch += 1;
        if let Some(task) = self.task.take() {
            task.abort();
        }
        true
    }

    pub fn tick(&mut self, epoch: u64) -> Tick {
        if epoch != self.epoch || self.state != ClockState::Running {
            return Tick::Stale;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state = ClockState::Expired;
            Tick::Expired
        } else {
            Tick::Counted(self.remaining)
        }
    }

    /// Re-enters `Running` after expiry. The same tick task keeps going.
    pub fn restart(&mut self) {
        if self.state == ClockState::Expired {
            self.remaining = TURN_SECONDS;
            self.state = ClockState::Running;
        }
    }
}

impl Drop for TurnClock {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run(session: Weak<Mutex<MatchSession>>, epoch: u64, first_tick: Instant) {
    let mut ticker = time::interval_at(first_tick, TICK_PERIOD);
    // A late tick still counts as one second.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let Some(session) = session.upgrade() else {
            return;
        };
        let mut game = session.lock().await;
        if !game.on_clock_tick(epoch) {
            tracing::debug!(room_id = %game.room_id, epoch, "Stale clock tick, stopping");
            return;
        }
    }
}
