/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Heartbeat scheduling.
//!
//! This module handles gateway heartbeat timing:
//! - Ticking at the interval the server announced in Hello
//! - Staying silent until that interval is known
//! - Bookkeeping of sent heartbeats and received acknowledgements
//!
//! Heartbeats go out on every tick whether or not the previous one was
//! acknowledged; acks are recorded but never acted upon.

use std::future;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Periodic heartbeat timer for a gateway session.
#[derive(Debug, Default)]
pub struct HeartbeatScheduler {
    /// Active timer, `None` until started and after stopping.
    timer: Option<Interval>,
    /// Interval the timer was started with.
    period: Option<Duration>,
    /// Number of heartbeats sent.
    sent: u64,
    /// Number of acknowledgements received.
    acked: u64,
    /// Time the last heartbeat was sent.
    last_sent: Option<Instant>,
    /// Latency between the last heartbeat and its acknowledgement.
    last_latency: Option<Duration>,
}

impl HeartbeatScheduler {
    /// Creates a stopped scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts ticking every `period`, first tick one period from now.
    ///
    /// Restarting replaces the running timer.
    pub fn start(&mut self, period: Duration) {
        let mut timer = interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.timer = Some(timer);
        self.period = Some(period);
    }

    /// Stops the timer. Pending and future `tick` calls never complete.
    pub fn stop(&mut self) {
        self.timer = None;
    }

    /// Waits for the next tick.
    ///
    /// Never completes while the scheduler is stopped, so it can sit in a
    /// `select!` before the interval is known.
    pub async fn tick(&mut self) -> Instant {
        match self.timer.as_mut() {
            Some(timer) => timer.tick().await,
            None => future::pending().await,
        }
    }

    /// Returns true while the timer is running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Returns the interval the scheduler was started with.
    #[must_use]
    pub const fn interval(&self) -> Option<Duration> {
        self.period
    }

    /// Records that a heartbeat was written.
    pub fn on_sent(&mut self) {
        self.sent += 1;
        self.last_sent = Some(Instant::now());
    }

    /// Records a heartbeat acknowledgement.
    pub fn on_ack(&mut self) {
        self.acked += 1;
        self.last_latency = self.last_sent.map(|sent| sent.elapsed());
    }

    /// Returns the number of heartbeats sent.
    #[must_use]
    pub const fn sent_count(&self) -> u64 {
        self.sent
    }

    /// Returns the number of acknowledgements received.
    #[must_use]
    pub const fn ack_count(&self) -> u64 {
        self.acked
    }

    /// Returns the latency of the last acknowledged heartbeat.
    #[must_use]
    pub const fn last_latency(&self) -> Option<Duration> {
        self.last_latency
    }
}
