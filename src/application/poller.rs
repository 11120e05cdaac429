//! Progress poller
//!
//! Fixed-cadence tick source that drives progress publishing. It is started
//! once when the controller comes up and stopped once at teardown; ticks that
//! are missed while the owner is busy are skipped rather than queued.

use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Running,
    Stopped,
}

pub struct ProgressPoller {
    period: Duration,
    state: PollerState,
    ticker: Option<Interval>,
    ticks: u64,
}

impl ProgressPoller {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            state: PollerState::Idle,
            ticker: None,
            ticks: 0,
        }
    }

    /// Begin ticking; the first tick fires one period from now
    pub fn start(&mut self) -> Result<()> {
        if self.state != PollerState::Idle {
            return Err(DomainError::InvalidStateTransition(format!(
                "Cannot start progress poller from {:?}",
                self.state
            )));
        }

        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.ticker = Some(ticker);
        self.state = PollerState::Running;
        debug!("Progress poller started ({:?})", self.period);
        Ok(())
    }

    /// Cancel the timer; no tick completes afterwards
    pub fn stop(&mut self) -> Result<()> {
        if self.state != PollerState::Running {
            return Err(DomainError::InvalidStateTransition(format!(
                "Cannot stop progress poller from {:?}",
                self.state
            )));
        }

        self.ticker = None;
        self.state = PollerState::Stopped;
        debug!("Progress poller stopped after {} ticks", self.ticks);
        Ok(())
    }

    /// Wait for the next tick. Pending forever unless running.
    ///
    /// Cancel safe, so it can sit in a `select!` next to other sources.
    pub async fn tick(&mut self) {
        match self.ticker.as_mut() {
            Some(ticker) => {
                ticker.tick().await;
                self.ticks += 1;
            }
            None => std::future::pending::<()>().await,
        }
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PollerState::Running
    }

    /// Ticks observed so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_elapsed(since: Instant, millis: u64) {
        let elapsed = Instant::now() - since;
        assert!(elapsed >= Duration::from_millis(millis), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(millis + 1), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_every_period() {
        let mut poller = ProgressPoller::new(Duration::from_millis(100));
        poller.start().unwrap();

        let started = Instant::now();
        poller.tick().await;
        assert_elapsed(started, 100);
        poller.tick().await;
        assert_elapsed(started, 200);
        assert_eq!(poller.ticks(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missed_ticks_are_skipped() {
        let mut poller = ProgressPoller::new(Duration::from_millis(100));
        poller.start().unwrap();

        tokio::time::advance(Duration::from_millis(450)).await;
        poller.tick().await;
        let after_burst = Instant::now();
        poller.tick().await;

        assert_eq!(poller.ticks(), 2);
        assert!(Instant::now() > after_burst);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_and_stop_exactly_once() {
        let mut poller = ProgressPoller::new(Duration::from_millis(100));
        assert_eq!(poller.state(), PollerState::Idle);
        tokio_test::assert_err!(poller.stop());

        tokio_test::assert_ok!(poller.start());
        tokio_test::assert_err!(poller.start());
        assert!(poller.is_running());

        tokio_test::assert_ok!(poller.stop());
        tokio_test::assert_err!(poller.stop());
        tokio_test::assert_err!(poller.start());
        assert_eq!(poller.state(), PollerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_poller_never_ticks() {
        let mut poller = ProgressPoller::new(Duration::from_millis(100));
        poller.start().unwrap();
        poller.stop().unwrap();

        let waited = tokio::time::timeout(Duration::from_secs(1), poller.tick()).await;
        assert!(waited.is_err());
        assert_eq!(poller.ticks(), 0);
    }
}
