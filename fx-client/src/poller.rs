//! Transaction status poller.
//!
//! Fetches a transaction once on subscribe, then again one interval after
//! each fetch completes, until it reaches a terminal status or a fetch fails.
//! A companion countdown restarts with every completed fetch and ticks down to
//! the next one. State is published through a `tokio::sync::watch` channel.
//!
//! Every cycle carries an epoch. Closing a handle bumps the epoch while
//! holding the channel's write lock, so a cycle that was mid-fetch can never
//! publish after `close` returns.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use fx_types::{FxError, StatusSource, Transaction, TransactionId, TransactionStatus};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

/// Timing of a polling cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Time between status fetches
    pub interval: Duration,
    /// Countdown step
    pub tick: Duration,
}

/// Shortest period a cycle will run with; timers reject a zero period.
const MIN_PERIOD: Duration = Duration::from_millis(1);

impl PollerConfig {
    /// Checked constructor. Both durations must be non-zero and the tick
    /// must not exceed the interval.
    pub fn new(interval: Duration, tick: Duration) -> Result<Self, FxError> {
        if interval.is_zero() || tick.is_zero() {
            return Err(FxError::Validation(
                "Poll interval and countdown tick must be non-zero".into(),
            ));
        }
        if tick > interval {
            return Err(FxError::Validation(
                "Countdown tick must not exceed the poll interval".into(),
            ));
        }
        Ok(Self { interval, tick })
    }

    /// Interval and tick as actually scheduled, raised to at least 1 ms.
    fn periods(&self) -> (Duration, Duration) {
        (self.interval.max(MIN_PERIOD), self.tick.max(MIN_PERIOD))
    }

    fn steps(&self) -> u32 {
        let (interval, tick) = self.periods();
        (interval.as_millis() / tick.as_millis()).clamp(1, u32::MAX as u128) as u32
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            tick: Duration::from_secs(1),
        }
    }
}

/// Where a subscription is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    /// Waiting for the first fetch.
    Fetching,
    /// Non-terminal status seen; refetching on the interval.
    Polling,
    Settled,
    Failed,
    /// A fetch failed; polling stopped until retried.
    Errored,
}

/// Time to the next refresh, as displayed. Partial seconds round up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Remaining(Duration),
    Updating,
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Countdown::Remaining(left) => write!(f, "{}s", left.as_millis().div_ceil(1000)),
            Countdown::Updating => write!(f, "Updating..."),
        }
    }
}

/// Observable state of one subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct PollSnapshot {
    pub phase: PollPhase,
    /// Last transaction fetched, kept across errors
    pub transaction: Option<Transaction>,
    pub loading: bool,
    pub error: Option<FxError>,
    pub polling: bool,
    pub countdown: Countdown,
}

impl PollSnapshot {
    fn initial(config: &PollerConfig) -> Self {
        Self {
            phase: PollPhase::Fetching,
            transaction: None,
            loading: true,
            error: None,
            polling: true,
            countdown: Countdown::Remaining(config.periods().0),
        }
    }
}

/// Starts polling subscriptions against a status source.
#[derive(Clone)]
pub struct TransactionPoller {
    source: Arc<dyn StatusSource>,
    config: PollerConfig,
}

impl TransactionPoller {
    pub fn new(source: Arc<dyn StatusSource>, config: PollerConfig) -> Self {
        Self { source, config }
    }

    /// Fetches `id` immediately and keeps polling until the returned handle
    /// is closed or dropped.
    pub fn subscribe(&self, id: TransactionId) -> PollHandle {
        let (state, _) = watch::channel(PollSnapshot::initial(&self.config));
        let mut handle = PollHandle {
            transaction_id: id,
            source: self.source.clone(),
            config: self.config,
            state: Arc::new(state),
            epoch: Arc::new(AtomicU64::new(0)),
            task: None,
        };
        handle.start();
        handle
    }
}

/// A live subscription. Dropping it stops polling.
pub struct PollHandle {
    transaction_id: TransactionId,
    source: Arc<dyn StatusSource>,
    config: PollerConfig,
    state: Arc<watch::Sender<PollSnapshot>>,
    epoch: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }

    /// The current state.
    pub fn snapshot(&self) -> PollSnapshot {
        self.state.borrow().clone()
    }

    /// A receiver notified on every state change.
    pub fn watch(&self) -> watch::Receiver<PollSnapshot> {
        self.state.subscribe()
    }

    /// Clears any error and restarts from the initial fetch.
    pub fn retry(&mut self) {
        self.close();
        self.state.send_replace(PollSnapshot::initial(&self.config));
        self.start();
    }

    /// Cancels the pending fetch and countdown. No update is published after
    /// this returns.
    pub fn close(&mut self) {
        let epoch = &self.epoch;
        self.state.send_if_modified(|_| {
            epoch.fetch_add(1, Ordering::SeqCst);
            false
        });
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!(transaction_id = %self.transaction_id, "polling closed");
        }
    }

    fn start(&mut self) {
        let cycle = Cycle {
            transaction_id: self.transaction_id,
            source: self.source.clone(),
            config: self.config,
            state: self.state.clone(),
            epoch: self.epoch.clone(),
            own_epoch: self.epoch.load(Ordering::SeqCst),
        };
        self.task = Some(tokio::spawn(cycle.run()));
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// One polling cycle, from the initial fetch to a stop.
struct Cycle {
    transaction_id: TransactionId,
    source: Arc<dyn StatusSource>,
    config: PollerConfig,
    state: Arc<watch::Sender<PollSnapshot>>,
    epoch: Arc<AtomicU64>,
    own_epoch: u64,
}

impl Cycle {
    async fn run(self) {
        tracing::debug!(transaction_id = %self.transaction_id, "polling started");

        if !self.fetch().await {
            return;
        }

        // Both timers count from the end of the last fetch.
        let (period, step) = self.config.periods();
        let now = Instant::now();
        let mut poll = interval_at(now + period, period);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tick = interval_at(now + step, step);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let steps = self.config.steps();
        let mut left = steps;

        loop {
            tokio::select! {
                biased;
                _ = tick.tick() => {
                    left = left.saturating_sub(1);
                    let countdown = if left == 0 {
                        Countdown::Updating
                    } else {
                        Countdown::Remaining(step * left)
                    };
                    if !self.publish(|snap| snap.countdown = countdown) {
                        return;
                    }
                }
                _ = poll.tick() => {
                    if !self.fetch().await {
                        return;
                    }
                    poll.reset();
                    tick.reset();
                    left = steps;
                }
            }
        }
    }

    /// Fetches once and publishes the outcome. Returns whether to keep polling.
    async fn fetch(&self) -> bool {
        let result = self.source.fetch_status(self.transaction_id).await;

        let mut keep_polling = false;
        let published = self.publish(|snap| {
            snap.loading = false;
            match result {
                Ok(tx) => {
                    snap.phase = match tx.status {
                        TransactionStatus::Settled => PollPhase::Settled,
                        TransactionStatus::Failed => PollPhase::Failed,
                        TransactionStatus::Processing | TransactionStatus::Sent => {
                            PollPhase::Polling
                        }
                    };
                    keep_polling = !tx.is_terminal();
                    if keep_polling {
                        snap.countdown = Countdown::Remaining(self.config.periods().0);
                    }
                    snap.transaction = Some(tx);
                    snap.error = None;
                }
                Err(err) => {
                    tracing::debug!(transaction_id = %self.transaction_id, error = %err, "status fetch failed");
                    snap.phase = PollPhase::Errored;
                    snap.error = Some(err);
                }
            }
            snap.polling = keep_polling;
        });

        if published && !keep_polling {
            tracing::debug!(transaction_id = %self.transaction_id, "polling stopped");
        }
        published && keep_polling
    }

    /// Applies `update` unless the cycle has been closed.
    fn publish(&self, update: impl FnOnce(&mut PollSnapshot)) -> bool {
        self.state.send_if_modified(|snap| {
            if self.epoch.load(Ordering::SeqCst) != self.own_epoch {
                return false;
            }
            update(snap);
            true
        })
    }
}
