//! The throttled action and its pending-execution state machine.
//!
//! # States
//!
//! - **Idle**: no timer scheduled.
//! - **Pending**: one timer scheduled and one [`SharedFuture`] outstanding.
//!
//! [`ThrottledAction::urge`] moves Idle to Pending when the interval has not
//! yet elapsed; the timer firing moves Pending back to Idle. All state
//! transitions happen under one lock. The action itself runs outside it.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, error, trace, warn};

use super::config::ThrottleConfig;
use super::future::SharedFuture;
use super::timer::{Timer, TimerHandle};
use crate::error::{Error, Result};

type ActionFn<T> = Box<dyn Fn() -> T + Send + Sync + 'static>;

struct Pending<T> {
    timer: TimerHandle,
    future: SharedFuture<T>,
}

struct ThrottleState<T> {
    last_execute: Option<Instant>,
    pending: Option<Pending<T>>,
}

struct Shared<T> {
    action: ActionFn<T>,
    interval: Duration,
    state: Mutex<ThrottleState<T>>,
    /// Serializes action invocations.
    running: Mutex<()>,
}

impl<T: Clone + Send + 'static> Shared<T> {
    fn run(&self) -> T {
        let _running = self.running.lock();
        (self.action)()
    }

    /// Timer callback: leaves Pending, runs the action, resolves the future.
    fn fire(&self) {
        let future = {
            let mut state = self.state.lock();
            match state.pending.take() {
                Some(pending) => {
                    state.last_execute = Some(Instant::now());
                    pending.future
                }
                None => return,
            }
        };

        debug!("throttled execution fired");
        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| self.run())) {
            Ok(value) => Ok(value),
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                error!(panic = %msg, "throttled action panicked on the timer thread");
                Err(Error::ActionPanicked(msg))
            }
        };
        future.complete(outcome);
    }
}

/// Runs an action at most once per interval, coalescing requests.
///
/// - [`urge`](Self::urge) requests a throttled run. If the interval has
///   elapsed since the last execution the action runs right away on the
///   caller's thread (leading edge). Otherwise a single run is scheduled for
///   the end of the interval (trailing edge) and every request made in the
///   meantime receives the same [`SharedFuture`].
/// - [`execute_immediately`](Self::execute_immediately) bypasses throttling.
///
/// Execution time is recorded when an execution starts. The action never
/// runs concurrently with itself and must not call back into the
/// `ThrottledAction` that owns it.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
/// use u_inventory::throttle::ThrottledAction;
///
/// let count = Arc::new(AtomicUsize::new(0));
/// let c = Arc::clone(&count);
/// let action = ThrottledAction::new(
///     move || c.fetch_add(1, Ordering::SeqCst) + 1,
///     Duration::from_millis(50),
/// );
///
/// // Leading edge: runs now.
/// assert_eq!(action.urge().wait(), Ok(1));
///
/// // Within the interval: both requests share one deferred run.
/// let a = action.urge();
/// let b = action.urge();
/// assert!(a.ptr_eq(&b));
/// assert_eq!(a.wait(), Ok(2));
/// assert_eq!(b.wait(), Ok(2));
/// ```
pub struct ThrottledAction<T> {
    shared: Arc<Shared<T>>,
    timer: Timer,
}

impl<T: Clone + Send + 'static> ThrottledAction<T> {
    /// Creates a throttled action with the given minimum interval.
    ///
    /// A zero interval disables throttling: every [`urge`](Self::urge) runs
    /// the action immediately.
    pub fn new<F>(action: F, interval: Duration) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::build(Box::new(action), interval, ThrottleConfig::default().thread_name)
    }

    /// Creates a throttled action from a validated configuration.
    pub fn with_config<F>(action: F, config: ThrottleConfig) -> Result<Self>
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        config.validate()?;
        Ok(Self::build(Box::new(action), config.interval, config.thread_name))
    }

    fn build(action: ActionFn<T>, interval: Duration, thread_name: String) -> Self {
        Self {
            shared: Arc::new(Shared {
                action,
                interval,
                state: Mutex::new(ThrottleState {
                    last_execute: None,
                    pending: None,
                }),
                running: Mutex::new(()),
            }),
            timer: Timer::new(thread_name),
        }
    }

    /// Minimum interval between throttled executions.
    pub fn interval(&self) -> Duration {
        self.shared.interval
    }

    /// Runs the action now on the caller's thread and returns its result.
    ///
    /// Does not affect a pending execution, which still fires later.
    pub fn execute_immediately(&self) -> T {
        self.shared.state.lock().last_execute = Some(Instant::now());
        self.shared.run()
    }

    /// Requests a throttled execution.
    ///
    /// Never blocks on a deferred execution. Returns:
    /// - the pending future if an execution is already scheduled;
    /// - a completed future if the interval has elapsed (the action ran
    ///   on this thread);
    /// - a new pending future otherwise, resolved when the timer fires.
    ///
    /// After [`shutdown`](Self::shutdown), a request that would need the
    /// timer returns a future resolved to [`Error::Cancelled`].
    pub fn urge(&self) -> SharedFuture<T> {
        let now = Instant::now();
        let mut state = self.shared.state.lock();

        if let Some(pending) = &state.pending {
            trace!("urge coalesced into pending execution");
            return pending.future.clone();
        }

        let elapsed = state.last_execute.map(|t| now.saturating_duration_since(t));
        match elapsed {
            Some(elapsed) if elapsed < self.shared.interval => {
                let delay = self.shared.interval - elapsed;
                let future = SharedFuture::pending();
                let shared = Arc::clone(&self.shared);
                match self.timer.schedule(delay, move || shared.fire()) {
                    Ok(timer) => {
                        debug!(?delay, "throttled execution scheduled");
                        state.pending = Some(Pending {
                            timer,
                            future: future.clone(),
                        });
                        future
                    }
                    Err(err) => {
                        warn!(error = %err, "cannot schedule throttled execution");
                        SharedFuture::resolved(Err(err))
                    }
                }
            }
            _ => {
                state.last_execute = Some(now);
                drop(state);
                SharedFuture::completed(self.shared.run())
            }
        }
    }

    /// Returns `true` while a deferred execution is pending.
    pub fn is_scheduled(&self) -> bool {
        self.shared.state.lock().pending.is_some()
    }

    /// Time since the last execution started, or `None` if the action has
    /// never run.
    pub fn since_last_execute(&self) -> Option<Duration> {
        self.since_last_execute_at(Instant::now())
    }

    /// Like [`since_last_execute`](Self::since_last_execute), measured
    /// against `now`. Saturates to zero if `now` precedes the execution.
    pub fn since_last_execute_at(&self, now: Instant) -> Option<Duration> {
        self.shared
            .state
            .lock()
            .last_execute
            .map(|t| now.saturating_duration_since(t))
    }

    /// Cancels the pending execution, if any, resolving its future to
    /// [`Error::Cancelled`]. Returns `true` if an execution was cancelled.
    pub fn cancel_pending(&self) -> bool {
        let pending = self.shared.state.lock().pending.take();
        match pending {
            Some(pending) => {
                pending.timer.cancel();
                pending.future.complete(Err(Error::Cancelled));
                debug!("pending throttled execution cancelled");
                true
            }
            None => false,
        }
    }

    /// Stops the timer thread.
    ///
    /// A pending execution is cancelled and its future resolves to
    /// [`Error::Cancelled`]. An execution already running is allowed to
    /// finish. Leading-edge execution through [`urge`](Self::urge) and
    /// [`execute_immediately`](Self::execute_immediately) keeps working.
    pub fn shutdown(&self) {
        self.timer.shutdown();
        self.cancel_pending();
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        self.timer.is_shut_down()
    }
}

impl<T> fmt::Debug for ThrottledAction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("ThrottledAction")
            .field("interval", &self.shared.interval)
            .field("last_execute", &state.last_execute)
            .field("scheduled", &state.pending.is_some())
            .finish()
    }
}

impl<T> Drop for ThrottledAction<T> {
    fn drop(&mut self) {
        self.timer.shutdown();
        let pending = self.shared.state.lock().pending.take();
        if let Some(pending) = pending {
            pending.timer.cancel();
            pending.future.complete(Err(Error::Cancelled));
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
