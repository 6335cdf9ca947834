//! Isolated command execution
//!
//! A command runs on a tokio blocking-pool thread, away from the caller's
//! stack. Its outcome (value, error, or captured panic) travels back over a
//! one-shot channel.

use crate::Command;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use tally_core::{CalcError, Outcome};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Default time box for a single command
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Run `command` on a worker thread and send exactly one message on `outcome`.
///
/// The message is the command's result, its error, or an
/// `IsolatedExecutionFailure` if the command panicked or no runtime is
/// available to host the worker.
pub fn execute_isolated(command: Box<dyn Command>, outcome: oneshot::Sender<Outcome>) {
    let handle = match Handle::try_current() {
        Ok(handle) => handle,
        Err(e) => {
            let _ = outcome.send(Err(CalcError::isolation(format!("no async runtime: {}", e))));
            return;
        }
    };

    handle.spawn_blocking(move || {
        let name = command.name().to_string();
        let result = panic::catch_unwind(AssertUnwindSafe(|| command.execute()))
            .unwrap_or_else(|payload| {
                Err(CalcError::isolation(format!(
                    "{} panicked: {}",
                    name,
                    panic_message(payload.as_ref())
                )))
            });

        if outcome.send(result).is_err() {
            debug!(command = %name, "caller stopped waiting, outcome discarded");
        }
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// How long the caller waits for an isolated command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Isolation {
    timeout: Option<Duration>,
}

impl Isolation {
    /// Wait as long as the command takes
    pub fn unbounded() -> Self {
        Self { timeout: None }
    }

    /// Give up after `limit`. A zero limit means unbounded.
    pub fn with_timeout(limit: Duration) -> Self {
        if limit.is_zero() {
            Self::unbounded()
        } else {
            Self { timeout: Some(limit) }
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Execute `command` isolated and wait for its single outcome.
    ///
    /// On timeout the worker is abandoned: it runs to completion in the
    /// background and its late result is dropped.
    pub async fn run(&self, command: Box<dyn Command>) -> Outcome {
        let name = command.name().to_string();
        let (tx, rx) = oneshot::channel();
        execute_isolated(command, tx);

        let received = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, rx).await {
                Ok(received) => received,
                Err(_) => {
                    warn!(command = %name, limit_ms = limit.as_millis() as u64, "command timed out");
                    return Err(CalcError::timeout(&name, limit.as_millis()));
                }
            },
            None => rx.await,
        };

        received.unwrap_or_else(|_| {
            Err(CalcError::isolation(format!("{} worker exited without reporting", name)))
        })
    }
}

impl Default for Isolation {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }
}
