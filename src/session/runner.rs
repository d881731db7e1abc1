// src/session/runner.rs
//! Frame-cadence session driver.
//!
//! An explicit cooperative loop with one suspension point per frame: a tokio
//! interval ticks at the capture cadence, pulls at most one sample from the
//! source, and runs the pipeline synchronously. Missed ticks are skipped, so
//! a slow frame sheds the next one instead of queueing it. Stopping cancels
//! future ticks; the in-flight frame runs to completion and the session is
//! handed back to the caller.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::session::{RawSample, Session};

/// Handle to a running frame loop.
pub struct SessionRunner {
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<Session>,
}

impl SessionRunner {
    /// Spawn the frame loop on the current tokio runtime.
    ///
    /// `source` is polled once per tick; returning `None` means no frame
    /// arrived in time, which is not an error.
    pub fn spawn<F>(mut session: Session, frame_interval: Duration, mut source: F) -> Self
    where
        F: FnMut() -> Option<RawSample> + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(frame_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            debug!(?frame_interval, "frame loop started");

            loop {
                tokio::select! {
                    changed = stop_rx.changed() => {
                        // A dropped sender also ends the loop.
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        if let Some(sample) = source() {
                            if let Err(error) = session.push_and_process(sample) {
                                warn!(%error, "dropping bad sample");
                            }
                        }
                    }
                }
            }

            debug!("frame loop stopped");
            session
        });

        Self { stop_tx, join }
    }

    /// Stop the loop and recover the session.
    pub async fn stop(self) -> Session {
        // Receiver dropping already ends the loop; the send result is moot.
        let _ = self.stop_tx.send(true);
        self.join.await.expect("frame loop panicked")
    }
}
