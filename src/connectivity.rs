//! ConnectivityObserver — debounced, de-duplicated reachability signal
//!
//! Raw reachability events arrive in bursts (interface flaps, captive
//! portals, radio handoff). The observer collapses each burst with a
//! single-slot timer: every raw event cancels and restarts the settle
//! window, so only the last event of a burst fires. Settled transitions
//! are de-duplicated before being forwarded; repeated observations of the
//! same state advance the sequence number but emit nothing downstream.
//!
//! The first settled offline transition produces exactly one user-visible
//! notice; further offline settles are suppressed until an online
//! transition resets the flag.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::session::ConnectivityState;

/// One-shot user-visible connectivity notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityNotice {
    pub message: String,
}

impl ConnectivityNotice {
    fn offline() -> Self {
        Self {
            message: "No internet connection detected".to_string(),
        }
    }
}

/// Consumer-facing side of a running observer
pub struct ConnectivityFeed {
    /// Latest settled observation
    pub state: watch::Receiver<ConnectivityState>,
    /// One-shot offline notices for the UI layer
    pub notices: mpsc::Receiver<ConnectivityNotice>,
    /// The observer task; ends when the raw event stream closes
    pub task: JoinHandle<()>,
}

/// Wraps a push-based raw reachability feed into settled observations
pub struct ConnectivityObserver;

impl ConnectivityObserver {
    /// Start observing `raw_events` (each item: reachable yes/no).
    ///
    /// Settled online/offline transitions are forwarded to `settled_tx`;
    /// the returned feed carries the state watch and the notice channel.
    pub fn spawn(
        mut raw_events: mpsc::Receiver<bool>,
        config: &SessionConfig,
        settled_tx: mpsc::Sender<ConnectivityState>,
    ) -> ConnectivityFeed {
        let window = config.debounce_window;
        let (state_tx, state_rx) = watch::channel(ConnectivityState::unknown());
        let (notice_tx, notice_rx) = mpsc::channel(4);

        let task = tokio::spawn(async move {
            let mut pending: Option<bool> = None;
            let mut last_settled: Option<bool> = None;
            let mut notice_shown = false;
            let mut seq = 0u64;

            loop {
                tokio::select! {
                    raw = raw_events.recv() => match raw {
                        // Restarting the loop restarts the settle timer:
                        // cancel-and-restart, only the last event fires
                        Some(reachable) => pending = Some(reachable),
                        None => break,
                    },
                    _ = tokio::time::sleep(window), if pending.is_some() => {
                        let reachable = pending.take().unwrap_or(false);
                        seq += 1;
                        let state = ConnectivityState { reachable, seq };
                        state_tx.send_replace(state);

                        if last_settled == Some(reachable) {
                            debug!(reachable, seq, "Settled observation unchanged");
                            continue;
                        }
                        last_settled = Some(reachable);
                        info!(reachable, seq, "Connectivity transition settled");

                        if reachable {
                            notice_shown = false;
                        } else if !notice_shown {
                            notice_shown = true;
                            let _ = notice_tx.try_send(ConnectivityNotice::offline());
                        }

                        if settled_tx.send(state).await.is_err() {
                            // Downstream gone; keep publishing to the watch
                            debug!("Settled sink closed");
                        }
                    }
                }
            }
            debug!("Raw connectivity stream closed; observer stopping");
        });

        ConnectivityFeed {
            state: state_rx,
            notices: notice_rx,
            task,
        }
    }
}
