//! Coalescing of rapid list-filter edits into a single backend query.
//!
//! List screens feed every keystroke into a [`QueryDebouncer`]; after a
//! quiet period only the latest accumulated parameter set is emitted, so a
//! burst of edits produces exactly one query.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

/// Quiet period used by the portal's list screens.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

pub struct QueryDebouncer<T> {
    input: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> QueryDebouncer<T> {
    /// Spawn the coalescing worker. Emitted parameter sets land on `output`
    /// once per quiet period; dropping the debouncer flushes the pending
    /// value, if any, and stops the worker.
    pub fn new(quiet_period: Duration, output: mpsc::UnboundedSender<T>) -> Self {
        let (input, mut edits) = mpsc::unbounded_channel::<T>();
        tokio::spawn(async move {
            while let Some(mut latest) = edits.recv().await {
                let mut deadline = Instant::now() + quiet_period;
                loop {
                    tokio::select! {
                        next = edits.recv() => match next {
                            Some(value) => {
                                latest = value;
                                deadline = Instant::now() + quiet_period;
                            }
                            None => {
                                let _ = output.send(latest);
                                return;
                            }
                        },
                        _ = sleep_until(deadline) => {
                            let _ = output.send(latest);
                            break;
                        }
                    }
                }
            }
        });
        Self { input }
    }

    /// Record an edit; only the latest value within a quiet period survives.
    pub fn update(&self, value: T) {
        let _ = self.input.send(value);
    }
}
