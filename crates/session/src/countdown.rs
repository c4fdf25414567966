use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{sleep, Duration},
};
use tracing::debug;

/// Repeating one-second countdown: each expiry fires the completion callback
/// once and re-arms from `initial`. Dropping the timer aborts the tick task.
pub struct CountdownTimer {
    seconds: watch::Receiver<u32>,
    reset_tx: mpsc::Sender<()>,
    tick_task: JoinHandle<()>,
}

impl CountdownTimer {
    pub fn spawn(initial: u32, on_complete: impl Fn() + Send + Sync + 'static) -> Self {
        let (seconds_tx, seconds) = watch::channel(initial);
        let (reset_tx, mut reset_rx) = mpsc::channel(1);

        let tick_task = tokio::spawn(async move {
            let mut remaining = initial;
            loop {
                tokio::select! {
                    _ = sleep(Duration::from_secs(1)) => {
                        if remaining <= 1 {
                            debug!(initial, "countdown elapsed, re-arming");
                            on_complete();
                            remaining = initial;
                        } else {
                            remaining -= 1;
                        }
                    }
                    Some(()) = reset_rx.recv() => {
                        remaining = initial;
                    }
                }
                if seconds_tx.send(remaining).is_err() {
                    break;
                }
            }
        });

        Self {
            seconds,
            reset_tx,
            tick_task,
        }
    }

    pub fn seconds_left(&self) -> u32 {
        *self.seconds.borrow()
    }

    pub fn formatted_time(&self) -> String {
        format_clock(self.seconds_left())
    }

    pub fn reset(&self) {
        // a queued reset already covers this one
        let _ = self.reset_tx.try_send(());
    }

    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.seconds.clone()
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.tick_task.abort();
    }
}

pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
#[path = "tests/countdown_tests.rs"]
mod tests;
