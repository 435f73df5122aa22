//! Background refresh poller.
//!
//! # Responsibility
//! - Emit a refresh tick every `interval` from a worker thread.
//! - Hand ticks to the single consumer that owns the store connection.
//!
//! # Invariants
//! - The worker never touches the store; all refresh work runs on the
//!   consumer's thread.
//! - At most one tick is queued at a time; ticks produced while one is still
//!   pending are dropped, so refreshes never overlap or pile up.
//! - Once `stop()` returns the worker has exited and no new tick is sent.

use log::{debug, info};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender, TrySendError};
use std::thread::JoinHandle;
use std::time::Duration;

const WORKER_THREAD_NAME: &str = "taskledger-refresh";

/// One wake-up of the poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTick {
    /// 1-based count of wake-ups, including dropped ones.
    pub sequence: u64,
}

/// Handle owning the refresh worker thread.
#[derive(Debug)]
pub struct RefreshPoller {
    interval: Duration,
    cancel_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl RefreshPoller {
    /// Spawns the worker and returns the poller with the tick receiver.
    ///
    /// # Errors
    /// - Returns the OS error when the worker thread cannot be spawned.
    pub fn start(interval: Duration) -> std::io::Result<(Self, Receiver<RefreshTick>)> {
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
        let (tick_tx, tick_rx) = mpsc::sync_channel::<RefreshTick>(1);

        let worker = std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run_worker(interval, &cancel_rx, &tick_tx))?;

        info!(
            "event=refresh_start module=refresh status=ok interval_ms={}",
            interval.as_millis()
        );
        Ok((
            Self {
                interval,
                cancel_tx: Some(cancel_tx),
                worker: Some(worker),
            },
            tick_rx,
        ))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }

    /// Cancels the worker and waits for it to exit. Idempotent.
    pub fn stop(&mut self) {
        let Some(cancel_tx) = self.cancel_tx.take() else {
            return;
        };
        let _ = cancel_tx.send(());
        drop(cancel_tx);

        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        info!("event=refresh_stop module=refresh status=ok");
    }
}

impl Drop for RefreshPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(interval: Duration, cancel_rx: &Receiver<()>, tick_tx: &SyncSender<RefreshTick>) {
    let mut sequence = 0_u64;
    loop {
        match cancel_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                sequence += 1;
                match tick_tx.try_send(RefreshTick { sequence }) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        debug!("event=refresh_tick module=refresh status=skipped sequence={sequence}");
                    }
                    Err(TrySendError::Disconnected(_)) => return,
                }
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RefreshPoller;
    use std::sync::mpsc::RecvTimeoutError;
    use std::time::{Duration, Instant};

    #[test]
    fn emits_ticks_until_stopped() {
        let (mut poller, ticks) = RefreshPoller::start(Duration::from_millis(10)).unwrap();
        assert!(poller.is_running());

        let first = ticks.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(first.sequence >= 1);

        poller.stop();
        assert!(!poller.is_running());

        while ticks.try_recv().is_ok() {}
        assert!(matches!(
            ticks.recv_timeout(Duration::from_millis(100)),
            Err(RecvTimeoutError::Disconnected)
        ));
    }

    #[test]
    fn unconsumed_ticks_are_coalesced() {
        let (mut poller, ticks) = RefreshPoller::start(Duration::from_millis(5)).unwrap();
        std::thread::sleep(Duration::from_millis(150));
        poller.stop();

        let queued = ticks.try_iter().count();
        assert_eq!(queued, 1);
    }

    #[test]
    fn stop_is_idempotent_and_worker_exits_when_receiver_dropped() {
        let (mut poller, ticks) = RefreshPoller::start(Duration::from_millis(5)).unwrap();
        drop(ticks);
        let deadline = Instant::now() + Duration::from_secs(5);
        while poller.is_running() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(!poller.is_running());
        poller.stop();
        poller.stop();
        assert_eq!(poller.interval(), Duration::from_millis(5));
    }
}
