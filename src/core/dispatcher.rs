//! Bounded async dispatch for fire-and-forget writes
//!
//! One worker thread consumes a bounded queue of jobs. A logger tree shares a
//! single dispatcher, so child loggers do not spawn threads of their own.

use super::{
    error::{LoggerError, Result},
    metrics::LoggerMetrics,
    overflow_policy::{OverflowCallback, OverflowPolicy},
};
use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender, TrySendError};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default shutdown timeout for draining the queue when the last logger
/// handle is dropped
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of records the async queue holds
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

enum Command {
    Run(Job),
    Drain(Sender<()>),
}

pub(crate) struct Dispatcher {
    sender: Option<Sender<Command>>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
    capacity: usize,
    overflow_policy: OverflowPolicy,
    on_overflow: Option<OverflowCallback>,
    metrics: Arc<LoggerMetrics>,
}

impl Dispatcher {
    pub(crate) fn new(
        capacity: usize,
        overflow_policy: OverflowPolicy,
        on_overflow: Option<OverflowCallback>,
        metrics: Arc<LoggerMetrics>,
    ) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded(capacity);

        let spawned = thread::Builder::new()
            .name("logfanout-dispatch".to_string())
            .spawn(move || worker_loop(receiver));

        let (sender, handle) = match spawned {
            Ok(handle) => (Some(sender), Some(handle)),
            Err(e) => {
                log::error!("logfanout: failed to spawn dispatch worker: {e}");
                (None, None)
            }
        };

        Self {
            sender,
            handle: Mutex::new(handle),
            capacity,
            overflow_policy,
            on_overflow,
            metrics,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of jobs waiting for the worker
    pub(crate) fn pending(&self) -> usize {
        self.sender.as_ref().map_or(0, Sender::len)
    }

    /// Queue a job, applying the overflow policy when the queue is full
    pub(crate) fn submit(&self, job: Job) -> Result<()> {
        let sender = self.sender()?;

        match sender.try_send(Command::Run(job)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(command)) => self.handle_overflow(sender, command),
            Err(TrySendError::Disconnected(_)) => {
                self.metrics.record_dropped();
                Err(LoggerError::LoggerStopped)
            }
        }
    }

    /// Queue a job, failing with `QueueFull` instead of consulting the policy
    pub(crate) fn try_submit(&self, job: Job) -> Result<()> {
        let sender = self.sender()?;

        match sender.try_send(Command::Run(job)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.metrics.record_queue_full();
                self.metrics.record_dropped();
                Err(LoggerError::queue_full(sender.len(), self.capacity))
            }
            Err(TrySendError::Disconnected(_)) => {
                self.metrics.record_dropped();
                Err(LoggerError::LoggerStopped)
            }
        }
    }

    /// Wait until every job queued before this call has run
    ///
    /// Returns `false` if the worker is gone or does not catch up in time.
    pub(crate) fn drain(&self, timeout: Duration) -> bool {
        let Ok(sender) = self.sender() else {
            return false;
        };
        if self.is_worker_thread() {
            // The worker cannot wait on its own queue.
            return false;
        }

        let (ack_tx, ack_rx) = bounded(1);
        let deadline = Instant::now() + timeout;
        if sender
            .send_timeout(Command::Drain(ack_tx), timeout)
            .is_err()
        {
            return false;
        }
        ack_rx
            .recv_timeout(deadline.saturating_duration_since(Instant::now()))
            .is_ok()
    }

    fn sender(&self) -> Result<&Sender<Command>> {
        self.sender.as_ref().ok_or(LoggerError::LoggerStopped)
    }

    fn handle_overflow(&self, sender: &Sender<Command>, command: Command) -> Result<()> {
        self.metrics.record_queue_full();

        match &self.overflow_policy {
            OverflowPolicy::DropNewest => {
                self.metrics.record_dropped();
                Err(LoggerError::queue_full(sender.len(), self.capacity))
            }

            OverflowPolicy::Block => {
                self.metrics.record_block();
                sender.send(command).map_err(|_| {
                    self.metrics.record_dropped();
                    LoggerError::LoggerStopped
                })
            }

            OverflowPolicy::BlockWithTimeout(timeout) => {
                self.metrics.record_block();
                match sender.send_timeout(command, *timeout) {
                    Ok(()) => Ok(()),
                    Err(SendTimeoutError::Timeout(_)) => {
                        self.alert_and_drop();
                        Err(LoggerError::queue_full(sender.len(), self.capacity))
                    }
                    Err(SendTimeoutError::Disconnected(_)) => {
                        self.metrics.record_dropped();
                        Err(LoggerError::LoggerStopped)
                    }
                }
            }

            OverflowPolicy::AlertAndDrop => {
                self.alert_and_drop();
                Err(LoggerError::queue_full(sender.len(), self.capacity))
            }
        }
    }

    fn alert_and_drop(&self) {
        let dropped = self.metrics.record_dropped() + 1;

        // First drop, then every 1000th.
        if dropped == 1 || dropped % 1000 == 0 {
            log::warn!(
                "logfanout: async queue full ({} slots), {} records dropped",
                self.capacity,
                dropped
            );
            if let Some(ref callback) = self.on_overflow {
                callback(dropped);
            }
        }
    }

    fn is_worker_thread(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|h| h.thread().id() == thread::current().id())
    }
}

fn worker_loop(receiver: Receiver<Command>) {
    while let Ok(command) = receiver.recv() {
        match command {
            Command::Run(job) => {
                // A panicking sink must not take the worker down with it.
                if let Err(panic_info) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(job))
                {
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    log::error!("logfanout: async write panicked: {panic_msg}");
                }
            }
            Command::Drain(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        // Closing the channel lets the worker finish what is queued and exit.
        drop(self.sender.take());

        let Some(handle) = self.handle.get_mut().take() else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            // Last logger handle released by a job on the worker itself.
            return;
        }

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if handle.join().is_err() {
                    log::error!("logfanout: dispatch worker panicked during shutdown");
                }
                break;
            }

            if start.elapsed() >= DEFAULT_SHUTDOWN_TIMEOUT {
                log::warn!(
                    "logfanout: dispatch worker did not finish within {:?}, some records may be lost",
                    DEFAULT_SHUTDOWN_TIMEOUT
                );
                break;
            }

            thread::sleep(Duration::from_millis(10));
        }
    }
}
