//! Callback pump for Vapor.
//!
//! Nothing reaches a registered handler until something calls
//! `run_callbacks`. The pump is that something, in one of two mutually
//! exclusive modes:
//!
//! - **Manual**: the application calls [`CallbackPump::run_once`] from
//!   its own loop (10 Hz or faster is plenty). Handlers run on that thread.
//! - **Background**: a dedicated OS thread named `vapor-callbacks` calls
//!   `run_callbacks` every [`PumpConfig::interval`] until stopped. Handlers
//!   run on that thread.
//!
//! # Stopping
//!
//! [`CallbackPump::stop`] is synchronous: it hands the worker an
//! acknowledgement channel, waits for the reply and joins the thread.
//! Once it returns, no handler is running and none will run again until
//! the pump is restarted or pumped manually.
//!
//! ```ignore
//! let pump = CallbackPump::new(ctx.clone());
//! pump.start(PumpConfig::default())?;
//! // ... game loop ...
//! pump.stop();
//! ```

mod error;

pub use error::PumpError;

use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, error, warn};
use vapor_runtime::Context;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Who drives `run_callbacks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PumpMode {
    /// The application calls [`CallbackPump::run_once`] itself.
    Manual,
    /// A background thread pumps at a fixed interval.
    #[default]
    Background,
}

/// Pump configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PumpConfig {
    pub mode: PumpMode,
    /// Delay between background pumps. Ignored in manual mode.
    #[serde(with = "micros")]
    pub interval: Duration,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            mode: PumpMode::default(),
            interval: Duration::from_millis(1),
        }
    }
}

impl PumpConfig {
    pub const MIN_INTERVAL: Duration = Duration::from_micros(100);
    pub const MAX_INTERVAL: Duration = Duration::from_millis(100);

    pub fn manual() -> Self {
        Self {
            mode: PumpMode::Manual,
            ..Default::default()
        }
    }

    pub fn background(interval: Duration) -> Self {
        Self {
            mode: PumpMode::Background,
            interval,
        }
    }

    /// Clamps `interval` into [`MIN_INTERVAL`](Self::MIN_INTERVAL)..=
    /// [`MAX_INTERVAL`](Self::MAX_INTERVAL).
    ///
    /// Called automatically by [`CallbackPump::start`].
    pub fn validated(mut self) -> Self {
        let clamped = self.interval.clamp(Self::MIN_INTERVAL, Self::MAX_INTERVAL);
        if clamped != self.interval {
            warn!(
                requested_us = self.interval.as_micros() as u64,
                clamped_us = clamped.as_micros() as u64,
                "pump interval out of range, clamping"
            );
            self.interval = clamped;
        }
        self
    }
}

/// The interval is written as whole microseconds in config files.
mod micros {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_micros)
    }
}

// ---------------------------------------------------------------------------
// Pump
// ---------------------------------------------------------------------------

type Ack = mpsc::Sender<()>;

struct Worker {
    stop_tx: mpsc::Sender<Ack>,
    thread: JoinHandle<()>,
}

/// Drives the callback registry of one [`Context`].
pub struct CallbackPump {
    ctx: Context,
    worker: Mutex<Option<Worker>>,
}

impl CallbackPump {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            worker: Mutex::new(None),
        }
    }

    fn worker(&self) -> MutexGuard<'_, Option<Worker>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `config`, stopping any background worker first.
    ///
    /// In manual mode this only stops the worker; the application pumps
    /// with [`run_once`](Self::run_once) from then on.
    pub fn start(&self, config: PumpConfig) -> Result<(), PumpError> {
        let config = config.validated();
        let mut slot = self.worker();
        if let Some(old) = slot.take() {
            shut_down(old);
        }

        if config.mode == PumpMode::Manual {
            debug!("callback pump in manual mode");
            return Ok(());
        }

        let (stop_tx, stop_rx) = mpsc::channel::<Ack>();
        let ctx = self.ctx.clone();
        let interval = config.interval;
        let thread = thread::Builder::new()
            .name("vapor-callbacks".to_string())
            .spawn(move || pump_loop(&ctx, interval, &stop_rx))
            .map_err(PumpError::Spawn)?;

        debug!(interval_us = interval.as_micros() as u64, "background callback pump started");
        *slot = Some(Worker { stop_tx, thread });
        Ok(())
    }

    /// Stops the background worker, blocking until it has exited.
    ///
    /// Returns `false` if no worker was running.
    pub fn stop(&self) -> bool {
        let worker = self.worker().take();
        match worker {
            Some(worker) => {
                shut_down(worker);
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker().is_some()
    }

    /// Delivers every pending callback on the calling thread.
    ///
    /// Allowed while a background worker runs, but then handlers may run
    /// on either thread. Concurrent pumps coalesce: if another thread is
    /// mid-delivery this returns at once and that thread delivers the
    /// pending callbacks. The same holds for a handler that pumps.
    pub fn run_once(&self) {
        self.ctx.run_callbacks();
    }
}

impl Drop for CallbackPump {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for CallbackPump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackPump")
            .field("running", &self.is_running())
            .finish()
    }
}

fn pump_loop(ctx: &Context, interval: Duration, stop_rx: &mpsc::Receiver<Ack>) {
    loop {
        match stop_rx.recv_timeout(interval) {
            Ok(ack) => {
                let _ = ack.send(());
                return;
            }
            Err(RecvTimeoutError::Timeout) => ctx.run_callbacks(),
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

fn shut_down(worker: Worker) {
    let (ack_tx, ack_rx) = mpsc::channel();
    if worker.stop_tx.send(ack_tx).is_ok() {
        // Err means the worker died without acknowledging.
        let _ = ack_rx.recv();
    }
    if worker.thread.join().is_err() {
        error!("callback pump thread panicked");
    } else {
        debug!("background callback pump stopped");
    }
}
