//! `log` facade sink
//!
//! Treats the `log` crate facade as the native emitter. Registration spawns
//! a dispatcher thread and installs a process-wide forwarding logger that
//! queues converted records for it. The handler therefore always runs on
//! the dispatcher thread, never on the thread that called `log!`.
//!
//! Shutdown ordering: `stopped` is set before the worker is signalled, the
//! logger checks it before queueing and the worker checks it before every
//! invocation, and unregister joins the worker. Once unregister returns no
//! invocation is running and none can start.

use crate::bridge::CallbackBridge;
use crate::config::FacadeConfig;
use crate::errors::SinkError;
use crate::sink::LogSink;
use crossbeam_channel::{Receiver, Sender};
use logbridge_core_types::LogRecord;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub const DISPATCH_THREAD_NAME: &str = "logbridge-dispatch";

/// Sink backed by the global `log` facade
///
/// The facade accepts a single logger per process, so at most one
/// registration through this sink can ever succeed.
#[derive(Debug, Clone, Default)]
pub struct FacadeSink {
    config: FacadeConfig,
}

impl FacadeSink {
    pub fn new(config: FacadeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FacadeConfig {
        &self.config
    }
}

/// Registration token for `FacadeSink`
///
/// Dropping the handle shuts the dispatcher down as `unregister` would.
#[derive(Debug)]
pub struct FacadeHandle {
    worker: Option<JoinHandle<()>>,
    stopped: Arc<AtomicBool>,
    done: Sender<()>,
}

impl FacadeHandle {
    fn shutdown(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
        let _ = self.done.try_send(());

        let Some(worker) = self.worker.take() else {
            return;
        };
        if worker.thread().id() == thread::current().id() {
            // Called from inside a handler; the worker exits once it returns.
            tracing::debug!("facade sink stopped from its dispatcher thread");
            return;
        }
        if worker.join().is_err() {
            tracing::warn!("facade sink dispatcher thread panicked");
        }
    }
}

impl Drop for FacadeHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl LogSink for FacadeSink {
    type Handle = FacadeHandle;

    fn register(&self, bridge: Arc<CallbackBridge>) -> Result<FacadeHandle, SinkError> {
        let stopped = Arc::new(AtomicBool::new(false));
        let (record_tx, record_rx) = crossbeam_channel::unbounded();
        // Wakes the worker promptly even when no records are flowing.
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);

        let dispatcher = Dispatcher {
            bridge,
            records: record_rx,
            done: done_rx,
            stopped: Arc::clone(&stopped),
        };
        let worker = thread::Builder::new()
            .name(DISPATCH_THREAD_NAME.into())
            .spawn(move || dispatcher.run())?;

        let mut handle = FacadeHandle {
            worker: Some(worker),
            stopped: Arc::clone(&stopped),
            done: done_tx,
        };

        let logger = ForwardingLogger {
            sender: record_tx,
            stopped,
            include_location: self.config.include_location,
        };
        if log::set_boxed_logger(Box::new(logger)).is_err() {
            handle.shutdown();
            return Err(SinkError::LoggerAlreadyInstalled);
        }
        log::set_max_level(self.config.max_level);

        tracing::debug!(max_level = %self.config.max_level, "facade sink installed");
        Ok(handle)
    }

    fn unregister(&self, mut handle: FacadeHandle) {
        log::set_max_level(log::LevelFilter::Off);
        handle.shutdown();
        tracing::debug!("facade sink dispatcher stopped");
    }
}

struct Dispatcher {
    bridge: Arc<CallbackBridge>,
    records: Receiver<LogRecord>,
    done: Receiver<()>,
    stopped: Arc<AtomicBool>,
}

impl Dispatcher {
    fn run(self) {
        loop {
            crossbeam_channel::select! {
                recv(self.records) -> record => match record {
                    Ok(record) => {
                        if self.stopped.load(Ordering::SeqCst) {
                            return;
                        }
                        self.bridge.dispatch(&record);
                    }
                    // Logger dropped: a failed registration.
                    Err(_) => {
                        self.stopped.store(true, Ordering::SeqCst);
                        return;
                    }
                },
                recv(self.done) -> _ => return,
            }
            if self.stopped.load(Ordering::SeqCst) {
                return;
            }
        }
    }
}

struct ForwardingLogger {
    sender: Sender<LogRecord>,
    stopped: Arc<AtomicBool>,
    include_location: bool,
}

impl log::Log for ForwardingLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        !self.stopped.load(Ordering::SeqCst)
    }

    // Must not log from here: the facade would re-enter this logger.
    fn log(&self, record: &log::Record) {
        // `enabled` is not called by the facade macros, so check again.
        if self.stopped.load(Ordering::SeqCst) {
            return;
        }
        // Fails only once the dispatcher is gone; nothing can receive it then.
        let _ = self
            .sender
            .send(convert_record(record, self.include_location));
    }

    fn flush(&self) {}
}

/// Convert a facade record into a bridge record
///
/// The tag is the module path. With `include_location`, the message is
/// prefixed with `file@line:` or `file:` depending on what is known.
pub fn convert_record(record: &log::Record, include_location: bool) -> LogRecord {
    let message = match (include_location, record.file(), record.line()) {
        (true, Some(file), Some(line)) => format!("{}@{}: {}", file, line, record.args()),
        (true, Some(file), None) => format!("{}: {}", file, record.args()),
        _ => record.args().to_string(),
    };
    LogRecord::new(
        record.level().into(),
        record.module_path().map(str::to_string),
        message,
    )
}
