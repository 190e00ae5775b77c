#![allow(dead_code)]

use logbridge_core::errors::SinkError;
use logbridge_core::sink::{DirectHandle, DirectSink, LogSink};
use logbridge_core::{CallbackBridge, HandlerResult, LogHandler, LogLevel, LogRecord};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Handler factory that records every delivered record
#[derive(Clone, Default)]
pub struct Recorder {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler(&self) -> impl LogHandler {
        let records = Arc::clone(&self.records);
        move |level: LogLevel, tag: Option<&str>, message: &str| -> HandlerResult {
            records
                .lock()
                .unwrap()
                .push(LogRecord::new(level, tag.map(str::to_string), message));
            Ok(())
        }
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.message).collect()
    }
}

/// Handler that fails on every call, counting attempts
pub fn failing_handler(attempts: Arc<AtomicUsize>) -> impl LogHandler {
    move |_: LogLevel, _: Option<&str>, message: &str| -> HandlerResult {
        attempts.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("handler refuses {:?}", message)
    }
}

/// Handler that panics on every call, counting attempts
pub fn panicking_handler(attempts: Arc<AtomicUsize>) -> impl LogHandler {
    move |_: LogLevel, _: Option<&str>, _: &str| -> HandlerResult {
        attempts.fetch_add(1, Ordering::SeqCst);
        panic!("handler exploded")
    }
}

/// Sink whose registration always fails
pub struct RejectingSink {
    pub reason: &'static str,
}

impl LogSink for RejectingSink {
    type Handle = ();

    fn register(&self, _bridge: Arc<CallbackBridge>) -> Result<(), SinkError> {
        Err(SinkError::Rejected {
            reason: self.reason.to_string(),
        })
    }

    fn unregister(&self, _handle: ()) {}
}

/// Direct sink that calls the bridge from inside `register`, before
/// reporting success, the way some native emitters flush a greeting
#[derive(Default)]
pub struct EagerSink {
    pub inner: DirectSink,
}

pub const EAGER_GREETING: &str = "sink attached";

impl LogSink for EagerSink {
    type Handle = DirectHandle;

    fn register(&self, bridge: Arc<CallbackBridge>) -> Result<DirectHandle, SinkError> {
        bridge.invoke(LogLevel::Info, Some("eager"), EAGER_GREETING);
        self.inner.register(bridge)
    }

    fn unregister(&self, handle: DirectHandle) {
        self.inner.unregister(handle)
    }
}

/// Poll `condition` until it holds or `timeout` elapses
pub fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}
