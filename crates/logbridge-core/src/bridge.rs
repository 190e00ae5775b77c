//! Callback bridge between the external emitter and a user handler
//!
//! The emitter may call a bridge any number of times, from any thread, at
//! any moment between registration and confirmed unregistration. Whatever
//! the handler does, nothing unwinds back into the emitter: handler errors
//! and panics are caught here, reported to a fallback channel and dropped.
//!
//! The fallback channel is deliberately not `tracing` or `log`. A bridge
//! serving the `log` facade that reported through it would feed its own
//! failures back into itself.

use logbridge_core_types::{LogLevel, LogRecord};
use std::any::Any;
use std::fmt;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};

/// Result returned by a log handler
pub type HandlerResult = anyhow::Result<()>;

/// A user-supplied receiver of log records
///
/// Implemented for any `Fn(LogLevel, Option<&str>, &str) -> HandlerResult`
/// that can be shared across threads.
pub trait LogHandler: Send + Sync + 'static {
    fn on_log(&self, level: LogLevel, tag: Option<&str>, message: &str) -> HandlerResult;
}

impl<F> LogHandler for F
where
    F: Fn(LogLevel, Option<&str>, &str) -> HandlerResult + Send + Sync + 'static,
{
    fn on_log(&self, level: LogLevel, tag: Option<&str>, message: &str) -> HandlerResult {
        self(level, tag, message)
    }
}

/// Why a handler invocation did not complete normally
#[derive(Debug)]
pub enum HandlerFailure {
    /// The handler returned an error
    Error(anyhow::Error),
    /// The handler panicked; carries the panic message when it was a string
    Panic(String),
}

impl fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerFailure::Error(err) => write!(f, "handler returned error: {:#}", err),
            HandlerFailure::Panic(msg) => write!(f, "handler panicked: {}", msg),
        }
    }
}

type FallbackReporter = dyn Fn(&HandlerFailure) + Send + Sync;

/// A user handler adapted for invocation from the external emitter
pub struct CallbackBridge {
    handler: Box<dyn LogHandler>,
    fallback: Box<FallbackReporter>,
    delivered: AtomicU64,
    failures: AtomicU64,
}

impl CallbackBridge {
    /// Wrap a handler, reporting its failures to stderr
    pub fn new(handler: impl LogHandler) -> Self {
        Self {
            handler: Box::new(handler),
            fallback: Box::new(report_to_stderr),
            delivered: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Replace the fallback reporter
    ///
    /// A reporter that panics is contained the same way a handler is.
    pub fn with_fallback(
        mut self,
        fallback: impl Fn(&HandlerFailure) + Send + Sync + 'static,
    ) -> Self {
        self.fallback = Box::new(fallback);
        self
    }

    /// Deliver one record to the handler
    ///
    /// Never panics and never returns the handler's error.
    pub fn invoke(&self, level: LogLevel, tag: Option<&str>, message: &str) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.handler.on_log(level, tag, message)
        }));

        let failure = match outcome {
            Ok(Ok(())) => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
                return;
            }
            Ok(Err(err)) => HandlerFailure::Error(err),
            Err(payload) => HandlerFailure::Panic(panic_message(payload.as_ref())),
        };

        self.failures.fetch_add(1, Ordering::Relaxed);
        let _ = panic::catch_unwind(AssertUnwindSafe(|| (self.fallback)(&failure)));
    }

    /// Deliver a record value
    pub fn dispatch(&self, record: &LogRecord) {
        self.invoke(record.level, record.tag(), record.message());
    }

    /// Invocations where the handler completed normally
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Invocations where the handler returned an error or panicked
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for CallbackBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackBridge")
            .field("delivered", &self.delivered())
            .field("failures", &self.failures())
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// Last resort: nothing below this, so write errors are ignored.
fn report_to_stderr(failure: &HandlerFailure) {
    let _ = writeln!(std::io::stderr().lock(), "logbridge: {}", failure);
}
