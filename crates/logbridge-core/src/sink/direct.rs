//! Direct in-process sink
//!
//! For hosts that produce records themselves: `emit` runs the registered
//! bridge synchronously on the calling thread. Emissions hold a read lock
//! on the registration slot and `unregister` takes the write lock, so it
//! returns only once every in-flight emission has finished.
//!
//! A handler must not disable the adapter from inside an emission on this
//! sink: the write lock would wait on the emission holding the read lock.

use crate::bridge::CallbackBridge;
use crate::errors::SinkError;
use crate::sink::LogSink;
use logbridge_core_types::{LogLevel, LogRecord};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

struct Registered {
    token: u64,
    bridge: Arc<CallbackBridge>,
}

/// Registration token for `DirectSink`
#[derive(Debug)]
pub struct DirectHandle {
    token: u64,
}

/// Sink that dispatches on the emitting thread
#[derive(Default)]
pub struct DirectSink {
    slot: RwLock<Option<Registered>>,
    next_token: AtomicU64,
    dropped: AtomicU64,
}

impl DirectSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit one record
    ///
    /// Returns `true` if a bridge was registered and invoked. Records
    /// emitted with no registration are counted and dropped.
    pub fn emit(&self, level: LogLevel, tag: Option<&str>, message: &str) -> bool {
        let slot = self.read_slot();
        match slot.as_ref() {
            Some(registered) => {
                registered.bridge.invoke(level, tag, message);
                true
            }
            None => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    pub fn emit_record(&self, record: &LogRecord) -> bool {
        self.emit(record.level, record.tag(), record.message())
    }

    /// Whether a bridge is currently registered
    pub fn is_registered(&self) -> bool {
        self.read_slot().is_some()
    }

    /// Records emitted while nothing was registered
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    // The bridge contains handler panics, so poisoning only follows a bug
    // in this module; the slot is still consistent then.
    fn read_slot(&self) -> RwLockReadGuard<'_, Option<Registered>> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_slot(&self) -> RwLockWriteGuard<'_, Option<Registered>> {
        self.slot.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogSink for DirectSink {
    type Handle = DirectHandle;

    fn register(&self, bridge: Arc<CallbackBridge>) -> Result<DirectHandle, SinkError> {
        let mut slot = self.write_slot();
        if slot.is_some() {
            return Err(SinkError::Occupied);
        }
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        *slot = Some(Registered { token, bridge });
        tracing::debug!(token, "direct sink registered bridge");
        Ok(DirectHandle { token })
    }

    fn unregister(&self, handle: DirectHandle) {
        let released = {
            let mut slot = self.write_slot();
            let current = slot
                .as_ref()
                .is_some_and(|registered| registered.token == handle.token);
            if current {
                slot.take()
            } else {
                None
            }
        };
        match released {
            Some(_) => tracing::debug!(token = handle.token, "direct sink unregistered bridge"),
            None => tracing::warn!(
                token = handle.token,
                "direct sink asked to unregister unknown handle"
            ),
        }
    }
}
