//! One-shot log adapter
//!
//! `LogAdapter` owns at most one live bridge registration with its sink.
//! Enablement happens at most once: after a disable the adapter stays
//! disabled for good.
//!
//! ```text
//! NeverEnabled --enable(ok)-------------> Enabled
//! NeverEnabled --enable(sink error)-----> NeverEnabled
//! Enabled      --disable----------------> Disabled
//! Enabled | Disabled --enable-----------> rejected, unchanged
//! NeverEnabled | Disabled --disable-----> unchanged
//! ```
//!
//! All transitions run under one mutex, including the sink's register and
//! unregister calls. The phase is also published to an atomic so that
//! `is_enabled` / `can_enable` never wait on that mutex: a handler may
//! query the adapter while `disable` is blocked on the sink.
//!
//! ## Logging Ownership
//!
//! `enable`, `try_enable` and `disable` own lifecycle logging for their
//! operation (`log_op_start!` / `log_op_end!` / `log_op_error!`). Sinks log
//! only `debug` / `warn` details.

use crate::bridge::{CallbackBridge, LogHandler};
use crate::errors::{AdapterError, ExError, Result};
use crate::schema::{OP_DISABLE, OP_ENABLE, OP_TRY_ENABLE};
use crate::sink::LogSink;
use crate::{log_op_end, log_op_error, log_op_start};
use logbridge_core_types::RegistrationId;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Observable lifecycle phase of the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AdapterPhase {
    /// Initial phase; the only one from which enable can succeed
    NeverEnabled = 0,
    /// A bridge is registered and may receive records
    Enabled = 1,
    /// Terminal: disabled after having been enabled
    Disabled = 2,
}

impl AdapterPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => AdapterPhase::NeverEnabled,
            1 => AdapterPhase::Enabled,
            _ => AdapterPhase::Disabled,
        }
    }
}

impl fmt::Display for AdapterPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AdapterPhase::NeverEnabled => "never enabled",
            AdapterPhase::Enabled => "enabled",
            AdapterPhase::Disabled => "disabled",
        })
    }
}

/// The live registration; the bridge lives here and nowhere else on our side
struct ActiveRegistration<H> {
    id: RegistrationId,
    handle: H,
    bridge: Arc<CallbackBridge>,
}

enum AdapterState<H> {
    NeverEnabled,
    Enabled(ActiveRegistration<H>),
    Disabled,
}

impl<H> AdapterState<H> {
    fn registration_id(&self) -> Option<RegistrationId> {
        match self {
            AdapterState::Enabled(active) => Some(active.id.clone()),
            _ => None,
        }
    }

    fn phase(&self) -> AdapterPhase {
        match self {
            AdapterState::NeverEnabled => AdapterPhase::NeverEnabled,
            AdapterState::Enabled(_) => AdapterPhase::Enabled,
            AdapterState::Disabled => AdapterPhase::Disabled,
        }
    }
}

/// Controller for the single bridge registration of a process
///
/// Create one per process at the application root and pass references to
/// whoever needs to enable, disable or query it.
pub struct LogAdapter<S: LogSink> {
    sink: S,
    state: Mutex<AdapterState<S::Handle>>,
    phase: AtomicU8,
}

impl<S: LogSink> LogAdapter<S> {
    /// Create an adapter in the `NeverEnabled` phase
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            state: Mutex::new(AdapterState::NeverEnabled),
            phase: AtomicU8::new(AdapterPhase::NeverEnabled as u8),
        }
    }

    /// The external sink this adapter registers with
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> AdapterPhase {
        AdapterPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// True while a bridge is registered
    pub fn is_enabled(&self) -> bool {
        self.phase() == AdapterPhase::Enabled
    }

    /// True until the first successful enable
    ///
    /// Not the negation of `is_enabled`: a disabled adapter is neither.
    pub fn can_enable(&self) -> bool {
        self.phase() == AdapterPhase::NeverEnabled
    }

    /// Register `handler` with the sink
    ///
    /// # Errors
    ///
    /// - `AlreadyEnabled` if the adapter is enabled or disabled; nothing is
    ///   registered and the phase is unchanged
    /// - `Registration` if the sink fails; the adapter stays `NeverEnabled`
    pub fn enable(&self, handler: impl LogHandler) -> Result<()> {
        self.enable_bridge(CallbackBridge::new(handler))
    }

    /// Like `enable`, for a bridge built by the caller (e.g. with a custom
    /// fallback reporter)
    ///
    /// # Errors
    ///
    /// Same as `enable`.
    pub fn enable_bridge(&self, bridge: CallbackBridge) -> Result<()> {
        log_op_start!(OP_ENABLE);
        let start = Instant::now();

        let (result, owner) = {
            let mut state = self.lock_state();
            let result = self.enable_locked(&mut state, bridge);
            let owner = result.is_err().then(|| state.registration_id()).flatten();
            (result, owner)
        };

        match result {
            Ok(id) => {
                log_op_end!(
                    OP_ENABLE,
                    duration_ms = start.elapsed().as_millis() as u64,
                    registration_id = id.as_str()
                );
                Ok(())
            }
            Err(err) => {
                // A refused enable names the registration that owns the stream.
                let ex_err = match owner {
                    Some(id) => ExError::from(err.clone()).with_registration_id(id),
                    None => ExError::from(err.clone()),
                };
                log_op_error!(
                    OP_ENABLE,
                    ex_err,
                    duration_ms = start.elapsed().as_millis() as u64
                );
                Err(err)
            }
        }
    }

    /// Enable if nobody has yet; report whether this call won
    ///
    /// Check and registration happen in one critical section, so of any
    /// number of concurrent callers at most one gets `true`.
    pub fn try_enable(&self, handler: impl LogHandler) -> bool {
        log_op_start!(OP_TRY_ENABLE);
        let start = Instant::now();

        let result = {
            let mut state = self.lock_state();
            self.enable_locked(&mut state, CallbackBridge::new(handler))
        };

        match result {
            Ok(id) => {
                log_op_end!(
                    OP_TRY_ENABLE,
                    duration_ms = start.elapsed().as_millis() as u64,
                    registration_id = id.as_str(),
                    enabled = true
                );
                true
            }
            Err(AdapterError::AlreadyEnabled { phase }) => {
                log_op_end!(
                    OP_TRY_ENABLE,
                    duration_ms = start.elapsed().as_millis() as u64,
                    enabled = false,
                    phase = %phase
                );
                false
            }
            Err(err) => {
                log_op_error!(
                    OP_TRY_ENABLE,
                    err,
                    duration_ms = start.elapsed().as_millis() as u64
                );
                false
            }
        }
    }

    /// Unregister the live bridge, if any, and become `Disabled`
    ///
    /// Blocks until the sink confirms the handler will not be invoked
    /// again. No-op unless enabled.
    pub fn disable(&self) {
        let mut state = self.lock_state();
        let AdapterState::Enabled(active) = &*state else {
            tracing::debug!(phase = %state.phase(), "disable ignored");
            return;
        };

        log_op_start!(OP_DISABLE, registration_id = active.id.as_str());
        let start = Instant::now();

        let previous = std::mem::replace(&mut *state, AdapterState::Disabled);
        if let AdapterState::Enabled(active) = previous {
            // Publishes even if the sink panics in unregister; the state is
            // already Disabled by then.
            let published = PublishOnDrop {
                phase: &self.phase,
                value: AdapterPhase::Disabled,
            };
            let id = self.release(active);
            drop(published);
            log_op_end!(
                OP_DISABLE,
                duration_ms = start.elapsed().as_millis() as u64,
                registration_id = id.as_str()
            );
        }
    }

    fn enable_locked(
        &self,
        state: &mut AdapterState<S::Handle>,
        bridge: CallbackBridge,
    ) -> Result<RegistrationId> {
        if !matches!(state, AdapterState::NeverEnabled) {
            return Err(AdapterError::AlreadyEnabled {
                phase: state.phase(),
            });
        }

        // Fully built before register: the sink may call it before returning.
        let bridge = Arc::new(bridge);
        let handle = self.sink.register(Arc::clone(&bridge))?;

        let id = RegistrationId::new();
        *state = AdapterState::Enabled(ActiveRegistration {
            id: id.clone(),
            handle,
            bridge,
        });
        self.publish(AdapterPhase::Enabled);
        Ok(id)
    }

    /// Unregister, then drop our bridge reference. The order matters: the
    /// bridge must outlive every invocation the sink may still make.
    fn release(&self, active: ActiveRegistration<S::Handle>) -> RegistrationId {
        let ActiveRegistration { id, handle, bridge } = active;
        self.sink.unregister(handle);
        tracing::debug!(
            registration_id = id.as_str(),
            delivered = bridge.delivered(),
            failures = bridge.failures(),
            "bridge released"
        );
        drop(bridge);
        id
    }

    fn publish(&self, phase: AdapterPhase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    // Sink calls run under this lock; if one panics the state is still a
    // valid value, so keep going with it.
    fn lock_state(&self) -> MutexGuard<'_, AdapterState<S::Handle>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct PublishOnDrop<'a> {
    phase: &'a AtomicU8,
    value: AdapterPhase,
}

impl Drop for PublishOnDrop<'_> {
    fn drop(&mut self) {
        self.phase.store(self.value as u8, Ordering::Release);
    }
}

impl<S: LogSink> Drop for LogAdapter<S> {
    fn drop(&mut self) {
        let state = self
            .state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let AdapterState::Enabled(active) = std::mem::replace(state, AdapterState::Disabled) {
            self.release(active);
        }
    }
}

impl<S: LogSink> fmt::Debug for LogAdapter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogAdapter")
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::HandlerResult;
    use crate::errors::SinkError;
    use crate::sink::DirectSink;
    use logbridge_core_types::LogLevel;

    fn noop() -> impl LogHandler {
        |_: LogLevel, _: Option<&str>, _: &str| -> HandlerResult { Ok(()) }
    }

    struct RejectingSink;

    impl LogSink for RejectingSink {
        type Handle = ();

        fn register(&self, _bridge: Arc<CallbackBridge>) -> std::result::Result<(), SinkError> {
            Err(SinkError::Rejected {
                reason: "emitter offline".to_string(),
            })
        }

        fn unregister(&self, _handle: ()) {}
    }

    struct PanickingUnregisterSink;

    impl LogSink for PanickingUnregisterSink {
        type Handle = ();

        fn register(&self, _bridge: Arc<CallbackBridge>) -> std::result::Result<(), SinkError> {
            Ok(())
        }

        fn unregister(&self, _handle: ()) {
            panic!("emitter crashed during unregister");
        }
    }

    #[test]
    fn test_phase_round_trips_through_atomic() {
        for phase in [
            AdapterPhase::NeverEnabled,
            AdapterPhase::Enabled,
            AdapterPhase::Disabled,
        ] {
            assert_eq!(AdapterPhase::from_u8(phase as u8), phase);
        }
    }

    #[test]
    fn test_fresh_adapter_can_enable() {
        let adapter = LogAdapter::new(DirectSink::new());
        assert_eq!(adapter.phase(), AdapterPhase::NeverEnabled);
        assert!(adapter.can_enable());
        assert!(!adapter.is_enabled());
    }

    #[test]
    fn test_enable_then_disable_is_terminal() {
        let adapter = LogAdapter::new(DirectSink::new());

        adapter.enable(noop()).unwrap();
        assert!(adapter.is_enabled());
        assert!(!adapter.can_enable());
        assert!(adapter.sink().is_registered());

        adapter.disable();
        assert_eq!(adapter.phase(), AdapterPhase::Disabled);
        assert!(!adapter.sink().is_registered());

        let err = adapter.enable(noop()).unwrap_err();
        assert_eq!(
            err,
            AdapterError::AlreadyEnabled {
                phase: AdapterPhase::Disabled
            }
        );
        assert!(!adapter.sink().is_registered());
    }

    #[test]
    fn test_disable_before_enable_is_noop() {
        let adapter = LogAdapter::new(DirectSink::new());
        adapter.disable();
        assert!(adapter.can_enable());
        adapter.enable(noop()).unwrap();
        assert!(adapter.is_enabled());
    }

    #[test]
    fn test_registration_failure_keeps_never_enabled() {
        let adapter = LogAdapter::new(RejectingSink);

        let err = adapter.enable(noop()).unwrap_err();
        assert_eq!(
            err,
            AdapterError::Registration {
                message: "registration rejected: emitter offline".to_string()
            }
        );
        assert_eq!(adapter.phase(), AdapterPhase::NeverEnabled);
        assert!(!adapter.try_enable(noop()));
        assert!(adapter.can_enable());
    }

    #[test]
    fn test_panicking_unregister_still_reports_disabled() {
        let adapter = LogAdapter::new(PanickingUnregisterSink);
        adapter.enable(noop()).unwrap();

        let outcome =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| adapter.disable()));
        assert!(outcome.is_err());

        assert_eq!(adapter.phase(), AdapterPhase::Disabled);
        assert!(!adapter.is_enabled());
        assert!(!adapter.can_enable());
        assert!(adapter.enable(noop()).is_err());
    }

    #[test]
    fn test_drop_unregisters_live_bridge() {
        let sink = Arc::new(DirectSink::new());
        {
            let adapter = LogAdapter::new(Arc::clone(&sink));
            adapter.enable(noop()).unwrap();
            assert!(sink.is_registered());
        }
        assert!(!sink.is_registered());
    }
}
