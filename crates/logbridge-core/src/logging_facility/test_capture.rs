//! In-memory capture of adapter log events for tests
//!
//! `init_test_capture` installs a global subscriber whose only layer keeps
//! every event in memory. Test binaries run tests in parallel against that
//! one log, so assertions should select events by a unique operation name
//! or by registration id rather than by position.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

use crate::schema::{FIELD_ERR_CODE, FIELD_EVENT, FIELD_OP, FIELD_REGISTRATION_ID};

/// One captured event, fields rendered as text
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    fields: BTreeMap<&'static str, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn op(&self) -> Option<&str> {
        self.field(FIELD_OP)
    }

    pub fn event(&self) -> Option<&str> {
        self.field(FIELD_EVENT)
    }

    pub fn registration_id(&self) -> Option<&str> {
        self.field(FIELD_REGISTRATION_ID)
    }

    pub fn err_code(&self) -> Option<&str> {
        self.field(FIELD_ERR_CODE)
    }

    fn is(&self, op: &str, event: &str) -> bool {
        self.op() == Some(op) && self.event() == Some(event)
    }
}

// Strings are kept unquoted; everything else uses its Debug rendering.
struct Fields<'a>(&'a mut BTreeMap<&'static str, String>);

impl Visit for Fields<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name(), format!("{:?}", value));
    }
}

#[derive(Clone, Default)]
struct Shared(Arc<Mutex<Vec<CapturedEvent>>>);

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Vec<CapturedEvent>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: Subscriber> Layer<S> for Shared {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        event.record(&mut Fields(&mut fields));
        self.lock().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields,
        });
    }
}

/// Read side of the capture log
#[derive(Clone)]
pub struct TestCapture {
    shared: Shared,
}

impl TestCapture {
    /// Snapshot of everything captured so far
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.shared.lock().clone()
    }

    /// Events of one operation with the given event name, in capture order
    pub fn find(&self, op: &str, event: &str) -> Vec<CapturedEvent> {
        self.select(|e| e.is(op, event))
    }

    /// All lifecycle events logged for one registration
    pub fn for_registration(&self, id: &str) -> Vec<CapturedEvent> {
        self.select(|e| e.registration_id() == Some(id))
    }

    /// Event names logged for `op`, in order
    pub fn lifecycle(&self, op: &str) -> Vec<String> {
        self.shared
            .lock()
            .iter()
            .filter(|e| e.op() == Some(op))
            .filter_map(|e| e.event().map(str::to_string))
            .collect()
    }

    /// # Panics
    ///
    /// Panics if no event with this operation and event name was captured.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.shared.lock();
        assert!(
            events.iter().any(|e| e.is(op, event)),
            "Expected event op={} event={} among {} captured events",
            op,
            event,
            events.len()
        );
    }

    pub fn count_events(&self, predicate: impl Fn(&CapturedEvent) -> bool) -> usize {
        self.shared.lock().iter().filter(|e| predicate(e)).count()
    }

    pub fn clear(&self) {
        self.shared.lock().clear();
    }

    fn select(&self, predicate: impl Fn(&CapturedEvent) -> bool) -> Vec<CapturedEvent> {
        self.shared
            .lock()
            .iter()
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }
}

static CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture subscriber on first use and return its read side
///
/// If another global subscriber is already installed, the returned capture
/// stays empty.
///
/// ```
/// use logbridge_core::logging_facility::test_capture::init_test_capture;
/// use logbridge_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_capture_op");
/// assert_eq!(capture.lifecycle("doc_capture_op"), vec!["start"]);
/// ```
pub fn init_test_capture() -> TestCapture {
    CAPTURE
        .get_or_init(|| {
            let shared = Shared::default();
            let _ = tracing::subscriber::set_global_default(
                tracing_subscriber::registry().with(shared.clone()),
            );
            TestCapture { shared }
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(fields: &[(&'static str, &str)]) -> CapturedEvent {
        CapturedEvent {
            level: Level::INFO,
            target: "logbridge_core::adapter".to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (*k, v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_accessors_read_schema_fields() {
        let captured = event(&[
            (FIELD_OP, "log_adapter.enable"),
            (FIELD_EVENT, "end_error"),
            (FIELD_ERR_CODE, "ERR_REGISTRATION"),
        ]);

        assert!(captured.is("log_adapter.enable", "end_error"));
        assert!(!captured.is("log_adapter.enable", "end"));
        assert_eq!(captured.err_code(), Some("ERR_REGISTRATION"));
        assert_eq!(captured.registration_id(), None);
    }

    #[test]
    fn test_lifecycle_and_registration_selection() {
        let capture = TestCapture {
            shared: Shared::default(),
        };
        capture.shared.lock().extend([
            event(&[(FIELD_OP, "op.a"), (FIELD_EVENT, "start")]),
            event(&[(FIELD_OP, "op.b"), (FIELD_EVENT, "start")]),
            event(&[
                (FIELD_OP, "op.a"),
                (FIELD_EVENT, "end"),
                (FIELD_REGISTRATION_ID, "reg-9"),
            ]),
        ]);

        assert_eq!(capture.lifecycle("op.a"), vec!["start", "end"]);
        assert_eq!(capture.for_registration("reg-9").len(), 1);
        assert_eq!(capture.count_events(|e| e.event() == Some("start")), 2);

        capture.clear();
        assert!(capture.events().is_empty());
    }
}
