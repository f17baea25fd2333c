//! In-memory event capture for log assertions in tests
//!
//! Transformation passes for different hosts run side by side in one test
//! binary, so events are usually selected by their `host` field before
//! anything is asserted about them.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use skewbridge_core_types::schema::{FIELD_EVENT, FIELD_HOST, FIELD_OP};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One recorded event, every field rendered as text
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub fields: HashMap<String, String>,
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

    pub fn host(&self) -> Option<&str> {
        self.field(FIELD_HOST)
    }

    /// Formatted message of the event, if it had one
    pub fn message(&self) -> Option<&str> {
        self.field("message")
    }
}

#[derive(Default)]
struct FieldRecorder(HashMap<String, String>);

impl FieldRecorder {
    fn put(&mut self, field: &Field, value: String) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldRecorder {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }
}

/// Subscriber layer appending every event to a shared buffer
pub struct CaptureLayer {
    sink: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureLayer {
    /// Layer plus the handle reading what it records
    pub fn new() -> (Self, TestCapture) {
        let sink = Arc::new(Mutex::new(Vec::new()));
        (Self { sink: sink.clone() }, TestCapture { sink })
    }
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut recorder = FieldRecorder::default();
        event.record(&mut recorder);
        let captured = CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields: recorder.0,
        };
        if let Ok(mut sink) = self.sink.lock() {
            sink.push(captured);
        }
    }
}

#[derive(Clone)]
pub struct TestCapture {
    sink: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCapture {
    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.sink.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events logged for one target host
    pub fn events_for_host(&self, host: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.host() == Some(host))
            .collect()
    }

    /// Warning batches flushed for one target host
    pub fn warning_batches(&self, host: &str) -> Vec<CapturedEvent> {
        self.events_for_host(host)
            .into_iter()
            .filter(|e| e.event() == Some(skewbridge_core_types::schema::EVENT_TRANSFORM_WARNINGS))
            .collect()
    }

    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().iter().filter(|e| predicate(e)).count()
    }

    /// # Panics
    ///
    /// Panics when no event has both `op` and `event`.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let found = self.count_events(|e| e.op() == Some(op) && e.event() == Some(event));
        assert!(found > 0, "no {} event recorded for op {}", event, op);
    }

    pub fn clear(&self) {
        if let Ok(mut sink) = self.sink.lock() {
            sink.clear();
        }
    }
}

static CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the global subscriber, once per process
///
/// Later calls return the same handle. If another subscriber was installed
/// first nothing is recorded.
///
/// # Example
///
/// ```
/// use skewbridge_core::log_op_start;
/// use skewbridge_core::logging_facility::test_capture::init_test_capture;
///
/// let capture = init_test_capture();
/// log_op_start!("transform_resource", host = "slave-a");
/// assert_eq!(capture.events_for_host("slave-a").len(), 1);
/// capture.assert_event_exists("transform_resource", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    CAPTURE
        .get_or_init(|| {
            let (layer, capture) = CaptureLayer::new();
            let _ = tracing_subscriber::registry().with(layer).try_init();
            capture
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warning(host: &str) -> CapturedEvent {
        let fields = [
            (FIELD_EVENT, skewbridge_core_types::schema::EVENT_TRANSFORM_WARNINGS),
            (FIELD_HOST, host),
            ("message", "There were problems"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        CapturedEvent {
            level: Level::WARN,
            target: "skewbridge_core::transform::logger".to_string(),
            fields,
        }
    }

    #[test]
    fn test_field_accessors() {
        let event = warning("slave");

        assert_eq!(event.host(), Some("slave"));
        assert_eq!(event.event(), Some("transform_warnings"));
        assert_eq!(event.op(), None);
        assert!(event.message().is_some_and(|m| m.starts_with("There were")));
    }

    #[test]
    fn test_host_filters() {
        let (_layer, capture) = CaptureLayer::new();
        capture.sink.lock().unwrap().extend([warning("a"), warning("b"), warning("a")]);

        assert_eq!(capture.events_for_host("a").len(), 2);
        assert_eq!(capture.warning_batches("b").len(), 1);
        capture.clear();
        assert!(capture.events().is_empty());
    }
}
