//! Structured logging.
//!
//! # Responsibilities
//! - Render every event as one JSON line
//! - Open the optional log file sink
//!
//! # Design Decisions
//! - Field set follows the log shipper's expectations: `timestamp`, `level`,
//!   `msg` plus the event's own fields (`requestID` on request-scoped lines)
//! - Levels are lowercase, timestamps RFC 3339 in UTC
//! - A log file that cannot be opened is reported, never fatal

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Event formatter producing one JSON object per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLines;

impl<S, N> FormatEvent<S, N> for JsonLines
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let line = render_line(*event.metadata().level(), visitor.fields, Utc::now())
            .map_err(|_| fmt::Error)?;
        writeln!(writer, "{line}")
    }
}

/// Serialize one log record.
pub fn render_line(
    level: Level,
    mut fields: Map<String, Value>,
    at: DateTime<Utc>,
) -> Result<String, serde_json::Error> {
    fields.insert("level".into(), Value::from(level.to_string().to_ascii_lowercase()));
    fields.insert(
        "timestamp".into(),
        Value::from(at.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    serde_json::to_string(&Value::Object(fields))
}

#[derive(Default)]
struct FieldVisitor {
    fields: Map<String, Value>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        let key = match field.name() {
            "message" => "msg",
            other => other,
        };
        self.fields.insert(key.to_string(), value);
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::from(format!("{value:?}")));
    }
}

/// Open `path` for appending, creating its directory first.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for SharedBuf {
        type Writer = SharedBuf;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(f: impl FnOnce()) -> Vec<Value> {
        let buf = SharedBuf::default();
        let subscriber = tracing_subscriber::fmt()
            .event_format(JsonLines)
            .with_writer(buf.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);

        let bytes = buf.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_event_renders_expected_fields() {
        let lines = capture(|| {
            tracing::info!(requestID = %1_234u64, size = 20_000u64, "Finished sorting");
        });

        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line["msg"], "Finished sorting");
        assert_eq!(line["requestID"], "1234");
        assert_eq!(line["size"], 20_000);
        assert_eq!(line["level"], "info");
        assert!(line["timestamp"].as_str().unwrap().ends_with('Z'));
        assert!(line.get("message").is_none());
    }

    #[test]
    fn test_warn_level_is_lowercase() {
        let lines = capture(|| tracing::warn!(status = 400u64, "Request is even"));
        assert_eq!(lines[0]["level"], "warn");
        assert_eq!(lines[0]["status"], 400);
    }

    #[test]
    fn test_render_line_timestamp_format() {
        let at = DateTime::parse_from_rfc3339("2024-03-01T12:00:00.250Z")
            .unwrap()
            .with_timezone(&Utc);
        let line = render_line(Level::ERROR, Map::new(), at).unwrap();
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["timestamp"], "2024-03-01T12:00:00.250Z");
        assert_eq!(value["level"], "error");
    }

    #[test]
    fn test_open_log_file_creates_directory() {
        let dir = std::env::temp_dir().join(format!("podperf-log-{}", std::process::id()));
        let path = dir.join("nested").join("app.log");

        let mut file = open_log_file(&path).unwrap();
        writeln!(file, "line").unwrap();
        assert!(path.exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
