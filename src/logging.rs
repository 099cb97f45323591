use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::FmtSubscriber;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::registry::LookupSpan;

/// Installs the global subscriber: one line per event, teed to stdout and
/// the append-only log file.
///
/// The server keeps running on stdout alone when the file cannot be opened;
/// the open error is handed back so the caller can report it. Installing a
/// second global subscriber is an error.
pub fn init(log_file: &Path, level: Level) -> anyhow::Result<Option<std::io::Error>> {
    let (file, open_error) = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
    {
        Ok(file) => (Some(Arc::new(Mutex::new(file))), None),
        Err(e) => (None, Some(e)),
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_ansi(false)
        .event_format(LineFormat)
        .with_writer(TeeMakeWriter {
            file,
            suppress_stdout: false,
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("a global tracing subscriber is already installed")?;

    Ok(open_error)
}

#[derive(Clone)]
pub(crate) struct TeeMakeWriter {
    pub file: Option<Arc<Mutex<File>>>,
    pub suppress_stdout: bool,
}

impl<'a> MakeWriter<'a> for TeeMakeWriter {
    type Writer = TeeWriter;

    fn make_writer(&'a self) -> Self::Writer {
        TeeWriter {
            file: self.file.clone(),
            suppress_stdout: self.suppress_stdout,
        }
    }
}

pub(crate) struct TeeWriter {
    file: Option<Arc<Mutex<File>>>,
    suppress_stdout: bool,
}

impl std::io::Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Some(file) = &self.file
            && let Ok(mut file) = file.lock()
        {
            let _ = file.write_all(buf); // best effort
        }
        if !self.suppress_stdout {
            std::io::stdout().write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if let Some(file) = &self.file
            && let Ok(mut file) = file.lock()
        {
            let _ = file.flush();
        }
        if !self.suppress_stdout {
            std::io::stdout().flush()?;
        }
        Ok(())
    }
}

/// `[2026-01-31T12:00:00.000Z] [INFO] message {"key":"value"}`
pub(crate) struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
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
        let mut fields = JsonFields::default();
        event.record(&mut fields);

        write!(
            writer,
            "[{}] [{}] {}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event.metadata().level(),
            fields.message
        )?;
        if !fields.data.is_empty() {
            write!(writer, " {}", Value::Object(fields.data))?;
        }
        writeln!(writer)
    }
}

#[derive(Default)]
struct JsonFields {
    message: String,
    data: Map<String, Value>,
}

impl JsonFields {
    fn insert(&mut self, field: &Field, value: Value) {
        self.data.insert(field.name().to_string(), value);
    }
}

impl Visit for JsonFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.insert(field, Value::from(value));
        }
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
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.insert(field, Value::from(format!("{:?}", value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn capture<F: FnOnce()>(f: F) -> String {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .unwrap();

        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_ansi(false)
            .event_format(LineFormat)
            .with_writer(TeeMakeWriter {
                file: Some(Arc::new(Mutex::new(file))),
                suppress_stdout: true,
            })
            .finish();
        tracing::subscriber::with_default(subscriber, f);

        let mut out = String::new();
        File::open(&path).unwrap().read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn writes_timestamp_level_message_and_json() {
        let out = capture(|| {
            tracing::error!(args = "status", code = 2u64, "CLI invocation failed");
        });
        let line = out.lines().next().unwrap();

        assert!(line.starts_with('['));
        let (stamp, rest) = line[1..].split_once("] ").unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok(), "{stamp}");
        assert!(stamp.ends_with('Z'));

        let (message, json) = rest
            .strip_prefix("[ERROR] ")
            .unwrap()
            .split_once(" {")
            .unwrap();
        assert_eq!(message, "CLI invocation failed");
        let data: Value = serde_json::from_str(&format!("{{{json}")).unwrap();
        assert_eq!(data, serde_json::json!({ "args": "status", "code": 2 }));
    }

    #[test]
    fn omits_json_when_there_are_no_fields() {
        let out = capture(|| tracing::info!("listening"));
        assert!(out.trim_end().ends_with("[INFO] listening"), "{out}");
    }

    #[test]
    fn display_fields_become_strings() {
        let path = std::path::PathBuf::from("/tmp/x.log");
        let out = capture(|| tracing::warn!(path = %path.display(), "traversal rejected"));
        assert!(out.contains("[WARN] traversal rejected {\"path\":\"/tmp/x.log\"}"), "{out}");
    }

    #[test]
    fn appends_one_line_per_event() {
        let out = capture(|| {
            tracing::info!("one");
            tracing::debug!("two");
            tracing::trace!("dropped");
        });
        assert_eq!(out.lines().count(), 2);
    }

    #[test]
    fn init_reports_open_failure_and_rejects_second_install() {
        let dir = tempfile::tempdir().unwrap();
        let unopenable = dir.path().join("missing-dir").join("clawboard.log");

        let open_error = init(&unopenable, Level::INFO).unwrap();
        assert!(open_error.is_some());

        let err = init(&dir.path().join("clawboard.log"), Level::INFO).unwrap_err();
        assert!(err.to_string().contains("already installed"), "{err}");
    }
}
