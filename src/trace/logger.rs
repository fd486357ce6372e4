use std::{fs::OpenOptions, io::Write, path::Path, sync::Mutex};

use tracing::warn;

use crate::trace::trace::TraceEvent;

/// Append-only JSONL sink for [`TraceEvent`]s. Write failures only warn.
pub struct TraceLogger {
    file: Option<Mutex<std::fs::File>>,
}

impl TraceLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let file = OpenOptions::new().create(true).append(true).open(path);

        match file {
            Ok(f) => Self {
                file: Some(Mutex::new(f)),
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not open trace file");
                Self { file: None }
            }
        }
    }

    /// A logger that drops every event.
    pub fn disabled() -> Self {
        Self { file: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    /// Append one event as a JSON line.
    pub fn log(&self, event: &TraceEvent) {
        let Some(sink) = &self.file else { return };

        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, url = %event.url, "failed to serialize trace event");
                return;
            }
        };

        let Ok(mut file) = sink.lock() else {
            warn!("trace sink lock poisoned; dropping event");
            return;
        };
        if let Err(e) = writeln!(file, "{}", line) {
            warn!(error = %e, "failed to append trace event");
        }
    }
}
