use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::Serialize;
use tracing::{debug, warn};

use crate::trace::trace::FillTraceEvent;

struct Sink {
    path: PathBuf,
    writer: BufWriter<File>,
    written: usize,
}

/// Append-only JSONL sink for fill events. A logger whose file could not be
/// opened swallows events.
pub struct TraceLogger {
    sink: Option<Mutex<Sink>>,
}

impl TraceLogger {
    pub fn new(path: &Path) -> Self {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Self {
                sink: Some(Mutex::new(Sink {
                    path: path.to_path_buf(),
                    writer: BufWriter::new(file),
                    written: 0,
                })),
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not open trace file, tracing disabled");
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Lines written by this logger so far.
    pub fn written(&self) -> usize {
        self.sink
            .as_ref()
            .and_then(|s| s.lock().ok().map(|s| s.written))
            .unwrap_or(0)
    }

    pub fn log(&self, event: &FillTraceEvent) {
        self.append(event);
    }

    fn append<T: Serialize>(&self, record: &T) {
        let Some(sink) = &self.sink else {
            return;
        };
        let Ok(mut sink) = sink.lock() else {
            warn!("trace sink lock poisoned");
            return;
        };

        let result = serde_json::to_writer(&mut sink.writer, record)
            .map_err(std::io::Error::from)
            .and_then(|()| sink.writer.write_all(b"\n"))
            .and_then(|()| sink.writer.flush());
        match result {
            Ok(()) => {
                sink.written += 1;
                debug!(path = %sink.path.display(), line = sink.written, "trace event written");
            }
            Err(e) => warn!(path = %sink.path.display(), error = %e, "failed to write trace event"),
        }
    }
}
