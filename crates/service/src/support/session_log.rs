#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

/// A small plain-text record of the current session, refreshed on every
/// command so the last action and the last store failure survive a crash.
#[derive(Clone, Debug)]
pub(crate) struct SessionLog {
    path: PathBuf,
    start_rfc3339: String,
    pid: u32,
    last_command: Option<String>,
    last_error: Option<String>,
}

impl SessionLog {
    pub(crate) fn new(storage_dir: &Path) -> Self {
        let this = Self {
            path: storage_dir.join("prockit_last_session.txt"),
            start_rfc3339: super::ts_ms_to_rfc3339(super::now_ms_i64()),
            pid: std::process::id(),
            last_command: None,
            last_error: None,
        };
        this.flush();
        this
    }

    pub(crate) fn note_command(&mut self, command: &str) {
        self.last_command = Some(truncate(command, 240));
        self.flush();
    }

    pub(crate) fn note_error(&mut self, message: &str) {
        self.last_error = Some(truncate(message, 240));
        self.flush();
    }

    fn flush(&self) {
        let mut body = String::new();
        body.push_str(&format!("start: {}\n", self.start_rfc3339));
        body.push_str(&format!("pid: {}\n", self.pid));
        if let Some(command) = &self.last_command {
            body.push_str(&format!("last_command: {command}\n"));
        }
        if let Some(message) = &self.last_error {
            body.push_str(&format!("last_error: {message}\n"));
        }
        let _ = std::fs::write(&self.path, body);
    }
}

fn truncate(value: &str, max: usize) -> String {
    if value.len() <= max {
        return value.to_string();
    }
    let mut cut = max;
    while !value.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…", &value[..cut])
}
