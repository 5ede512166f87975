#![forbid(unsafe_code)]

mod convert;
mod dispatch;
mod handlers;
mod session;
mod support;

pub use dispatch::command_names;
pub use session::{Principal, SessionContext, SessionError};

use pk_storage::{SqliteStore, StoreError};
use serde_json::Value;
use std::path::Path;
use support::SessionLog;

/// The procedures command surface: named commands with JSON arguments over
/// the gateway and forms layers.
///
/// Commands require an attached [`SessionContext`]; the context carries the
/// resolved tenant so no handler ever re-derives it from ambient state.
pub struct FormService {
    pub(crate) store: SqliteStore,
    pub(crate) session: Option<SessionContext>,
    pub(crate) session_log: SessionLog,
}

impl FormService {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let store = SqliteStore::open(&storage_dir)?;
        let session_log = SessionLog::new(store.storage_dir());
        Ok(Self {
            store,
            session: None,
            session_log,
        })
    }

    pub fn attach_session(&mut self, session: SessionContext) {
        self.session = Some(session);
    }

    pub fn clear_session(&mut self) {
        self.session = None;
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// Runs one named command. Unknown names get an error envelope, never a
    /// panic.
    pub fn handle(&mut self, command: &str, args: Value) -> Value {
        self.session_log.note_command(command);
        match dispatch::dispatch_command(self, command, args) {
            Some(response) => response,
            None => support::error(
                "UNKNOWN_COMMAND",
                &format!("unknown command \"{command}\""),
            ),
        }
    }

    pub(crate) fn require_session(&self) -> Result<SessionContext, Value> {
        match &self.session {
            Some(session) => Ok(session.clone()),
            None => Err(support::error(
                "NOT_AUTHENTICATED",
                "no session is attached; sign in first",
            )),
        }
    }

    pub(crate) fn store_failure(&mut self, err: StoreError) -> Value {
        let message = support::format_store_error(&err);
        self.session_log.note_error(&message);
        match err {
            StoreError::UnknownId => support::error("NOT_FOUND", "no such record in this tenant"),
            StoreError::InvalidInput(reason) => support::error("INVALID_INPUT", reason),
            StoreError::ExecutionAlreadyTerminal { .. } => support::error_with(
                "CONFLICT",
                &message,
                Some("terminal executions cannot transition; start a new execution instead"),
            ),
            StoreError::Io(_) | StoreError::Sql(_) | StoreError::PayloadDecode { .. } => {
                support::error("STORE_ERROR", &message)
            }
        }
    }
}
