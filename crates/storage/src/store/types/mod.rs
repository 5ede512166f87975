#![forbid(unsafe_code)]

mod executions;
mod procedures;

pub use executions::ExecutionRow;
pub use procedures::{FieldRow, ProcedureRecord, ProcedureRow};
