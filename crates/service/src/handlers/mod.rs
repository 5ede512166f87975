#![forbid(unsafe_code)]

mod executions;
mod forms;
mod procedures;
