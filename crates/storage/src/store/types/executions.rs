#![forbid(unsafe_code)]

use pk_core::fields::Answers;
use pk_core::model::ExecutionStatus;

#[derive(Clone, Debug)]
pub struct ExecutionRow {
    pub id: String,
    pub tenant: String,
    pub procedure_id: String,
    pub work_order_id: Option<String>,
    pub user_id: Option<String>,
    pub answers: Answers,
    pub score: f64,
    pub status: ExecutionStatus,
    pub started_at_ms: i64,
    pub completed_at_ms: Option<i64>,
}
