#![forbid(unsafe_code)]

use pk_core::fields::{FieldDef, FieldKind, FieldList};
use pk_core::model::ProcedureCategory;

#[derive(Clone, Debug)]
pub struct ProcedureRow {
    pub id: String,
    pub tenant: String,
    pub title: String,
    pub description: Option<String>,
    pub category: ProcedureCategory,
    pub tags: Vec<String>,
    pub is_global: bool,
    /// Recomputed on every read by counting execution rows; never stored.
    pub executions_count: i64,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct FieldRow {
    pub id: String,
    pub procedure_id: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub order_index: i64,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

impl FieldRow {
    pub fn to_def(&self) -> FieldDef {
        FieldDef {
            id: self.id.clone(),
            label: self.label.clone(),
            kind: self.kind.clone(),
            required: self.required,
        }
    }
}

/// A procedure with its fields, ordered by `order_index`.
#[derive(Clone, Debug)]
pub struct ProcedureRecord {
    pub procedure: ProcedureRow,
    pub fields: Vec<FieldRow>,
}

impl ProcedureRecord {
    pub fn field_list(&self) -> FieldList {
        FieldList::from_vec(self.fields.iter().map(FieldRow::to_def).collect())
    }
}
