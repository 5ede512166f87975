#![forbid(unsafe_code)]

use pk_core::fields::FieldKind;
use pk_core::fields::Answers;
use pk_core::model::ProcedureCategory;

/// One field as supplied by a caller. `id` is kept when given (client-side
/// generation) and minted from the tenant's counter when `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldInput {
    pub id: Option<String>,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProcedureCreateRequest {
    pub title: String,
    pub description: Option<String>,
    pub category: ProcedureCategory,
    pub tags: Vec<String>,
    pub is_global: bool,
    pub fields: Vec<FieldInput>,
}

/// Partial update. `Option<Option<…>>` distinguishes "leave alone" from
/// "clear"; a present `fields` replaces the whole field set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProcedureUpdateRequest {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<ProcedureCategory>,
    pub tags: Option<Vec<String>>,
    pub is_global: Option<bool>,
    pub fields: Option<Vec<FieldInput>>,
}

impl ProcedureUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.tags.is_none()
            && self.is_global.is_none()
            && self.fields.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListProceduresRequest {
    pub limit: usize,
    pub offset: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionStartRequest {
    pub procedure_id: String,
    pub work_order_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionSubmitRequest {
    pub execution_id: String,
    pub answers: Answers,
    pub score: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionCancelRequest {
    pub execution_id: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListExecutionsRequest {
    pub procedure_id: Option<String>,
    pub work_order_id: Option<String>,
    pub limit: usize,
    pub offset: usize,
}
