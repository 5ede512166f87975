#![forbid(unsafe_code)]

//! The procedure field schema: one closed tagged union of field kinds, the
//! per-kind option payloads, the ordered field collection, and answer values.
//!
//! Every consumer (renderer, options editor, validator, gateway) switches
//! over [`FieldKind`]; there is no second enumeration of the type tags
//! anywhere in the workspace.

mod answers;
mod kind;
mod list;
mod options;

pub use answers::{AnswerDecodeError, AnswerValue, Answers};
pub use kind::{FieldDecodeError, FieldKind};
pub use list::{FieldList, FieldListError};
pub use options::{
    ChoiceOptions, DateOptions, FileOptions, InfoOptions, InspectionOptions, NumberOptions,
    RatingOptions, TextOptions,
};

/// One input/display unit within a procedure.
///
/// `order_index` is not stored here: a field's position is its index inside
/// the owning [`FieldList`], and the gateway materializes that index on save.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDef {
    pub id: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldDef {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            required: false,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        // Required is meaningless for presentation-only kinds.
        self.required = required && self.kind.is_input();
        self
    }
}

#[cfg(test)]
mod tests;
