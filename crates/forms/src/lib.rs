#![forbid(unsafe_code)]

pub mod editor;
pub mod render;
pub mod validate;

pub use editor::{EditorInput, OptionsEditor, options_editor};
pub use render::{RenderMode, RenderedControl, render_field, render_form};
pub use validate::{ValidationIssue, validate_answer, validate_answers};
