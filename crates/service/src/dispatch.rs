#![forbid(unsafe_code)]

use crate::FormService;
use serde_json::Value;

macro_rules! define_command_dispatch {
    ($($command_name:literal => $method:ident),* $(,)?) => {
        pub(crate) fn dispatch_command(
            service: &mut FormService,
            name: &str,
            args: Value,
        ) -> Option<Value> {
            let resp = match name {
                $($command_name => service.$method(args),)*
                _ => return None,
            };
            Some(resp)
        }

        /// Every command the service answers to, in dispatch order.
        pub fn command_names() -> &'static [&'static str] {
            &[$($command_name),*]
        }
    };
}

define_command_dispatch! {
    "procedure_create" => cmd_procedure_create,
    "procedure_get" => cmd_procedure_get,
    "procedure_list" => cmd_procedure_list,
    "procedure_update" => cmd_procedure_update,
    "procedure_delete" => cmd_procedure_delete,
    "procedure_duplicate" => cmd_procedure_duplicate,
    "execution_start" => cmd_execution_start,
    "execution_submit" => cmd_execution_submit,
    "execution_cancel" => cmd_execution_cancel,
    "execution_get" => cmd_execution_get,
    "execution_list" => cmd_execution_list,
    "form_render" => cmd_form_render,
    "field_options_editor" => cmd_field_options_editor,
}
