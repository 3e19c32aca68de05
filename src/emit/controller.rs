use super::php_str;
use crate::ast::FieldDescriptor;

/// Request-to-attribute mapping used by the controller's store and update.
pub fn emit_field_mappings(fields: &[FieldDescriptor]) -> Vec<String> {
    fields
        .iter()
        .filter(|f| !f.is_reserved())
        .map(|f| format!("{} => $request->input({})", php_str(&f.name), php_str(&f.name)))
        .collect()
}
