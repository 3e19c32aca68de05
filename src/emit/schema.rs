//! Migration column definitions.

use super::php_str;
use crate::ast::{FieldDescriptor, FieldType, ForeignKey, Modifier, OnDelete};

/// Column statements for a `Schema::create` closure.
///
/// Always opens with the primary key and closes with the timestamp and
/// soft-delete columns; reserved names in between are never re-declared.
pub fn emit_schema(fields: &[FieldDescriptor]) -> Vec<String> {
    let mut lines = vec!["$table->id();".to_string()];

    for field in fields.iter().filter(|f| !f.is_reserved()) {
        match &field.foreign {
            Some(fk) => lines.extend(foreign_statements(&field.name, fk)),
            None => lines.push(column_statement(field)),
        }
    }

    lines.push("$table->timestamps();".to_string());
    lines.push("$table->softDeletes();".to_string());
    lines
}

fn foreign_statements(name: &str, fk: &ForeignKey) -> [String; 2] {
    let mut column = format!("$table->unsignedBigInteger({})", php_str(name));
    // SET NULL needs a nullable column to act on.
    if fk.on_delete == Some(OnDelete::SetNull) {
        column.push_str("->nullable()");
    }
    column.push(';');

    let mut constraint = format!(
        "$table->foreign({})->references({})->on({})",
        php_str(name),
        php_str(&fk.column),
        php_str(&fk.table)
    );
    if let Some(action) = fk.on_delete {
        constraint.push_str(&format!("->onDelete({})", php_str(action.as_sql())));
    }
    constraint.push(';');

    [column, constraint]
}

fn column_method(typ: &FieldType) -> &str {
    match typ {
        FieldType::Email => "string",
        other => other.as_str(),
    }
}

fn column_statement(field: &FieldDescriptor) -> String {
    let mut def = format!("$table->{}({})", column_method(&field.typ), php_str(&field.name));

    // Fixed order regardless of how the modifiers were written.
    if field.has(&Modifier::Nullable) {
        def.push_str("->nullable()");
    }
    if let Some(value) = field.default_value() {
        def.push_str(&format!("->default({})", php_str(value)));
    }
    if field.has(&Modifier::Unique) {
        def.push_str("->unique()");
    }
    if field.has(&Modifier::Index) {
        def.push_str("->index()");
    }

    def.push(';');
    def
}
