use super::php_str;
use crate::ast::FieldDescriptor;

/// Attribute lines for an API resource's `toArray()`; `id` always leads.
pub fn emit_resource(fields: &[FieldDescriptor]) -> Vec<String> {
    let mut lines = vec!["'id' => $this->id,".to_string()];
    lines.extend(
        fields
            .iter()
            .filter(|f| !f.is_reserved())
            .map(|f| format!("{} => $this->{},", php_str(&f.name), f.name)),
    );
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_fields;

    #[test]
    fn test_resource_lines() {
        let spec = parse_fields("title,id,author_id:foreign,created_at").unwrap();
        assert_eq!(
            emit_resource(&spec.fields),
            vec![
                "'id' => $this->id,",
                "'title' => $this->title,",
                "'author_id' => $this->author_id,",
            ]
        );
    }
}
