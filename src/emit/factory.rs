use super::php_str;
use crate::ast::{FieldDescriptor, FieldType};
use crate::naming::related_model;

/// Fake-value expression for one field type.
pub fn fake_value(typ: &FieldType) -> &'static str {
    match typ {
        FieldType::Integer | FieldType::BigInteger => "$this->faker->randomNumber()",
        FieldType::Float | FieldType::Double | FieldType::Decimal => "$this->faker->randomFloat(2, 0, 1000)",
        FieldType::Boolean => "$this->faker->boolean()",
        FieldType::Date | FieldType::DateTime => "$this->faker->dateTime()",
        FieldType::Text | FieldType::LongText => "$this->faker->paragraph()",
        FieldType::Json => "json_encode(['key' => 'value'])",
        FieldType::Email => "$this->faker->unique()->safeEmail()",
        _ => "$this->faker->word()",
    }
}

/// Body of a factory `definition()` array.
pub fn emit_factory(fields: &[FieldDescriptor]) -> Vec<String> {
    let mut lines: Vec<String> = fields
        .iter()
        .filter(|f| !f.is_reserved())
        .map(|field| {
            let value = match &field.foreign {
                Some(fk) => format!("\\App\\Models\\{}::factory()", related_model(&fk.table)),
                None => fake_value(&field.typ).to_string(),
            };
            format!("{} => {},", php_str(&field.name), value)
        })
        .collect();

    lines.push("'created_at' => now(),".to_string());
    lines.push("'updated_at' => now(),".to_string());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_fields;

    #[test]
    fn test_factory_lines() {
        let spec = parse_fields("title,bio:text,price:decimal,active:boolean,meta:json").unwrap();
        let lines = emit_factory(&spec.fields);
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "'title' => $this->faker->word(),");
        assert_eq!(lines[1], "'bio' => $this->faker->paragraph(),");
        assert_eq!(lines[2], "'price' => $this->faker->randomFloat(2, 0, 1000),");
        assert_eq!(lines[3], "'active' => $this->faker->boolean(),");
        assert_eq!(lines[4], "'meta' => json_encode(['key' => 'value']),");
        assert_eq!(lines[6], "'updated_at' => now(),");
    }

    #[test]
    fn test_foreign_defers_to_related_factory() {
        let spec = parse_fields("category_id:foreign:categories").unwrap();
        let lines = emit_factory(&spec.fields);
        assert_eq!(lines[0], r"'category_id' => \App\Models\Category::factory(),");
    }

    #[test]
    fn test_reserved_fields_only_in_trailer() {
        let spec = parse_fields("id,created_at:dateTime,updated_at,title").unwrap();
        let lines = emit_factory(&spec.fields);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.iter().filter(|l| l.contains("created_at")).count(), 1);
    }
}
