//! Query-filter methods.
//!
//! A [`FilterPolicy`] both renders the PHP method body and evaluates an
//! incoming request value the same way that body does, so the generated
//! behaviour can be checked without a PHP runtime.

use super::php_str;
use crate::ast::{FieldDescriptor, FieldType};
use crate::naming::method_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPolicy {
    /// `LIKE %value%`
    Substring,
    /// `a,b` is a between, anything else is equality.
    NumericRange,
    /// `a,b` is a between, anything else is a date-truncated equality.
    DateRange,
    /// Value coerced to bool before equality.
    Boolean,
    Exact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Bool(bool),
}

/// Query constraint a filter method adds for one request value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Like { column: String, pattern: String },
    Between { column: String, low: String, high: String },
    Equals { column: String, value: FilterValue },
    DateEquals { column: String, value: String },
}

impl FilterPolicy {
    pub fn for_type(typ: &FieldType) -> Self {
        match typ {
            FieldType::String | FieldType::Text => Self::Substring,
            FieldType::Integer | FieldType::BigInteger | FieldType::Float | FieldType::Decimal => {
                Self::NumericRange
            }
            FieldType::Date | FieldType::DateTime => Self::DateRange,
            FieldType::Boolean => Self::Boolean,
            _ => Self::Exact,
        }
    }

    pub fn apply(self, column: &str, value: &str) -> Predicate {
        let column = column.to_string();
        match self {
            Self::Substring => Predicate::Like {
                column,
                pattern: format!("%{}%", value),
            },
            Self::NumericRange | Self::DateRange if value.contains(',') => {
                let mut ends = value.split(',');
                Predicate::Between {
                    column,
                    low: ends.next().unwrap_or_default().to_string(),
                    high: ends.next().unwrap_or_default().to_string(),
                }
            }
            Self::DateRange => Predicate::DateEquals {
                column,
                value: value.to_string(),
            },
            Self::Boolean => Predicate::Equals {
                column,
                value: FilterValue::Bool(parse_bool(value)),
            },
            Self::NumericRange | Self::Exact => Predicate::Equals {
                column,
                value: FilterValue::Text(value.to_string()),
            },
        }
    }

    /// Method body lines, without braces or indentation.
    fn body(self, column: &str) -> Vec<String> {
        let col = php_str(column);
        let range = |exact: String| {
            vec![
                "if (str_contains($value, ',')) {".to_string(),
                format!("    return $this->builder->whereBetween({}, array_slice(explode(',', $value), 0, 2));", col),
                "}".to_string(),
                exact,
            ]
        };
        match self {
            Self::Substring => vec![format!(
                "return $this->builder->where({}, 'LIKE', \"%{{$value}}%\");",
                col
            )],
            Self::NumericRange => range(format!("return $this->builder->where({}, $value);", col)),
            Self::DateRange => range(format!("return $this->builder->whereDate({}, $value);", col)),
            Self::Boolean => vec![format!(
                "return $this->builder->where({}, filter_var($value, FILTER_VALIDATE_BOOLEAN));",
                col
            )],
            Self::Exact => vec![format!("return $this->builder->where({}, $value);", col)],
        }
    }
}

/// Same truth table as PHP's `FILTER_VALIDATE_BOOLEAN`.
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterMethod {
    pub name: String,
    pub column: String,
    pub policy: FilterPolicy,
}

impl FilterMethod {
    pub fn render(&self) -> String {
        let mut out = format!("public function {}($value)\n    {{\n", self.name);
        for line in self.policy.body(&self.column) {
            out.push_str("        ");
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str("    }");
        out
    }
}

/// Filter methods in field order, plus warnings for method-name collisions.
///
/// Two columns that camel-case to the same method name cannot both exist on
/// one class; the later column keeps the name.
pub fn emit_filters(fields: &[FieldDescriptor]) -> (Vec<FilterMethod>, Vec<String>) {
    let mut methods: Vec<FilterMethod> = Vec::new();
    let mut warnings = Vec::new();

    for field in fields.iter().filter(|f| !f.is_reserved()) {
        let method = FilterMethod {
            name: method_name(&field.name),
            column: field.name.clone(),
            policy: FilterPolicy::for_type(&field.typ),
        };
        if let Some(pos) = methods.iter().position(|m| m.name == method.name) {
            let replaced = methods.remove(pos);
            let warning = format!(
                "filter method `{}` for `{}` replaces the one for `{}`",
                method.name, method.column, replaced.column
            );
            warnings.push(warning);
        }
        methods.push(method);
    }

    (methods, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_fields;

    fn policy(spec: &str) -> FilterPolicy {
        let parsed = parse_fields(spec).unwrap();
        FilterPolicy::for_type(&parsed.fields[0].typ)
    }

    #[test]
    fn test_integer_range_or_equality() {
        let p = policy("age:integer");
        assert_eq!(
            p.apply("age", "18,30"),
            Predicate::Between {
                column: "age".into(),
                low: "18".into(),
                high: "30".into()
            }
        );
        assert_eq!(
            p.apply("age", "18"),
            Predicate::Equals {
                column: "age".into(),
                value: FilterValue::Text("18".into())
            }
        );
    }

    #[test]
    fn test_date_exact_is_truncated() {
        let p = policy("born_on:date");
        assert!(matches!(p.apply("born_on", "2024-01-01"), Predicate::DateEquals { .. }));
        assert!(matches!(p.apply("born_on", "2024-01-01,2024-02-01"), Predicate::Between { .. }));
    }

    #[test]
    fn test_string_substring() {
        assert_eq!(
            policy("title").apply("title", "rust"),
            Predicate::Like {
                column: "title".into(),
                pattern: "%rust%".into()
            }
        );
    }

    #[test]
    fn test_boolean_coercion() {
        let p = policy("active:boolean");
        for (input, expected) in [("true", true), ("1", true), ("Yes", true), ("on", true), ("0", false), ("no", false), ("", false)] {
            assert_eq!(
                p.apply("active", input),
                Predicate::Equals {
                    column: "active".into(),
                    value: FilterValue::Bool(expected)
                },
                "input {input:?}"
            );
        }
    }

    #[test]
    fn test_other_types_use_equality() {
        assert_eq!(policy("ratio:double"), FilterPolicy::Exact);
        assert_eq!(policy("contact:email"), FilterPolicy::Exact);
        assert_eq!(policy("meta:json"), FilterPolicy::Exact);
    }

    #[test]
    fn test_render_range_method() {
        let spec = parse_fields("unit_price:decimal").unwrap();
        let (methods, _) = emit_filters(&spec.fields);
        let php = methods[0].render();
        assert!(php.starts_with("public function unitPrice($value)"));
        assert!(php.contains("whereBetween('unit_price'"));
        assert!(php.contains("return $this->builder->where('unit_price', $value);"));
    }

    #[test]
    fn test_render_like_method() {
        let spec = parse_fields("title").unwrap();
        let (methods, _) = emit_filters(&spec.fields);
        assert!(methods[0].render().contains(r#"where('title', 'LIKE', "%{$value}%")"#));
    }

    #[test]
    fn test_reserved_excluded_and_collisions_warned() {
        let spec = parse_fields("id,first_name,firstName:integer,created_at:date").unwrap();
        let (methods, warnings) = emit_filters(&spec.fields);
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].column, "firstName");
        assert_eq!(methods[0].policy, FilterPolicy::NumericRange);
        assert_eq!(warnings.len(), 1);
    }
}
