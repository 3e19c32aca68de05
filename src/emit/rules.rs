//! Form-request validation rules and their messages.

use serde::{Deserialize, Serialize};

use super::php_str;
use crate::ast::{FieldDescriptor, FieldType, Modifier};

/// How requiredness differs between the store and update requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequirednessPolicy {
    /// Both requests mark every field `required`.
    #[default]
    Always,
    /// Store marks fields `required`; update only validates what is sent.
    StrictCreate,
}

impl RequirednessPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "always" => Some(Self::Always),
            "strict-create" => Some(Self::StrictCreate),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::StrictCreate => "strict-create",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Store,
    Update,
}

impl RequestKind {
    /// Class-name prefix: `StorePostRequest`, `UpdatePostRequest`.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Store => "Store",
            Self::Update => "Update",
        }
    }
}

/// Rule and message lines for one form request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    pub rules: Vec<String>,
    pub messages: Vec<String>,
}

/// Ordered rules for a single field: requiredness first, then one type rule.
///
/// `nullable` wins over everything; an explicit `required` modifier keeps the
/// field required in the update request under `strict-create`.
pub fn field_rules(field: &FieldDescriptor, kind: RequestKind, policy: RequirednessPolicy) -> Vec<String> {
    let presence = if field.is_nullable() {
        "nullable"
    } else if field.has(&Modifier::Required) {
        "required"
    } else {
        match (policy, kind) {
            (RequirednessPolicy::StrictCreate, RequestKind::Update) => "sometimes",
            _ => "required",
        }
    };
    let mut rules = vec![presence.to_string()];

    if let Some(fk) = &field.foreign {
        rules.push(format!("exists:{},{}", fk.table, fk.column));
        return rules;
    }

    match field.typ {
        FieldType::Integer | FieldType::BigInteger => rules.push("integer".into()),
        FieldType::Float | FieldType::Double | FieldType::Decimal => rules.push("numeric".into()),
        FieldType::Boolean => rules.push("boolean".into()),
        FieldType::Date | FieldType::DateTime => rules.push("date".into()),
        FieldType::Email => rules.extend(["email", "max:255"].map(String::from)),
        FieldType::Text | FieldType::LongText => rules.push("string".into()),
        FieldType::Json => rules.push("json".into()),
        _ => rules.extend(["string", "max:255"].map(String::from)),
    }
    rules
}

/// Message key suffix for a rule: `max:255` -> `max`.
fn rule_name(rule: &str) -> &str {
    rule.split(':').next().unwrap_or(rule)
}

pub fn emit_rules(fields: &[FieldDescriptor], kind: RequestKind, policy: RequirednessPolicy) -> RuleSet {
    let mut set = RuleSet::default();

    for field in fields.iter().filter(|f| !f.is_reserved()) {
        let rules = field_rules(field, kind, policy);
        let quoted: Vec<String> = rules.iter().map(|r| php_str(r)).collect();
        set.rules
            .push(format!("{} => [{}],", php_str(&field.name), quoted.join(", ")));

        for rule in &rules {
            set.messages.push(format!(
                "{} => {},",
                php_str(&format!("{}.{}", field.name, rule_name(rule))),
                php_str(&format!("The {} field must be valid.", field.name))
            ));
        }
    }

    set
}
