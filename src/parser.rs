use std::collections::HashSet;

use crate::ast::*;
use crate::lexer::{Clause, LexError, Lexer};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParseError {
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),
    #[error("Empty field clause at position {index}")]
    EmptyClause { index: usize },
    #[error("Missing field name in clause `{clause}`")]
    MissingName { clause: String },
    #[error("Invalid field name `{name}`: expected letters, digits and underscores, not starting with a digit")]
    InvalidName { name: String },
    #[error("Unbalanced default(...) on field `{field}`: `{modifier}`")]
    UnbalancedDefault { field: String, modifier: String },
    #[error("Field `{name}` is declared more than once")]
    DuplicateField { name: String },
}

pub struct Parser {
    clauses: Vec<Clause>,
    warnings: Vec<String>,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self, ParseError> {
        let clauses = Lexer::new(input).tokenize()?;
        Ok(Self {
            clauses,
            warnings: Vec::new(),
        })
    }

    pub fn parse(&mut self) -> Result<FieldSpec, ParseError> {
        let clauses = std::mem::take(&mut self.clauses);
        let mut fields = Vec::with_capacity(clauses.len());
        let mut seen = HashSet::new();

        for clause in &clauses {
            let field = self.parse_clause(clause)?;
            if !seen.insert(field.name.clone()) {
                return Err(ParseError::DuplicateField { name: field.name });
            }
            fields.push(field);
        }

        Ok(FieldSpec {
            fields,
            warnings: std::mem::take(&mut self.warnings),
        })
    }

    fn parse_clause(&mut self, clause: &Clause) -> Result<FieldDescriptor, ParseError> {
        let mut parts = clause.parts.iter().map(String::as_str);

        let name = match parts.next() {
            None => return Err(ParseError::EmptyClause { index: clause.index }),
            Some("") => {
                return Err(ParseError::MissingName {
                    clause: clause.text.clone(),
                });
            }
            Some(name) if is_identifier(name) => name.to_string(),
            Some(name) => {
                return Err(ParseError::InvalidName {
                    name: name.to_string(),
                });
            }
        };

        let typ = match parts.next() {
            Some(t) if !t.is_empty() => FieldType::from_str(t),
            _ => FieldType::String,
        };

        if typ == FieldType::Foreign {
            return Ok(self.parse_foreign(name, parts.collect()));
        }

        let mut modifiers = Vec::new();
        for token in parts {
            if let Some(modifier) = self.parse_modifier(&name, token)? {
                modifiers.push(modifier);
            }
        }

        let defaults = modifiers
            .iter()
            .filter(|m| matches!(m, Modifier::Default(_)))
            .count();
        if defaults > 1 {
            self.warnings.push(format!(
                "field `{}` has {} default(...) modifiers; the last one is used",
                name, defaults
            ));
        }

        Ok(FieldDescriptor {
            name,
            typ,
            modifiers,
            foreign: None,
        })
    }

    /// `name:foreign[:table[:column]][:cascade|:setNull]...`
    fn parse_foreign(&mut self, name: String, rest: Vec<&str>) -> FieldDescriptor {
        let mut positional = rest.iter().take(2);
        let table = positional
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(&"users")
            .to_string();
        let column = positional
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(&"id")
            .to_string();

        let mut modifiers = Vec::new();
        let mut on_delete = None;
        for token in rest.iter().skip(2) {
            match *token {
                "cascade" => {
                    modifiers.push(Modifier::Cascade);
                    on_delete.get_or_insert(OnDelete::Cascade);
                }
                "setNull" => {
                    modifiers.push(Modifier::SetNull);
                    on_delete.get_or_insert(OnDelete::SetNull);
                }
                other => self.warnings.push(format!(
                    "ignoring modifier `{}` on foreign field `{}`",
                    other, name
                )),
            }
        }

        FieldDescriptor {
            name,
            typ: FieldType::Foreign,
            modifiers,
            foreign: Some(ForeignKey {
                table,
                column,
                on_delete,
            }),
        }
    }

    fn parse_modifier(&mut self, field: &str, token: &str) -> Result<Option<Modifier>, ParseError> {
        let modifier = match token {
            "nullable" => Modifier::Nullable,
            "required" => Modifier::Required,
            "unique" => Modifier::Unique,
            "index" => Modifier::Index,
            "cascade" | "setNull" => {
                self.warnings.push(format!(
                    "`{}` only applies to foreign fields; ignored on `{}`",
                    token, field
                ));
                return Ok(None);
            }
            t if t.starts_with("default(") => {
                let payload = t
                    .strip_prefix("default(")
                    .and_then(|rest| rest.strip_suffix(')'))
                    .ok_or_else(|| ParseError::UnbalancedDefault {
                        field: field.to_string(),
                        modifier: t.to_string(),
                    })?;
                Modifier::Default(payload.to_string())
            }
            "" => return Ok(None),
            other => {
                self.warnings.push(format!(
                    "ignoring unknown modifier `{}` on field `{}`",
                    other, field
                ));
                return Ok(None);
            }
        };
        Ok(Some(modifier))
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`: usable as a column, a PHP property and a method name.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse a field spec string in one call.
pub fn parse_fields(input: &str) -> Result<FieldSpec, ParseError> {
    Parser::new(input)?.parse()
}
