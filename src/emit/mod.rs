//! Emitters: pure functions from parsed fields to blocks of PHP source.
//!
//! Each emitter returns its statements as separate lines; the generator joins
//! them with the indentation the target stub expects.

pub mod controller;
pub mod factory;
pub mod filter;
pub mod resource;
pub mod rules;
pub mod schema;

pub use filter::{FilterMethod, FilterPolicy, FilterValue, Predicate};
pub use rules::{RequestKind, RequirednessPolicy, RuleSet};

/// Separator for statements inside a method body (migration, factory, rules).
pub const STATEMENT_SEPARATOR: &str = "\n            ";
/// Separator between generated class methods.
pub const METHOD_SEPARATOR: &str = "\n\n    ";
/// Separator for the controller's request-to-attribute mapping.
pub const MAPPING_SEPARATOR: &str = ",\n                ";

/// Single-quoted PHP string literal.
pub fn php_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\'' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}
