pub mod ast;
pub mod config;
pub mod emit;
pub mod error;
pub mod generator;
pub mod lexer;
pub mod lock;
pub mod naming;
pub mod parser;
pub mod routes;
pub mod template;

use wasm_bindgen::prelude::*;

use emit::{METHOD_SEPARATOR, RequestKind, RequirednessPolicy, STATEMENT_SEPARATOR};
use error::ScaffoldError;
use naming::EntityNames;
use parser::parse_fields;

/// Rendered blocks for one entity, without touching disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub table: String,
    pub route: String,
    pub schema: String,
    pub rules: String,
    pub factory: String,
    pub filters: String,
    pub warnings: Vec<String>,
}

impl Preview {
    pub fn build(model: &str, fields: &str) -> Result<Self, ScaffoldError> {
        if !naming::is_valid_model_name(model) {
            return Err(ScaffoldError::InvalidModelName(model.to_string()));
        }
        let names = EntityNames::new(model);
        let spec = parse_fields(fields)?;

        let rules = emit::rules::emit_rules(&spec.fields, RequestKind::Store, RequirednessPolicy::Always);
        let (filters, filter_warnings) = emit::filter::emit_filters(&spec.fields);
        let filters: Vec<String> = filters.iter().map(|m| m.render()).collect();
        let mut warnings = spec.warnings.clone();
        warnings.extend(filter_warnings);

        Ok(Self {
            schema: format!(
                "Schema::create('{}', function (Blueprint $table) {{{}{}\n}});",
                names.table,
                STATEMENT_SEPARATOR,
                emit::schema::emit_schema(&spec.fields).join(STATEMENT_SEPARATOR)
            ),
            table: names.table,
            route: names.route,
            rules: rules.rules.join(STATEMENT_SEPARATOR),
            factory: emit::factory::emit_factory(&spec.fields).join(STATEMENT_SEPARATOR),
            filters: filters.join(METHOD_SEPARATOR),
            warnings,
        })
    }
}

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Preview the generated blocks for a field spec.
///
/// Returns an object with `table`, `route`, `schema`, `rules`, `factory`,
/// `filters` and `warnings` string properties.
#[wasm_bindgen(js_name = "scaffoldPreview")]
pub fn scaffold_preview(model: &str, fields: &str) -> Result<js_sys::Object, String> {
    let preview = Preview::build(model, fields).map_err(|e| e.to_string())?;

    let object = js_sys::Object::new();
    let entries = [
        ("table", preview.table),
        ("route", preview.route),
        ("schema", preview.schema),
        ("rules", preview.rules),
        ("factory", preview.factory),
        ("filters", preview.filters),
        ("warnings", preview.warnings.join("\n")),
    ];
    for (key, value) in entries {
        js_sys::Reflect::set(&object, &JsValue::from_str(key), &JsValue::from_str(&value))
            .map_err(|_| format!("failed to set `{}` on preview", key))?;
    }
    Ok(object)
}
