//! Stub templates rendered with `{{ placeholder }}` substitution.

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const EMBEDDED: [(&str, &str); 12] = [
    ("model", include_str!("templates/model.stub")),
    ("controller-with-fields", include_str!("templates/controller-with-fields.stub")),
    ("controller-no-fields", include_str!("templates/controller-no-fields.stub")),
    ("migration", include_str!("templates/migration.stub")),
    ("factory", include_str!("templates/factory.stub")),
    ("store-request", include_str!("templates/store-request.stub")),
    ("update-request", include_str!("templates/update-request.stub")),
    ("resource", include_str!("templates/resource.stub")),
    ("resource-collection", include_str!("templates/resource-collection.stub")),
    ("query-filter", include_str!("templates/query-filter.stub")),
    ("model-filter", include_str!("templates/model-filter.stub")),
    ("response-trait", include_str!("templates/response-trait.stub")),
];

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Missing template `{name}`")]
    Missing { name: String },
    #[error("Missing template `{name}` (looked for {})", .path.display())]
    MissingFile { name: String, path: PathBuf },
    #[error("Failed to read template {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where stub text comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TemplateStore {
    /// Stubs compiled into the binary.
    #[default]
    Embedded,
    /// A user stubs directory holding `<name>.stub` files. No fallback: a
    /// customised set must be complete.
    Directory(PathBuf),
}

impl TemplateStore {
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        Self::Directory(dir.as_ref().to_path_buf())
    }

    pub fn get(&self, name: &str) -> Result<Cow<'static, str>, TemplateError> {
        match self {
            Self::Embedded => EMBEDDED
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, text)| Cow::Borrowed(*text))
                .ok_or_else(|| TemplateError::Missing {
                    name: name.to_string(),
                }),
            Self::Directory(dir) => {
                let path = dir.join(format!("{}.stub", name));
                match fs::read_to_string(&path) {
                    Ok(text) => Ok(Cow::Owned(text)),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => Err(TemplateError::MissingFile {
                        name: name.to_string(),
                        path,
                    }),
                    Err(source) => Err(TemplateError::Read { path, source }),
                }
            }
        }
    }

    /// Fetch a stub and substitute `vars` into it.
    pub fn render(&self, name: &str, vars: &[(&str, &str)]) -> Result<String, TemplateError> {
        Ok(render(&self.get(name)?, vars))
    }
}

/// Replace every `{{ key }}` with its value. Unknown placeholders are left as is.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |text, (key, value)| {
        text.replace(&format!("{{{{ {} }}}}", key), value)
    })
}
