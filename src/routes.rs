//! Route-declaration file patching.
//!
//! The file is read into a [`RouteFile`] (opening tag, `use` imports, body
//! statements) so inserts are plain list operations and re-running is a no-op.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::naming::EntityNames;

const ROUTE_FACADE: &str = "use Illuminate\\Support\\Facades\\Route;";

#[derive(Debug, thiserror::Error)]
pub enum RouteFileError {
    #[error("Failed to read route file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write route file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteFile {
    pub header: Vec<String>,
    pub imports: Vec<String>,
    pub body: Vec<String>,
}

fn is_import(line: &str) -> bool {
    let line = line.trim();
    line.starts_with("use ") && line.ends_with(';')
}

impl RouteFile {
    /// Minimal content for a route file that does not exist yet.
    pub fn bootstrap() -> Self {
        Self {
            header: vec!["<?php".to_string()],
            imports: vec![ROUTE_FACADE.to_string()],
            body: Vec::new(),
        }
    }

    pub fn parse(source: &str) -> Self {
        let lines: Vec<&str> = source.lines().collect();
        let mut pos = 0;

        let header = match lines.iter().position(|l| l.trim_start().starts_with("<?php")) {
            Some(tag) => {
                pos = tag + 1;
                lines[..=tag].iter().map(|l| l.to_string()).collect()
            }
            None => vec!["<?php".to_string()],
        };

        let mut imports = Vec::new();
        while pos < lines.len() {
            let line = lines[pos];
            if is_import(line) {
                imports.push(line.trim().to_string());
            } else if !line.trim().is_empty() {
                break;
            }
            pos += 1;
        }

        let mut body: Vec<String> = lines[pos..].iter().map(|l| l.to_string()).collect();
        while body.last().is_some_and(|l| l.trim().is_empty()) {
            body.pop();
        }

        Self {
            header,
            imports,
            body,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.header {
            out.push_str(line);
            out.push('\n');
        }
        if !self.imports.is_empty() {
            out.push('\n');
            for line in &self.imports {
                out.push_str(line);
                out.push('\n');
            }
        }
        if !self.body.is_empty() {
            out.push('\n');
            for line in &self.body {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }

    /// Append an import unless an identical one exists. Returns whether it was added.
    pub fn upsert_import(&mut self, import: &str) -> bool {
        let import = import.trim();
        if self.imports.iter().any(|l| l == import) {
            return false;
        }
        self.imports.push(import.to_string());
        true
    }

    /// Append a statement to the body unless an identical one exists.
    pub fn upsert_route(&mut self, statement: &str) -> bool {
        let statement = statement.trim();
        if self.body.iter().any(|l| l.trim() == statement) {
            return false;
        }
        self.body.push(statement.to_string());
        true
    }
}

pub fn import_line(names: &EntityNames) -> String {
    format!("use App\\Http\\Controllers\\{};", names.controller)
}

pub fn route_line(names: &EntityNames) -> String {
    format!("Route::apiResource('{}', {}::class);", names.route, names.controller)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteChange {
    pub created: bool,
    pub import_added: bool,
    pub route_added: bool,
}

impl RouteChange {
    pub fn changed(&self) -> bool {
        self.created || self.import_added || self.route_added
    }
}

/// Register the entity's resource route in `path`, creating the file if needed.
pub fn register(path: &Path, names: &EntityNames) -> Result<RouteChange, RouteFileError> {
    let mut change = RouteChange::default();
    let mut file = match fs::read_to_string(path) {
        Ok(source) => RouteFile::parse(&source),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            change.created = true;
            RouteFile::bootstrap()
        }
        Err(source) => {
            return Err(RouteFileError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    change.import_added = file.upsert_import(&import_line(names));
    change.route_added = file.upsert_route(&route_line(names));

    if change.changed() {
        let write_err = |source| RouteFileError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, file.render()).map_err(write_err)?;
        log::debug!("patched {}: {:?}", path.display(), change);
    }

    Ok(change)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LARAVEL_API: &str = "<?php\n\nuse Illuminate\\Http\\Request;\nuse Illuminate\\Support\\Facades\\Route;\n\nRoute::get('/user', function (Request $request) {\n    return $request->user();\n})->middleware('auth:sanctum');\n";

    #[test]
    fn test_parse_sections() {
        let file = RouteFile::parse(LARAVEL_API);
        assert_eq!(file.header, vec!["<?php"]);
        assert_eq!(file.imports.len(), 2);
        assert_eq!(file.body.len(), 3);
        assert_eq!(file.render(), LARAVEL_API);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let names = EntityNames::new("BlogPost");
        let mut file = RouteFile::parse(LARAVEL_API);

        assert!(file.upsert_import(&import_line(&names)));
        assert!(file.upsert_route(&route_line(&names)));
        assert!(!file.upsert_import(&import_line(&names)));
        assert!(!file.upsert_route(&route_line(&names)));

        let rendered = file.render();
        assert_eq!(rendered.matches("use App\\Http\\Controllers\\BlogPostController;").count(), 1);
        assert_eq!(
            rendered.matches("Route::apiResource('blog-posts', BlogPostController::class);").count(),
            1
        );
        // Imports stay above the body.
        assert!(rendered.find("BlogPostController;").unwrap() < rendered.find("Route::get").unwrap());
        assert!(rendered.trim_end().ends_with("Route::apiResource('blog-posts', BlogPostController::class);"));
    }

    #[test]
    fn test_register_twice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes/api.php");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, LARAVEL_API).unwrap();
        let names = EntityNames::new("Post");

        let first = register(&path, &names).unwrap();
        assert!(first.import_added && first.route_added && !first.created);
        let after_first = fs::read_to_string(&path).unwrap();

        let second = register(&path, &names).unwrap();
        assert!(!second.changed());
        assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
    }

    #[test]
    fn test_register_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes/api.php");
        let change = register(&path, &EntityNames::new("Tag")).unwrap();
        assert!(change.created);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<?php\n"));
        assert!(content.contains(ROUTE_FACADE));
        assert!(content.contains("use App\\Http\\Controllers\\TagController;"));
        assert!(content.contains("Route::apiResource('tags', TagController::class);"));
    }

    #[test]
    fn test_missing_open_tag_is_added() {
        let file = RouteFile::parse("Route::get('/', fn () => 'ok');\n");
        assert_eq!(file.header, vec!["<?php"]);
        assert_eq!(file.body.len(), 1);
    }
}
