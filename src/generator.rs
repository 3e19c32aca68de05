//! Scaffold pipeline: parse the field spec once, render every artifact, then
//! write what is not already on disk and register the resource route.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::ast::FieldSpec;
use crate::config::ScaffoldConfig;
use crate::emit::{
    self, METHOD_SEPARATOR, MAPPING_SEPARATOR, RequestKind, STATEMENT_SEPARATOR,
};
use crate::error::ScaffoldError;
use crate::lock::DirLock;
use crate::naming::{EntityNames, is_valid_model_name};
use crate::parser::parse_fields;
use crate::routes::{self, RouteChange, RouteFileError};
use crate::template::TemplateStore;

/// One invocation: which entity, which fields, and when (for the migration name).
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub fields: Option<String>,
    pub timestamp: NaiveDateTime,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, fields: Option<String>) -> Self {
        Self {
            model: model.into(),
            fields,
            timestamp: Local::now().naive_local(),
        }
    }

    pub fn at(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    ResponseTrait,
    Model,
    Controller,
    Migration,
    Factory,
    StoreRequest,
    UpdateRequest,
    Resource,
    ResourceCollection,
    BaseFilter,
    ModelFilter,
}

impl ArtifactKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::ResponseTrait => "response trait",
            Self::Model => "model",
            Self::Controller => "controller",
            Self::Migration => "migration",
            Self::Factory => "factory",
            Self::StoreRequest => "store request",
            Self::UpdateRequest => "update request",
            Self::Resource => "resource",
            Self::ResourceCollection => "resource collection",
            Self::BaseFilter => "base filter",
            Self::ModelFilter => "filter",
        }
    }

    /// Shared by every entity; created once and never reported as a conflict.
    pub fn is_shared(self) -> bool {
        matches!(self, Self::ResponseTrait | Self::BaseFilter)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    /// Relative to the project directory.
    pub path: PathBuf,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub names: EntityNames,
    pub spec: FieldSpec,
    pub artifacts: Vec<Artifact>,
    pub warnings: Vec<String>,
}

impl Plan {
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactOutcome {
    Created,
    /// Target already existed; left untouched.
    Skipped { existing: PathBuf },
    /// Shared asset already present.
    Present,
}

#[derive(Debug)]
pub struct Report {
    pub entity: String,
    pub artifacts: Vec<(ArtifactKind, PathBuf, ArtifactOutcome)>,
    pub route: Result<RouteChange, RouteFileError>,
    pub warnings: Vec<String>,
}

impl Report {
    pub fn created(&self) -> usize {
        self.artifacts
            .iter()
            .filter(|(_, _, o)| *o == ArtifactOutcome::Created)
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.artifacts
            .iter()
            .filter(|(_, _, o)| matches!(o, ArtifactOutcome::Skipped { .. }))
            .count()
    }
}

pub struct Generator {
    base: PathBuf,
    config: ScaffoldConfig,
    templates: TemplateStore,
}

impl Generator {
    pub fn new(base: impl Into<PathBuf>, config: ScaffoldConfig) -> Self {
        let templates = match &config.stubs_dir {
            Some(dir) => TemplateStore::from_dir(dir),
            None => TemplateStore::Embedded,
        };
        Self {
            base: base.into(),
            config,
            templates,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Render every artifact without touching the project directory.
    ///
    /// Fails fast on a malformed spec or a missing template, before anything
    /// could be written.
    pub fn plan(&self, request: &GenerationRequest) -> Result<Plan, ScaffoldError> {
        if !is_valid_model_name(&request.model) {
            return Err(ScaffoldError::InvalidModelName(request.model.clone()));
        }
        let names = EntityNames::new(&request.model);
        let spec = match &request.fields {
            Some(raw) => parse_fields(raw)?,
            None => FieldSpec::default(),
        };
        let has_fields = !spec.fields.is_empty();
        let mut warnings = spec.warnings.clone();
        let mut artifacts = Vec::new();

        let model = names.model.as_str();
        let fields = &spec.fields;

        if self.config.response_trait {
            artifacts.push(Artifact {
                kind: ArtifactKind::ResponseTrait,
                path: PathBuf::from("app/Traits/Response.php"),
                content: self.templates.render("response-trait", &[])?,
            });
        }

        artifacts.push(Artifact {
            kind: ArtifactKind::Model,
            path: PathBuf::from(format!("app/Models/{}.php", model)),
            content: self.templates.render(
                "model",
                &[("class", model), ("table", &names.table), ("model", model)],
            )?,
        });

        let controller = if has_fields {
            let mappings = emit::controller::emit_field_mappings(fields).join(MAPPING_SEPARATOR);
            self.templates.render(
                "controller-with-fields",
                &[
                    ("model", model),
                    ("modelVariable", &names.variable),
                    ("fields", &mappings),
                ],
            )?
        } else {
            self.templates.render(
                "controller-no-fields",
                &[("model", model), ("modelVariable", &names.variable)],
            )?
        };
        artifacts.push(Artifact {
            kind: ArtifactKind::Controller,
            path: PathBuf::from(format!("app/Http/Controllers/{}.php", names.controller)),
            content: controller,
        });

        if has_fields {
            let schema = emit::schema::emit_schema(fields).join(STATEMENT_SEPARATOR);
            artifacts.push(Artifact {
                kind: ArtifactKind::Migration,
                path: PathBuf::from(format!(
                    "database/migrations/{}_create_{}_table.php",
                    request.timestamp.format("%Y_%m_%d_%H%M%S"),
                    names.table
                )),
                content: self
                    .templates
                    .render("migration", &[("table", &names.table), ("schema", &schema)])?,
            });

            let factory = emit::factory::emit_factory(fields).join(STATEMENT_SEPARATOR);
            artifacts.push(Artifact {
                kind: ArtifactKind::Factory,
                path: PathBuf::from(format!("database/factories/{}Factory.php", model)),
                content: self
                    .templates
                    .render("factory", &[("model", model), ("fields", &factory)])?,
            });

            for (kind, request_kind, stub) in [
                (ArtifactKind::StoreRequest, RequestKind::Store, "store-request"),
                (ArtifactKind::UpdateRequest, RequestKind::Update, "update-request"),
            ] {
                let set = emit::rules::emit_rules(fields, request_kind, self.config.requiredness);
                artifacts.push(Artifact {
                    kind,
                    path: PathBuf::from(format!(
                        "app/Http/Requests/{}{}Request.php",
                        request_kind.prefix(),
                        model
                    )),
                    content: self.templates.render(
                        stub,
                        &[
                            ("model", model),
                            ("rules", &set.rules.join(STATEMENT_SEPARATOR)),
                            ("messages", &set.messages.join(STATEMENT_SEPARATOR)),
                        ],
                    )?,
                });
            }

            let resource = emit::resource::emit_resource(fields).join(STATEMENT_SEPARATOR);
            artifacts.push(Artifact {
                kind: ArtifactKind::Resource,
                path: PathBuf::from(format!("app/Http/Resources/{}Resource.php", model)),
                content: self
                    .templates
                    .render("resource", &[("model", model), ("fields", &resource)])?,
            });
            artifacts.push(Artifact {
                kind: ArtifactKind::ResourceCollection,
                path: PathBuf::from(format!("app/Http/Resources/{}Collection.php", model)),
                content: self.templates.render("resource-collection", &[("model", model)])?,
            });

            artifacts.push(Artifact {
                kind: ArtifactKind::BaseFilter,
                path: PathBuf::from("app/Filters/QueryFilter.php"),
                content: self.templates.render("query-filter", &[])?,
            });
            let (methods, filter_warnings) = emit::filter::emit_filters(fields);
            warnings.extend(filter_warnings);
            let methods: Vec<String> = methods.iter().map(|m| m.render()).collect();
            artifacts.push(Artifact {
                kind: ArtifactKind::ModelFilter,
                path: PathBuf::from(format!("app/Filters/{}Filter.php", model)),
                content: self.templates.render(
                    "model-filter",
                    &[("model", model), ("methods", &methods.join(METHOD_SEPARATOR))],
                )?,
            });
        }

        log::debug!(
            "planned {} artifacts for {} ({} emitted fields)",
            artifacts.len(),
            names.model,
            spec.emitted().count()
        );

        Ok(Plan {
            names,
            spec,
            artifacts,
            warnings,
        })
    }

    /// Plan, write, and register the route, holding the directory lock throughout.
    pub fn run(&self, request: &GenerationRequest) -> Result<Report, ScaffoldError> {
        let plan = self.plan(request)?;
        let _lock = DirLock::acquire(&self.base)?;

        let artifacts = self.write(&plan)?;
        let route = routes::register(&self.base.join(&self.config.routes_file), &plan.names);
        match &route {
            Ok(change) if change.route_added => {
                log::info!("registered route for {}", plan.names.route)
            }
            Ok(_) => log::debug!("route for {} already registered", plan.names.route),
            Err(e) => log::error!("{}", e),
        }

        Ok(Report {
            entity: plan.names.model.clone(),
            artifacts,
            route,
            warnings: plan.warnings,
        })
    }

    /// Write each artifact unless its target exists. Stops at the first I/O
    /// failure; files written before it stay on disk and are listed in the
    /// error.
    pub fn write(&self, plan: &Plan) -> Result<Vec<(ArtifactKind, PathBuf, ArtifactOutcome)>, ScaffoldError> {
        let mut results = Vec::with_capacity(plan.artifacts.len());

        for artifact in &plan.artifacts {
            let outcome = match self.existing_target(artifact, &plan.names) {
                Some(_) if artifact.kind.is_shared() => ArtifactOutcome::Present,
                Some(existing) => {
                    log::warn!(
                        "{} {} already exists, skipping",
                        artifact.kind.label(),
                        existing.display()
                    );
                    ArtifactOutcome::Skipped { existing }
                }
                None => {
                    let path = self.base.join(&artifact.path);
                    write_file(&path, &artifact.content).map_err(|source| ScaffoldError::Write {
                        path,
                        source,
                        written: created_paths(&results),
                    })?;
                    log::info!("created {} {}", artifact.kind.label(), artifact.path.display());
                    ArtifactOutcome::Created
                }
            };
            results.push((artifact.kind, artifact.path.clone(), outcome));
        }

        Ok(results)
    }

    /// Existing file standing in for `artifact`, relative to the base.
    ///
    /// Migrations carry a timestamp, so any earlier `create_<table>_table`
    /// migration counts as the same artifact.
    fn existing_target(&self, artifact: &Artifact, names: &EntityNames) -> Option<PathBuf> {
        if self.base.join(&artifact.path).exists() {
            return Some(artifact.path.clone());
        }
        if artifact.kind != ArtifactKind::Migration {
            return None;
        }
        let dir = artifact.path.parent()?;
        let suffix = format!("_create_{}_table.php", names.table);
        fs::read_dir(self.base.join(dir))
            .ok()?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .find(|name| name.ends_with(&suffix))
            .map(|name| dir.join(name))
    }

}

fn created_paths(results: &[(ArtifactKind, PathBuf, ArtifactOutcome)]) -> Vec<PathBuf> {
    results
        .iter()
        .filter(|(_, _, outcome)| *outcome == ArtifactOutcome::Created)
        .map(|(_, path, _)| path.clone())
        .collect()
}

fn write_file(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::RequirednessPolicy;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(9, 30, 5)
            .unwrap()
    }

    fn request(model: &str, fields: Option<&str>) -> GenerationRequest {
        GenerationRequest::new(model, fields.map(String::from)).at(at())
    }

    fn generator(base: &Path) -> Generator {
        Generator::new(base, ScaffoldConfig::default())
    }

    #[test]
    fn test_plan_without_fields_is_model_and_controller() {
        let plan = generator(Path::new(".")).plan(&request("Post", None)).unwrap();
        let kinds: Vec<_> = plan.artifacts.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![ArtifactKind::ResponseTrait, ArtifactKind::Model, ArtifactKind::Controller]
        );
        let controller = plan.artifact(ArtifactKind::Controller).unwrap();
        assert!(controller.content.contains("class PostController"));
        assert!(controller.content.contains("$post->delete();"));
        assert!(!controller.content.contains("{{"));
    }

    #[test]
    fn test_blank_fields_behave_like_none() {
        let plan = generator(Path::new(".")).plan(&request("Post", Some("  "))).unwrap();
        assert!(plan.artifact(ArtifactKind::Migration).is_none());
    }

    #[test]
    fn test_plan_with_fields() {
        let plan = generator(Path::new("."))
            .plan(&request(
                "BlogPost",
                Some("title:string:unique,price:decimal:default(0.00),author_id:foreign:users:id:cascade"),
            ))
            .unwrap();

        assert_eq!(plan.artifacts.len(), 11);
        let migration = plan.artifact(ArtifactKind::Migration).unwrap();
        assert_eq!(
            migration.path,
            PathBuf::from("database/migrations/2024_05_17_093005_create_blog_posts_table.php")
        );
        assert!(migration.content.contains("Schema::create('blog_posts'"));
        assert!(migration.content.contains("$table->decimal('price')->default('0.00');"));
        assert!(migration.content.contains("->onDelete('cascade');"));

        let model = plan.artifact(ArtifactKind::Model).unwrap();
        assert_eq!(model.path, PathBuf::from("app/Models/BlogPost.php"));
        assert!(model.content.contains("protected $table = 'blog_posts';"));

        let factory = plan.artifact(ArtifactKind::Factory).unwrap();
        assert!(factory.content.contains(r"'author_id' => \App\Models\User::factory(),"));

        let filter = plan.artifact(ArtifactKind::ModelFilter).unwrap();
        assert!(filter.content.contains("public function authorId($value)"));

        for artifact in &plan.artifacts {
            assert!(!artifact.content.contains("{{ "), "{:?}", artifact.path);
        }
    }

    #[test]
    fn test_update_request_follows_policy() {
        let config = ScaffoldConfig {
            requiredness: RequirednessPolicy::StrictCreate,
            ..ScaffoldConfig::default()
        };
        let plan = Generator::new(".", config)
            .plan(&request("Post", Some("title")))
            .unwrap();
        let store = plan.artifact(ArtifactKind::StoreRequest).unwrap();
        let update = plan.artifact(ArtifactKind::UpdateRequest).unwrap();
        assert!(store.content.contains("'title' => ['required', 'string', 'max:255'],"));
        assert!(update.content.contains("'title' => ['sometimes', 'string', 'max:255'],"));
        assert!(update.content.contains("class UpdatePostRequest"));
    }

    #[test]
    fn test_parse_error_aborts_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let result = generator(dir.path()).run(&request("Post", Some("title,,body")));
        assert!(matches!(result, Err(ScaffoldError::Parse(_))));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_invalid_model_name() {
        let result = generator(Path::new(".")).plan(&request("blog_post", None));
        assert!(matches!(result, Err(ScaffoldError::InvalidModelName(_))));
    }

    #[test]
    fn test_missing_template_is_fatal() {
        let stubs = tempfile::tempdir().unwrap();
        fs::write(stubs.path().join("model.stub"), "{{ class }}").unwrap();
        let config = ScaffoldConfig {
            stubs_dir: Some(stubs.path().to_path_buf()),
            response_trait: false,
            ..ScaffoldConfig::default()
        };
        let result = Generator::new(".", config).plan(&request("Post", None));
        assert!(matches!(result, Err(ScaffoldError::Template(_))));
    }

    #[test]
    fn test_run_skips_existing_and_keeps_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("app/Models/Post.php");
        fs::create_dir_all(existing.parent().unwrap()).unwrap();
        fs::write(&existing, "<?php // hand written").unwrap();

        let report = generator(dir.path()).run(&request("Post", Some("title"))).unwrap();

        assert_eq!(fs::read_to_string(&existing).unwrap(), "<?php // hand written");
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.created(), 10);
        assert!(dir.path().join("app/Http/Controllers/PostController.php").exists());
        assert!(report.route.as_ref().unwrap().route_added);
        assert!(!dir.path().join(crate::lock::LOCK_FILE).exists());
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let generator = generator(dir.path());
        generator.run(&request("Post", Some("title"))).unwrap();

        let later = GenerationRequest::new("Post", Some("title".into()))
            .at(at() + chrono::Duration::seconds(60));
        let report = generator.run(&later).unwrap();

        assert_eq!(report.created(), 0);
        let migrations = fs::read_dir(dir.path().join("database/migrations")).unwrap().count();
        assert_eq!(migrations, 1);
        let shared: Vec<_> = report
            .artifacts
            .iter()
            .filter(|(kind, _, _)| kind.is_shared())
            .map(|(_, _, outcome)| outcome.clone())
            .collect();
        assert_eq!(shared, vec![ArtifactOutcome::Present, ArtifactOutcome::Present]);
        assert!(!report.route.unwrap().changed());
    }

    #[test]
    fn test_write_failure_lists_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        // A plain file where the controllers directory should go.
        fs::create_dir_all(dir.path().join("app")).unwrap();
        fs::write(dir.path().join("app/Http"), "").unwrap();

        let err = generator(dir.path()).run(&request("Post", None)).unwrap_err();
        match err {
            ScaffoldError::Write { path, written, .. } => {
                assert!(path.ends_with("app/Http/Controllers/PostController.php"));
                assert_eq!(
                    written,
                    vec![
                        PathBuf::from("app/Traits/Response.php"),
                        PathBuf::from("app/Models/Post.php"),
                    ]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(dir.path().join("app/Models/Post.php").exists());
        assert!(!dir.path().join(crate::lock::LOCK_FILE).exists());
    }

    #[test]
    fn test_run_fails_when_locked() {
        let dir = tempfile::tempdir().unwrap();
        let _held = DirLock::acquire(dir.path()).unwrap();
        let result = generator(dir.path()).run(&request("Post", None));
        assert!(matches!(result, Err(ScaffoldError::Lock(_))));
    }
}
