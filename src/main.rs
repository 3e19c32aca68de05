//! smart-scaffold: generate a Laravel CRUD stack for one model.
//!
//! ```bash
//! smart-scaffold make:crud BlogPost --fields "title:string:unique,body:text:nullable"
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};

use smart_scaffold::config::ScaffoldConfig;
use smart_scaffold::emit::RequirednessPolicy;
use smart_scaffold::error::ScaffoldError;
use smart_scaffold::generator::{ArtifactOutcome, GenerationRequest, Generator};

#[derive(Parser)]
#[command(
    name = "smart-scaffold",
    about = "Laravel CRUD scaffolding from a compact field spec",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate model, controller, migration, requests, resources and filters
    #[command(name = "make:crud")]
    MakeCrud(MakeCrud),
}

#[derive(Args)]
struct MakeCrud {
    /// Model name in PascalCase, e.g. `BlogPost`
    model: String,

    /// Field spec: `name[:type][:modifier...]` clauses separated by commas
    #[arg(long)]
    fields: Option<String>,

    /// Laravel project directory
    #[arg(long, default_value = ".")]
    base: PathBuf,

    /// Requiredness policy for form requests: `always` or `strict-create`
    #[arg(long)]
    requiredness: Option<String>,

    /// Directory of custom `<name>.stub` templates
    #[arg(long)]
    stubs: Option<PathBuf>,

    /// Config file (default: `smart-scaffold.toml` in the project directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print what would be generated without writing anything
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::MakeCrud(args) => make_crud(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(args: &MakeCrud) -> Result<ScaffoldConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = ScaffoldConfig::from_file(path)?;
            config.apply_env_vars()?;
            config
        }
        None => ScaffoldConfig::load(&args.base)?,
    };
    if let Some(policy) = &args.requiredness {
        config.requiredness = RequirednessPolicy::from_str(policy)
            .ok_or_else(|| anyhow!("unknown requiredness policy `{}`", policy))?;
    }
    if let Some(dir) = &args.stubs {
        config.stubs_dir = Some(dir.clone());
    }
    config.validate()?;
    Ok(config)
}

fn make_crud(args: MakeCrud) -> Result<()> {
    let config = load_config(&args)?;

    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .format_timestamp(None)
    .format_module_path(false)
    .format_target(false)
    .try_init();
    log::debug!(
        "requiredness={} routes_file={}",
        config.requiredness.as_str(),
        config.routes_file.display()
    );

    let generator = Generator::new(&args.base, config);
    let request = GenerationRequest::new(&args.model, args.fields.clone());

    if args.dry_run {
        let plan = generator.plan(&request)?;
        for artifact in &plan.artifacts {
            println!("would write {} ({})", artifact.path.display(), artifact.kind.label());
            log::debug!("{}:\n{}", artifact.path.display(), artifact.content);
        }
        for warning in &plan.warnings {
            println!("warning: {}", warning);
        }
        return Ok(());
    }

    let report = match generator.run(&request) {
        Ok(report) => report,
        Err(e) => {
            if let ScaffoldError::Write { written, .. } = &e {
                for path in written {
                    println!("left in place: {}", path.display());
                }
            }
            return Err(e.into());
        }
    };
    for (kind, path, outcome) in &report.artifacts {
        match outcome {
            ArtifactOutcome::Created => println!("created {} {}", kind.label(), path.display()),
            ArtifactOutcome::Skipped { existing } => {
                println!("skipped {} ({} exists)", kind.label(), existing.display())
            }
            ArtifactOutcome::Present => {}
        }
    }
    for warning in &report.warnings {
        println!("warning: {}", warning);
    }

    let (created, skipped) = (report.created(), report.skipped());
    let entity = report.entity;
    let change = report.route.with_context(|| {
        format!("{} generated {} file(s) which were left in place", entity, created)
    })?;
    if change.route_added {
        println!("registered route for {}", entity);
    }
    println!("{}: {} created, {} skipped", entity, created, skipped);
    Ok(())
}
