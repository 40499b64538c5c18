/*!
 * Command-line interface for acadfs
 */

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use acadfs::config::{AdminArgs, Args, Command, Config, OutputFormat};
use acadfs::{
    classify, format_file_size, AcadFsError, Reporter, Repository, Session, TaxonomyPath,
};

fn main() -> ExitCode {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(shell) = args.generate {
        clap_complete::generate(shell, &mut Args::command(), "acadfs", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    init_tracing(args.verbose);

    let Some(command) = args.command.clone() else {
        let _ = Args::command().print_help();
        return ExitCode::FAILURE;
    };

    // Create configuration
    let config = Config::from_args(&args);

    match run(&config, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<AcadFsError>() {
                Some(err) if err.is_not_found() => eprintln!("⚠️  {:#}", e),
                _ => eprintln!("❌ Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "acadfs=debug" } else { "acadfs=warn" };
    let filter = EnvFilter::try_from_env("ACADFS_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(config: &Config, command: Command) -> anyhow::Result<()> {
    // Classification needs no storage
    if !matches!(command, Command::Classify { .. }) {
        config.validate()?;
    }

    let reporter = Reporter::new(config.report_format());
    let repo = Repository::open(config.root.clone());
    let mut session = Session::new();
    if let Some(admin) = command.admin() {
        login(config, &mut session, admin)?;
    }

    match command {
        Command::Classify { name } => {
            let category = classify(&name);
            match config.format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::json!({ "name": name, "category": category, "label": category.label() })
                ),
                OutputFormat::Table => println!("{} → {}", name, category.label()),
            }
        }
        Command::Branches => {
            let branches = repo.list_branches()?;
            reporter.print(&reporter.names(&TaxonomyPath::root(), &branches)?);
        }
        Command::List { segments } => {
            let path = TaxonomyPath::new(&segments)?;
            let children = repo.list_children(&path)?;
            reporter.print(&reporter.names(&path, &children)?);
        }
        Command::Materials { location, filter } => {
            let path = location.path()?;
            let materials = match filter {
                Some(pattern) => repo.catalog().list_materials_matching(&path, &pattern)?,
                None => repo.list_materials(&path)?,
            };
            reporter.print(&reporter.materials(&path, &materials)?);
        }
        Command::Download {
            location,
            name,
            output,
        } => {
            let path = location.path()?;
            let download = repo.download(&path, &name)?;
            let destination = output.unwrap_or_else(|| PathBuf::from(&download.name));
            fs::write(&destination, &download.bytes)
                .with_context(|| format!("writing {}", destination.display()))?;
            println!(
                "📥  Saved {} ({}, {}) to {}",
                download.name,
                download.media_type,
                format_file_size(download.bytes.len() as u64),
                destination.display()
            );
        }
        Command::Tree => {
            let summary = repo.summarize()?;
            reporter.print(&reporter.summary(&summary)?);
        }
        Command::Mkdir { segments, .. } => {
            let path = TaxonomyPath::new(&segments)?;
            repo.create_node(&session, &path)?;
            println!("✅  Ready: {}", path);
        }
        Command::Upload {
            location,
            file,
            name,
            ..
        } => {
            let path = location.path()?;
            let (content, name) = read_upload(&file, name)?;
            let stored = repo.upload(&session, &path, &content, &name)?;
            reporter.print(&reporter.stored("Uploaded", &stored)?);
        }
        Command::Replace {
            location,
            file,
            name,
            ..
        } => {
            let path = location.path()?;
            let (content, name) = read_upload(&file, name)?;
            let stored = repo.replace(&session, &path, &content, &name)?;
            reporter.print(&reporter.stored("Replaced", &stored)?);
        }
        Command::Delete { location, name, .. } => {
            let path = location.path()?;
            repo.delete_file(&session, &path, &name)?;
            println!("🗑️  Deleted {} from {}", name, path);
        }
        Command::Rmtree { segments, .. } => {
            let path = TaxonomyPath::new(&segments)?;

            let progress = ProgressBar::new_spinner();
            progress.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos} removed")
                    .map_err(|e| anyhow!("invalid progress template: {}", e))?,
            );
            progress.enable_steady_tick(Duration::from_millis(100));
            progress.set_prefix("🗑️  Deleting");

            let repo = repo.with_progress(Arc::new(progress.clone()));
            let removed = repo.delete_node(&session, &path);
            let count = progress.position();
            progress.finish_and_clear();

            if removed? {
                println!("🗑️  Removed {} ({} entries)", path, count);
            } else {
                return Err(AcadFsError::NotFound(format!("nothing to delete at {}", path)).into());
            }
        }
    }

    session.logout();
    Ok(())
}

fn login(config: &Config, session: &mut Session, admin: &AdminArgs) -> anyhow::Result<()> {
    let password = admin.password.as_deref().ok_or_else(|| {
        AcadFsError::Unauthorized(
            "admin password required (--password or ACADFS_ADMIN_PASSWORD)".to_string(),
        )
    })?;
    session.login(&config.credentials, &admin.username, password)?;
    Ok(())
}

/// Read a local file to upload and pick the name it is stored under
fn read_upload(file: &Path, name: Option<String>) -> anyhow::Result<(Vec<u8>, String)> {
    let content = fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let name = match name {
        Some(name) => name,
        None => file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| anyhow!("{} has no file name", file.display()))?,
    };
    Ok((content, name))
}
