//! Command-line entry point for the upload reference rewrite pass.

mod cli;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use uploads_rewriter::walker::{DATABASE_PLAN, DOCUMENT_PLAN, PREFIX_PLAN};
use uploads_rewriter::{
    AssetListing, DocumentStore, PassMode, PassReport, RecordStore, RecordWalker, RewriterConfig,
    SqliteStore, TargetMode,
};

use cli::{Cli, Commands, PassArgs, Source, Target};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(report) => {
            summarize(&report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn run(cli: &Cli) -> Result<PassReport> {
    let root = cli.root.as_path();
    load_env(root);

    let config = match &cli.config {
        Some(path) => RewriterConfig::load_from_path(path),
        None => RewriterConfig::discover(root),
    }
    .context("failed to load configuration")?;

    match &cli.command {
        Commands::Hashed {
            source,
            target,
            args,
        } => run_hashed(root, &config, *source, *target, args),
        Commands::Prefix { args } => run_prefix(root, &config, args),
    }
}

fn load_env(root: &Path) {
    let path = root.join(".env");
    match dotenv::from_path(&path) {
        Ok(()) => debug!(path = %path.display(), "loaded environment file"),
        Err(err) if err.not_found() => {}
        Err(err) => warn!(path = %path.display(), "ignoring unreadable environment file: {err}"),
    }
}

fn open_store(root: &Path, config: &RewriterConfig, source: Source) -> Result<Box<dyn RecordStore>> {
    let store: Box<dyn RecordStore> = match source {
        Source::Database => {
            let path = config.database_path(root);
            info!(path = %path.display(), "opening database");
            Box::new(SqliteStore::open(&path).context("failed to open the content database")?)
        }
        Source::Document => {
            let path = config.document_path(root);
            info!(path = %path.display(), "loading document");
            Box::new(DocumentStore::load(&path).context("failed to load the seed document")?)
        }
    };
    Ok(store)
}

/// Open the store and snapshot the uploads directory, failing before anything is written.
fn open_prerequisites(
    root: &Path,
    config: &RewriterConfig,
    source: Source,
) -> Result<(Box<dyn RecordStore>, AssetListing)> {
    let store = open_store(root, config, source)?;

    let uploads_dir = config.uploads_dir_path(root);
    let listing = AssetListing::snapshot(&uploads_dir)
        .context("failed to list the uploads directory")?;
    info!(dir = %uploads_dir.display(), files = listing.len(), "loaded uploads listing");
    Ok((store, listing))
}

fn run_hashed(
    root: &Path,
    config: &RewriterConfig,
    source: Source,
    target: Target,
    args: &PassArgs,
) -> Result<PassReport> {
    let (mut store, listing) = open_prerequisites(root, config, source)?;

    let target = match target {
        Target::Local => TargetMode::Local,
        Target::Cloud => {
            let base_url = config.resolve_base_url(args.base_url.as_deref());
            info!(%base_url, "using cloud media URL");
            TargetMode::cloud(base_url)
        }
    };
    let plan = match source {
        Source::Database => DATABASE_PLAN,
        Source::Document => DOCUMENT_PLAN,
    };

    if args.dry_run {
        info!("dry run: no changes will be written");
    }
    let walker = RecordWalker::new(PassMode::Hashed {
        resolver: &listing,
        target: &target,
    })
    .with_uploads_prefix(&config.uploads_prefix)?
    .dry_run(args.dry_run);

    walker
        .run(store.as_mut(), plan)
        .context("rewrite pass failed")
}

fn run_prefix(root: &Path, config: &RewriterConfig, args: &PassArgs) -> Result<PassReport> {
    let mut store = open_store(root, config, Source::Database)?;

    let base_url = config.resolve_base_url(args.base_url.as_deref());
    info!(%base_url, "using cloud media URL");

    if args.dry_run {
        info!("dry run: no changes will be written");
    }
    let walker = RecordWalker::new(PassMode::Prefix {
        base_url: &base_url,
    })
    .with_uploads_prefix(&config.uploads_prefix)?
    .dry_run(args.dry_run);

    walker
        .run(store.as_mut(), PREFIX_PLAN)
        .context("prefix pass failed")
}

fn summarize(report: &PassReport) {
    for (category, count) in &report.by_category {
        debug!(%category, count, "category summary");
    }
    info!(
        records = report.records_updated,
        "Total replacements: {}", report.total
    );
    if report.total == 0 {
        info!("no updates needed; check that the uploads directory holds the hashed files");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use tempfile::tempdir;
    use uploads_rewriter::RewriteError;

    fn seed_database(root: &Path) -> rusqlite::Result<()> {
        let db_path = RewriterConfig::default().database_path(root);
        std::fs::create_dir_all(db_path.parent().expect("database path has a parent"))
            .expect("failed to create database dir");
        let conn = Connection::open(db_path)?;
        conn.execute_batch(
            r#"
            CREATE TABLE "components_shared_rich_texts" (id INTEGER PRIMARY KEY, body TEXT);
            INSERT INTO components_shared_rich_texts (id, body) VALUES (1, '![a](/uploads/hero.png)');
            "#,
        )
    }

    fn pass_args() -> PassArgs {
        PassArgs {
            base_url: None,
            dry_run: false,
        }
    }

    #[test]
    fn missing_uploads_dir_aborts_before_writing() -> Result<()> {
        let temp = tempdir()?;
        seed_database(temp.path())?;
        let config = RewriterConfig::default();

        let err = run_hashed(
            temp.path(),
            &config,
            Source::Database,
            Target::Cloud,
            &pass_args(),
        )
        .expect_err("pass should fail without an uploads directory");
        assert!(matches!(
            err.downcast_ref::<RewriteError>(),
            Some(RewriteError::MissingUploadsDir(_))
        ));

        let conn = Connection::open(config.database_path(temp.path()))?;
        let body: String = conn.query_row(
            "SELECT body FROM components_shared_rich_texts WHERE id = 1",
            [],
            |row| row.get(0),
        )?;
        assert_eq!(body, "![a](/uploads/hero.png)");
        Ok(())
    }

    #[test]
    fn missing_database_is_reported_before_listing() -> Result<()> {
        let temp = tempdir()?;
        let config = RewriterConfig::default();

        let err = open_prerequisites(temp.path(), &config, Source::Database)
            .err()
            .expect("database should be required");
        assert!(matches!(
            err.downcast_ref::<RewriteError>(),
            Some(RewriteError::MissingDatabase(_))
        ));
        assert!(!config.database_path(temp.path()).exists());
        Ok(())
    }

    #[test]
    fn prerequisites_load_store_and_listing() -> Result<()> {
        let temp = tempdir()?;
        seed_database(temp.path())?;
        let config = RewriterConfig::default();
        let uploads = config.uploads_dir_path(temp.path());
        std::fs::create_dir_all(&uploads)?;
        std::fs::write(uploads.join("hero_ab12.png"), b"png")?;

        let (store, listing) = open_prerequisites(temp.path(), &config, Source::Database)?;
        assert_eq!(listing.files(), ["hero_ab12.png".to_string()]);
        assert!(!store.categories()?.is_empty());
        Ok(())
    }

    #[test]
    fn malformed_env_file_is_not_fatal() -> Result<()> {
        let temp = tempdir()?;
        std::fs::write(temp.path().join(".env"), "not a valid line\n")?;
        load_env(temp.path());
        load_env(&temp.path().join("absent"));
        Ok(())
    }
}
