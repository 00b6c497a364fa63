//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Rewrite upload references to their hashed files
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root containing the database, the seed document and the uploads
    #[arg(short, long, default_value = ".", value_hint = clap::ValueHint::DirPath)]
    pub root: PathBuf,

    /// Config file path (default: <root>/uploads-rewriter.config.json)
    #[arg(short = 'C', long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Log every visited category
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Resolve references against the hashed files in the uploads directory
    Hashed {
        /// Record store to rewrite
        #[arg(short, long, value_enum, default_value_t = Source::Document)]
        source: Source,

        /// Where rewritten references should point
        #[arg(short, long, value_enum, default_value_t = Target::Local)]
        target: Target,

        #[command(flatten)]
        args: PassArgs,
    },

    /// Replace the uploads prefix with the cloud media URL in every database body
    Prefix {
        #[command(flatten)]
        args: PassArgs,
    },
}

/// Arguments shared by every pass
#[derive(clap::Args, Debug, Clone)]
pub struct PassArgs {
    /// Cloud media base URL, overriding the environment and config
    #[arg(long)]
    pub base_url: Option<String>,

    /// Report replacements without writing anything back
    #[arg(long)]
    pub dry_run: bool,
}

/// Record store selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// SQLite content database
    Database,
    /// JSON seed document
    Document,
}

/// Rewrite target selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// `/uploads/<hashed>`
    Local,
    /// `<base-url>/<hashed>`
    Cloud,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hashed_command() {
        let cli = Cli::parse_from([
            "uploads-rewriter",
            "--root",
            "site",
            "hashed",
            "--source",
            "database",
            "--target",
            "cloud",
            "--base-url",
            "https://cdn.example.com",
        ]);

        assert_eq!(cli.root, PathBuf::from("site"));
        let Commands::Hashed { source, target, args } = cli.command else {
            panic!("expected hashed command");
        };
        assert_eq!(source, Source::Database);
        assert_eq!(target, Target::Cloud);
        assert_eq!(args.base_url.as_deref(), Some("https://cdn.example.com"));
        assert!(!args.dry_run);
    }

    #[test]
    fn hashed_defaults_to_local_document_pass() {
        let cli = Cli::parse_from(["uploads-rewriter", "hashed", "--dry-run"]);
        let Commands::Hashed { source, target, args } = cli.command else {
            panic!("expected hashed command");
        };
        assert_eq!(source, Source::Document);
        assert_eq!(target, Target::Local);
        assert!(args.dry_run);
    }

    #[test]
    fn verifies_command_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
