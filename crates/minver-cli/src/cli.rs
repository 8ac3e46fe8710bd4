//! Command-line interface definition.
//!
//! - `minver check` - report the minimum Windows version of one or more binaries
//! - `minver build-store` - build the symbol store from API documentation

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use minver_config::{ConfigOverrides, OutputFormat};

/// minver - minimum Windows version auditing
#[derive(Parser, Debug)]
#[command(
    name = "minver",
    version,
    about = "Report the minimum Windows version a binary requires",
    long_about = "minver walks the import graph of a binary, looks every imported symbol up\n\
                  in a store built from the Windows API documentation and reports the\n\
                  highest minimum version among them."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Config file to use instead of ./minver.toml
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check binaries against the symbol store
    ///
    /// Exits with 0 when every root passes, the number of violations when
    /// any symbol is unexpected or disallowed, and 255 when no imported
    /// symbol has version data.
    Check(CheckArgs),

    /// Build the symbol store from an extracted API documentation tree
    BuildStore(BuildStoreArgs),
}

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Import manifest (JSON or TOML) describing the modules to walk
    #[arg(short, long, value_name = "FILE")]
    pub manifest: PathBuf,

    /// Root modules to check
    ///
    /// Examples:
    ///   minver check -m imports.toml C:/App/app.exe
    ///   minver check -m imports.json C:/App/app.exe C:/App/tool.exe
    #[arg(required = true, value_name = "ROOT")]
    pub roots: Vec<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum)]
    pub format: Option<Format>,

    /// Highest version or build expected (Win7, Win8_1, Win10_1809, ...)
    #[arg(long, value_name = "VERSION")]
    pub max_expected: Option<String>,

    /// Module no symbol may be imported from (repeatable)
    #[arg(long = "disallow", value_name = "MODULE")]
    pub disallowed_modules: Vec<String>,

    /// Path fragment of modules whose imports are not walked (repeatable)
    #[arg(long = "no-recurse", value_name = "PATTERN", conflicts_with = "recurse_all")]
    pub no_recurse_patterns: Vec<String>,

    /// Walk the imports of every module, system ones included
    #[arg(long)]
    pub recurse_all: bool,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Rebuild the symbol store before checking (requires --docs-dir)
    #[arg(long)]
    pub rebuild_store: bool,
}

#[derive(Args, Debug)]
pub struct BuildStoreArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args, Debug, Default, Clone)]
pub struct StoreArgs {
    /// Symbol store file
    #[arg(long = "store", value_name = "FILE")]
    pub store_path: Option<PathBuf>,

    /// Extracted API documentation tree (sdk-api `content` directory)
    #[arg(long, value_name = "DIR")]
    pub docs_dir: Option<PathBuf>,
}

impl StoreArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            store_path: self.store_path.clone(),
            docs_dir: self.docs_dir.clone(),
            ..ConfigOverrides::default()
        }
    }
}

impl CheckArgs {
    /// Values given on the command line, layered over file and environment.
    pub fn overrides(&self) -> ConfigOverrides {
        let no_recurse_patterns = if self.recurse_all {
            Some(Vec::new())
        } else {
            non_empty(&self.no_recurse_patterns)
        };

        ConfigOverrides {
            max_expected: self.max_expected.clone(),
            disallowed_modules: non_empty(&self.disallowed_modules),
            no_recurse_patterns,
            format: self.format.map(Into::into),
            ..self.store.overrides()
        }
    }
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_check() {
        let cli = Cli::try_parse_from([
            "minver",
            "check",
            "-m",
            "imports.toml",
            "app.exe",
            "tool.exe",
            "--max-expected",
            "Win7",
            "--disallow",
            "d3d12.dll",
            "--format",
            "json",
        ])
        .unwrap();

        let Command::Check(args) = cli.command else {
            panic!("expected check command");
        };
        assert_eq!(args.roots.len(), 2);

        let overrides = args.overrides();
        assert_eq!(overrides.max_expected.as_deref(), Some("Win7"));
        assert_eq!(overrides.disallowed_modules, Some(vec!["d3d12.dll".to_string()]));
        assert_eq!(overrides.no_recurse_patterns, None);
        assert_eq!(overrides.format, Some(OutputFormat::Json));
    }

    #[test]
    fn recurse_all_clears_patterns() {
        let cli = Cli::try_parse_from(["minver", "check", "-m", "m.json", "app.exe", "--recurse-all"])
            .unwrap();

        let Command::Check(args) = cli.command else {
            panic!("expected check command");
        };
        assert_eq!(args.overrides().no_recurse_patterns, Some(Vec::new()));
    }

    #[test]
    fn check_requires_a_root() {
        assert!(Cli::try_parse_from(["minver", "check", "-m", "m.json"]).is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["minver", "-q", "-v", "build-store"]).is_err());
    }
}
