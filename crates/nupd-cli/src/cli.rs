//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// nupd - Bring a directory tree up to date with a content source
#[derive(Parser, Debug)]
#[command(name = "nupd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to <config dir>/nupd/config.toml)
    #[arg(long, global = true, env = "NUPD_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Update a working root to match a source
    ///
    /// Content already present anywhere under the root is copied locally;
    /// only missing content is fetched. Files the source does not list are
    /// never deleted.
    ///
    /// Examples:
    ///   nupd update --root ./app --source /srv/mirror
    ///   nupd update --root ./app --source https://example.com/app/
    ///   nupd update --root ./app --source /srv/mirror --dry-run
    Update {
        /// Working root to update
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Source directory or http(s) base URL
        #[arg(long, short)]
        source: String,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Compare a working root with a source without changing anything
    Check {
        /// Working root to inspect
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Source directory or http(s) base URL
        #[arg(long, short)]
        source: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Print or write the listfile for a directory tree
    ///
    /// Examples:
    ///   nupd manifest ./release
    ///   nupd manifest ./release --output ./release/listfile.psli
    Manifest {
        /// Directory to scan
        dir: PathBuf,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completions
    ///
    /// Examples:
    ///   nupd completions bash > ~/.local/share/bash-completion/completions/nupd
    ///   nupd completions zsh > ~/.zfunc/_nupd
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
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
    fn parse_update_command() {
        let cli = Cli::parse_from(["nupd", "update", "--root", "r", "--source", "s", "--dry-run"]);
        assert_eq!(
            cli.command,
            Some(Commands::Update {
                root: PathBuf::from("r"),
                source: "s".into(),
                dry_run: true,
                json: false,
            })
        );
    }

    #[test]
    fn update_root_defaults_to_cwd() {
        let cli = Cli::parse_from(["nupd", "update", "-s", "https://example.com/"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Update { ref root, .. }) if root == &PathBuf::from(".")
        ));
    }

    #[test]
    fn update_requires_source() {
        assert!(Cli::try_parse_from(["nupd", "update"]).is_err());
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["nupd", "check", "-s", "src", "--verbose", "--config", "c.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
    }

    #[test]
    fn parse_manifest_command() {
        let cli = Cli::parse_from(["nupd", "manifest", "dir", "-o", "out.psli"]);
        assert_eq!(
            cli.command,
            Some(Commands::Manifest {
                dir: PathBuf::from("dir"),
                output: Some(PathBuf::from("out.psli")),
            })
        );
    }

    #[test]
    fn parse_completions_command() {
        let cli = Cli::parse_from(["nupd", "completions", "bash"]);
        assert!(matches!(cli.command, Some(Commands::Completions { .. })));
    }
}
