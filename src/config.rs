/*!
 * Configuration handling for acadfs
 */

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crate::access::{StaticCredentials, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USER};
use crate::error::Result;
use crate::report::ReportFormat;
use crate::types::TaxonomyPath;
use crate::{ensure, error};

/// Output format for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Rounded console tables
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Location of a year directory
#[derive(clap::Args, Debug, Clone)]
pub struct YearArgs {
    /// Branch name
    pub branch: String,
    /// Semester name
    pub semester: String,
    /// Subject name
    pub subject: String,
    /// Year name
    pub year: String,
}

impl YearArgs {
    /// Validate into a taxonomy path
    pub fn path(&self) -> Result<TaxonomyPath> {
        TaxonomyPath::year(&self.branch, &self.semester, &self.subject, &self.year)
    }
}

/// Admin credentials
#[derive(clap::Args, Debug, Clone)]
pub struct AdminArgs {
    /// Admin username
    #[clap(long, env = "ACADFS_ADMIN_USER", default_value = DEFAULT_ADMIN_USER)]
    pub username: String,

    /// Admin password
    #[clap(long, env = "ACADFS_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List branches under the storage root
    Branches,

    /// List the nodes one level below the given path
    List {
        /// Up to three path segments (branch, semester, subject)
        segments: Vec<String>,
    },

    /// List materials stored under a year
    Materials {
        #[clap(flatten)]
        location: YearArgs,

        /// Only show materials whose name matches this glob
        #[clap(long)]
        filter: Option<String>,
    },

    /// Show the category a file name would be filed under
    Classify {
        /// File name to classify
        name: String,
    },

    /// Copy a material out of the repository
    Download {
        #[clap(flatten)]
        location: YearArgs,

        /// Material name
        name: String,

        /// Destination file (defaults to the material name in the current directory)
        #[clap(long, short)]
        output: Option<PathBuf>,
    },

    /// Summarize the whole repository
    Tree,

    /// Create a taxonomy node and any missing parents (admin)
    Mkdir {
        /// One to four path segments
        #[clap(required = true)]
        segments: Vec<String>,

        #[clap(flatten)]
        admin: AdminArgs,
    },

    /// Upload a file into a year, creating it if needed (admin)
    Upload {
        #[clap(flatten)]
        location: YearArgs,

        /// Local file to upload
        file: PathBuf,

        /// Store under this name instead of the local file name
        #[clap(long)]
        name: Option<String>,

        #[clap(flatten)]
        admin: AdminArgs,
    },

    /// Overwrite an existing material (admin)
    Replace {
        #[clap(flatten)]
        location: YearArgs,

        /// Local file with the new content
        file: PathBuf,

        /// Material to replace (defaults to the local file name)
        #[clap(long)]
        name: Option<String>,

        #[clap(flatten)]
        admin: AdminArgs,
    },

    /// Delete one material (admin)
    Delete {
        #[clap(flatten)]
        location: YearArgs,

        /// Material name
        name: String,

        #[clap(flatten)]
        admin: AdminArgs,
    },

    /// Delete a node and everything below it (admin)
    Rmtree {
        /// One to four path segments
        #[clap(required = true)]
        segments: Vec<String>,

        #[clap(flatten)]
        admin: AdminArgs,
    },
}

impl Command {
    /// Credentials supplied to an admin command
    pub fn admin(&self) -> Option<&AdminArgs> {
        match self {
            Command::Mkdir { admin, .. }
            | Command::Upload { admin, .. }
            | Command::Replace { admin, .. }
            | Command::Delete { admin, .. }
            | Command::Rmtree { admin, .. } => Some(admin),
            _ => None,
        }
    }
}

/// Command-line arguments for acadfs
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "acadfs",
    version = env!("CARGO_PKG_VERSION"),
    about = "Browse and manage an academic materials repository",
    long_about = "Browse question banks, papers, solutions and notes stored as branch/semester/subject/year folders, and manage them as an admin."
)]
pub struct Args {
    /// Storage root holding the branch directories
    #[clap(long, global = true, env = "ACADFS_ROOT", default_value = "data")]
    pub root: PathBuf,

    /// Output format for listings
    #[clap(long, global = true, value_enum, default_value_t = OutputFormat::default())]
    pub format: OutputFormat,

    /// Enable debug logging
    #[clap(long, short, global = true)]
    pub verbose: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,

    /// Admin username this process accepts
    #[clap(
        long,
        global = true,
        env = "ACADFS_EXPECTED_USER",
        default_value = DEFAULT_ADMIN_USER,
        hide = true
    )]
    pub expected_user: String,

    /// Admin password this process accepts
    #[clap(
        long,
        global = true,
        env = "ACADFS_EXPECTED_PASSWORD",
        default_value = DEFAULT_ADMIN_PASSWORD,
        hide = true,
        hide_env_values = true
    )]
    pub expected_password: String,

    #[clap(subcommand)]
    pub command: Option<Command>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Storage root
    pub root: PathBuf,

    /// Listing output format
    pub format: OutputFormat,

    /// Debug logging
    pub verbose: bool,

    /// Admin credentials accepted by this process
    pub credentials: StaticCredentials,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: &Args) -> Self {
        Self {
            root: args.root.clone(),
            format: args.format,
            verbose: args.verbose,
            credentials: StaticCredentials::new(
                args.expected_user.clone(),
                args.expected_password.clone(),
            ),
        }
    }

    /// Report format for the configured output
    pub fn report_format(&self) -> ReportFormat {
        match self.format {
            OutputFormat::Table => ReportFormat::ConsoleTable,
            OutputFormat::Json => ReportFormat::Json,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let metadata = std::fs::metadata(&self.root).map_err(|_| {
            error!(
                NotFound,
                "Storage root not found: {}",
                self.root.display()
            )
        })?;
        ensure!(
            metadata.is_dir(),
            Config,
            "Storage root is not a directory: {}",
            self.root.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_student_command() {
        let args = Args::parse_from([
            "acadfs", "--root", "/srv/data", "materials", "CS", "5", "DS", "2023", "--filter",
            "*.pdf",
        ]);
        assert_eq!(args.root, PathBuf::from("/srv/data"));

        match args.command {
            Some(Command::Materials { location, filter }) => {
                assert_eq!(location.path().unwrap().segments(), ["CS", "5", "DS", "2023"]);
                assert_eq!(filter.as_deref(), Some("*.pdf"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_admin_command() {
        let args = Args::parse_from([
            "acadfs",
            "rmtree",
            "CS",
            "5",
            "--username",
            "admin",
            "--password",
            "admin123",
        ]);
        let command = args.command.as_ref().unwrap();
        let admin = command.admin().unwrap();
        assert_eq!(admin.username, "admin");
        assert_eq!(admin.password.as_deref(), Some("admin123"));
        assert!(Args::parse_from(["acadfs", "tree"]).command.unwrap().admin().is_none());
    }

    #[test]
    fn test_expected_credentials_from_args() {
        use crate::access::CredentialCheck;

        let config = Config::from_args(&Args::parse_from(["acadfs", "tree"]));
        assert!(config.credentials.check(DEFAULT_ADMIN_USER, DEFAULT_ADMIN_PASSWORD));

        let config = Config::from_args(&Args::parse_from([
            "acadfs",
            "--expected-user",
            "dean",
            "--expected-password",
            "s3cret",
            "tree",
        ]));
        assert!(config.credentials.check("dean", "s3cret"));
        assert!(!config.credentials.check(DEFAULT_ADMIN_USER, DEFAULT_ADMIN_PASSWORD));
    }

    #[test]
    fn test_validate_root() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path().to_string_lossy().to_string();
        let config = Config::from_args(&Args::parse_from(["acadfs", "--root", &root, "tree"]));
        assert!(config.validate().is_ok());

        let missing = temp_dir.path().join("missing").to_string_lossy().to_string();
        let config = Config::from_args(&Args::parse_from(["acadfs", "--root", &missing, "tree"]));
        assert!(config.validate().unwrap_err().is_not_found());
    }
}
