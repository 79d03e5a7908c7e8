//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `archintel`: engineering-document retrieval platform.
///
/// Ingests process/piping/IFC/drawing archives into a hybrid dense+lexical
/// index and answers natural-language queries with cited evidence.
#[derive(Parser, Debug)]
#[command(name = "archintel")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the index database file.
    ///
    /// Defaults to `.archintel/index.db` in the current directory.
    #[arg(short, long, env = "ARCHINTEL_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Path to a `archintel.toml` config file overriding chunk/fusion/
    /// deadline defaults.
    #[arg(long, env = "ARCHINTEL_CONFIG_PATH")]
    pub config_path: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json, ndjson).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest one archive from a directory of documents plus its manifest.
    ///
    /// `archive_dir` is the root every manifest document path is resolved
    /// against; `manifest` is the archive manifest JSON file (`spec.md`
    /// §6).
    Ingest {
        /// Directory holding the archive's documents.
        archive_dir: PathBuf,

        /// Path to the archive manifest JSON file.
        manifest: PathBuf,
    },

    /// Run a natural-language query over the indexed archives.
    Search {
        /// The query text.
        query: String,

        /// Restrict results to this discipline (e.g. `process`, `piping`).
        #[arg(long)]
        discipline: Option<String>,

        /// Restrict results to this archive id.
        #[arg(long)]
        archive_id: Option<String>,
    },

    /// Find analog equipment by type and numeric parameters.
    ///
    /// Each `--param` is `name=value:unit`, e.g. `--param flow_rate=1000:m3/h`.
    AnalogSearch {
        /// Equipment type term, e.g. "центробежный насос".
        equipment_type: String,

        /// A numeric parameter in `name=value:unit` form. May be repeated.
        #[arg(long = "param")]
        params: Vec<String>,

        /// Restrict results to this discipline.
        #[arg(long)]
        discipline: Option<String>,

        /// Maximum number of hits to return.
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Show an ingestion job's current progress.
    JobStatus {
        /// Job id, as returned by `ingest`.
        job_id: String,
    },
}

impl Cli {
    /// Returns the index database path, using the default if not specified.
    #[must_use]
    pub fn get_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(".archintel/index.db"))
    }

    /// Returns the config file path, using the default if not specified.
    #[must_use]
    pub fn get_config_path(&self) -> PathBuf {
        self.config_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(".archintel/archintel.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_db_path() {
        let cli = Cli {
            db_path: None,
            config_path: None,
            verbose: false,
            format: "text".to_string(),
            command: Commands::JobStatus {
                job_id: "job-1".to_string(),
            },
        };
        assert_eq!(cli.get_db_path(), PathBuf::from(".archintel/index.db"));
    }

    #[test]
    fn test_custom_db_path() {
        let cli = Cli {
            db_path: Some(PathBuf::from("/custom/path.db")),
            config_path: None,
            verbose: false,
            format: "text".to_string(),
            command: Commands::JobStatus {
                job_id: "job-1".to_string(),
            },
        };
        assert_eq!(cli.get_db_path(), PathBuf::from("/custom/path.db"));
    }
}
