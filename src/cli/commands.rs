//! CLI command implementations.
//!
//! Wires the clap-parsed [`Cli`] onto a production-shaped
//! [`crate::app::Core`]: `LocalObjectStore` for archive documents,
//! `SqliteStore` for both index roles, `SqliteJobStore` for job records.

#![allow(clippy::too_many_lines)]

use crate::app::Core;
use crate::cli::output::{OutputFormat, format_analog_hits, format_job, format_search_outcome};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::job::JobState;
use crate::embed::{TextEmbedder, default_text_embedder};
use crate::error::{Error, Result};
use crate::orchestrator::{LocalObjectStore, SqliteJobStore};
use crate::query::analog::{AnalogRequest, NumericParam};
use crate::query::rerank::FakeCrossEncoder;
use crate::store::{Filter, SqliteStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Outcome of executing one CLI command: the rendered output plus the
/// process exit code to return (`spec.md` §6).
pub struct CommandOutcome {
    /// Rendered output, ready to write to stdout.
    pub output: String,
    /// Process exit code: `0` success, `2` invalid input, `3` upstream
    /// store unavailable, `4` partial success (some documents failed).
    pub exit_code: u8,
}

impl CommandOutcome {
    fn ok(output: String) -> Self {
        Self { output, exit_code: 0 }
    }
}

type ProdCore = Core<LocalObjectStore, SqliteStore, SqliteStore, SqliteJobStore>;

fn jobs_db_path(index_db_path: &Path) -> PathBuf {
    let parent = index_db_path.parent().filter(|p| !p.as_os_str().is_empty());
    match parent {
        Some(parent) => parent.join("jobs.db"),
        None => PathBuf::from("jobs.db"),
    }
}

fn open_core(cli: &Cli, object_root: &Path) -> Result<ProdCore> {
    let db_path = cli.get_db_path();
    let config = Config::load(&cli.get_config_path())?;

    let object_store = Arc::new(LocalObjectStore::new(object_root));
    let vector_store = Arc::new(SqliteStore::open(&db_path)?);
    let lexical_store = vector_store.clone();
    let embedder: Arc<dyn TextEmbedder> = Arc::from(default_text_embedder()?);
    let job_store = Arc::new(SqliteJobStore::open(jobs_db_path(&db_path))?);

    Ok(Core::new(
        object_store,
        vector_store,
        lexical_store,
        embedder,
        Box::new(FakeCrossEncoder),
        job_store,
        config,
    ))
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

/// Executes the parsed CLI command.
///
/// # Errors
///
/// Returns an error if the command's own setup (opening the index,
/// reading the manifest file from disk) fails; per-document ingestion
/// failures are folded into the returned job's counters instead of
/// propagating here (`spec.md` §4.7).
pub fn execute(cli: &Cli) -> Result<CommandOutcome> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Ingest { archive_dir, manifest } => cmd_ingest(cli, archive_dir, manifest, format),
        Commands::Search { query, discipline, archive_id } => {
            cmd_search(cli, query, discipline.as_deref(), archive_id.as_deref(), format)
        }
        Commands::AnalogSearch { equipment_type, params, discipline, limit } => {
            cmd_analog_search(cli, equipment_type, params, discipline.as_deref(), *limit, format)
        }
        Commands::JobStatus { job_id } => cmd_job_status(cli, job_id, format),
    }
}

fn cmd_ingest(cli: &Cli, archive_dir: &Path, manifest: &Path, format: OutputFormat) -> Result<CommandOutcome> {
    let core = open_core(cli, archive_dir)?;
    let manifest_bytes = std::fs::read(manifest)?;
    let job = core.ingest(&manifest_bytes, now_unix())?;

    let exit_code = match job.state {
        JobState::Failed => 2,
        JobState::Completed if job.counters.files_failed > 0 => 4,
        JobState::Completed | JobState::Running => 0,
    };

    Ok(CommandOutcome { output: format_job(&job, format), exit_code })
}

fn cmd_job_status(cli: &Cli, job_id: &str, format: OutputFormat) -> Result<CommandOutcome> {
    let core = open_core(cli, Path::new("."))?;
    let job = core.job_status(job_id)?;
    Ok(CommandOutcome::ok(format_job(&job, format)))
}

fn cmd_search(
    cli: &Cli,
    query: &str,
    discipline: Option<&str>,
    archive_id: Option<&str>,
    format: OutputFormat,
) -> Result<CommandOutcome> {
    let core = open_core(cli, Path::new("."))?;
    let mut filter = Filter::new();
    if let Some(discipline) = discipline {
        filter = filter.with_equals("discipline", discipline);
    }
    if let Some(archive_id) = archive_id {
        filter = filter.with_equals("archive_id", archive_id);
    }
    let outcome = core.search(query, filter)?;
    Ok(CommandOutcome::ok(format_search_outcome(&outcome, query, format)))
}

fn parse_param(raw: &str) -> Result<NumericParam> {
    let invalid = || Error::InvalidState {
        message: format!("invalid --param '{raw}', expected name=value:unit"),
    };
    let (name, rest) = raw.split_once('=').ok_or_else(invalid)?;
    let (value, unit) = rest.split_once(':').ok_or_else(invalid)?;
    let value: f64 = value.parse().map_err(|_| invalid())?;
    Ok(NumericParam { name: name.to_string(), value, unit: unit.to_string() })
}

fn cmd_analog_search(
    cli: &Cli,
    equipment_type: &str,
    params: &[String],
    discipline: Option<&str>,
    limit: usize,
    format: OutputFormat,
) -> Result<CommandOutcome> {
    let core = open_core(cli, Path::new("."))?;
    let numeric_params = params.iter().map(|p| parse_param(p)).collect::<Result<Vec<_>>>()?;
    let mut filters = Filter::new();
    if let Some(discipline) = discipline {
        filters = filters.with_equals("discipline", discipline);
    }
    let request = AnalogRequest {
        equipment_type: equipment_type.to_string(),
        numeric_params,
        filters,
        limit,
    };
    let hits = core.analog_search(&request)?;
    Ok(CommandOutcome::ok(format_analog_hits(&hits, equipment_type, format)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::parser::Cli;
    use std::io::Write;

    fn cli_with(command: Commands, db_path: &Path) -> Cli {
        Cli {
            db_path: Some(db_path.to_path_buf()),
            config_path: None,
            verbose: false,
            format: "json".to_string(),
            command,
        }
    }

    #[test]
    fn test_jobs_db_path_sits_alongside_index() {
        assert_eq!(jobs_db_path(Path::new("foo/index.db")), PathBuf::from("foo/jobs.db"));
        assert_eq!(jobs_db_path(Path::new("index.db")), PathBuf::from("jobs.db"));
    }

    #[test]
    fn test_parse_param_valid() {
        let param = parse_param("flow_rate=1000:m3/h").unwrap();
        assert_eq!(param.name, "flow_rate");
        assert!((param.value - 1000.0).abs() < f64::EPSILON);
        assert_eq!(param.unit, "m3/h");
    }

    #[test]
    fn test_parse_param_missing_unit_is_invalid() {
        assert!(parse_param("flow_rate=1000").is_err());
    }

    #[test]
    fn test_parse_param_non_numeric_value_is_invalid() {
        assert!(parse_param("flow_rate=abc:m3/h").is_err());
    }

    #[test]
    fn test_ingest_then_job_status_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("index.db");
        let archive_dir = tmp.path().join("archive");
        std::fs::create_dir_all(archive_dir.join("process")).unwrap();
        std::fs::write(
            archive_dir.join("process/pump.txt"),
            "Центробежный насос для перекачки аммиака. Производительность 1000 m3/h.",
        )
        .unwrap();

        let manifest_path = tmp.path().join("manifest.json");
        let mut manifest_file = std::fs::File::create(&manifest_path).unwrap();
        write!(
            manifest_file,
            r#"{{
                "archive_id": "arc-1",
                "project_id": "proj-1",
                "object_id": "obj-1",
                "phase": "pd",
                "customer": "Acme",
                "language": ["ru"],
                "confidentiality": "internal",
                "default_discipline": "process",
                "documents": [
                    {{"path": "process/pump.txt", "media_type": "text/plain", "permissions": ["internal"]}}
                ]
            }}"#
        )
        .unwrap();

        let ingest_cli = cli_with(
            Commands::Ingest { archive_dir: archive_dir.clone(), manifest: manifest_path },
            &db_path,
        );
        let outcome = execute(&ingest_cli).unwrap();
        assert_eq!(outcome.exit_code, 0);
        let job_value: serde_json::Value = serde_json::from_str(&outcome.output).unwrap();
        let job_id = job_value["id"].as_str().unwrap().to_string();

        let status_cli = cli_with(Commands::JobStatus { job_id: job_id.clone() }, &db_path);
        let status = execute(&status_cli).unwrap();
        assert_eq!(status.exit_code, 0);
        let status_value: serde_json::Value = serde_json::from_str(&status.output).unwrap();
        assert_eq!(status_value["id"], job_id);
        assert_eq!(status_value["state"], "completed");
    }

    #[test]
    fn test_ingest_missing_manifest_is_invalid_input() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("index.db");
        let cli = cli_with(
            Commands::Ingest {
                archive_dir: tmp.path().to_path_buf(),
                manifest: tmp.path().join("missing.json"),
            },
            &db_path,
        );
        let err = execute(&cli).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_search_against_empty_index_has_no_evidence() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("index.db");
        let cli = cli_with(
            Commands::Search { query: "насос".to_string(), discipline: None, archive_id: None },
            &db_path,
        );
        let outcome = execute(&cli).unwrap();
        assert_eq!(outcome.exit_code, 0);
        let value: serde_json::Value = serde_json::from_str(&outcome.output).unwrap();
        assert_eq!(value["answer"]["confidence"], 0.0);
    }
}
