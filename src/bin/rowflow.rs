//! rowflow CLI
//!
//! Validates pipeline/save specifications, runs pipelines over JSON row
//! files, and drives the asynchronous job lifecycle against a job
//! directory.
//!
//! Usage:
//!   rowflow validate --pipeline spec.json [--save save.json]
//!   rowflow run --data rows.json --spec spec.json [--out result.csv]
//!   rowflow submit --params params.json --jobs-dir jobs/
//!   rowflow jobs --jobs-dir jobs/ [--limit 20]
//!   rowflow exec --job <id> --data rows.json --jobs-dir jobs/

use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use rowflow::rowflow::output::write_csv;
use rowflow::{
    Dataset, JobStatus, JobStore, JobUpdate, PipelineEngine, PipelineSpec, SpecValidator,
    ValidationError,
};

#[derive(Parser)]
#[command(name = "rowflow")]
#[command(about = "Result-set pipeline engine and job runner")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate pipeline and save specification files
    Validate {
        /// Path to a pipeline specification JSON file
        #[arg(long)]
        pipeline: PathBuf,

        /// Path to a save specification JSON file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Run a pipeline over a JSON row file
    Run {
        /// Path to the dataset: a JSON array of row objects
        #[arg(long)]
        data: PathBuf,

        /// Path to the pipeline specification JSON file
        #[arg(long)]
        spec: PathBuf,

        /// Write the result as CSV here instead of printing JSON
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Create a queued job from a parameter file
    Submit {
        /// Path to the job parameter JSON file
        #[arg(long)]
        params: PathBuf,

        /// Job store directory
        #[arg(long)]
        jobs_dir: PathBuf,
    },

    /// List recent jobs
    Jobs {
        /// Job store directory
        #[arg(long)]
        jobs_dir: PathBuf,

        /// Maximum number of jobs to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Execute a queued job over a JSON row file
    Exec {
        /// Job identifier
        #[arg(long)]
        job: String,

        /// Path to the dataset: a JSON array of row objects
        #[arg(long)]
        data: PathBuf,

        /// Job store directory
        #[arg(long)]
        jobs_dir: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Validate { pipeline, save } => {
            let validator = SpecValidator::new();
            let mut all_errors: Vec<ValidationError> = Vec::new();

            let raw = read_json(&pipeline)?;
            match validator.validate_pipeline(&raw) {
                Ok(spec) => info!("pipeline spec ok: {}", serde_json::to_string(&spec)?),
                Err(errors) => all_errors.extend(errors),
            }

            if let Some(save) = save {
                let raw = read_json(&save)?;
                match validator.validate_save(&raw) {
                    Ok(spec) => info!("save spec ok: {}", serde_json::to_string(&spec)?),
                    Err(errors) => all_errors.extend(errors),
                }
            }

            if all_errors.is_empty() {
                Ok(ExitCode::SUCCESS)
            } else {
                println!("{}", serde_json::to_string_pretty(&all_errors)?);
                Ok(ExitCode::FAILURE)
            }
        }

        Commands::Run { data, spec, out } => {
            let spec = load_pipeline_spec(&spec)?;
            let dataset = load_dataset(&data)?;
            let result = PipelineEngine::execute(&dataset, &spec)?;

            match out {
                Some(path) => {
                    write_csv(&result, &path)?;
                    info!("wrote {} rows to {}", result.len(), path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&result.to_json_rows())?),
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Submit { params, jobs_dir } => {
            let params = read_json(&params)?;
            let store = JobStore::new(jobs_dir)?;
            let record = store.create(params, Some("cli"))?;
            println!("{}", record.job_id);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Jobs { jobs_dir, limit } => {
            let store = JobStore::new(jobs_dir)?;
            for record in store.list(limit)? {
                println!(
                    "{}  {:<9}  rows={}  {}",
                    record.job_id,
                    record.status.to_string(),
                    record
                        .row_count
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    record.updated_at.to_rfc3339(),
                );
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Exec {
            job,
            data,
            jobs_dir,
        } => {
            let store = JobStore::new(jobs_dir)?;
            let record = store
                .load(&job)?
                .ok_or_else(|| format!("job '{}' not found", job))?;
            if record.status != JobStatus::Queued {
                return Err(format!(
                    "job '{}' is {}, only queued jobs can be executed",
                    job, record.status
                )
                .into());
            }

            store.update(
                &job,
                JobUpdate::new()
                    .status(JobStatus::Running)
                    .started_at(Utc::now())
                    .runner_pid(std::process::id()),
            )?;

            match execute_job(&record.params, &data, &record.artifact_path) {
                Ok(rows) => {
                    store.update(
                        &job,
                        JobUpdate::new()
                            .status(JobStatus::Succeeded)
                            .finished_at(Utc::now())
                            .row_count(rows),
                    )?;
                    info!("job {} succeeded with {} rows", job, rows);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    store.update(
                        &job,
                        JobUpdate::new()
                            .status(JobStatus::Failed)
                            .finished_at(Utc::now())
                            .error(e.to_string()),
                    )?;
                    error!("job {} failed: {}", job, e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

/// Run one job: validate its pipeline parameters, execute, write the
/// artifact. Returns the result row count.
fn execute_job(
    params: &serde_json::Value,
    data: &Path,
    artifact_path: &str,
) -> Result<u64, Box<dyn std::error::Error>> {
    let raw_pipeline = params
        .get("pipeline")
        .cloned()
        .unwrap_or_else(|| serde_json::json!({}));

    let validator = SpecValidator::new();
    let spec = validator
        .validate_pipeline(&raw_pipeline)
        .map_err(|errors| {
            let rendered: Vec<String> = errors.iter().map(ToString::to_string).collect();
            rendered.join("; ")
        })?;

    let dataset = load_dataset(data)?;
    let result = PipelineEngine::execute(&dataset, &spec)?;
    write_csv(&result, Path::new(artifact_path))?;
    Ok(result.len() as u64)
}

fn read_json(path: &Path) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    Ok(serde_json::from_str(&text)?)
}

fn load_pipeline_spec(path: &Path) -> Result<PipelineSpec, Box<dyn std::error::Error>> {
    let raw = read_json(path)?;
    SpecValidator::new().validate_pipeline(&raw).map_err(|errors| {
        let rendered: Vec<String> = errors.iter().map(ToString::to_string).collect();
        rendered.join("; ").into()
    })
}

fn load_dataset(path: &Path) -> Result<Dataset, Box<dyn std::error::Error>> {
    let raw = read_json(path)?;
    Ok(Dataset::from_json_rows(&raw)?)
}
