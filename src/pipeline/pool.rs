use anyhow::{anyhow, Result};
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info};

use super::{run_file, ImportError};
use crate::config::Config;

/// One input table and the template its output follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileJob {
    pub input: PathBuf,
    pub template: PathBuf,
}

impl FileJob {
    pub fn new(input: impl Into<PathBuf>, template: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            template: template.into(),
        }
    }

    /// `input.csv=template.csv`, or a bare `input.csv` using `default_template`.
    pub fn parse(spec: &str, default_template: Option<&Path>) -> Result<Self> {
        match spec.split_once('=') {
            Some((input, template)) if !input.is_empty() && !template.is_empty() => {
                Ok(Self::new(input, template))
            }
            Some(_) => Err(anyhow!("Malformed job '{}', expected INPUT=TEMPLATE", spec)),
            None => default_template
                .map(|template| Self::new(spec, template))
                .ok_or_else(|| anyhow!("No template given for {}", spec)),
        }
    }
}

#[derive(Debug)]
pub struct JobOutcome {
    pub job: FileJob,
    pub result: Result<PathBuf, String>,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run independent file pipelines, at most `workers` at a time, each with
/// its own session. Waits for all of them; one failing or panicking job does
/// not affect the others. Outcomes come back in job order.
pub async fn run_jobs(config: Arc<Config>, jobs: Vec<FileJob>, workers: usize) -> Vec<JobOutcome> {
    let workers = workers.max(1);
    info!("Processing {} files with {} workers", jobs.len(), workers);

    let semaphore = Arc::new(Semaphore::new(workers));
    let mut handles = Vec::with_capacity(jobs.len());

    for (slot, job) in jobs.into_iter().enumerate() {
        let config = Arc::clone(&config);
        let semaphore = Arc::clone(&semaphore);
        let task_job = job.clone();

        let handle = tokio::spawn(async move {
            match semaphore.acquire_owned().await {
                Ok(_permit) => run_file(&config, &task_job, slot).await,
                Err(e) => Err(ImportError::Setup(e.into())),
            }
        });
        handles.push((job, handle));
    }

    let (jobs, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
    let joined = join_all(handles).await;

    let mut outcomes = Vec::with_capacity(jobs.len());
    for (job, joined) in jobs.into_iter().zip(joined) {
        let result = match joined {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(e) => {
                error!("Worker for {} crashed: {}", job.input.display(), e);
                Err(format!("worker crashed: {}", e))
            }
        };
        outcomes.push(JobOutcome { job, result });
    }

    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    info!("All files processed: {}/{} succeeded", succeeded, outcomes.len());
    outcomes
}
