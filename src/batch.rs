//! Batch orchestration
//!
//! Files are processed strictly one after another. A file that cannot be
//! read or decoded marks its own job as failed and the batch moves on; only
//! batch-level preconditions (empty selection, too many files) stop a run
//! before it starts.

use crate::config::Config;
use crate::error::{FdmError, FdmResult};
use crate::excel::FileExtractor;
use crate::types::ExtractedRecord;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Container formats accepted as input
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["xlsx", "xlsm"];

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| ext.eq_ignore_ascii_case(s))
        })
        .unwrap_or(false)
}

//==============================================================================
// Jobs
//==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Error(String),
}

impl JobStatus {
    fn name(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Error(_) => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error(_))
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Error(msg) => write!(f, "error: {}", msg),
            other => f.write_str(other.name()),
        }
    }
}

/// One selected input file
#[derive(Debug, Clone, Serialize)]
pub struct FileJob {
    pub id: Uuid,
    pub path: PathBuf,
    pub name: String,
    status: JobStatus,
}

impl FileJob {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            id: Uuid::new_v4(),
            path,
            name,
            status: JobStatus::Pending,
        }
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    pub fn start(&mut self) -> FdmResult<()> {
        self.transition(JobStatus::Processing)
    }

    pub fn complete(&mut self) -> FdmResult<()> {
        self.transition(JobStatus::Completed)
    }

    pub fn fail(&mut self, message: impl Into<String>) -> FdmResult<()> {
        self.transition(JobStatus::Error(message.into()))
    }

    /// Pending → Processing → Completed | Error
    fn transition(&mut self, next: JobStatus) -> FdmResult<()> {
        let allowed = matches!(
            (&self.status, &next),
            (JobStatus::Pending, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Completed)
                | (JobStatus::Processing, JobStatus::Error(_))
        );

        if !allowed {
            return Err(FdmError::InvalidTransition {
                from: self.status.name().to_string(),
                to: next.name().to_string(),
            });
        }

        self.status = next;
        Ok(())
    }
}

//==============================================================================
// Processor
//==============================================================================

/// Reported after every file, successful or not
pub struct Progress<'a> {
    pub processed: usize,
    pub total: usize,
    pub job: &'a FileJob,
}

pub struct BatchProcessor {
    extractor: FileExtractor,
    max_files: usize,
}

impl BatchProcessor {
    pub fn new(config: &Config) -> FdmResult<Self> {
        Ok(Self {
            extractor: FileExtractor::new(config)?,
            max_files: config.batch.max_files,
        })
    }

    /// Process every job in order. Records are returned in completion
    /// order, which equals input order.
    pub fn run<F>(&self, mut jobs: Vec<FileJob>, mut on_progress: F) -> FdmResult<BatchOutcome>
    where
        F: FnMut(&Progress<'_>),
    {
        if jobs.is_empty() {
            return Err(FdmError::EmptyBatch);
        }
        if jobs.len() > self.max_files {
            return Err(FdmError::BatchTooLarge {
                count: jobs.len(),
                max: self.max_files,
            });
        }

        let total = jobs.len();
        let mut records = Vec::with_capacity(total);

        for (idx, job) in jobs.iter_mut().enumerate() {
            job.start()?;

            match self.process(job) {
                Ok(record) => {
                    let missing = record.missing().count();
                    info!(file = %job.name, missing, "extracted");
                    records.push(record);
                    job.complete()?;
                }
                Err(e) => {
                    warn!(file = %job.name, error = %e, "extraction failed");
                    job.fail(e.to_string())?;
                }
            }

            on_progress(&Progress {
                processed: idx + 1,
                total,
                job: &*job,
            });
        }

        let outcome = BatchOutcome {
            jobs,
            records,
            finished_at: Local::now(),
        };
        info!(
            completed = outcome.completed(),
            failed = outcome.failed(),
            "batch finished"
        );
        Ok(outcome)
    }

    fn process(&self, job: &FileJob) -> FdmResult<ExtractedRecord> {
        if !is_supported(&job.path) {
            return Err(FdmError::Decode {
                file: job.name.clone(),
                details: "unsupported file type (expected .xlsx or .xlsm)".to_string(),
            });
        }

        let bytes = fs::read(&job.path)?;
        self.extractor.extract_bytes(&job.name, bytes)
    }
}

//==============================================================================
// Outcome
//==============================================================================

pub struct BatchOutcome {
    pub jobs: Vec<FileJob>,
    pub records: Vec<ExtractedRecord>,
    pub finished_at: DateTime<Local>,
}

#[derive(Serialize)]
pub struct BatchReport<'a> {
    pub generated_at: DateTime<Local>,
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub jobs: &'a [FileJob],
}

impl BatchOutcome {
    pub fn completed(&self) -> usize {
        self.count(|s| *s == JobStatus::Completed)
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, JobStatus::Error(_)))
    }

    fn count(&self, pred: impl Fn(&JobStatus) -> bool) -> usize {
        self.jobs.iter().filter(|j| pred(j.status())).count()
    }

    /// Records to compose, or an error when no file was extracted
    pub fn require_records(&self) -> FdmResult<&[ExtractedRecord]> {
        if self.records.is_empty() {
            return Err(FdmError::NoRecordsExtracted {
                failed: self.failed(),
            });
        }
        Ok(&self.records)
    }

    pub fn report(&self) -> BatchReport<'_> {
        BatchReport {
            generated_at: self.finished_at,
            total: self.jobs.len(),
            completed: self.completed(),
            failed: self.failed(),
            jobs: &self.jobs,
        }
    }

    pub fn report_json(&self) -> FdmResult<String> {
        Ok(serde_json::to_string_pretty(&self.report())?)
    }
}
