//!
//! Client for the workload execution backend.
//!
//! The backend runs uploaded source files on a set of machines and writes a
//! measurement report, which is then fetched and ingested.
use bytes::Bytes;
use serde::Deserialize;

use crate::record::Dataset;
use crate::{table, Error, Result};

pub mod machines;

pub use machines::{Machine, MACHINES};

/// Language of the uploaded workload
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    Python,
    JavaScript,
}

impl Language {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "python" => Ok(Self::Python),
            "javascript" => Ok(Self::JavaScript),
            other => Err(Error::General(format!("unsupported language '{other}'"))),
        }
    }
}

/// One source file to upload
#[derive(Clone, Debug)]
pub struct WorkloadFile {
    pub name: String,
    pub contents: Bytes,
}

impl WorkloadFile {
    #[must_use]
    pub fn new(name: &str, contents: impl Into<Bytes>) -> Self {
        Self {
            name: name.to_string(),
            contents: contents.into(),
        }
    }

    /// Read a file from disk, uploaded under its file name
    pub async fn read<P: AsRef<std::path::Path> + std::fmt::Debug>(path: P) -> Result<Self> {
        let name = path
            .as_ref()
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::General(format!("no file name in {path:?}")))?
            .to_string();
        let data = tokio::fs::read(path.as_ref()).await?;
        Ok(Self {
            name,
            contents: data.into(),
        })
    }
}

/// What to run, and where
#[derive(Clone, Debug)]
pub struct RunRequest {
    language: Language,
    entry_point: String,
    machines: Vec<&'static str>,
    files: Vec<WorkloadFile>,
}

impl RunRequest {
    #[must_use]
    pub fn new(language: Language, entry_point: &str) -> Self {
        Self {
            language,
            entry_point: entry_point.to_string(),
            machines: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Run on the named machine, which must be in [`MACHINES`]
    pub fn machine(mut self, name: &str) -> Result<Self> {
        let machine = machines::find(name).ok_or_else(|| Error::UnknownMachine(name.into()))?;
        if !self.machines.contains(&machine.name) {
            self.machines.push(machine.name);
        }
        Ok(self)
    }

    /// Run on every known machine
    #[must_use]
    pub fn all_machines(self) -> Self {
        Self {
            machines: MACHINES.iter().map(|m| m.name).collect(),
            ..self
        }
    }

    #[must_use]
    pub fn file(mut self, file: WorkloadFile) -> Self {
        self.files.push(file);
        self
    }

    #[must_use]
    pub fn machines(&self) -> &[&'static str] {
        &self.machines
    }

    fn form(&self) -> Result<reqwest::multipart::Form> {
        if self.machines.is_empty() {
            return Err(Error::general("Select at least one machine"));
        }
        if self.files.is_empty() {
            return Err(Error::general("No files to upload"));
        }

        let form = reqwest::multipart::Form::new()
            .text("machines", serde_json::to_string(&self.machines)?)
            .text("language", self.language.as_str())
            .text("entryPoint", self.entry_point.clone());

        Ok(self.files.iter().fold(form, |form, f| {
            form.part(
                "files",
                reqwest::multipart::Part::stream_with_length(
                    f.contents.clone(),
                    f.contents.len() as u64,
                )
                .file_name(f.name.clone()),
            )
        }))
    }
}

/// Where the backend put the report
#[derive(Debug, Clone, Deserialize)]
pub struct RunReport {
    pub message: String,
    pub path: String,
}

/// Client for the execution backend
#[derive(Clone, Debug)]
pub struct WorkloadClient {
    base_url: url::Url,
    report_url: url::Url,
    client: reqwest::Client,
}

impl WorkloadClient {
    /// `base` is the backend API, `reports` is where report paths are served from
    pub fn new(base: &str, reports: &str) -> Result<Self> {
        Ok(Self {
            base_url: url::Url::parse(base)?,
            report_url: url::Url::parse(reports)?,
            client: reqwest::Client::builder().build()?,
        })
    }

    /// Upload the workload and wait for the backend to finish running it
    #[tracing::instrument(level = "debug", skip(self, request), fields(machines = ?request.machines))]
    pub async fn submit(&self, request: &RunRequest) -> Result<RunReport> {
        let form = request.form()?;
        let url = self.base_url.join("upload")?;
        tracing::info!(
            "submitting {} on {} machines",
            request.entry_point,
            request.machines.len()
        );

        let result = self.client.post(url).multipart(form).send().await?;

        if result.status().is_success() {
            let report: RunReport = result.json().await?;
            tracing::debug!("{}: {}", report.message, report.path);
            Ok(report)
        } else {
            tracing::error!("upload failed");
            let status = result.status();
            let text = result.text().await.unwrap_or_default();
            Err(Error::WebServer(status.as_u16(), text))
        }
    }

    /// Download and ingest a finished report
    pub async fn fetch_report(&self, report: &RunReport) -> Result<Dataset> {
        let url = self.report_url.join(&report.path)?;
        tracing::debug!("GET {}", url);

        let result = self.client.get(url).send().await?;
        if result.status().is_success() {
            let text = result.text().await?;
            Ok(table::ingest(&text))
        } else {
            Err(Error::WebServer(
                result.status().as_u16(),
                result.status().to_string(),
            ))
        }
    }

    /// Submit a workload and ingest its report
    pub async fn run(&self, request: &RunRequest) -> Result<Dataset> {
        let report = self.submit(request).await?;
        self.fetch_report(&report).await
    }
}
