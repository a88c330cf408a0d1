#[cfg(test)]
pub mod mock;
pub mod openai;
pub mod prompt;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::InsightSettings;
use crate::error::InsightError;

pub use openai::OpenAiAnalyzer;

/// Definition of the analysis agent to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSpec {
    pub name: String,
    pub instructions: String,
    pub model: String,
    pub tools: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Completed,
    Failed { status: String, message: String },
}

/// Remote document-analysis service, one method per endpoint used.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    async fn upload_file(&self, path: &Path) -> Result<String, InsightError>;
    async fn create_agent(&self, spec: &AgentSpec) -> Result<String, InsightError>;
    async fn create_thread(&self, message: &str, file_id: &str) -> Result<String, InsightError>;
    async fn create_run(&self, thread_id: &str, agent_id: &str) -> Result<String, InsightError>;
    async fn run_state(&self, thread_id: &str, run_id: &str) -> Result<RunState, InsightError>;
    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<(), InsightError>;
    /// Text payloads of the run's messages, oldest first.
    async fn list_messages(&self, thread_id: &str, run_id: &str)
        -> Result<Vec<String>, InsightError>;
    async fn delete_agent(&self, agent_id: &str) -> Result<(), InsightError>;
    async fn delete_file(&self, file_id: &str) -> Result<(), InsightError>;
}

#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl From<&InsightSettings> for PollPolicy {
    fn from(s: &InsightSettings) -> Self {
        PollPolicy {
            interval: s.poll_interval(),
            timeout: s.timeout(),
        }
    }
}

/// Turns the structured export into a narrative report.
///
/// Any failing step aborts the run. Remote resources created before the
/// failure (uploaded file, agent) are left behind.
pub struct InsightPipeline<A> {
    analyzer: A,
    agent: AgentSpec,
    poll: PollPolicy,
}

impl<A: DocumentAnalyzer> InsightPipeline<A> {
    pub fn new(analyzer: A, brief: &str, settings: &InsightSettings) -> Self {
        InsightPipeline {
            analyzer,
            agent: AgentSpec {
                name: settings.agent_name.clone(),
                instructions: brief.to_string(),
                model: settings.model.clone(),
                tools: prompt::AGENT_TOOLS.iter().map(|t| t.to_string()).collect(),
            },
            poll: PollPolicy::from(settings),
        }
    }

    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub async fn summarize(&self, export: &Path) -> Result<String, InsightError> {
        let file_id = self.analyzer.upload_file(export).await?;
        info!(file_id = %file_id, "Uploaded reviews for analysis");

        let agent_id = self.analyzer.create_agent(&self.agent).await?;
        let thread_id = self
            .analyzer
            .create_thread(prompt::THREAD_MESSAGE, &file_id)
            .await?;
        let run_id = self.analyzer.create_run(&thread_id, &agent_id).await?;
        info!(run_id = %run_id, "Analysis run started");

        self.wait_for_run(&thread_id, &run_id).await?;

        let report = self
            .analyzer
            .list_messages(&thread_id, &run_id)
            .await?
            .pop()
            .filter(|text| !text.trim().is_empty())
            .ok_or(InsightError::EmptyResponse)?;

        self.analyzer.delete_agent(&agent_id).await?;
        self.analyzer.delete_file(&file_id).await?;
        Ok(report)
    }

    /// Poll until the run settles. On timeout the run is cancelled and a
    /// `Timeout` error is returned.
    async fn wait_for_run(&self, thread_id: &str, run_id: &str) -> Result<(), InsightError> {
        match tokio::time::timeout(self.poll.timeout, self.poll_run(thread_id, run_id)).await {
            Ok(result) => result,
            Err(_) => {
                if let Err(e) = self.analyzer.cancel_run(thread_id, run_id).await {
                    warn!("Failed to cancel timed-out run {}: {}", run_id, e);
                }
                Err(InsightError::Timeout(self.poll.timeout))
            }
        }
    }

    async fn poll_run(&self, thread_id: &str, run_id: &str) -> Result<(), InsightError> {
        loop {
            match self.analyzer.run_state(thread_id, run_id).await? {
                RunState::Completed => return Ok(()),
                RunState::Failed { status, message } => {
                    return Err(InsightError::RunFailed { status, message })
                }
                RunState::Pending => tokio::time::sleep(self.poll.interval).await,
            }
        }
    }
}
