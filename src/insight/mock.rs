//! Scripted analysis service for tests: records every call in order.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{AgentSpec, DocumentAnalyzer, RunState};
use crate::error::InsightError;

#[derive(Default)]
pub struct MockAnalyzer {
    pub states: Mutex<VecDeque<RunState>>,
    pub messages: Vec<String>,
    pub fail_thread: bool,
    pub calls: Mutex<Vec<String>>,
}

impl MockAnalyzer {
    pub fn completing(messages: &[&str]) -> Self {
        MockAnalyzer {
            states: Mutex::new(VecDeque::from([
                RunState::Pending,
                RunState::Pending,
                RunState::Completed,
            ])),
            messages: messages.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }
    }

    fn log(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl<'a> DocumentAnalyzer for &'a MockAnalyzer {
    async fn upload_file(&self, _path: &Path) -> Result<String, InsightError> {
        self.log("upload");
        Ok("file-1".into())
    }
    async fn create_agent(&self, spec: &AgentSpec) -> Result<String, InsightError> {
        self.log(&format!("agent:{}", spec.name));
        Ok("agent-1".into())
    }
    async fn create_thread(&self, _m: &str, file_id: &str) -> Result<String, InsightError> {
        self.log(&format!("thread:{}", file_id));
        if self.fail_thread {
            return Err(InsightError::Api {
                status: 500,
                body: "boom".into(),
            });
        }
        Ok("thread-1".into())
    }
    async fn create_run(&self, _t: &str, agent_id: &str) -> Result<String, InsightError> {
        self.log(&format!("run:{}", agent_id));
        Ok("run-1".into())
    }
    async fn run_state(&self, _t: &str, _r: &str) -> Result<RunState, InsightError> {
        self.log("poll");
        Ok(self
            .states
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(RunState::Pending))
    }
    async fn cancel_run(&self, _t: &str, _r: &str) -> Result<(), InsightError> {
        self.log("cancel");
        Ok(())
    }
    async fn list_messages(&self, _t: &str, _r: &str) -> Result<Vec<String>, InsightError> {
        self.log("messages");
        Ok(self.messages.clone())
    }
    async fn delete_agent(&self, agent_id: &str) -> Result<(), InsightError> {
        self.log(&format!("delete_agent:{}", agent_id));
        Ok(())
    }
    async fn delete_file(&self, file_id: &str) -> Result<(), InsightError> {
        self.log(&format!("delete_file:{}", file_id));
        Ok(())
    }
}
