use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{AgentSpec, DocumentAnalyzer, RunState};
use crate::error::InsightError;

const BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

/// Assistants v2 API: files, assistants, threads, runs.
pub struct OpenAiAnalyzer {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct Created {
    id: String,
}

#[derive(Deserialize)]
struct Run {
    status: String,
    #[serde(default)]
    last_error: Option<RunError>,
}

#[derive(Deserialize)]
struct RunError {
    message: String,
}

#[derive(Deserialize)]
struct MessageList {
    data: Vec<Message>,
}

#[derive(Deserialize)]
struct Message {
    content: Vec<ContentPart>,
}

#[derive(Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<TextValue>,
}

#[derive(Deserialize)]
struct TextValue {
    value: String,
}

impl OpenAiAnalyzer {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        OpenAiAnalyzer {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(&self.api_key).header(BETA_HEADER.0, BETA_HEADER.1)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, InsightError> {
        let resp = self.authed(req).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InsightError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json::<T>().await?)
    }

    async fn send_empty(&self, req: RequestBuilder) -> Result<(), InsightError> {
        self.send::<serde_json::Value>(req).await.map(|_| ())
    }
}

fn run_state(run: Run) -> RunState {
    match run.status.as_str() {
        "completed" => RunState::Completed,
        "queued" | "in_progress" | "cancelling" => RunState::Pending,
        _ => RunState::Failed {
            message: run
                .last_error
                .map(|e| e.message)
                .unwrap_or_else(|| "no error detail".to_string()),
            status: run.status,
        },
    }
}

fn message_texts(list: MessageList) -> Vec<String> {
    list.data
        .into_iter()
        .map(|m| {
            m.content
                .into_iter()
                .filter(|part| part.kind == "text")
                .filter_map(|part| part.text.map(|t| t.value))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect()
}

#[async_trait]
impl DocumentAnalyzer for OpenAiAnalyzer {
    async fn upload_file(&self, path: &Path) -> Result<String, InsightError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| InsightError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "reviews.json".to_string());
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/json")?;
        let form = Form::new().text("purpose", "assistants").part("file", part);

        let created: Created = self
            .send(self.client.post(self.url("files")).multipart(form))
            .await?;
        Ok(created.id)
    }

    async fn create_agent(&self, spec: &AgentSpec) -> Result<String, InsightError> {
        let tools: Vec<_> = spec.tools.iter().map(|t| json!({ "type": t })).collect();
        let body = json!({
            "name": spec.name,
            "instructions": spec.instructions,
            "model": spec.model,
            "tools": tools,
        });
        let created: Created = self
            .send(self.client.post(self.url("assistants")).json(&body))
            .await?;
        debug!(agent_id = %created.id, "Assistant created");
        Ok(created.id)
    }

    async fn create_thread(&self, message: &str, file_id: &str) -> Result<String, InsightError> {
        let body = json!({
            "messages": [{
                "role": "user",
                "content": message,
                "attachments": [{
                    "file_id": file_id,
                    "tools": [{ "type": "file_search" }],
                }],
            }],
        });
        let created: Created = self
            .send(self.client.post(self.url("threads")).json(&body))
            .await?;
        Ok(created.id)
    }

    async fn create_run(&self, thread_id: &str, agent_id: &str) -> Result<String, InsightError> {
        let created: Created = self
            .send(
                self.client
                    .post(self.url(&format!("threads/{}/runs", thread_id)))
                    .json(&json!({ "assistant_id": agent_id })),
            )
            .await?;
        Ok(created.id)
    }

    async fn run_state(&self, thread_id: &str, run_id: &str) -> Result<RunState, InsightError> {
        let run: Run = self
            .send(
                self.client
                    .get(self.url(&format!("threads/{}/runs/{}", thread_id, run_id))),
            )
            .await?;
        Ok(run_state(run))
    }

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<(), InsightError> {
        self.send_empty(
            self.client
                .post(self.url(&format!("threads/{}/runs/{}/cancel", thread_id, run_id))),
        )
        .await
    }

    async fn list_messages(
        &self,
        thread_id: &str,
        run_id: &str,
    ) -> Result<Vec<String>, InsightError> {
        let list: MessageList = self
            .send(
                self.client
                    .get(self.url(&format!("threads/{}/messages", thread_id)))
                    .query(&[("run_id", run_id), ("order", "asc")]),
            )
            .await?;
        Ok(message_texts(list))
    }

    async fn delete_agent(&self, agent_id: &str) -> Result<(), InsightError> {
        self.send_empty(
            self.client
                .delete(self.url(&format!("assistants/{}", agent_id))),
        )
        .await
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), InsightError> {
        self.send_empty(self.client.delete(self.url(&format!("files/{}", file_id))))
            .await
    }
}
