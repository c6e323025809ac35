//! Roster API Client
//!
//! One method per server operation. Successful bodies are decoded into
//! typed envelopes; error bodies are decoded and handed back to the caller
//! inside [`ClientError::Api`].

use async_trait::async_trait;
use record_validator::{MarkDraft, StudentDraft};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use storage::{Mark, Student};
use thiserror::Error;
use tracing::{debug, warn};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport or decoding failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response, with the decoded error body when there was one
    #[error("API error ({status}): {}", .body.as_ref().map(|b| b.message.as_str()).unwrap_or("no message"))]
    Api {
        status: StatusCode,
        body: Option<ErrorBody>,
    },
}

impl ClientError {
    /// Message provided by the server, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { body: Some(body), .. } if !body.message.is_empty() => {
                Some(body.message.as_str())
            }
            _ => None,
        }
    }

    /// HTTP status of an API error
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status(),
        }
    }
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// One page of students
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentPage {
    pub success: bool,
    pub students: Vec<Student>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}

/// A student with its marks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentDetail {
    pub success: bool,
    pub student: Student,
    pub marks: Vec<Mark>,
}

/// Create/update response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentEnvelope {
    pub success: bool,
    pub student: Student,
    pub message: String,
}

/// Add-mark response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkEnvelope {
    pub success: bool,
    pub mark: Mark,
    pub message: String,
}

/// Message-only response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub success: bool,
    pub message: String,
}

/// Roster operations as seen by the view
#[async_trait]
pub trait StudentApi: Send + Sync {
    async fn list_students(
        &self,
        page: u64,
        limit: u64,
        search: &str,
    ) -> Result<StudentPage, ClientError>;

    async fn get_student(&self, id: &str) -> Result<StudentDetail, ClientError>;

    async fn create_student(&self, input: &StudentDraft) -> Result<StudentEnvelope, ClientError>;

    async fn update_student(
        &self,
        id: &str,
        input: &StudentDraft,
    ) -> Result<StudentEnvelope, ClientError>;

    async fn delete_student(&self, id: &str) -> Result<MessageEnvelope, ClientError>;

    async fn add_mark(
        &self,
        student_id: &str,
        input: &MarkDraft,
    ) -> Result<MarkEnvelope, ClientError>;
}

/// HTTP client for the roster API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for a base URL such as `http://localhost:5000/api`
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are issued against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let bytes = response.bytes().await?;
        let body = serde_json::from_slice::<ErrorBody>(&bytes).ok();
        warn!(
            "Request failed with {}: {}",
            status,
            body.as_ref().map(|b| b.message.as_str()).unwrap_or("<no body>")
        );
        Err(ClientError::Api { status, body })
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[async_trait]
impl StudentApi for ApiClient {
    async fn list_students(
        &self,
        page: u64,
        limit: u64,
        search: &str,
    ) -> Result<StudentPage, ClientError> {
        let mut params = vec![("page", page.to_string()), ("limit", limit.to_string())];
        if !search.is_empty() {
            params.push(("search", search.to_string()));
        }
        debug!("Fetching students {:?}", params);

        let response = self.http.get(self.url("students")).query(&params).send().await?;
        Self::decode(response).await
    }

    async fn get_student(&self, id: &str) -> Result<StudentDetail, ClientError> {
        let response = self.http.get(self.url(&format!("students/{id}"))).send().await?;
        Self::decode(response).await
    }

    async fn create_student(&self, input: &StudentDraft) -> Result<StudentEnvelope, ClientError> {
        debug!("Creating student {:?}", input);
        let response = self.http.post(self.url("students")).json(input).send().await?;
        Self::decode(response).await
    }

    async fn update_student(
        &self,
        id: &str,
        input: &StudentDraft,
    ) -> Result<StudentEnvelope, ClientError> {
        let response = self
            .http
            .put(self.url(&format!("students/{id}")))
            .json(input)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn delete_student(&self, id: &str) -> Result<MessageEnvelope, ClientError> {
        let response = self
            .http
            .delete(self.url(&format!("students/{id}")))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn add_mark(
        &self,
        student_id: &str,
        input: &MarkDraft,
    ) -> Result<MarkEnvelope, ClientError> {
        let response = self
            .http
            .post(self.url(&format!("students/{student_id}/marks")))
            .json(input)
            .send()
            .await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use storage::MemoryStore;

    async fn spawn_server() -> ApiClient {
        let state = ::api::AppState::new(Arc::new(MemoryStore::new()));
        let app = ::api::create_router(Arc::new(state));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        ApiClient::new(format!("http://{addr}/api/")).unwrap()
    }

    fn draft(name: &str, email: &str) -> StudentDraft {
        StudentDraft {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            age: Some(json!(10)),
            parents_email: Some("p@x.com".to_string()),
        }
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ApiClient::new("http://localhost:5000/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000/api");
        assert_eq!(client.url("students"), "http://localhost:5000/api/students");
        assert_eq!(ApiClient::default().base_url(), DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn test_round_trip_against_live_server() {
        let client = spawn_server().await;

        let created = client.create_student(&draft("Ana", "ana@x.com")).await.unwrap();
        assert!(created.success);
        assert_eq!(created.message, "Student created successfully");
        let id = created.student.id.to_string();

        let mark = client
            .add_mark(
                &id,
                &MarkDraft {
                    subject: Some("Math".to_string()),
                    marks: Some(json!(90)),
                },
            )
            .await
            .unwrap();
        assert_eq!(mark.mark.student_id, created.student.id);

        let update = StudentDraft {
            name: Some("Ana Maria".to_string()),
            ..Default::default()
        };
        let updated = client.update_student(&id, &update).await.unwrap();
        assert_eq!(updated.student.name, "Ana Maria");
        assert_eq!(updated.student.email, "ana@x.com");

        let detail = client.get_student(&id).await.unwrap();
        assert_eq!(detail.marks.len(), 1);

        let page = client.list_students(1, 6, "maria").await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.pages, 1);

        client.delete_student(&id).await.unwrap();
        let err = client.get_student(&id).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.server_message(), Some("Student not found"));
    }

    #[tokio::test]
    async fn test_error_bodies_are_decoded() {
        let client = spawn_server().await;
        client.create_student(&draft("Dup", "dup@x.com")).await.unwrap();

        let err = client.create_student(&draft("Dup", "dup@x.com")).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(
            err.server_message(),
            Some("A student with this email already exists")
        );

        let err = client.get_student("nope").await.unwrap_err();
        assert_eq!(err.server_message(), Some("Invalid student ID"));
        assert!(err.to_string().contains("Invalid student ID"));
    }
}
