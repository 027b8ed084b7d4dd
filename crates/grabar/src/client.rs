//! Bearer-authenticated HTTP client for the project and script backend.
//!
//! One request, one response: transport failures surface as
//! [`GrabarError::Http`], non-2xx statuses as [`GrabarError::Api`]. Nothing
//! is retried.

use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::result::{GrabarError, GrabarResult};
use crate::script::{Script, ScriptLanguage};

/// Per-request timeout applied by [`ApiClient::new`]
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A project grouping saved scripts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project id
    pub id: String,
    /// Display name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Creation time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of a project create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    /// Display name
    pub name: String,
    /// Free-form description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial project update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPatch {
    /// New name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A script stored on the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedScript {
    /// Script id
    pub id: String,
    /// Owning project
    pub project_id: String,
    /// Display name
    pub name: String,
    /// Script language
    pub language: ScriptLanguage,
    /// Script source
    pub content: String,
    /// Action blocks in the script
    #[serde(default)]
    pub action_count: usize,
    /// Creation time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of a script upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScript {
    /// Display name
    pub name: String,
    /// Script language
    pub language: ScriptLanguage,
    /// Script source
    pub content: String,
    /// Action blocks in the script
    pub action_count: usize,
}

impl NewScript {
    /// Upload body for an emitted script
    #[must_use]
    pub fn from_script(name: impl Into<String>, script: &Script) -> Self {
        Self {
            name: name.into(),
            language: script.language,
            content: script.text.clone(),
            action_count: script.block_count,
        }
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Backend client
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    token: Option<String>,
}

impl ApiClient {
    /// Client for `base_url` with a [`REQUEST_TIMEOUT`] per request
    ///
    /// # Errors
    ///
    /// Returns [`GrabarError::Http`] if the TLS backend cannot be initialized.
    pub fn new(base_url: impl Into<String>) -> GrabarResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Client with a custom reqwest client
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            token: None,
        }
    }

    /// Set the bearer token
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Bearer token, if any
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, method: Method, path: &str) -> GrabarResult<RequestBuilder> {
        let token = self.token.as_deref().ok_or(GrabarError::NotAuthenticated)?;
        Ok(self.client.request(method, self.url(path)).bearer_auth(token))
    }

    async fn send(request: RequestBuilder) -> GrabarResult<reqwest::Response> {
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "backend rejected request");
            return Err(GrabarError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> GrabarResult<T> {
        Ok(Self::send(request).await?.json().await?)
    }

    /// Exchange credentials for a token and keep it
    pub async fn sign_in(&mut self, email: &str, password: &str) -> GrabarResult<String> {
        let request = self
            .client
            .post(self.url("/auth/token"))
            .json(&Credentials { email, password });
        let token: TokenResponse = Self::send_json(request).await?;
        tracing::info!(email, "signed in");
        self.token = Some(token.access_token.clone());
        Ok(token.access_token)
    }

    /// All projects visible to the token
    pub async fn list_projects(&self) -> GrabarResult<Vec<Project>> {
        Self::send_json(self.authorized(Method::GET, "/projects")?).await
    }

    /// One project
    pub async fn get_project(&self, id: &str) -> GrabarResult<Project> {
        Self::send_json(self.authorized(Method::GET, &format!("/projects/{id}"))?).await
    }

    /// Create a project
    pub async fn create_project(&self, project: &NewProject) -> GrabarResult<Project> {
        let request = self.authorized(Method::POST, "/projects")?.json(project);
        let created: Project = Self::send_json(request).await?;
        tracing::info!(id = created.id.as_str(), "project created");
        Ok(created)
    }

    /// Update a project
    pub async fn update_project(&self, id: &str, patch: &ProjectPatch) -> GrabarResult<Project> {
        let request = self
            .authorized(Method::PATCH, &format!("/projects/{id}"))?
            .json(patch);
        Self::send_json(request).await
    }

    /// Delete a project
    pub async fn delete_project(&self, id: &str) -> GrabarResult<()> {
        Self::send(self.authorized(Method::DELETE, &format!("/projects/{id}"))?).await?;
        tracing::info!(id, "project deleted");
        Ok(())
    }

    /// Scripts saved under a project
    pub async fn list_scripts(&self, project_id: &str) -> GrabarResult<Vec<SavedScript>> {
        let path = format!("/projects/{project_id}/scripts");
        Self::send_json(self.authorized(Method::GET, &path)?).await
    }

    /// One script
    pub async fn get_script(&self, id: &str) -> GrabarResult<SavedScript> {
        Self::send_json(self.authorized(Method::GET, &format!("/scripts/{id}"))?).await
    }

    /// Upload a script under a project
    pub async fn create_script(&self, project_id: &str, script: &NewScript) -> GrabarResult<SavedScript> {
        let path = format!("/projects/{project_id}/scripts");
        let request = self.authorized(Method::POST, &path)?.json(script);
        let saved: SavedScript = Self::send_json(request).await?;
        tracing::info!(id = saved.id.as_str(), project_id, "script uploaded");
        Ok(saved)
    }

    /// Delete a script
    pub async fn delete_script(&self, id: &str) -> GrabarResult<()> {
        Self::send(self.authorized(Method::DELETE, &format!("/scripts/{id}"))?).await?;
        tracing::info!(id, "script deleted");
        Ok(())
    }
}
