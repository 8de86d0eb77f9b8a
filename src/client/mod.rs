//! Typed HTTP client for the MelodyStudio API.
//!
//! Every call unwraps the `{"success": true, "data": ...}` envelope; error
//! bodies (`{"error": true, "message", "code"}`) surface as [`ClientError::Api`].

pub mod store;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::handlers::protected::auth::WhoAmI;
use crate::handlers::public::auth::{LoginRequest, LoginResponse, SignupResponse};
use crate::pagination::Page;
use crate::services::SignupRequest;
use crate::types::Role;

pub use store::{Identified, ListStore, Pagination};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid server URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("{message} ({code}, HTTP {status})")]
    Api { status: u16, code: String, message: String },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Not signed in")]
    NotAuthenticated,
}

impl ClientError {
    /// HTTP status of a server-side rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Query string accepted by every list endpoint
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ListQuery {
    pub fn new(limit: usize) -> Self {
        Self { limit: Some(limit), ..Default::default() }
    }

    pub fn page_token(mut self, token: Option<String>) -> Self {
        self.page_token = token;
        self
    }

    /// Blank search terms are dropped
    pub fn search(mut self, search: &str) -> Self {
        let search = search.trim();
        self.search = (!search.is_empty()).then(|| search.to_string());
        self
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    code: String,
}

#[derive(Deserialize)]
struct WhoAmIBody {
    user: WhoAmI,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidResponse(format!("'{}' cannot be used as a base URL", base_url)));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // Auth

    /// Exchange credentials for a token; the client keeps the token for later calls
    pub async fn login(&mut self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let session: LoginResponse = self.send(Method::POST, "/auth/login", None::<&()>, Some(&body)).await?;
        self.token = Some(session.id_token.clone());
        Ok(session)
    }

    pub async fn signup(&mut self, role: Role, request: &SignupRequest) -> Result<SignupResponse, ClientError> {
        let path = format!("/auth/signup-{}", role.as_str());
        let created: SignupResponse = self.send(Method::POST, &path, None::<&()>, Some(request)).await?;
        self.token = Some(created.id_token.clone());
        Ok(created)
    }

    pub async fn whoami(&self) -> Result<WhoAmI, ClientError> {
        let body: WhoAmIBody = self.send(Method::GET, "/auth/protected", None::<&()>, None::<&()>).await?;
        Ok(body.user)
    }

    /// Revoke every token of the current subject, then forget ours
    pub async fn signout(&mut self) -> Result<(), ClientError> {
        let _: Value = self.send(Method::POST, "/auth/signout", None::<&()>, None::<&()>).await?;
        self.token = None;
        Ok(())
    }

    // Collections

    pub async fn list<T: DeserializeOwned>(&self, path: &str, query: &ListQuery) -> Result<Page<T>, ClientError> {
        self.send(Method::GET, path, Some(query), None::<&()>).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(Method::GET, path, None::<&()>, None::<&()>).await
    }

    pub async fn create<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, path, None::<&()>, Some(body)).await
    }

    pub async fn update<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::PUT, path, None::<&()>, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ClientError> {
        self.send(Method::DELETE, path, None::<&()>, None::<&()>).await
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{}/{}", base, path.trim_start_matches('/')))?)
    }

    async fn send<T, Q, B>(&self, method: Method, path: &str, query: Option<&Q>, body: Option<&B>) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method, url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        parse_response(response).await
    }
}

async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    let text = response.text().await?;

    if status.is_success() {
        let envelope: Envelope<T> = serde_json::from_str(&text)
            .map_err(|e| ClientError::InvalidResponse(format!("{}: {}", e, text)))?;
        return Ok(envelope.data);
    }

    Err(api_error(status, &text))
}

fn api_error(status: StatusCode, text: &str) -> ClientError {
    match serde_json::from_str::<ErrorBody>(text) {
        Ok(body) => ClientError::Api {
            status: status.as_u16(),
            code: body.code,
            message: body.message,
        },
        Err(_) => ClientError::Api {
            status: status.as_u16(),
            code: status.canonical_reason().unwrap_or("UNKNOWN").to_uppercase().replace(' ', "_"),
            message: text.to_string(),
        },
    }
}
