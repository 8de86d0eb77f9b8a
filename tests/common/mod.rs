#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use melody_studio_api::app::app;
use melody_studio_api::auth::LocalIdentityProvider;
use melody_studio_api::config::AppConfig;
use melody_studio_api::state::AppState;
use melody_studio_api::store::{DocumentStore, MemoryStore};

/// One server per test: its own in-memory store on an ephemeral port
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    handle: JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn test_state(config: AppConfig) -> AppState {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let identity = Arc::new(LocalIdentityProvider::new(store.clone(), &config.security));
    AppState::new(store, identity, config)
}

pub async fn spawn_server() -> Result<TestServer> {
    spawn_server_with(AppConfig::development()).await
}

pub async fn spawn_server_with(config: AppConfig) -> Result<TestServer> {
    let state = test_state(config);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let base_url = format!("http://{}", listener.local_addr()?);

    let router = app(state.clone());
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(TestServer { base_url, state, handle })
}

impl TestServer {
    /// Send a request and return the status with the parsed JSON body
    pub async fn call(&self, method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let client = reqwest::Client::new();
        let mut request = client.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body = if text.is_empty() { Value::Null } else { serde_json::from_str(&text)? };
        Ok((status, body))
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.call(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::POST, path, token, Some(body)).await
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::PUT, path, Some(token), Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.call(Method::DELETE, path, Some(token), None).await
    }

    /// Sign up through the public endpoint; returns `(uid, idToken)`
    pub async fn signup(&self, role: &str, email: &str, extra: Value) -> Result<(String, String)> {
        let mut body = json!({ "email": email, "password": "secret123" });
        if let (Some(target), Value::Object(extra)) = (body.as_object_mut(), extra) {
            target.extend(extra);
        }
        let (status, body) = self.post(&format!("/auth/signup-{}", role), None, body).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "signup failed with {}: {}", status, body);
        let data = &body["data"];
        Ok((
            data["uid"].as_str().context("missing uid")?.to_string(),
            data["idToken"].as_str().context("missing idToken")?.to_string(),
        ))
    }

    pub async fn client(&self, email: &str) -> Result<String> {
        Ok(self.signup("client", email, json!({})).await?.1)
    }

    pub async fn admin(&self, email: &str) -> Result<String> {
        Ok(self.signup("admin", email, json!({})).await?.1)
    }

    /// Create an appointment and return its id
    pub async fn appointment(&self, token: &str, title: &str) -> Result<String> {
        let (status, body) = self
            .post(
                "/appointments",
                Some(token),
                json!({ "title": title, "description": format!("{} session", title) }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create failed with {}: {}", status, body);
        Ok(body["data"]["id"].as_str().context("missing id")?.to_string())
    }
}

/// Titles of a list response, in order
pub fn titles(body: &Value) -> Vec<String> {
    body["data"]["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["title"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// `path?limit=..&pageToken=..&search=..` with the values form-encoded
pub fn list_path(path: &str, limit: Option<&str>, page_token: Option<&str>, search: Option<&str>) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if let Some(limit) = limit {
        query.append_pair("limit", limit);
    }
    if let Some(token) = page_token {
        query.append_pair("pageToken", token);
    }
    if let Some(search) = search {
        query.append_pair("search", search);
    }
    format!("{}?{}", path, query.finish())
}

/// Follow `nextPageToken` until exhausted, returning every title in order
pub async fn walk_titles(server: &TestServer, path: &str, token: &str, limit: &str, search: Option<&str>) -> Result<Vec<String>> {
    let mut all = Vec::new();
    let mut page_token: Option<String> = None;
    loop {
        let (status, body) = server
            .get(&list_path(path, Some(limit), page_token.as_deref(), search), Some(token))
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "list failed with {}: {}", status, body);
        let items = body["data"]["items"].as_array().map(Vec::len).unwrap_or(0);
        anyhow::ensure!(items <= limit.parse::<usize>()?, "page larger than limit");
        all.extend(titles(&body));

        match body["data"]["nextPageToken"].as_str() {
            Some(next) => page_token = Some(next.to_string()),
            None => break,
        }
    }
    Ok(all)
}
