#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::{json, Value};

use noteful_api::auth::{hash_password, TokenService, UserIdentity};
use noteful_api::database::{models::NewUser, Store};
use noteful_api::server::app;
use noteful_api::state::AppState;

pub const SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "baseball";

/// In-process server on an unused port, backed by the in-memory store
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: Store,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let store = Store::memory();
        let tokens = TokenService::new(SECRET, chrono::Duration::hours(1));
        let router = app(AppState::new(store.clone(), tokens), &[]);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            port,
            base_url,
            store,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Provision a user directly in the store, as the CLI does
    pub async fn seed_user(&self, username: &str, fullname: &str) -> Result<UserIdentity> {
        let user = self
            .store
            .users
            .create(NewUser {
                username: username.to_string(),
                fullname: fullname.to_string(),
                password_hash: hash_password(PASSWORD)?,
            })
            .await?;
        Ok(UserIdentity::from(&user))
    }

    /// Log in over HTTP and return the bearer token
    pub async fn login(&self, username: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/api/auth"))
            .json(&json!({ "username": username, "password": PASSWORD }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

        let body: Value = res.json().await?;
        body["authToken"]
            .as_str()
            .map(str::to_string)
            .context("login response has no authToken")
    }

    /// Seed a user and log them in
    pub async fn user_token(&self, username: &str) -> Result<String> {
        self.seed_user(username, &format!("{} user", username)).await?;
        self.login(username).await
    }

    pub fn get(&self, token: &str, path: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, token: &str, path: &str, body: &Value) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token).json(body)
    }

    pub fn put(&self, token: &str, path: &str, body: &Value) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token).json(body)
    }

    pub fn delete(&self, token: &str, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }

    /// POST a resource, asserting 201, and return its body
    pub async fn create(&self, token: &str, collection: &str, body: Value) -> Result<Value> {
        let res = self.post(token, collection, &body).send().await?;
        anyhow::ensure!(
            res.status() == StatusCode::CREATED,
            "create {} failed: {}",
            collection,
            res.status()
        );
        Ok(res.json().await?)
    }
}

/// Assert the standard error body and return its message
pub async fn error_message(res: reqwest::Response, status: StatusCode) -> Result<String> {
    assert_eq!(res.status(), status);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], true, "not an error body: {}", body);
    Ok(body["message"].as_str().unwrap_or_default().to_string())
}
