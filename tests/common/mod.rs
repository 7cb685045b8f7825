#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use marketplace_api::app::{app, AppState};
use marketplace_api::config::AppConfig;
use marketplace_api::database::MemoryStore;

/// In-process server backed by a fresh in-memory store. Lives as long as the
/// test's runtime.
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    async fn spawn(config: AppConfig) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = AppState::new(Arc::new(MemoryStore::new()), &config)?;
        let router = app(state, &config.security);
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            base_url,
            client: reqwest::Client::new(),
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = self.client.get(&url).send().await {
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

    /// POST /{collection} with the registration body, returning the new id
    pub async fn register(&self, collection: &str, email: &str, password: &str) -> Result<i64> {
        let res = self
            .client
            .post(self.url(&format!("/{}", collection)))
            .json(&json!({ "name": "Test", "email": email, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());
        let body: Value = res.json().await?;
        body["id"].as_i64().context("registration returned no id")
    }

    pub async fn login(&self, collection: &str, email: &str, password: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url(&format!("/{}/login", collection)))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        let body: Value = res.json().await?;
        body["token"].as_str().map(str::to_string).context("login returned no token")
    }

    /// Register and log in a customer, returning (id, token)
    pub async fn customer(&self, email: &str) -> Result<(i64, String)> {
        let id = self.register("customers", email, "secret").await?;
        let token = self.login("customers", email, "secret").await?;
        Ok((id, token))
    }

    /// Create a business owned by `owner_id`, returning its id
    pub async fn business(&self, token: &str, owner_id: i64) -> Result<i64> {
        self.create(token, "/businesses", &business_body(owner_id)).await
    }

    /// POST `body` to `collection` as `token`, returning the new id
    pub async fn create(&self, token: &str, collection: &str, body: &Value) -> Result<i64> {
        let res = self
            .client
            .post(self.url(collection))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create on {} failed: {}", collection, res.status());
        let body: Value = res.json().await?;
        body["id"].as_i64().context("create returned no id")
    }
}

/// Development preset with cheap password hashing
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = "integration-test-secret".to_string();
    config.security.password_hash_memory_kib = 64;
    config.security.password_hash_iterations = 1;
    config
}

pub async fn start_server() -> Result<TestServer> {
    start_server_with(test_config()).await
}

pub async fn start_server_with(config: AppConfig) -> Result<TestServer> {
    let server = TestServer::spawn(config).await?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

pub fn business_body(owner_id: i64) -> Value {
    json!({
        "owner_id": owner_id,
        "name": "Block 15",
        "address": "300 SW Jefferson Ave.",
        "city": "Corvallis",
        "state": "OR",
        "zip": "97333",
        "phone": "541-758-2077",
        "category": "Restaurant",
        "subcategory": "Brewpub"
    })
}

pub fn review_body(customer_id: i64, business_id: i64) -> Value {
    json!({
        "customer_id": customer_id,
        "business_id": business_id,
        "dollars": 1,
        "stars": 4.5,
        "review": "Cheap, delicious food."
    })
}

pub fn photo_body(customer_id: i64, business_id: i64) -> Value {
    json!({
        "customer_id": customer_id,
        "business_id": business_id,
        "caption": "Hops on the bar",
        "filename": "hops.jpg"
    })
}

pub fn product_body(customer_id: i64, business_id: i64) -> Value {
    json!({
        "customer_id": customer_id,
        "business_id": business_id,
        "name": "Pale Ale",
        "category": "Beer",
        "description": "House pale ale",
        "price": 6.5
    })
}
