#![allow(dead_code, unreachable_pub, missing_debug_implementations, clippy::unwrap_used, clippy::missing_panics_doc)]

use messagely_server::AppBuilder;
use messagely_server::adapters::database::{self, DbPool};
use messagely_server::api::MgmtState;
use messagely_server::config::{
    AuthConfig, Config, DatabaseConfig, HealthConfig, LogFormat, MessagingConfig, ServerConfig, TelemetryConfig,
};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::Once;
use tokio::net::TcpListener;
use uuid::Uuid;

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("messagely_server=debug".parse().unwrap())
            .add_directive("sqlx=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().init();
    });
}

pub fn get_test_config() -> Config {
    Config {
        database: DatabaseConfig { url: None, max_connections: 5, min_connections: 0, acquire_timeout_secs: 5 },
        server: ServerConfig { host: "127.0.0.1".to_string(), port: 0, mgmt_port: 0, shutdown_timeout_secs: 1 },
        auth: AuthConfig { jwt_secret: "test_secret".to_string(), token_ttl_secs: 3600 },
        messaging: MessagingConfig { trust_client_sender: false },
        health: HealthConfig { db_timeout_ms: 500 },
        telemetry: TelemetryConfig { log_format: LogFormat::Text, otlp_endpoint: None },
    }
}

/// Connects to `DATABASE_URL` and applies migrations.
///
/// Returns `None` when the variable is unset so Postgres-backed tests can skip.
pub async fn get_test_pool() -> Option<DbPool> {
    setup_tracing();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        tracing::warn!("DATABASE_URL not set; skipping Postgres-backed test");
        return None;
    };

    let config = get_test_config();
    let pool =
        database::init_pool(&database_url, &config.database).await.expect("Failed to connect to DB. Is Postgres running?");

    // Run migrations automatically
    messagely_server::run_migrations(&pool).await.expect("Failed to run migrations");

    Some(pool)
}

pub struct TestUser {
    pub username: String,
    pub token: String,
}

pub struct TestApp {
    pub server_url: String,
    pub mgmt_url: String,
    pub client: reqwest::Client,
    pub config: Config,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_config(get_test_config()).await
    }

    pub async fn spawn_with_config(config: Config) -> Self {
        Self::spawn_with_builder(config.clone(), AppBuilder::new(config)).await
    }

    /// Spawns the server on a Postgres pool instead of the in-memory store.
    pub async fn spawn_with_pool(pool: DbPool) -> Self {
        let config = get_test_config();
        Self::spawn_with_builder(config.clone(), AppBuilder::new(config).with_database(pool)).await
    }

    async fn spawn_with_builder(config: Config, builder: AppBuilder) -> Self {
        setup_tracing();

        let app = builder.build();
        let app_router = messagely_server::api::app_router(app.services);
        let mgmt_app = messagely_server::api::mgmt_router(MgmtState { health_service: app.health_service });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mgmt_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server_url = format!("http://{}", listener.local_addr().unwrap());
        let mgmt_url = format!("http://{}", mgmt_listener.local_addr().unwrap());

        tokio::spawn(async move {
            axum::serve(listener, app_router).await.unwrap();
        });
        tokio::spawn(async move {
            axum::serve(mgmt_listener, mgmt_app).await.unwrap();
        });

        Self { server_url, mgmt_url, client: reqwest::Client::new(), config }
    }

    /// Registers a user whose name is unique per call, keyed by `prefix`.
    pub async fn register_user(&self, prefix: &str) -> TestUser {
        let run_id = Uuid::new_v4().to_string()[..8].to_string();
        let username = format!("{prefix}_{run_id}");

        let resp = self
            .client
            .post(format!("{}/auth/register", self.server_url))
            .json(&json!({
                "username": username,
                "password": "password12345",
                "first_name": prefix.to_uppercase(),
                "last_name": "Tester",
                "phone": "555-0100",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED, "registration failed for {username}");

        let body: Value = resp.json().await.unwrap();
        let token = body["token"].as_str().unwrap().to_string();

        TestUser { username, token }
    }

    pub async fn send_message(&self, sender: &TestUser, to_username: &str, body: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/messages", self.server_url))
            .bearer_auth(&sender.token)
            .json(&json!({ "to_username": to_username, "body": body }))
            .send()
            .await
            .unwrap()
    }

    /// Sends a message that must succeed and returns its id.
    pub async fn send_ok(&self, sender: &TestUser, to_username: &str, body: &str) -> i64 {
        let resp = self.send_message(sender, to_username, body).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        body["message"]["id"].as_i64().unwrap()
    }

    pub async fn get_message(&self, caller: &TestUser, id: i64) -> reqwest::Response {
        self.client
            .get(format!("{}/messages/{id}", self.server_url))
            .bearer_auth(&caller.token)
            .send()
            .await
            .unwrap()
    }

    pub async fn mark_read(&self, caller: &TestUser, id: i64) -> reqwest::Response {
        self.client
            .post(format!("{}/messages/{id}/read", self.server_url))
            .bearer_auth(&caller.token)
            .send()
            .await
            .unwrap()
    }
}
