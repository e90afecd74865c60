//! Shared harness for the integration suites
//!
//! Each test spawns its own server on a random port over a fresh
//! `MemoryStore`, so no database is needed and tests never share state.

#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use chirpy::configuration::{
    ApplicationSettings, DatabaseSettings, JwtSettings, PolkaSettings, SecretString, Settings,
};
use chirpy::startup::run;
use chirpy::storage::MemoryStore;
use serde_json::{json, Value};

pub const JWT_SECRET: &str = "integration-test-secret";
pub const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";
pub const PASSWORD: &str = "04234-password";

pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
    pub settings: Settings,
    pub client: reqwest::Client,
}

pub fn test_settings(platform: &str) -> Settings {
    Settings {
        database: DatabaseSettings {
            username: "postgres".to_string(),
            password: SecretString::new("password"),
            port: 5432,
            host: "localhost".to_string(),
            database_name: "chirpy".to_string(),
            in_memory: true,
        },
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            platform: platform.to_string(),
            static_root: ".".to_string(),
            log_level: "info".to_string(),
        },
        jwt: JwtSettings {
            secret: SecretString::new(JWT_SECRET),
            issuer: "chirpy".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry_days: 60,
            leeway: 5,
        },
        polka: PolkaSettings {
            api_key: SecretString::new(POLKA_KEY),
        },
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(test_settings("dev"))
}

pub fn spawn_app_with(settings: Settings) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let store = Arc::new(MemoryStore::new());

    let server = run(listener, store.clone(), &settings).expect("Failed to create server");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        store,
        settings,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn create_user(&self, email: &str) -> Value {
        let response = self
            .client
            .post(self.url("/api/users"))
            .json(&json!({ "email": email, "password": PASSWORD }))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(201, response.status().as_u16());
        response.json().await.expect("Failed to parse response")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Create a user and log in, returning the login body
    pub async fn signed_in_user(&self, email: &str) -> Value {
        self.create_user(email).await;
        let response = self.login(email, PASSWORD).await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse response")
    }

    pub async fn post_chirp(&self, access_token: &str, body: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/chirps"))
            .bearer_auth(access_token)
            .json(&json!({ "body": body }))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}
