// tests/common/mod.rs

#![allow(dead_code)]

use exam_portal::{config::Config, db, routes, state::AppState};
use serde_json::{Value, json};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin_pass";
pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub client: reqwest::Client,
}

/// Spawns the app on a random port against a fresh in-memory database.
pub async fn spawn_app() -> TestApp {
    // One connection that never expires: every new connection to
    // `sqlite::memory:` would open a different, empty database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    db::migrate(&pool).await.expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        admin_username: Some(ADMIN_USERNAME.to_string()),
        admin_password: Some(ADMIN_PASSWORD.to_string()),
        admin_name: None,
    };

    db::seed_admin_user(&pool, &config)
        .await
        .expect("Failed to seed admin");

    let state = AppState {
        pool: pool.clone(),
        config,
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        pool,
        client: reqwest::Client::new(),
    }
}

pub fn unique_username(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let resp: Value = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Login failed")
            .json()
            .await
            .expect("Failed to parse login json");

        resp["token"].as_str().expect("Token not found").to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    /// Registers a student and returns (token, user id, username).
    pub async fn student(&self, prefix: &str) -> (String, i64, String) {
        let username = unique_username(prefix);
        let resp: Value = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({ "name": prefix, "username": username, "password": PASSWORD }))
            .send()
            .await
            .expect("Register failed")
            .json()
            .await
            .expect("Failed to parse register json");

        let id = resp["id"].as_i64().expect("User id not found");
        let token = self.login(&username, PASSWORD).await;
        (token, id, username)
    }

    /// Creates the three-question test used across the suite:
    /// correct answers are 0, 1 and 2, marks +4 / -1.
    pub async fn create_sample_test(&self, admin: &str) -> i64 {
        let resp = self
            .client
            .post(self.url("/api/admin/tests"))
            .bearer_auth(admin)
            .json(&json!({
                "title": "Physics Mock 1",
                "correct_marks": 4,
                "incorrect_marks": -1,
                "duration": 60,
                "questions": [
                    {"number": 1, "text": "Q1", "options": ["a", "b", "c"], "correctAnswer": 0},
                    {"number": 2, "text": "Q2", "options": ["a", "b", "c"], "correctAnswer": 1},
                    {"number": 3, "text": "Q3", "options": ["a", "b", "c"], "correctAnswer": 2}
                ]
            }))
            .send()
            .await
            .expect("Create test failed");

        assert_eq!(resp.status().as_u16(), 201);
        let body: Value = resp.json().await.unwrap();
        body["id"].as_i64().expect("Test id not found")
    }

    pub async fn assign(&self, admin: &str, test_id: i64, user_ids: &[i64]) -> reqwest::Response {
        self.client
            .post(self.url("/api/admin/assignments"))
            .bearer_auth(admin)
            .json(&json!({ "test_id": test_id, "user_ids": user_ids }))
            .send()
            .await
            .expect("Assign failed")
    }

    pub async fn patch_test(&self, admin: &str, test_id: i64, body: Value) -> reqwest::Response {
        self.client
            .patch(self.url(&format!("/api/admin/tests/{}", test_id)))
            .bearer_auth(admin)
            .json(&body)
            .send()
            .await
            .expect("Patch failed")
    }

    /// Fetches the paper and returns question ids in number order.
    pub async fn question_ids(&self, token: &str, test_id: i64) -> Vec<String> {
        let paper: Value = self
            .client
            .get(self.url(&format!("/api/tests/{}", test_id)))
            .bearer_auth(token)
            .send()
            .await
            .expect("Fetch test failed")
            .json()
            .await
            .unwrap();

        paper["questions"]
            .as_array()
            .expect("questions missing")
            .iter()
            .map(|q| q["id"].as_str().unwrap().to_string())
            .collect()
    }

    pub async fn submit(&self, token: &str, test_id: i64, answers: Value) -> reqwest::Response {
        self.client
            .post(self.url(&format!("/api/tests/{}/submit", test_id)))
            .bearer_auth(token)
            .json(&json!({ "answers": answers }))
            .send()
            .await
            .expect("Submit failed")
    }
}
