// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;

use portal::{catalog::Catalog, config::Config, routes, state::AppState, store};

/// Spawns the app on a random port backed by a fresh in-memory database.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
pub async fn spawn_app() -> String {
    let database_url = "sqlite::memory:".to_string();

    let pool = store::connect(&database_url)
        .await
        .expect("Failed to open in-memory database");

    store::migrate(&pool).await.expect("Failed to migrate database");

    let config = Config {
        database_url,
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        log_dir: "logs".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
    };

    let state = AppState {
        pool,
        config,
        catalog: Arc::new(Catalog::builtin().expect("Built-in catalog must load")),
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

    address
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}_{}@example.com", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}

/// Registers a user with the given role and returns a bearer token.
pub async fn register_and_login(
    client: &reqwest::Client,
    address: &str,
    role: &str,
) -> String {
    let email = unique_email(role);
    let password = "password123";

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "name": format!("Test {}", role),
            "email": email,
            "password": password,
            "role": role
        }))
        .send()
        .await
        .expect("Register failed");
    assert_eq!(response.status().as_u16(), 201);

    let login: serde_json::Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Login failed")
        .json()
        .await
        .expect("Failed to parse login json");

    login["token"].as_str().expect("Token not found").to_string()
}
