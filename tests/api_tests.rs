// tests/api_tests.rs

mod common;

use common::{register_and_login, spawn_app, unique_email};

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_works_and_rejects_duplicates() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let email = unique_email("student");
    let body = serde_json::json!({
        "name": "Ana",
        "email": email,
        "password": "password123"
    });

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);

    let user: serde_json::Value = response.json().await.unwrap();
    assert_eq!(user["role"], "student");
    assert!(user.get("password").is_none());

    let duplicate = client
        .post(format!("{}/api/auth/register", address))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(duplicate.status().as_u16(), 409);
}

#[tokio::test]
async fn register_fails_validation() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "name": "Ana",
            "email": "not-an-email",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let email = unique_email("student");

    client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "name": "Ana",
            "email": email,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Register failed");

    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "email": email, "password": "wrong-password" }))
        .send()
        .await
        .expect("Login failed");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn protected_routes_require_token() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let missing = client
        .get(format!("{}/api/progress/me", address))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 401);

    let garbage = client
        .get(format!("{}/api/progress/me", address))
        .header("Authorization", "Bearer not.a.jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(garbage.status().as_u16(), 401);
}

#[tokio::test]
async fn teacher_routes_require_teacher_role() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let student = register_and_login(&client, &address, "student").await;
    let teacher = register_and_login(&client, &address, "teacher").await;

    let forbidden = client
        .get(format!("{}/api/teacher/students", address))
        .header("Authorization", format!("Bearer {}", student))
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status().as_u16(), 403);

    // Give the student some history to summarize.
    client
        .post(format!("{}/api/diagnostic/submit", address))
        .header("Authorization", format!("Bearer {}", student))
        .json(&serde_json::json!({ "answers": { "1": "B", "2": "C" } }))
        .send()
        .await
        .unwrap();

    let response = client
        .get(format!("{}/api/teacher/students", address))
        .header("Authorization", format!("Bearer {}", teacher))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let students: Vec<serde_json::Value> = response.json().await.unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0]["total_xp"], 20);
    assert_eq!(students[0]["latest_performance_level"], "Basic");
    assert_eq!(students[0]["latest_diagnostic_score"], 2);
}
