// tests/question_bank_tests.rs

mod common;

use common::{register_and_login, spawn_app};
use serde_json::{Value, json};

async fn attempt(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    question_id: &str,
    selected: &str,
) -> reqwest::Response {
    client
        .post(format!("{}/api/questions/{}/attempt", address, question_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "selected_answer": selected, "time_spent_seconds": 60 }))
        .send()
        .await
        .expect("Failed to execute request")
}

async fn get_json(client: &reqwest::Client, url: String, token: &str) -> Value {
    client
        .get(url)
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse json")
}

#[tokio::test]
async fn attempts_award_practice_xp_and_track_streaks() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address, "student").await;

    // Hard, first attempt, no streak yet: 20 + 10.
    let first: Value = attempt(&client, &address, &token, "11", "B")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(first["is_correct"], true);
    assert_eq!(first["first_attempt"], true);
    assert_eq!(first["xp_earned"], 30);
    assert_eq!(first["current_streak"], 1);

    // Hard, first attempt, streak running: 20 + 10 + 5.
    let second: Value = attempt(&client, &address, &token, "17", "C")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(second["xp_earned"], 35);
    assert_eq!(second["current_streak"], 2);
    assert_eq!(second["total_xp"], 65);

    // Wrong answers earn nothing and break the streak.
    let wrong: Value = attempt(&client, &address, &token, "1", "A")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(wrong["is_correct"], false);
    assert_eq!(wrong["correct_answer"], "B");
    assert_eq!(wrong["xp_earned"], 0);
    assert_eq!(wrong["current_streak"], 0);

    // Easy retry: no first-attempt bonus, no streak bonus.
    let retry: Value = attempt(&client, &address, &token, "1", "B")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(retry["first_attempt"], false);
    assert_eq!(retry["xp_earned"], 10);
    assert_eq!(retry["total_xp"], 75);

    let me = get_json(&client, format!("{}/api/progress/me", address), &token).await;
    assert_eq!(me["total_xp"], 75);
    assert_eq!(me["questions_answered"], 4);
    assert_eq!(me["overall_accuracy"], 75.0);
    assert_eq!(me["current_streak"], 1);
    assert_eq!(me["longest_streak"], 2);
    assert_eq!(me["diagnostic_completed"], false);

    let topics = get_json(&client, format!("{}/api/progress/topics", address), &token).await;
    let algebra = topics
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["topic_name"] == "Álgebra básica")
        .expect("Algebra progress missing");
    assert_eq!(algebra["questions_attempted"], 2);
    assert_eq!(algebra["questions_correct"], 1);
    assert_eq!(algebra["current_accuracy"], 50.0);
    assert_eq!(algebra["average_time"], 60.0);

    let activity = get_json(
        &client,
        format!("{}/api/progress/activity?days=1", address),
        &token,
    )
    .await;
    let days = activity.as_array().unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0]["questions_answered"], 4);
    assert_eq!(days[0]["time_spent_minutes"], 4);
    assert_eq!(days[0]["xp_earned"], 75);
}

#[tokio::test]
async fn attempt_rejects_unknown_question_and_alternative() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address, "student").await;

    let unknown = attempt(&client, &address, &token, "999", "A").await;
    assert_eq!(unknown.status().as_u16(), 404);

    let invalid = attempt(&client, &address, &token, "1", "Z").await;
    assert_eq!(invalid.status().as_u16(), 400);

    let empty = attempt(&client, &address, &token, "1", "").await;
    assert_eq!(empty.status().as_u16(), 400);
}

#[tokio::test]
async fn bank_lists_status_per_question() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address, "student").await;

    attempt(&client, &address, &token, "1", "B").await;
    attempt(&client, &address, &token, "2", "A").await;

    let all = get_json(&client, format!("{}/api/questions", address), &token).await;
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 20);
    assert_eq!(all[0]["status"], "correct");
    assert_eq!(all[1]["status"], "incorrect");
    assert_eq!(all[2]["status"], "not_attempted");
    assert!(all.iter().all(|q| q.get("correct_answer").is_none()));

    let incorrect = get_json(
        &client,
        format!("{}/api/questions?status=incorrect", address),
        &token,
    )
    .await;
    let incorrect = incorrect.as_array().unwrap();
    assert_eq!(incorrect.len(), 1);
    assert_eq!(incorrect[0]["id"], "2");

    let hard = get_json(
        &client,
        format!("{}/api/questions?difficulty=hard", address),
        &token,
    )
    .await;
    let hard = hard.as_array().unwrap();
    assert_eq!(hard.len(), 2);
    assert!(hard.iter().all(|q| q["xp"] == 20));

    let sorted = get_json(
        &client,
        format!("{}/api/questions?sort=difficulty", address),
        &token,
    )
    .await;
    let sorted = sorted.as_array().unwrap();
    assert_eq!(sorted[0]["difficulty"], "easy");
    assert_eq!(sorted[19]["difficulty"], "hard");
}

#[tokio::test]
async fn recommended_follows_missed_questions_and_weak_topics() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address, "student").await;

    let none = get_json(&client, format!("{}/api/questions/recommended", address), &token).await;
    assert!(none.as_array().unwrap().is_empty());

    attempt(&client, &address, &token, "14", "A").await;

    let missed = get_json(&client, format!("{}/api/questions/recommended", address), &token).await;
    let missed = missed.as_array().unwrap();
    assert_eq!(missed.len(), 1);
    assert_eq!(missed[0]["id"], "14");

    // A blank diagnostic makes every topic weak.
    client
        .post(format!("{}/api/diagnostic/submit", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "answers": {} }))
        .send()
        .await
        .unwrap();

    let weak = get_json(&client, format!("{}/api/questions/recommended", address), &token).await;
    let ids: Vec<&str> = weak
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
}
