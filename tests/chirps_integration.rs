//! Chirp posting, reading, ownership-checked deletion and Polka upgrades

mod common;

use common::{spawn_app, POLKA_KEY};
use serde_json::{json, Value};
use uuid::Uuid;

async fn delete_chirp(app: &common::TestApp, chirp_id: &str, token: Option<&str>) -> reqwest::Response {
    let mut request = app.client.delete(app.url(&format!("/api/chirps/{}", chirp_id)));
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    request.send().await.expect("Failed to execute request.")
}

async fn polka(app: &common::TestApp, api_key: &str, body: Value) -> reqwest::Response {
    app.client
        .post(app.url("/api/polka/webhooks"))
        .header("Authorization", format!("ApiKey {}", api_key))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.")
}

#[tokio::test]
async fn chirp_is_cleaned_and_owned_by_author() {
    let app = spawn_app();
    let login = app.signed_in_user("author@example.com").await;

    let response = app
        .post_chirp(login["token"].as_str().unwrap(), "What a Kerfuffle today")
        .await;
    assert_eq!(201, response.status().as_u16());

    let chirp: Value = response.json().await.unwrap();
    assert_eq!(chirp["body"], "What a **** today");
    assert_eq!(chirp["user_id"], login["id"]);
}

#[tokio::test]
async fn chirp_longer_than_140_characters_is_rejected() {
    let app = spawn_app();
    let login = app.signed_in_user("verbose@example.com").await;

    let response = app
        .post_chirp(login["token"].as_str().unwrap(), &"x".repeat(141))
        .await;
    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn chirps_are_listed_oldest_first_and_fetchable_by_id() {
    let app = spawn_app();
    let login = app.signed_in_user("lister@example.com").await;
    let token = login["token"].as_str().unwrap();

    let mut ids = Vec::new();
    for body in ["first", "second", "third"] {
        let chirp: Value = app.post_chirp(token, body).await.json().await.unwrap();
        ids.push(chirp["id"].as_str().unwrap().to_string());
    }

    let listed: Vec<Value> = app
        .client
        .get(app.url("/api/chirps"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let bodies: Vec<&str> = listed.iter().map(|c| c["body"].as_str().unwrap()).collect();
    assert_eq!(bodies, vec!["first", "second", "third"]);

    let response = app
        .client
        .get(app.url(&format!("/api/chirps/{}", ids[1])))
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());
    let chirp: Value = response.json().await.unwrap();
    assert_eq!(chirp["body"], "second");
}

#[tokio::test]
async fn get_chirp_returns_404_or_400() {
    let app = spawn_app();

    let missing = app
        .client
        .get(app.url(&format!("/api/chirps/{}", Uuid::new_v4())))
        .send()
        .await
        .unwrap();
    assert_eq!(404, missing.status().as_u16());

    let malformed = app.client.get(app.url("/api/chirps/not-a-uuid")).send().await.unwrap();
    assert_eq!(400, malformed.status().as_u16());
}

#[tokio::test]
async fn only_the_author_can_delete_a_chirp() {
    let app = spawn_app();
    let author = app.signed_in_user("owner@example.com").await;
    let other = app.signed_in_user("intruder@example.com").await;

    let chirp: Value = app
        .post_chirp(author["token"].as_str().unwrap(), "mine")
        .await
        .json()
        .await
        .unwrap();
    let chirp_id = chirp["id"].as_str().unwrap();

    let response = delete_chirp(&app, chirp_id, None).await;
    assert_eq!(401, response.status().as_u16());

    let response = delete_chirp(&app, chirp_id, Some("not.a.jwt")).await;
    assert_eq!(401, response.status().as_u16());

    let response = delete_chirp(&app, chirp_id, other["token"].as_str()).await;
    assert_eq!(403, response.status().as_u16());

    let response = delete_chirp(&app, chirp_id, author["token"].as_str()).await;
    assert_eq!(204, response.status().as_u16());

    let response = delete_chirp(&app, chirp_id, author["token"].as_str()).await;
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn polka_upgrade_marks_user_chirpy_red() {
    let app = spawn_app();
    let user = app.create_user("red@example.com").await;

    let response = polka(
        &app,
        POLKA_KEY,
        json!({ "event": "user.upgraded", "data": { "user_id": user["id"] } }),
    )
    .await;
    assert_eq!(204, response.status().as_u16());

    let login: Value = app
        .login("red@example.com", common::PASSWORD)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(login["is_chirpy_red"], true);
}

#[tokio::test]
async fn polka_ignores_other_events_and_unknown_users() {
    let app = spawn_app();
    let user = app.create_user("plain@example.com").await;

    let response = polka(
        &app,
        POLKA_KEY,
        json!({ "event": "user.payment_failed", "data": { "user_id": user["id"] } }),
    )
    .await;
    assert_eq!(204, response.status().as_u16());

    let response = polka(
        &app,
        POLKA_KEY,
        json!({ "event": "user.upgraded", "data": { "user_id": Uuid::new_v4() } }),
    )
    .await;
    assert_eq!(204, response.status().as_u16());

    let login: Value = app
        .login("plain@example.com", common::PASSWORD)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(login["is_chirpy_red"], false);
}

#[tokio::test]
async fn polka_rejects_wrong_api_key() {
    let app = spawn_app();
    let user = app.create_user("locked@example.com").await;
    let body = json!({ "event": "user.upgraded", "data": { "user_id": user["id"] } });

    let response = polka(&app, "wrong-key", body.clone()).await;
    assert_eq!(401, response.status().as_u16());

    let response = app
        .client
        .post(app.url("/api/polka/webhooks"))
        .bearer_auth(POLKA_KEY)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn polka_checks_the_key_before_the_body() {
    let app = spawn_app();

    let test_cases = vec![
        (json!({}), "empty object"),
        (json!({ "event": "user.upgraded" }), "missing data"),
        (json!({ "event": "user.upgraded", "data": { "user_id": "nope" } }), "bad user id"),
    ];

    for (body, description) in test_cases {
        let response = polka(&app, "wrong-key", body.clone()).await;
        assert_eq!(
            401,
            response.status().as_u16(),
            "The API did not fail with 401 Unauthorized for a wrong key and {}.",
            description
        );

        let response = polka(&app, POLKA_KEY, body).await;
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request for a valid key and {}.",
            description
        );
    }
}
