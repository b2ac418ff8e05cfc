mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{error_message, TestServer};

#[tokio::test]
async fn folder_lifecycle() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.user_token("bobuser").await?;

    let res = server.post(&token, "/api/folders", &json!({ "name": "Work" })).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let location = res
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_default();
    let created: Value = res.json().await?;
    let id = created["id"].as_str().unwrap_or_default().to_string();
    assert_eq!(location, format!("/api/folders/{}", id));
    assert_eq!(created["name"], "Work");

    let fetched: Value = server.get(&token, &location).send().await?.json().await?;
    assert_eq!(fetched, created);

    let res = server.put(&token, &location, &json!({ "name": "Work2" })).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await?;
    assert_eq!(updated["name"], "Work2");
    assert_eq!(updated["createdAt"], created["createdAt"]);
    let created_at = chrono::DateTime::parse_from_rfc3339(created["createdAt"].as_str().unwrap_or_default())?;
    let updated_at = chrono::DateTime::parse_from_rfc3339(updated["updatedAt"].as_str().unwrap_or_default())?;
    assert!(updated_at > created_at);

    let res = server.delete(&token, &location).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(res.bytes().await?.is_empty());

    let res = server.delete(&token, &location).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = server.get(&token, &location).send().await?;
    assert_eq!(error_message(res, StatusCode::NOT_FOUND).await?, "Folder not found");
    Ok(())
}

#[tokio::test]
async fn create_requires_a_name() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.user_token("bobuser").await?;

    for body in [json!({}), json!({ "name": "" }), json!({ "name": null })] {
        let res = server.post(&token, "/api/folders", &body).send().await?;
        let message = error_message(res, StatusCode::BAD_REQUEST).await?;
        assert_eq!(message, "Missing `name` in request body");
    }
    Ok(())
}

#[tokio::test]
async fn duplicate_names_are_rejected_per_user() -> Result<()> {
    let server = TestServer::spawn().await?;
    let bob = server.user_token("bobuser").await?;
    let alice = server.user_token("aliceuser").await?;

    server.create(&bob, "/api/folders", json!({ "name": "Work" })).await?;

    let res = server.post(&bob, "/api/folders", &json!({ "name": "Work" })).send().await?;
    let message = error_message(res, StatusCode::BAD_REQUEST).await?;
    assert_eq!(message, "Folder name already exists");

    // Another user may reuse the name
    server.create(&alice, "/api/folders", json!({ "name": "Work" })).await?;
    Ok(())
}

#[tokio::test]
async fn malformed_ids_are_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.user_token("bobuser").await?;

    let res = server.get(&token, "/api/folders/doReMi").send().await?;
    assert_eq!(error_message(res, StatusCode::BAD_REQUEST).await?, "Folder Id: doReMi is not valid");

    let res = server.put(&token, "/api/folders/doReMi", &json!({ "name": "x" })).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server.delete(&token, "/api/folders/doReMi").send().await?;
    assert_eq!(error_message(res, StatusCode::BAD_REQUEST).await?, "Folder Id: doReMi is not valid");
    Ok(())
}

#[tokio::test]
async fn search_filters_and_orders_by_recent_update() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.user_token("bobuser").await?;

    let archive = server.create(&token, "/api/folders", json!({ "name": "Archive" })).await?;
    server.create(&token, "/api/folders", json!({ "name": "Drafts" })).await?;
    server.create(&token, "/api/folders", json!({ "name": "Work Archive" })).await?;

    // Touch the oldest so it moves to the front
    let path = format!("/api/folders/{}", archive["id"].as_str().unwrap_or_default());
    server.put(&token, &path, &json!({ "name": "Old Archive" })).send().await?;

    let all: Vec<Value> = server.get(&token, "/api/folders").send().await?.json().await?;
    let names: Vec<&str> = all.iter().filter_map(|f| f["name"].as_str()).collect();
    assert_eq!(names, vec!["Old Archive", "Work Archive", "Drafts"]);

    let found: Vec<Value> = server
        .get(&token, "/api/folders?searchTerm=aRcHiVe")
        .send()
        .await?
        .json()
        .await?;
    let names: Vec<&str> = found.iter().filter_map(|f| f["name"].as_str()).collect();
    assert_eq!(names, vec!["Old Archive", "Work Archive"]);

    let none: Vec<Value> = server
        .get(&token, "/api/folders?searchTerm=zzz")
        .send()
        .await?
        .json()
        .await?;
    assert!(none.is_empty());
    Ok(())
}

#[tokio::test]
async fn users_cannot_touch_each_others_folders() -> Result<()> {
    let server = TestServer::spawn().await?;
    let bob = server.user_token("bobuser").await?;
    let alice = server.user_token("aliceuser").await?;

    let folder = server.create(&bob, "/api/folders", json!({ "name": "Private" })).await?;
    let path = format!("/api/folders/{}", folder["id"].as_str().unwrap_or_default());

    let listed: Vec<Value> = server.get(&alice, "/api/folders").send().await?.json().await?;
    assert!(listed.is_empty());

    let res = server.get(&alice, &path).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.put(&alice, &path, &json!({ "name": "Mine now" })).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Deleting someone else's folder is a silent no-op
    let res = server.delete(&alice, &path).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let still_there: Value = server.get(&bob, &path).send().await?.json().await?;
    assert_eq!(still_there["name"], "Private");
    Ok(())
}

#[tokio::test]
async fn renaming_onto_an_existing_name_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.user_token("bobuser").await?;

    server.create(&token, "/api/folders", json!({ "name": "Work" })).await?;
    let home = server.create(&token, "/api/folders", json!({ "name": "Home" })).await?;
    let path = format!("/api/folders/{}", home["id"].as_str().unwrap_or_default());

    let res = server.put(&token, &path, &json!({ "name": "Work" })).send().await?;
    assert_eq!(error_message(res, StatusCode::BAD_REQUEST).await?, "Folder name already exists");

    let unchanged: Value = server.get(&token, &path).send().await?.json().await?;
    assert_eq!(unchanged["name"], "Home");
    Ok(())
}

#[tokio::test]
async fn malformed_query_strings_get_json_errors() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.user_token("bobuser").await?;

    let res = server
        .get(&token, "/api/folders?searchTerm=a&searchTerm=b")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["message"].as_str().is_some_and(|m| m.contains("searchTerm")));
    Ok(())
}
