mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::list_path;
use melody_studio_api::store::Fields;
use melody_studio_api::types::collections;

async fn musician(server: &common::TestServer, email: &str, name: &str) -> Result<(String, String)> {
    server
        .signup("musician", email, json!({ "name": name, "location": "Madrid" }))
        .await
}

#[tokio::test]
async fn catalogue_is_public_and_lists_only_musicians() -> Result<()> {
    let server = common::spawn_server().await?;
    musician(&server, "lola@melody.test", "Lola").await?;
    server.client("ana@melody.test").await?;
    musician(&server, "bruno@melody.test", "Bruno").await?;

    let (status, body) = server.get("/resources", None).await?;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]["items"]
        .as_array()
        .map(|items| items.iter().filter_map(|i| i["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, vec!["Bruno", "Lola"]);
    assert!(body["data"].get("totalItems").is_none());

    let (_, body) = server.get(&list_path("/resources", Some("5"), None, Some("Lo")), None).await?;
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"]["items"][0]["location"], "Madrid");
    Ok(())
}

#[tokio::test]
async fn reviews_feed_the_average_rating() -> Result<()> {
    let server = common::spawn_server().await?;
    let (lola, _) = musician(&server, "lola@melody.test", "Lola").await?;
    let ana = server.client("ana@melody.test").await?;
    let ben = server.client("ben@melody.test").await?;

    let (status, body) = server
        .post(&format!("/resources/{}/reviews", lola), Some(&ana), json!({ "rating": 5, "comment": "Great" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["musicianId"], lola.as_str());
    server
        .post(&format!("/resources/{}/reviews", lola), Some(&ben), json!({ "rating": 4 }))
        .await?;

    let (status, _) = server
        .post(&format!("/resources/{}/reviews", lola), Some(&ben), json!({ "rating": 9 }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .post(&format!("/resources/{}/reviews", lola), None, json!({ "rating": 3 }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = server.get(&format!("/resources/{}", lola), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Lola");
    assert_eq!(body["data"]["averageRating"], 4.5);
    assert_eq!(body["data"]["reviews"].as_array().map(Vec::len), Some(2));

    let (status, body) = server.get(&format!("/resources/{}/reviews", lola), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["rating"], 4);
    Ok(())
}

#[tokio::test]
async fn detail_lists_the_musicians_services() -> Result<()> {
    let server = common::spawn_server().await?;
    let (lola, _) = musician(&server, "lola@melody.test", "Lola").await?;
    let (bruno, _) = musician(&server, "bruno@melody.test", "Bruno").await?;

    let (status, body) = server.get(&format!("/resources/{}", lola), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["services"], json!([]));

    for (id, owner, name) in [("s1", &lola, "Mixing"), ("s2", &bruno, "Drums"), ("s3", &lola, "Mastering")] {
        let fields: Fields = json!({ "musicianId": owner, "name": name, "price": 40 })
            .as_object()
            .cloned()
            .unwrap_or_default();
        server.state.store.set(collections::SERVICES, id, fields).await?;
    }

    let (status, body) = server.get(&format!("/resources/{}", lola), None).await?;
    assert_eq!(status, StatusCode::OK);
    let services = body["data"]["services"].as_array().cloned().unwrap_or_default();
    let names: Vec<&str> = services.iter().filter_map(|s| s["name"].as_str()).collect();
    assert_eq!(names, vec!["Mixing", "Mastering"]);
    assert_eq!(services[0]["id"], "s1");
    assert_eq!(services[0]["price"], 40);
    Ok(())
}

#[tokio::test]
async fn non_musicians_are_not_resources() -> Result<()> {
    let server = common::spawn_server().await?;
    let (client_id, token) = server.signup("client", "ana@melody.test", json!({})).await?;

    let (status, _) = server.get(&format!("/resources/{}", client_id), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server
        .post(&format!("/resources/{}/reviews", client_id), Some(&token), json!({ "rating": 5 }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn only_the_musician_edits_their_profile() -> Result<()> {
    let server = common::spawn_server().await?;
    let (lola, lola_token) = musician(&server, "lola@melody.test", "Lola").await?;
    let ana = server.client("ana@melody.test").await?;
    let admin = server.admin("root@melody.test").await?;
    let path = format!("/resources/{}", lola);

    let (status, _) = server.put(&path, &ana, json!({ "location": "Sevilla" })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = server.put(&path, &admin, json!({ "location": "Sevilla" })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = server.put(&path, &lola_token, json!({ "location": "Sevilla" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["location"], "Sevilla");
    assert_eq!(body["data"]["name"], "Lola");

    let (status, _) = server.put(&path, &lola_token, json!({ "name": "  " })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn deleting_a_resource_removes_the_account() -> Result<()> {
    let server = common::spawn_server().await?;
    let (lola, _) = musician(&server, "lola@melody.test", "Lola").await?;
    let ana = server.client("ana@melody.test").await?;
    let admin = server.admin("root@melody.test").await?;
    let path = format!("/resources/{}", lola);

    let (status, _) = server.delete(&path, &ana).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = server.delete(&path, &admin).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = server.get(&path, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = server
        .post("/auth/login", None, json!({ "email": "lola@melody.test", "password": "secret123" }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}
