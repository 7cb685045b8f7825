mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{photo_body, TestServer};

/// Customer `a@x.com` with a business and one photo on it. Returns
/// (customer id, token, business id, photo path).
async fn seeded(server: &TestServer) -> Result<(i64, String, i64, String)> {
    let (customer, token) = server.customer("a@x.com").await?;
    let business = server.business(&token, customer).await?;
    let id = server.create(&token, "/photos", &photo_body(customer, business)).await?;
    Ok((customer, token, business, format!("/photos/{}", id)))
}

#[tokio::test]
async fn owner_updates_and_reads_back() -> Result<()> {
    let server = common::start_server().await?;
    let (customer, token, business, path) = seeded(&server).await?;

    let mut body = photo_body(customer, business);
    body["caption"] = json!("Taps at night");
    let res = server.client.put(server.url(&path)).bearer_auth(&token).json(&body).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let links = res.json::<Value>().await?["links"].clone();
    assert_eq!(links["photo"], json!(path));
    assert_eq!(links["business"], json!(format!("/businesses/{}", business)));

    let stored: Value = server.client.get(server.url(&path)).send().await?.json().await?;
    assert_eq!(stored["caption"], json!("Taps at night"));

    Ok(())
}

#[tokio::test]
async fn moving_to_another_business_is_forbidden_for_the_owner() -> Result<()> {
    let server = common::start_server().await?;
    let (customer, token, business, path) = seeded(&server).await?;
    let other_business = server.business(&token, customer).await?;

    let res = server
        .client
        .put(server.url(&path))
        .bearer_auth(&token)
        .json(&photo_body(customer, other_business))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert!(res.json::<Value>().await?["error"].is_string());

    let stored: Value = server.client.get(server.url(&path)).send().await?.json().await?;
    assert_eq!(stored["business_id"], json!(business));

    Ok(())
}

#[tokio::test]
async fn handing_over_to_another_customer_is_forbidden() -> Result<()> {
    let server = common::start_server().await?;
    let (customer, token, business, path) = seeded(&server).await?;
    let (other, _) = server.customer("b@x.com").await?;

    let res = server
        .client
        .put(server.url(&path))
        .bearer_auth(&token)
        .json(&photo_body(other, business))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let stored: Value = server.client.get(server.url(&path)).send().await?.json().await?;
    assert_eq!(stored["customer_id"], json!(customer));

    Ok(())
}

#[tokio::test]
async fn non_owner_may_not_update_or_delete() -> Result<()> {
    let server = common::start_server().await?;
    let (customer, _, business, path) = seeded(&server).await?;
    let (_, other_token) = server.customer("b@x.com").await?;

    let res = server
        .client
        .put(server.url(&path))
        .bearer_auth(&other_token)
        .json(&photo_body(customer, business))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.client.delete(server.url(&path)).bearer_auth(&other_token).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.client.get(server.url(&path)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn second_delete_falls_through() -> Result<()> {
    let server = common::start_server().await?;
    let (customer, token, business, path) = seeded(&server).await?;

    let res = server.client.delete(server.url(&path)).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = server.client.delete(server.url(&path)).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], json!(format!("Requested resource {} does not exist", path)));

    let res = server
        .client
        .put(server.url(&path))
        .bearer_auth(&token)
        .json(&photo_body(customer, business))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn writes_require_a_token() -> Result<()> {
    let server = common::start_server().await?;
    let (customer, _, business, path) = seeded(&server).await?;

    let res = server.client.put(server.url(&path)).json(&photo_body(customer, business)).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.client.delete(server.url(&path)).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
