mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{business_body, review_body};

#[tokio::test]
async fn business_detail_inlines_children() -> Result<()> {
    let server = common::start_server().await?;
    let (owner, owner_token) = server.customer("owner@x.com").await?;
    let (reviewer, reviewer_token) = server.customer("reviewer@x.com").await?;
    let business = server.business(&owner_token, owner).await?;

    let res = server
        .client
        .post(server.url("/reviews"))
        .bearer_auth(&reviewer_token)
        .json(&review_body(reviewer, business))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = server
        .client
        .post(server.url("/photos"))
        .bearer_auth(&reviewer_token)
        .json(&json!({ "customer_id": reviewer, "business_id": business, "caption": "Hops" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = server
        .client
        .post(server.url("/products"))
        .bearer_auth(&owner_token)
        .json(&json!({
            "customer_id": owner,
            "business_id": business,
            "name": "Growler",
            "category": "Drinks",
            "description": "64oz",
            "price": 12
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = server.client.get(server.url(&format!("/businesses/{}", business))).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let detail: Value = res.json().await?;
    assert_eq!(detail["name"], json!("Block 15"));
    assert_eq!(detail["reviews"].as_array().map(Vec::len), Some(1));
    assert_eq!(detail["photos"].as_array().map(Vec::len), Some(1));
    assert_eq!(detail["products"].as_array().map(Vec::len), Some(1));

    let listing: Value = server.client.get(server.url("/businesses")).send().await?.json().await?;
    assert_eq!(listing["businesses"].as_array().map(Vec::len), Some(1));

    Ok(())
}

#[tokio::test]
async fn cannot_create_business_for_someone_else() -> Result<()> {
    let server = common::start_server().await?;
    let (owner, _) = server.customer("owner@x.com").await?;
    let (_, other_token) = server.customer("other@x.com").await?;

    let res = server
        .client
        .post(server.url("/businesses"))
        .bearer_auth(&other_token)
        .json(&business_body(owner))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn owner_listing_requires_ownership() -> Result<()> {
    let server = common::start_server().await?;
    let (owner, owner_token) = server.customer("owner@x.com").await?;
    let (_, other_token) = server.customer("other@x.com").await?;
    server.business(&owner_token, owner).await?;
    let path = format!("/customers/{}/businesses", owner);

    let res = server.client.get(server.url(&path)).bearer_auth(&owner_token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["businesses"].as_array().map(Vec::len), Some(1));

    let res = server.client.get(server.url(&path)).bearer_auth(&other_token).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.client.get(server.url(&path)).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn owner_listing_may_be_empty() -> Result<()> {
    let server = common::start_server().await?;
    let (owner, token) = server.customer("owner@x.com").await?;

    let res = server
        .client
        .get(server.url(&format!("/customers/{}/photos", owner)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({ "photos": [] }));

    Ok(())
}

#[tokio::test]
async fn ownership_cannot_be_handed_over() -> Result<()> {
    let server = common::start_server().await?;
    let (owner, token) = server.customer("owner@x.com").await?;
    let (other, _) = server.customer("other@x.com").await?;
    let business = server.business(&token, owner).await?;
    let path = format!("/businesses/{}", business);

    let res = server
        .client
        .put(server.url(&path))
        .bearer_auth(&token)
        .json(&business_body(other))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let mut body = business_body(owner);
    body["name"] = json!("Block 16");
    let res = server.client.put(server.url(&path)).bearer_auth(&token).json(&body).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server.client.delete(server.url(&path)).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let res = server.client.get(server.url(&path)).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn duplicate_product_conflicts() -> Result<()> {
    let server = common::start_server().await?;
    let (owner, token) = server.customer("owner@x.com").await?;
    let business = server.business(&token, owner).await?;
    let product = json!({
        "customer_id": owner,
        "business_id": business,
        "name": "Growler",
        "category": "Drinks",
        "description": "64oz",
        "price": 12
    });

    let res = server.client.post(server.url("/products")).bearer_auth(&token).json(&product).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = server.client.post(server.url("/products")).bearer_auth(&token).json(&product).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        res.json::<Value>().await?["error"],
        json!("Customer has already listed a product for this business")
    );

    Ok(())
}

#[tokio::test]
async fn root_health_and_fallback() -> Result<()> {
    let server = common::start_server().await?;

    let res = server.client.get(server.url("/")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.json::<Value>().await?["endpoints"].is_object());

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server.client.get(server.url("/nowhere")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        res.json::<Value>().await?,
        json!({ "error": "Requested resource /nowhere does not exist" })
    );

    Ok(())
}
