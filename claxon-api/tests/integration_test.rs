//! Integration tests for the Claxon API.
//!
//! These drive the full router against a real PostgreSQL database and
//! verify the end-to-end behavior: the claxon exchange lifecycle,
//! ownership and recipient-only rules, pagination ordering, plate
//! search, and template localization.
//!
//! They are `#[ignore]`d by default; run them with a database configured:
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/claxon_test \
//! JWT_SECRET=test-secret-key-at-least-32-bytes-long \
//! cargo test -p claxon-api -- --ignored
//! ```

mod common;

use axum::http::StatusCode;
use common::{expect_status, json_request, TestContext};
use serde_json::json;

/// The representative scenario: B claxons A's vehicle, A reads it,
/// B cannot mark it read.
#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_claxon_exchange_flow() {
    let ctx = TestContext::new().await.unwrap();

    let user_a = ctx.create_user("Ana").await.unwrap();
    let user_b = ctx.create_user("Bogdan").await.unwrap();
    let vehicle = ctx.create_vehicle(&user_a, true).await.unwrap();

    let token_a = ctx.token_for(&user_a.id);
    let token_b = ctx.token_for(&user_b.id);

    // B sends a claxon about A's vehicle
    let response = ctx
        .request(json_request(
            "POST",
            "/claxons",
            Some(&token_b),
            Some(json!({
                "recipient_id": user_a.id,
                "vehicle_id": vehicle.id,
                "custom_message": "nice parking"
            })),
        ))
        .await;

    let created = expect_status(response, StatusCode::CREATED).await;
    assert_eq!(created["sender_id"], json!(user_b.id));
    assert_eq!(created["recipient_id"], json!(user_a.id));
    assert_eq!(created["read"], json!(false));
    assert_eq!(created["read_at"], json!(null));
    assert_eq!(created["claxon_type"], json!("custom"));
    // Sender projection carries names only
    assert_eq!(created["sender"]["first_name"], json!("Bogdan"));
    assert!(created["sender"].get("phone").is_none());

    let claxon_id = created["id"].as_str().unwrap().to_string();

    // A sees it in the inbox
    let response = ctx
        .request(json_request("GET", "/claxons/inbox", Some(&token_a), None))
        .await;
    let inbox = expect_status(response, StatusCode::OK).await;
    let ids: Vec<&str> = inbox
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&claxon_id.as_str()));

    // B sees it under sent
    let response = ctx
        .request(json_request("GET", "/claxons/sent", Some(&token_b), None))
        .await;
    let sent = expect_status(response, StatusCode::OK).await;
    assert!(sent
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["id"] == json!(claxon_id)));

    // The sender cannot mark it read
    let response = ctx
        .request(json_request(
            "PATCH",
            &format!("/claxons/{}", claxon_id),
            Some(&token_b),
            Some(json!({ "read": true })),
        ))
        .await;
    expect_status(response, StatusCode::NOT_FOUND).await;

    // The recipient can
    let response = ctx
        .request(json_request(
            "PATCH",
            &format!("/claxons/{}", claxon_id),
            Some(&token_a),
            Some(json!({ "read": true })),
        ))
        .await;
    let updated = expect_status(response, StatusCode::OK).await;
    assert_eq!(updated["read"], json!(true));
    assert!(updated["read_at"].is_string());
}

/// Claxoning a vehicle the stated recipient doesn't own is a 404 and
/// inserts nothing.
#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_create_claxon_vehicle_not_owned_by_recipient() {
    let ctx = TestContext::new().await.unwrap();

    let recipient = ctx.create_user("Ana").await.unwrap();
    let bystander = ctx.create_user("Carmen").await.unwrap();
    let sender = ctx.create_user("Bogdan").await.unwrap();
    // The vehicle belongs to the bystander, not the stated recipient
    let vehicle = ctx.create_vehicle(&bystander, true).await.unwrap();

    let response = ctx
        .request(json_request(
            "POST",
            "/claxons",
            Some(&ctx.token_for(&sender.id)),
            Some(json!({
                "recipient_id": recipient.id,
                "vehicle_id": vehicle.id,
                "custom_message": "wrong owner"
            })),
        ))
        .await;
    let body = expect_status(response, StatusCode::NOT_FOUND).await;
    assert_eq!(
        body["message"],
        json!("Vehicle not found or does not belong to recipient")
    );

    // Nothing was inserted
    let response = ctx
        .request(json_request(
            "GET",
            "/claxons/inbox",
            Some(&ctx.token_for(&recipient.id)),
            None,
        ))
        .await;
    let inbox = expect_status(response, StatusCode::OK).await;
    assert!(inbox.as_array().unwrap().is_empty());
}

/// A claxon with neither template nor custom message never reaches the
/// database.
#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_create_claxon_requires_content() {
    let ctx = TestContext::new().await.unwrap();

    let recipient = ctx.create_user("Ana").await.unwrap();
    let sender = ctx.create_user("Bogdan").await.unwrap();
    let vehicle = ctx.create_vehicle(&recipient, true).await.unwrap();

    let response = ctx
        .request(json_request(
            "POST",
            "/claxons",
            Some(&ctx.token_for(&sender.id)),
            Some(json!({
                "recipient_id": recipient.id,
                "vehicle_id": vehicle.id
            })),
        ))
        .await;
    expect_status(response, StatusCode::UNPROCESSABLE_ENTITY).await;
}

/// Unread count tracks the read transition exactly.
#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_unread_count() {
    let ctx = TestContext::new().await.unwrap();

    let recipient = ctx.create_user("Ana").await.unwrap();
    let sender = ctx.create_user("Bogdan").await.unwrap();
    let vehicle = ctx.create_vehicle(&recipient, true).await.unwrap();

    let token_r = ctx.token_for(&recipient.id);
    let token_s = ctx.token_for(&sender.id);

    let mut first_id = None;
    for i in 0..3 {
        let response = ctx
            .request(json_request(
                "POST",
                "/claxons",
                Some(&token_s),
                Some(json!({
                    "recipient_id": recipient.id,
                    "vehicle_id": vehicle.id,
                    "custom_message": format!("claxon {}", i)
                })),
            ))
            .await;
        let created = expect_status(response, StatusCode::CREATED).await;
        first_id.get_or_insert(created["id"].as_str().unwrap().to_string());
    }

    let response = ctx
        .request(json_request(
            "GET",
            "/claxons/inbox/unread-count",
            Some(&token_r),
            None,
        ))
        .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["count"], json!(3));

    // Mark one read; the count drops by exactly one
    let response = ctx
        .request(json_request(
            "PATCH",
            &format!("/claxons/{}", first_id.unwrap()),
            Some(&token_r),
            Some(json!({ "read": true })),
        ))
        .await;
    expect_status(response, StatusCode::OK).await;

    let response = ctx
        .request(json_request(
            "GET",
            "/claxons/inbox/unread-count",
            Some(&token_r),
            None,
        ))
        .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["count"], json!(2));

    // Read filter splits the inbox accordingly
    let response = ctx
        .request(json_request(
            "GET",
            "/claxons/inbox?read=false",
            Some(&token_r),
            None,
        ))
        .await;
    let unread = expect_status(response, StatusCode::OK).await;
    assert_eq!(unread.as_array().unwrap().len(), 2);
}

/// Listings are newest-first and respect limit/offset.
#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_inbox_pagination_and_ordering() {
    let ctx = TestContext::new().await.unwrap();

    let recipient = ctx.create_user("Ana").await.unwrap();
    let sender = ctx.create_user("Bogdan").await.unwrap();
    let vehicle = ctx.create_vehicle(&recipient, true).await.unwrap();

    let token_s = ctx.token_for(&sender.id);
    let token_r = ctx.token_for(&recipient.id);

    for i in 0..25 {
        let response = ctx
            .request(json_request(
                "POST",
                "/claxons",
                Some(&token_s),
                Some(json!({
                    "recipient_id": recipient.id,
                    "vehicle_id": vehicle.id,
                    "custom_message": format!("claxon {}", i)
                })),
            ))
            .await;
        expect_status(response, StatusCode::CREATED).await;
    }

    // Default page size is 20
    let response = ctx
        .request(json_request("GET", "/claxons/inbox", Some(&token_r), None))
        .await;
    let first_page = expect_status(response, StatusCode::OK).await;
    assert_eq!(first_page.as_array().unwrap().len(), 20);

    // Newest first
    let timestamps: Vec<&str> = first_page
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["created_at"].as_str().unwrap())
        .collect();
    let mut sorted = timestamps.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(timestamps, sorted);

    // The second page holds the remaining 5
    let response = ctx
        .request(json_request(
            "GET",
            "/claxons/inbox?limit=20&offset=20",
            Some(&token_r),
            None,
        ))
        .await;
    let second_page = expect_status(response, StatusCode::OK).await;
    assert_eq!(second_page.as_array().unwrap().len(), 5);

    // Out-of-range limit is rejected before any query runs
    let response = ctx
        .request(json_request(
            "GET",
            "/claxons/inbox?limit=101",
            Some(&token_r),
            None,
        ))
        .await;
    expect_status(response, StatusCode::UNPROCESSABLE_ENTITY).await;
}

/// Plate search is public, case-insensitive, and hides inactive
/// vehicles and owner contact data.
#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_plate_search() {
    let ctx = TestContext::new().await.unwrap();

    let owner = ctx.create_user("Ana").await.unwrap();
    let active = ctx.create_vehicle(&owner, true).await.unwrap();
    let inactive = ctx.create_vehicle(&owner, false).await.unwrap();

    // Lowercase query matches the uppercase-stored plate, without auth
    let response = ctx
        .request(json_request(
            "GET",
            &format!("/vehicles/search/{}", active.plate_number.to_lowercase()),
            None,
            None,
        ))
        .await;
    let results = expect_status(response, StatusCode::OK).await;
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["vehicle"]["id"], json!(active.id));
    assert_eq!(results[0]["owner"]["first_name"], json!("Ana"));
    assert!(results[0]["owner"].get("phone").is_none());
    assert!(results[0]["owner"].get("email").is_none());

    // Inactive vehicles never show up
    let response = ctx
        .request(json_request(
            "GET",
            &format!("/vehicles/search/{}", inactive.plate_number),
            None,
            None,
        ))
        .await;
    let results = expect_status(response, StatusCode::OK).await;
    assert!(results.as_array().unwrap().is_empty());
}

/// Template reads project the requested language, falling back to
/// Romanian for unknown codes.
#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_template_language_projection() {
    let ctx = TestContext::new().await.unwrap();

    let admin = ctx.create_user("Admin").await.unwrap();
    let admin_token = ctx.admin_token_for(&admin.id);

    let response = ctx
        .request(json_request(
            "POST",
            "/claxon-templates",
            Some(&admin_token),
            Some(json!({
                "category": "lights",
                "message_en": "Your lights are on",
                "message_ro": "Luminile sunt aprinse",
                "message_ru": "У вас включены фары"
            })),
        ))
        .await;
    let created = expect_status(response, StatusCode::CREATED).await;
    let template_id = created["id"].as_str().unwrap().to_string();

    // English projection
    let response = ctx
        .request(json_request(
            "GET",
            &format!("/claxon-templates/{}?language=en", template_id),
            None,
            None,
        ))
        .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["message"], json!("Your lights are on"));
    assert!(body.get("message_en").is_none());

    // Unknown code falls back to Romanian
    let response = ctx
        .request(json_request(
            "GET",
            &format!("/claxon-templates/{}?language=de", template_id),
            None,
            None,
        ))
        .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["message"], json!("Luminile sunt aprinse"));

    // Non-admin mutation is forbidden
    let response = ctx
        .request(json_request(
            "PATCH",
            &format!("/claxon-templates/{}", template_id),
            Some(&ctx.token_for(&admin.id)),
            Some(json!({ "category": "parking" })),
        ))
        .await;
    expect_status(response, StatusCode::FORBIDDEN).await;
}

/// Duplicate phone/email surface as 409 before anything is written.
#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_duplicate_user_conflicts() {
    let ctx = TestContext::new().await.unwrap();

    let existing = ctx.create_user("Ana").await.unwrap();

    // A different external id with the same phone
    let response = ctx
        .request(json_request(
            "POST",
            "/users",
            Some(&ctx.token_for("user_someone_else")),
            Some(json!({
                "phone": existing.phone,
                "email": "fresh@example.com"
            })),
        ))
        .await;
    expect_status(response, StatusCode::CONFLICT).await;
}

/// Protected routes without a token are 401.
#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_missing_token_rejected() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .request(json_request("GET", "/claxons/inbox", None, None))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
