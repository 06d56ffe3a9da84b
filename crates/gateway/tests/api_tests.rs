//! End-to-end tests driving the router the way the SPA does.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use saferoof_config::{AppConfig, DatabaseConfig, UploadsConfig};
use saferoof_gateway::{create_router, GatewayState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

const MULTIPART_BOUNDARY: &str = "saferoof-test-boundary";

async fn test_app() -> TestResult<(Router, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("api.sqlite");
    let uploads_dir = temp_dir.path().join("uploads");

    let config = AppConfig {
        database: DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 5,
        },
        uploads: UploadsConfig {
            directory: uploads_dir.display().to_string(),
            max_images: 5,
            max_image_bytes: 1024 * 1024,
        },
        ..Default::default()
    };

    let state = GatewayState::from_config(&config)
        .await
        .map_err(|e| format!("state init failed: {e}"))?;

    Ok((create_router(state), temp_dir))
}

async fn body_json(response: axum::response::Response) -> TestResult<Value> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(serde_json::from_slice(&bytes)?)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn signup(app: &Router, first_name: &str, email: &str) -> TestResult<(i64, String)> {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            None,
            json!({
                "first_name": first_name,
                "last_name": "Tester",
                "email": email,
                "password": "s3cret-pass",
            }),
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await?;
    let token = body["token"].as_str().expect("token in body").to_string();
    let id = body["user"]["id"].as_i64().expect("numeric user id");
    Ok((id, token))
}

fn multipart_listing_body(title: &str, with_image: bool) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    let fields = [
        ("title", title),
        ("description", "Sunny three-bedroom with a garden"),
        ("price", "250000"),
        ("status", "Available"),
        ("category", "Residential"),
        ("locality", "Old Town"),
        ("city", "Springfield"),
        ("state", "CA"),
        ("zipcode", "90210"),
    ];

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if with_image {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"front.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"fake-jpeg-bytes");
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    (
        format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        body,
    )
}

async fn create_listing(app: &Router, token: &str, title: &str) -> TestResult<i64> {
    let (content_type, body) = multipart_listing_body(title, true);
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/property")
                .header(header::CONTENT_TYPE, content_type)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::from(body))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await?;
    Ok(body["id"].as_i64().expect("numeric property id"))
}

#[tokio::test]
async fn health_endpoint_reports_ok() -> TestResult {
    let (app, _guard) = test_app().await?;

    let response = app.oneshot(get_request("/health", None)).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn signup_sets_cookie_and_me_accepts_both_transports() -> TestResult {
    let (app, _guard) = test_app().await?;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            None,
            json!({
                "first_name": "Alice",
                "last_name": "Example",
                "email": "alice@example.com",
                "password": "s3cret-pass",
            }),
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("signup must set the session cookie")
        .to_str()?
        .to_string();
    assert!(cookie.starts_with("access_token="));
    assert!(cookie.contains("HttpOnly"));

    let body = body_json(response).await?;
    let token = body["token"].as_str().unwrap().to_string();

    // bearer transport
    let response = app
        .clone()
        .oneshot(get_request("/api/auth/me", Some(&token)))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await?;
    assert_eq!(me["email"], "alice@example.com");

    // cookie transport
    let cookie_pair = cookie.split(';').next().unwrap().to_string();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/user/me")
                .header(header::COOKIE, cookie_pair)
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn login_rejects_bad_credentials() -> TestResult {
    let (app, _guard) = test_app().await?;
    signup(&app, "Alice", "alice@example.com").await?;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"email": "alice@example.com", "password": "wrong"}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"email": "alice@example.com", "password": "s3cret-pass"}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn guarded_routes_reject_anonymous_requests() -> TestResult {
    let (app, _guard) = test_app().await?;

    for (method, uri) in [
        ("GET", "/api/user/me"),
        ("GET", "/api/chat/conversations"),
        ("GET", "/api/chat/unread-count"),
        ("GET", "/api/property/mine"),
    ] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{method} {uri} must be guarded"
        );
    }

    Ok(())
}

#[tokio::test]
async fn property_lifecycle_over_http() -> TestResult {
    let (app, _guard) = test_app().await?;
    let (_owner_id, owner_token) = signup(&app, "Olive", "olive@example.com").await?;
    let (_other_id, other_token) = signup(&app, "Eve", "eve@example.com").await?;

    let property_id = create_listing(&app, &owner_token, "Lakeside cabin").await?;

    // public listing carries the address and the stored image URL
    let response = app.clone().oneshot(get_request("/api/property", None)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let listings = body_json(response).await?;
    assert_eq!(listings.as_array().unwrap().len(), 1);
    assert_eq!(listings[0]["address"]["city"], "Springfield");
    assert!(listings[0]["images"][0]["image_url"]
        .as_str()
        .unwrap()
        .starts_with("/uploads/"));

    // public search
    let response = app
        .clone()
        .oneshot(get_request("/api/property/search?query=lakeside", None))
        .await?;
    let found = body_json(response).await?;
    assert_eq!(found.as_array().unwrap().len(), 1);

    // strangers cannot update
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/property/{property_id}"),
            Some(&other_token),
            json!({"status": "Sold"}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // the owner can
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/property/{property_id}"),
            Some(&owner_token),
            json!({"status": "Sold", "price": 199999.0}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await?;
    assert_eq!(updated["status"], "sold");

    // owner's own listings endpoint
    let response = app
        .clone()
        .oneshot(get_request("/api/property/mine", Some(&owner_token)))
        .await?;
    let mine = body_json(response).await?;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    // delete and verify it is gone
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/property/{property_id}"))
                .header(header::AUTHORIZATION, format!("Bearer {owner_token}"))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request(&format!("/api/property/{property_id}"), None))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn create_property_rejects_missing_fields() -> TestResult {
    let (app, _guard) = test_app().await?;
    let (_id, token) = signup(&app, "Olive", "olive@example.com").await?;

    let body = format!(
        "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nNo price here\r\n--{MULTIPART_BOUNDARY}--\r\n"
    );
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/property")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
                )
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::from(body))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn conversation_flow_over_http() -> TestResult {
    let (app, _guard) = test_app().await?;
    let (owner_id, owner_token) = signup(&app, "Olive", "olive@example.com").await?;
    let (buyer_id, buyer_token) = signup(&app, "Ann", "ann@example.com").await?;

    let property_id = create_listing(&app, &owner_token, "City flat").await?;

    // the owner cannot open a conversation about their own listing
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/chat/conversations",
            Some(&owner_token),
            json!({"property_id": property_id}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // the buyer opens it; a second open returns the same conversation
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/chat/conversations",
            Some(&buyer_token),
            json!({"property_id": property_id}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let conversation = body_json(response).await?;
    let conversation_id = conversation["id"].as_i64().unwrap();
    assert_eq!(conversation["owner_id"].as_i64().unwrap(), owner_id);
    assert_eq!(conversation["buyer_id"].as_i64().unwrap(), buyer_id);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/chat/conversations",
            Some(&buyer_token),
            json!({"property_id": property_id}),
        ))
        .await?;
    let again = body_json(response).await?;
    assert_eq!(again["id"].as_i64().unwrap(), conversation_id);

    // messages flow
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/chat/{conversation_id}/messages"),
            Some(&buyer_token),
            json!({"body": "Is this still available?"}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/chat/{conversation_id}/messages"),
            Some(&buyer_token),
            json!({"body": "   "}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // the inbox shows the unread message with context
    let response = app
        .clone()
        .oneshot(get_request("/api/chat/conversations", Some(&owner_token)))
        .await?;
    let inbox = body_json(response).await?;
    assert_eq!(inbox.as_array().unwrap().len(), 1);
    assert_eq!(inbox[0]["property_title"], "City flat");
    assert_eq!(inbox[0]["unread_count"].as_i64().unwrap(), 1);
    assert_eq!(
        inbox[0]["last_message"]["body"],
        "Is this still available?"
    );

    let response = app
        .clone()
        .oneshot(get_request("/api/chat/unread-count", Some(&owner_token)))
        .await?;
    let unread = body_json(response).await?;
    assert_eq!(unread["unread"].as_i64().unwrap(), 1);

    // reading clears the counter
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/chat/{conversation_id}/read"),
            Some(&owner_token),
            json!({}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let receipt = body_json(response).await?;
    assert_eq!(receipt["updated"].as_u64().unwrap(), 1);

    let response = app
        .clone()
        .oneshot(get_request("/api/chat/unread-count", Some(&owner_token)))
        .await?;
    let unread = body_json(response).await?;
    assert_eq!(unread["unread"].as_i64().unwrap(), 0);

    // delete requires participation
    let (_eve_id, eve_token) = signup(&app, "Eve", "eve@example.com").await?;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/chat/conversations/{conversation_id}"))
                .header(header::AUTHORIZATION, format!("Bearer {eve_token}"))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/chat/conversations/{conversation_id}"))
                .header(header::AUTHORIZATION, format!("Bearer {buyer_token}"))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    Ok(())
}

#[tokio::test]
async fn review_flow_over_http() -> TestResult {
    let (app, _guard) = test_app().await?;
    let (_id, token) = signup(&app, "Rae", "rae@example.com").await?;

    // empty summary
    let response = app
        .clone()
        .oneshot(get_request("/api/review/summary", None))
        .await?;
    let summary = body_json(response).await?;
    assert_eq!(summary["total"].as_i64().unwrap(), 0);

    // invalid rating
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/review",
            Some(&token),
            json!({"rating": 9}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // create, then duplicate is rejected
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/review",
            Some(&token),
            json!({"rating": 5, "comment": "Found a flat in a week"}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let review = body_json(response).await?;
    let review_id = review["id"].as_i64().unwrap();
    assert_eq!(review["author"]["first_name"], "Rae");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/review",
            Some(&token),
            json!({"rating": 4}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // public list sees it
    let response = app.clone().oneshot(get_request("/api/review", None)).await?;
    let reviews = body_json(response).await?;
    assert_eq!(reviews.as_array().unwrap().len(), 1);

    // only the author deletes
    let (_other, other_token) = signup(&app, "Eve", "eve@example.com").await?;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/review/{review_id}"))
                .header(header::AUTHORIZATION, format!("Bearer {other_token}"))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/review/{review_id}"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    Ok(())
}
