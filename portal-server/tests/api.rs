//! HTTP surface: routing, passcode gate and the response envelope

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use portal_server::api::build_app;
use portal_server::cache::LocalCache;
use portal_server::gateway::MemoryGateway;
use portal_server::{Config, ErrorCode, ServerState};
use serde_json::{Value, json};
use tower::ServiceExt;

const PASSCODE: &str = "admin";

fn app() -> (Arc<MemoryGateway>, Router) {
    let config = Config::from_lookup(|_| None).unwrap();
    let gateway = Arc::new(MemoryGateway::new());
    let cache = LocalCache::open_in_memory().unwrap();
    let state = ServerState::new(config, gateway.clone(), cache);
    (gateway, build_app(state))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn admin_get(uri: &str) -> Request<Body> {
    Request::get(uri)
        .header("x-admin-passcode", PASSCODE)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value, passcode: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(p) = passcode {
        builder = builder.header("x-admin-passcode", p);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn registration() -> Value {
    json!({
        "fullName": "Asha Rao",
        "phone": "+919812345678",
        "email": "asha@example.com",
        "collegeBatch": "RVCE, 2025 Batch",
        "targetCompanyExam": "TCS",
        "serviceType": "exam_slot",
        "preferredDate": "2026-02-01",
        "paymentScreenshotUrl": "https://example.com/shot.png"
    })
}

#[tokio::test]
async fn test_health() {
    let (_gw, app) = app();
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "portal-server");
}

#[tokio::test]
async fn test_passcode_gate() {
    let (_gw, app) = app();

    let (status, body) = send(&app, get("/api/submissions")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], json!(ErrorCode::NotAuthenticated.code()));

    let req = Request::get("/api/submissions")
        .header("x-admin-passcode", "wrong")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], json!(ErrorCode::InvalidPasscode.code()));

    let (status, body) = send(&app, admin_get("/api/submissions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_settings_read_and_patch() {
    let (_gw, app) = app();

    let (status, body) = send(&app, get("/api/settings")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["serviceTypes"].as_array().unwrap().len(), 4);

    let (status, _) = send(
        &app,
        json_request("PATCH", "/api/settings", json!({"upiId": "x"}), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        json_request("PATCH", "/api/settings", json!({"upiId": "x"}), Some(PASSCODE)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["upiId"], "x");

    let (_, body) = send(&app, get("/api/settings")).await;
    assert_eq!(body["data"]["upiId"], "x");
}

#[tokio::test]
async fn test_price_lookup() {
    let (_gw, app) = app();
    let (_, body) = send(&app, get("/api/settings/price?company=TCS&service=exam_slot")).await;
    assert_eq!(body["data"]["price"], 1500);
    let (_, body) = send(&app, get("/api/settings/price?company=Nowhere&service=exam_slot")).await;
    assert_eq!(body["data"]["price"], 0);
}

#[tokio::test]
async fn test_service_type_add_and_remove() {
    let (_gw, app) = app();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/settings/service-types",
            json!({"label": "Exam Slot"}),
            Some(PASSCODE),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let added = body["data"]["serviceTypes"]
        .as_array()
        .unwrap()
        .last()
        .unwrap()
        .clone();
    assert_eq!(added["key"], "exam_slot_2");
    for company in body["data"]["companies"].as_array().unwrap() {
        assert_eq!(company["prices"]["exam_slot_2"], 0);
    }

    let uri = format!(
        "/api/settings/service-types/{}",
        added["id"].as_str().unwrap()
    );
    let req = Request::delete(uri.as_str())
        .header("x-admin-passcode", PASSCODE)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    for company in body["data"]["companies"].as_array().unwrap() {
        assert!(company["prices"].get("exam_slot_2").is_none());
    }

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/settings/service-types",
            json!({"label": "  "}),
            Some(PASSCODE),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!(ErrorCode::ValidationFailed.code()));
}

#[tokio::test]
async fn test_product_crud() {
    let (_gw, app) = app();
    let product = json!({
        "name": "Resume Builder",
        "description": "Builds resumes",
        "usageInstructions": "Open the link",
        "externalLink": "https://example.com/resume"
    });

    let (status, _) = send(&app, json_request("POST", "/api/products", product.clone(), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        json_request("POST", "/api/products", product, Some(PASSCODE)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = send(&app, get("/api/products/count")).await;
    assert_eq!(body["data"]["count"], 1);

    let (status, body) = send(&app, get(&format!("/api/products/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Resume Builder");

    let (_, body) = send(&app, get("/api/products?search=RESUME")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    let (_, body) = send(&app, get("/api/products?search=interview")).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let blank = json!({
        "name": "   ",
        "description": "Builds resumes",
        "usageInstructions": "Open the link",
        "externalLink": "https://example.com/resume"
    });
    let (status, body) = send(
        &app,
        json_request("PUT", &format!("/api/products/{id}"), blank, Some(PASSCODE)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!(ErrorCode::ValidationFailed.code()));

    let req = Request::delete(format!("/api/products/{id}"))
        .header("x-admin-passcode", PASSCODE)
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get(&format!("/api/products/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], json!(ErrorCode::ProductNotFound.code()));
}

#[tokio::test]
async fn test_submission_flow() {
    let (_gw, app) = app();

    let (status, body) = send(
        &app,
        json_request("POST", "/api/submissions", registration(), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let reference_id = body["data"]["referenceId"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["status"], "pending_verification");
    assert_eq!(body["data"]["timeline"].as_array().unwrap().len(), 2);

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/submissions/{reference_id}/status"),
            json!({"status": "shipped"}),
            Some(PASSCODE),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!(ErrorCode::InvalidStatus.code()));

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/submissions/{reference_id}/status"),
            json!({"status": "slot_confirmed", "notes": "Slot on Monday"}),
            Some(PASSCODE),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "slot_confirmed");
    assert_eq!(body["data"]["adminNotes"], "Slot on Monday");
    let timeline = body["data"]["timeline"].as_array().unwrap();
    assert_eq!(timeline.len(), 3);
    assert_eq!(timeline[2]["performedBy"], "Admin");

    let (status, body) = send(
        &app,
        admin_get(&format!("/api/submissions/{reference_id}/messages")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let first = &body["data"][0];
    assert_eq!(first["suggested"], true);
    assert!(
        first["whatsappLink"]
            .as_str()
            .unwrap()
            .starts_with("https://wa.me/919812345678?text=")
    );

    let (status, body) = send(&app, admin_get("/api/submissions/PJ-1999-99999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], json!(ErrorCode::SubmissionNotFound.code()));
}

#[tokio::test]
async fn test_submission_list_filters() {
    let (_gw, app) = app();
    let (_, body) = send(&app, admin_get("/api/submissions?status=completed")).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["status"], "completed");

    let (_, body) = send(&app, admin_get("/api/submissions?search=priya")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // blank values from the filter form mean "any"
    let (status, body) = send(
        &app,
        admin_get("/api/submissions?status=&serviceType=&search=&dateFrom=&dateTo="),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);

    let (status, body) = send(&app, admin_get("/api/submissions?status=archived")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!(ErrorCode::InvalidStatus.code()));
}

#[tokio::test]
async fn test_invalid_registration_rejected() {
    let (gw, app) = app();
    let mut form = registration();
    form["email"] = json!("not-an-email");

    let (status, body) = send(&app, json_request("POST", "/api/submissions", form, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!(ErrorCode::ValidationFailed.code()));
    assert!(
        gw.rows(portal_server::gateway::Table::UserSubmissions)
            .await
            .is_empty()
    );
}

fn multipart(fields: &[(&str, Option<&str>, &[u8])]) -> (String, Vec<u8>) {
    let boundary = "portal-test-boundary";
    let mut body = Vec::new();
    for (name, file_name, data) in fields {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        match file_name {
            Some(f) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

#[tokio::test]
async fn test_payment_screenshot_upload() {
    let (gw, app) = app();
    let (content_type, body) = multipart(&[
        ("referenceId", None, b"PJ-2026-12345".as_slice()),
        ("file", Some("pay.png"), [1, 2, 3].as_slice()),
    ]);
    let req = Request::post("/api/uploads/payment-screenshot")
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["inline"], false);
    let url = body["data"]["url"].as_str().unwrap();
    assert!(url.contains("payment-screenshots/PJ-2026-12345-"));
    let key = url.split("/public/").nth(1).unwrap();
    assert_eq!(gw.blob(key).await.unwrap().0, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_upload_without_file() {
    let (_gw, app) = app();
    let (content_type, body) = multipart(&[("referenceId", None, b"PJ-2026-12345".as_slice())]);
    let req = Request::post("/api/uploads/payment-screenshot")
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!(ErrorCode::NoFileProvided.code()));
}

#[tokio::test]
async fn test_qr_code_upload_updates_settings() {
    let (_gw, app) = app();
    let (content_type, body) = multipart(&[("file", Some("qr.png"), [9, 9].as_slice())]);
    let req = Request::post("/api/uploads/qr-code")
        .header(header::CONTENT_TYPE, content_type)
        .header("x-admin-passcode", PASSCODE)
        .body(Body::from(body))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let url = body["data"]["url"].as_str().unwrap().to_string();
    assert!(url.contains("/settings/qr-code-"));

    let (_, body) = send(&app, get("/api/settings")).await;
    assert_eq!(body["data"]["qrCodeUrl"], url);
}
