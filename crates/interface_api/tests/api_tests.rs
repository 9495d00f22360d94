//! Router tests against the in-memory ports

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use domain_fees::FeePort;
use interface_api::{
    auth::{create_token, permissions},
    config::ApiConfig,
    create_router,
    middleware::AuditUser,
    AppState,
};
use test_utils::ServiceFixture;

struct TestApp {
    router: Router,
    fixture: ServiceFixture,
    config: ApiConfig,
}

impl TestApp {
    async fn new() -> Self {
        let fixture = ServiceFixture::new().await;
        let config = ApiConfig {
            jwt_secret: "api-test-secret".to_string(),
            ..Default::default()
        };
        let state = AppState::new(fixture.service.clone(), fixture.fees.clone(), config.clone());
        Self {
            router: create_router(state),
            fixture,
            config,
        }
    }

    fn token(&self, roles: &[&str]) -> String {
        create_token(
            "bursar",
            roles.iter().map(|r| r.to_string()).collect(),
            &self.config.jwt_secret,
            300,
        )
        .unwrap()
    }

    fn writer(&self) -> String {
        self.token(&[permissions::FEE_READ, permissions::FEE_WRITE])
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn charge_body(&self, subjects: usize, total: &str, discount: Value) -> Value {
        json!({
            "student_id": Uuid::from(self.fixture.student.id),
            "subject_ids": self.fixture.subjects.iter().take(subjects).map(|s| Uuid::from(s.id)).collect::<Vec<_>>(),
            "total_amount": total,
            "discount_type": "percentage",
            "discount_value": discount,
        })
    }
}

fn amount(value: &Value, field: &str) -> Decimal {
    value[field].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;
    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.send(Method::GET, "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_fee_routes_require_token() {
    let app = TestApp::new().await;
    let (status, _) = app.send(Method::GET, "/api/v1/fees", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send(Method::GET, "/api/v1/fees", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_audit_user_set_only_for_authenticated_requests() {
    let app = TestApp::new().await;
    let request = |token: Option<String>| {
        let mut builder = Request::builder().uri("/api/v1/fees");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    };

    let rejected = app.router.clone().oneshot(request(None)).await.unwrap();
    assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);
    assert!(rejected.extensions().get::<AuditUser>().is_none());

    let accepted = app
        .router
        .clone()
        .oneshot(request(Some(app.token(&[permissions::FEE_READ]))))
        .await
        .unwrap();
    assert_eq!(accepted.status(), StatusCode::OK);
    assert_eq!(accepted.extensions().get::<AuditUser>(), Some(&AuditUser("bursar".to_string())));
}

#[tokio::test]
async fn test_read_only_token_cannot_create() {
    let app = TestApp::new().await;
    let token = app.token(&[permissions::FEE_READ]);
    let body = app.charge_body(1, "1000", json!("20"));

    let (status, body) = app.send(Method::POST, "/api/v1/fees", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
    assert_eq!(app.fixture.fees.count_fees().await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_single_subject_charge() {
    let app = TestApp::new().await;
    let token = app.writer();
    let body = app.charge_body(1, "1000", json!("20"));

    let (status, fee) = app.send(Method::POST, "/api/v1/fees", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(amount(&fee, "discount_amount"), dec!(200));
    assert_eq!(amount(&fee, "amount_due"), dec!(800));
    assert_eq!(amount(&fee, "discount_percentage"), dec!(20));
    assert_eq!(fee["category"], "DISCOUNT");
    assert_eq!(fee["status"], "PENDING");
    assert!(fee["invoice_number"].as_str().unwrap().starts_with("INV-"));
}

#[tokio::test]
async fn test_create_splits_across_subjects() {
    let app = TestApp::new().await;
    let token = app.writer();
    let body = app.charge_body(3, "300", json!("10"));

    let (status, fees) = app.send(Method::POST, "/api/v1/fees", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    let fees = fees.as_array().unwrap();
    assert_eq!(fees.len(), 3);
    for fee in fees {
        assert_eq!(amount(fee, "total_amount"), dec!(100));
        assert_eq!(amount(fee, "amount_due"), dec!(90));
    }
}

#[tokio::test]
async fn test_create_rejections() {
    let app = TestApp::new().await;
    let token = app.writer();

    let (status, body) = app
        .send(Method::POST, "/api/v1/fees", Some(&token), Some(app.charge_body(1, "1000", json!("150"))))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let mut unknown = app.charge_body(1, "1000", json!("0"));
    unknown["student_id"] = json!(Uuid::new_v4());
    let (status, _) = app.send(Method::POST, "/api/v1/fees", Some(&token), Some(unknown)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut missing = app.charge_body(1, "1000", json!("0"));
    missing["subject_ids"] = json!([]);
    let (status, _) = app.send(Method::POST, "/api/v1/fees", Some(&token), Some(missing)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.fixture.fees.count_fees().await.unwrap(), 0);
}

#[tokio::test]
async fn test_payment_flow() {
    let app = TestApp::new().await;
    let token = app.writer();
    let (_, fee) = app
        .send(Method::POST, "/api/v1/fees", Some(&token), Some(app.charge_body(1, "100", json!("0"))))
        .await;
    let uri = format!("/api/v1/fees/{}/payments", fee["id"].as_str().unwrap());

    let (status, paid) = app.send(Method::POST, &uri, Some(&token), Some(json!({ "amount": "60" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "PARTIAL");
    assert_eq!(amount(&paid, "balance"), dec!(40));

    let (status, body) = app.send(Method::POST, &uri, Some(&token), Some(json!({ "amount": "50" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("40"));

    let (status, paid) = app.send(Method::POST, &uri, Some(&token), Some(json!({ "amount": "40" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "PAID");
}

#[tokio::test]
async fn test_update_sets_and_clears_override() {
    let app = TestApp::new().await;
    let token = app.writer();
    let (_, fee) = app
        .send(Method::POST, "/api/v1/fees", Some(&token), Some(app.charge_body(1, "100", json!("0"))))
        .await;
    let uri = format!("/api/v1/fees/{}", fee["id"].as_str().unwrap());

    let (status, updated) = app
        .send(Method::PUT, &uri, Some(&token), Some(json!({ "status": "cancelled" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "CANCELLED");
    assert_eq!(updated["status_overridden"], true);

    let (status, updated) = app
        .send(Method::PUT, &uri, Some(&token), Some(json!({ "clear_status_override": true })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "PENDING");

    let (status, _) = app
        .send(Method::PUT, &uri, Some(&token), Some(json!({ "status": "refunded" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_filters_and_summary() {
    let app = TestApp::new().await;
    let token = app.writer();
    app.send(Method::POST, "/api/v1/fees", Some(&token), Some(app.charge_body(1, "1000", json!("100"))))
        .await;
    app.send(Method::POST, "/api/v1/fees", Some(&token), Some(app.charge_body(1, "500", json!("0"))))
        .await;

    let (status, fees) = app
        .send(Method::GET, "/api/v1/fees?category=free", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fees.as_array().unwrap().len(), 1);

    let (status, fees) = app
        .send(Method::GET, "/api/v1/fees?class_name=grade%2010", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fees.as_array().unwrap().len(), 2);
    assert_eq!(fees[0]["version"], 1);

    let (status, fees) = app
        .send(Method::GET, "/api/v1/fees?class_name=Grade%2011", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(fees.as_array().unwrap().is_empty());

    let (status, _) = app
        .send(Method::GET, "/api/v1/fees?payment_month=2024-13", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, summary) = app.send(Method::GET, "/api/v1/fees/summary", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["free"]["count"], 1);
    assert_eq!(amount(&summary["free"], "total_waived"), dec!(1000));
    assert_eq!(summary["full_payment"]["count"], 1);
    assert_eq!(amount(&summary["full_payment"], "total_due"), dec!(500));
    assert_eq!(summary["invoice_count"], 2);
}

#[tokio::test]
async fn test_delete_fee_and_student_fees() {
    let app = TestApp::new().await;
    let token = app.writer();
    let (_, fees) = app
        .send(Method::POST, "/api/v1/fees", Some(&token), Some(app.charge_body(3, "300", json!("0"))))
        .await;
    let uri = format!("/api/v1/fees/{}", fees[0]["id"].as_str().unwrap());

    let (status, _) = app.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let student_uri = format!("/api/v1/students/{}/fees", Uuid::from(app.fixture.student.id));
    let (status, body) = app.send(Method::DELETE, &student_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 2);
    assert_eq!(app.fixture.fees.count_fees().await.unwrap(), 0);
}
