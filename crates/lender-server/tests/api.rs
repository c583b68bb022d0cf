use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use lender_core::{FeatureVector, RiskScorer, ScoringModel};
use lender_model::ClassifierModel;
use lender_server::{app, AppState};
use lender_store::ApplicantStore;
use serde_json::{json, Value};
use tower::ServiceExt;

const MODEL: &str = r#"{
    "kind": "logistic_regression",
    "features": [
        "external_risk_estimate_c",
        "net_fraction_revolving_burden",
        "num_inq_last_6m",
        "percent_trades_never_delq",
        "m_since_recent_delq"
    ],
    "classes": [0, 1],
    "coefficients": [-0.08, 0.05, 0.3, -0.02, -0.01],
    "intercept": 5.0
}"#;

fn model() -> ClassifierModel {
    ClassifierModel::from_json(MODEL).unwrap()
}

fn store() -> ApplicantStore {
    let store = ApplicantStore::in_memory("application_master_record", "applicant_id").unwrap();
    store
        .execute_batch(
            "CREATE TABLE application_master_record (
                applicant_id INTEGER PRIMARY KEY,
                external_risk_estimate_c INTEGER,
                net_fraction_revolving_burden INTEGER,
                average_m_in_file INTEGER
            );
            INSERT INTO application_master_record VALUES (1001, 55, 33, 84), (1002, 61, 0, 41);",
        )
        .unwrap();
    store
}

fn test_app(scorer: Option<RiskScorer>) -> Router {
    app(Arc::new(AppState::new(Arc::new(store()), scorer)))
}

fn scored_app() -> Router {
    test_app(Some(RiskScorer::new(Arc::new(model())).unwrap()))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn lookup_returns_full_row() {
    let (status, body) = send(scored_app(), get("/application/1001")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "applicant_id": 1001,
            "external_risk_estimate_c": 55,
            "net_fraction_revolving_burden": 33,
            "average_m_in_file": 84
        })
    );
}

#[tokio::test]
async fn lookup_unknown_id_is_404() {
    let (status, body) = send(scored_app(), get("/application/9999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Applicant ID not found" }));
}

#[tokio::test]
async fn lookup_works_without_model() {
    let (status, body) = send(test_app(None), get("/application/1002")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["external_risk_estimate_c"], json!(61));
}

#[tokio::test]
async fn lookup_non_integer_id_is_rejected() {
    let response = scored_app().oneshot(get("/application/abc")).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn lookup_store_failure_is_500() {
    let empty = ApplicantStore::in_memory("application_master_record", "applicant_id").unwrap();
    let app = app(Arc::new(AppState::new(Arc::new(empty), None)));
    let (status, body) = send(app, get("/application/1001")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("no such table"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_lookups_all_complete() {
    let app = scored_app();
    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..16 {
        let app = app.clone();
        let id = if i % 2 == 0 { 1001 } else { 1002 };
        tasks.spawn(async move { send(app, get(&format!("/application/{id}"))).await });
    }

    let mut completed = 0;
    while let Some(joined) = tasks.join_next().await {
        let (status, body) = joined.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(body["applicant_id"] == json!(1001) || body["applicant_id"] == json!(1002));
        completed += 1;
    }
    assert_eq!(completed, 16);
}

#[tokio::test]
async fn predict_end_to_end() {
    let request = post_json(
        "/predict",
        json!({
            "External_Risk_Estimate_C": 65,
            "Net_Fraction_Revolving_Burden": 55,
            "Num_Inq_Last_6M": 2,
            "Percent_Trades_Never_Delq": 90,
            "M_Since_Recent_Delq": 3
        }),
    );
    let (status, body) = send(scored_app(), request).await;
    assert_eq!(status, StatusCode::OK);

    let features = FeatureVector::new([65.0, 55.0, 2.0, 90.0, 3.0]);
    let model = model();
    let expected_label = model.predict(&features).unwrap();
    let expected_probability =
        lender_core::round_percentage(model.predict_proba(&features).unwrap()[1]);

    assert_eq!(body["primary_factor"], json!("excessive revolving burden"));
    assert_eq!(body["prediction"], json!(expected_label));
    assert_eq!(body["probability"].as_f64().unwrap(), expected_probability);
}

#[tokio::test]
async fn predict_case_insensitive_keys() {
    let (_, upper) = send(
        scored_app(),
        post_json("/predict", json!({ "Net_Fraction_Revolving_Burden": 60, "External_Risk_Estimate_C": 75 })),
    )
    .await;
    let (_, lower) = send(
        scored_app(),
        post_json("/predict", json!({ "net_fraction_revolving_burden": 60, "external_risk_estimate_c": 75 })),
    )
    .await;
    assert_eq!(upper, lower);
}

#[tokio::test]
async fn predict_empty_body_uses_zero_vector() {
    let (status, body) = send(scored_app(), post_json("/predict", json!({}))).await;
    assert_eq!(status, StatusCode::OK);

    let zero = FeatureVector::new([0.0; 5]);
    let expected = lender_core::round_percentage(model().predict_proba(&zero).unwrap()[1]);
    assert_eq!(body["probability"].as_f64().unwrap(), expected);
    assert_eq!(body["primary_factor"], json!("low credit bureau risk score"));
}

#[tokio::test]
async fn predict_non_numeric_feature_is_zeroed() {
    let (status, garbled) = send(
        scored_app(),
        post_json("/predict", json!({ "num_inq_last_6m": "not-a-number", "external_risk_estimate_c": 90 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, zeroed) = send(
        scored_app(),
        post_json("/predict", json!({ "num_inq_last_6m": 0, "external_risk_estimate_c": 90 })),
    )
    .await;
    assert_eq!(garbled, zeroed);
    assert_eq!(garbled["primary_factor"], json!("standard risk profile"));
}

#[tokio::test]
async fn predict_without_model_is_backend_error() {
    let (status, body) = send(test_app(None), post_json("/predict", json!({}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "detail": "Backend Error: model not loaded" }));
}

#[tokio::test]
async fn predict_unreadable_factor_input_is_backend_error() {
    let (status, body) = send(
        scored_app(),
        post_json("/predict", json!({ "net_fraction_revolving_burden": "very high" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Backend Error: could not convert net_fraction_revolving_burden"));
}

#[tokio::test]
async fn predict_overflowing_score_is_backend_error() {
    let opposed = r#"{
        "kind": "logistic_regression",
        "features": [
            "external_risk_estimate_c",
            "net_fraction_revolving_burden",
            "num_inq_last_6m",
            "percent_trades_never_delq",
            "m_since_recent_delq"
        ],
        "classes": [0, 1],
        "coefficients": [-3.0, 3.0, 0.0, 0.0, 0.0],
        "intercept": 0.0
    }"#;
    let model = ClassifierModel::from_json(opposed).unwrap();
    let app = test_app(Some(RiskScorer::new(Arc::new(model)).unwrap()));

    let (status, body) = send(
        app,
        post_json(
            "/predict",
            json!({ "external_risk_estimate_c": 1e308, "net_fraction_revolving_burden": 1e308 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "detail": "Backend Error: model produced a non-finite score" })
    );
}

#[tokio::test]
async fn predict_rejects_non_object_body() {
    let response = scored_app()
        .oneshot(post_json("/predict", json!([1, 2, 3])))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn health_is_ok() {
    let response = test_app(None).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/predict")
        .header(header::ORIGIN, "http://localhost:5500")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = scored_app().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
