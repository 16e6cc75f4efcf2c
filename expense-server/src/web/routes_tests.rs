use axum::body::Body;
use axum::http::Request;
use serde_json::{Value, json};
use tower::ServiceExt;

use super::*;
use crate::config::QueryDefaults;
use crate::export::{CSV_CONTENT_TYPE, XLSX_CONTENT_TYPE};
use crate::places::{
    ConfiguredProvider, LooseNumber, MockPlaceProvider, PlaceResolver, PositionOptions, RawPlace,
    ResolverConfig,
};
use crate::store::{RecordStore, StoreDocument};

fn station(name: &str, line: &str, lat: f64, lon: f64) -> RawPlace {
    RawPlace {
        name: name.to_string(),
        line: Some(line.to_string()),
        x: Some(LooseNumber::from(lon)),
        y: Some(LooseNumber::from(lat)),
        distance: None,
    }
}

fn test_app() -> Router {
    let provider = MockPlaceProvider::from_stations(vec![
        station("有楽町", "JR山手線", 35.6751, 139.7638),
        station("東京", "JR山手線", 35.681236, 139.767125),
        station("新宿", "京王線", 35.690921, 139.700258),
    ]);
    let config = ResolverConfig {
        position: PositionOptions {
            timeout: std::time::Duration::from_millis(500),
            ..PositionOptions::default()
        },
        ..ResolverConfig::default()
    };
    let resolver = PlaceResolver::new(ConfiguredProvider::Mock(provider), config);
    let store = RecordStore::in_memory(StoreDocument::default());
    let state = AppState::new(store, resolver, QueryDefaults::default());

    create_router(state, concat!(env!("CARGO_MANIFEST_DIR"), "/static"))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn trip(date: &str, from: &str, to: &str, fare: u64) -> Value {
    json!({
        "date": date,
        "fromStation": from,
        "toStation": to,
        "transportationType": "train",
        "transportationCompany": "JR東日本",
        "fare": fare,
    })
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, record) = send(app, with_json("POST", "/api/records", body)).await;
    assert_eq!(status, StatusCode::CREATED);
    record
}

#[tokio::test]
async fn health_check() {
    let app = test_app();
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_then_list() {
    let app = test_app();
    let record = create(&app, trip("2025-11-03", "渋谷", "新宿", 170)).await;
    assert_eq!(record["fromStation"], "渋谷");
    assert!(record["id"].as_str().is_some_and(|id| !id.is_empty()));

    let (status, body) = send(&app, get("/api/records")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "page");
    assert_eq!(body["totalRecords"], 1);
    assert_eq!(body["totalFare"], 170);
    assert_eq!(body["records"][0]["toStation"], "新宿");
}

#[tokio::test]
async fn invalid_record_reports_fields() {
    let app = test_app();
    let mut body = trip("2025-02-30", "", "新宿", 0);
    body["fare"] = json!(-10);

    let (status, error) = send(&app, with_json("POST", "/api/records", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["fields"]["date"].is_string());
    assert!(error["fields"]["fromStation"].is_string());
    assert!(error["fields"]["fare"].is_string());
    assert!(error["fields"]["toStation"].is_null());
}

#[tokio::test]
async fn history_query_filters_and_groups() {
    let app = test_app();
    create(&app, trip("2025-10-20", "東京", "品川", 180)).await;
    create(&app, trip("2025-11-03", "渋谷", "新宿", 170)).await;
    create(&app, trip("2025-11-10", "渋谷", "原宿", 150)).await;

    // q=渋谷
    let (_, body) = send(&app, get("/api/records?q=%E6%B8%8B%E8%B0%B7")).await;
    assert_eq!(body["totalRecords"], 2);
    assert_eq!(body["totalFare"], 320);

    let (_, body) = send(&app, get("/api/records?groupBy=month")).await;
    assert_eq!(body["mode"], "groups");
    assert_eq!(body["groups"][0]["month"], "2025-11");
    assert_eq!(body["groups"][0]["totalFare"], 320);
    assert_eq!(body["groups"][1]["month"], "2025-10");

    let (_, body) = send(&app, get("/api/records?sortOrder=asc&pageSize=2&page=2")).await;
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["records"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["records"][0]["date"], "2025-11-10");
}

#[tokio::test]
async fn malformed_bounds_are_reported_not_applied() {
    let app = test_app();
    create(&app, trip("2025-11-03", "渋谷", "新宿", 170)).await;

    let (status, body) = send(&app, get("/api/records?from=2025-13-01")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalRecords"], 1);
    assert_eq!(body["ignoredFilters"], json!(["dateFrom"]));
}

#[tokio::test]
async fn update_and_delete() {
    let app = test_app();
    let record = create(&app, trip("2025-11-03", "渋谷", "新宿", 170)).await;
    let uri = format!("/api/records/{}", record["id"].as_str().unwrap());

    let (status, updated) = send(
        &app,
        with_json("PUT", &uri, trip("2025-11-04", "渋谷", "新宿", 200)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], record["id"]);
    assert_eq!(updated["fare"], 200);

    let (status, fetched) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["date"], "2025-11-04");

    let delete = Request::builder()
        .method("DELETE")
        .uri(&uri)
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, delete).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, error) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(error["error"].is_string());
}

#[tokio::test]
async fn update_missing_record_is_not_found() {
    let app = test_app();
    let (status, _) = send(
        &app,
        with_json("PUT", "/api/records/nope", trip("2025-11-04", "渋谷", "新宿", 200)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn frequent_route_logs_a_trip() {
    let app = test_app();
    let mut body = trip("", "自宅前", "駅前", 210);
    body["name"] = json!("通勤バス");
    body["transportationType"] = json!("bus");

    let (status, route) = send(&app, with_json("POST", "/api/routes", body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(route["name"], "通勤バス");

    let uri = format!("/api/routes/{}/use", route["id"].as_str().unwrap());
    let (status, record) = send(&app, with_json("POST", &uri, json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["fromStation"], "自宅前");
    assert_eq!(record["transportationType"], "bus");
    assert_ne!(record["id"], route["id"]);

    let (_, routes) = send(&app, get("/api/routes")).await;
    assert_eq!(routes.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn companies_by_type() {
    let app = test_app();
    let (status, body) = send(&app, get("/api/companies?type=bus")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        body["companies"]
            .as_array()
            .is_some_and(|c| !c.is_empty())
    );

    let (status, _) = send(&app, get("/api/companies?type=ferry")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn lookup_with_position_ranks_stations() {
    let app = test_app();
    let request = json!({
        "placeType": "station",
        "position": {"latitude": 35.681236, "longitude": 139.767125},
    });

    let (status, body) = send(&app, with_json("POST", "/api/places/lookup", request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["candidates"][0]["name"], "東京");
    assert_eq!(body["candidates"][0]["distanceMeters"], 0);
    assert_eq!(body["candidates"][1]["name"], "有楽町");
    assert_eq!(body["candidates"][0]["suggestedCompany"], "JR東日本");

    let (_, snapshot) = send(&app, get("/api/places")).await;
    assert_eq!(snapshot["status"], "success");

    let (_, reset) = send(&app, with_json("POST", "/api/places/reset", json!({}))).await;
    assert_eq!(reset["status"], "idle");
    assert_eq!(reset["candidates"], json!([]));
}

#[tokio::test]
async fn lookup_with_denied_permission() {
    let app = test_app();
    let (status, body) = send(
        &app,
        with_json("POST", "/api/places/lookup", json!({"errorCode": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"]["code"], "permission-denied");
    assert_eq!(body["candidates"], json!([]));
}

#[tokio::test]
async fn lookup_without_geolocation_support() {
    let app = test_app();
    let (_, body) = send(
        &app,
        with_json("POST", "/api/places/lookup", json!({"supported": false})),
    )
    .await;
    assert_eq!(body["error"]["code"], "not-supported");
}

#[tokio::test]
async fn lookup_needs_a_report() {
    let app = test_app();
    let (status, _) = send(&app, with_json("POST", "/api/places/lookup", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_csv_download() {
    let app = test_app();
    create(&app, trip("2025-11-03", "渋谷", "新宿", 170)).await;

    let response = app
        .clone()
        .oneshot(get("/api/export?range=all&format=csv"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], CSV_CONTENT_TYPE);
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with('\u{feff}'));
    assert!(text.contains("渋谷〜新宿"));
}

#[tokio::test]
async fn export_defaults_to_xlsx() {
    let app = test_app();
    create(&app, trip("2025-11-03", "渋谷", "新宿", 170)).await;

    let response = app.clone().oneshot(get("/api/export?range=all")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], XLSX_CONTENT_TYPE);
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("export.xlsx"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[tokio::test]
async fn export_errors() {
    let app = test_app();
    let (status, _) = send(&app, get("/api/export?range=all")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, get("/api/export?range=weekly")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    create(&app, trip("2025-11-03", "渋谷", "新宿", 170)).await;
    let (status, _) = send(&app, get("/api/export?range=all&format=pdf")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get("/api/export?range=custom&start=2025-99-01")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn index_page_renders() {
    let app = test_app();
    create(&app, trip("2025-11-03", "渋谷", "新宿", 170)).await;

    let response = app.clone().oneshot(get("/?groupBy=month")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("交通費記録"));
    assert!(html.contains("渋谷"));
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let app = test_app();
    let request = Request::builder()
        .uri("/nowhere")
        .header(header::ACCEPT, "text/html")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let (status, body) = send(&app, get("/api/nowhere")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not found");
}
