//! Integration tests for jcr-qs API endpoints
//!
//! Each test builds a scratch `jcr.db` with a handful of yearly tables in
//! the shapes the upstream CSV files use, then drives the router with
//! `oneshot`.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use jcr_common::db::{self, ColumnAffinity, ColumnDef, TableStore};
use jcr_common::Scalar;
use jcr_qs::{build_router, AppState};
use serde_json::Value;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

fn cells(values: &[&str]) -> Vec<Scalar> {
    values
        .iter()
        .map(|v| if v.is_empty() { Scalar::Null } else { Scalar::from(*v) })
        .collect()
}

async fn load(store: &TableStore, table: &str, columns: &[&str], rows: &[&[&str]]) {
    let columns: Vec<ColumnDef> = columns.iter().map(|c| ColumnDef::text(*c)).collect();
    let rows: Vec<Vec<Scalar>> = rows.iter().map(|r| cells(r)).collect();
    store
        .bulk_load(table, &columns, &rows, "test")
        .await
        .expect("fixture load");
}

/// Test helper: scratch database with one table per dataset kind
async fn setup_app() -> (axum::Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("jcr.db");
    let pool = db::init_database(&db_path).await.expect("init database");
    let store = TableStore::new(pool);

    load(&store, "JCR2022", &["Journal", "IF(2022)", "Quartile"], &[&["Test J", "3.5", "Q2"]]).await;

    load(
        &store,
        "FQBJCR2025",
        &["Journal", "大类分区", "学科", "影响因子", "Top", "Open Access"],
        &[
            &["Nature", "1区", "综合性期刊", "64.8", "是", "否"],
            &["Mid J", "2区", "医学", "7.2", "否", "是"],
            &["Edge J", "3区", "医学", "5", "否", "否"],
            &["Blank J", "2区", "医学", "", "否", "否"],
            &["NA J", "2区", "医学", "N/A", "", ""],
        ],
    )
    .await;

    load(&store, "FQBJCR2021", &["Journal", "大类分区"], &[&["Trend J", "2区"]]).await;
    load(&store, "FQBJCR2023", &["Journal", "大类分区"], &[&["Trend J", "1区"]]).await;

    load(&store, "GJQKYJMD2024", &["Journal", "预警等级"], &[&["Weak J", "严重"]]).await;

    // No Journal column: must never contribute to search
    load(
        &store,
        "CCF2022",
        &["刊物名称", "CCF推荐类型"],
        &[&["Test J Transactions", "A"]],
    )
    .await;

    let state = AppState::new(store, db_path);
    (build_router(state), dir)
}

/// Test helper: GET request
fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_bytes(body: Body) -> Vec<u8> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body")
        .to_vec()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    serde_json::from_slice(&body_bytes(body).await).expect("Should parse JSON")
}

async fn extract_text(body: Body) -> String {
    String::from_utf8(body_bytes(body).await).expect("Should be UTF-8")
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _dir) = setup_app().await;

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "jcr-qs");
    assert!(body["version"].is_string());
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_round_trip_case_insensitive() {
    let (app, _dir) = setup_app().await;

    let response = app
        .oneshot(get("/api/search?journal_name=test%20j&format=json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let records = body["records"].as_array().unwrap();
    // CCF2022 has no Journal column and is skipped
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["journal_name"], "Test J");
    assert_eq!(records[0]["impact_factor"], 3.5);
    assert_eq!(records[0]["partition"], "Q2");
    assert_eq!(records[0]["year"], "2022");
    assert_eq!(records[0]["kind"], "jcr");
    assert_eq!(body["rejected"], 0);
}

#[tokio::test]
async fn test_search_text_output() {
    let (app, _dir) = setup_app().await;

    let response = app.oneshot(get("/api/search?journal_name=Test")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let text = extract_text(response.into_body()).await;
    assert!(text.contains("📚 期刊名称: Test J"));
    assert!(text.contains("【2022年】"));
    assert!(text.contains("📊 影响因子: 3.5"));
    assert!(text.contains("🏆 分区: Q2"));
    assert!(!text.contains("Transactions"));
}

#[tokio::test]
async fn test_search_year_narrows_tables() {
    let (app, _dir) = setup_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/search?journal_name=Trend&year=2023&format=json"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let records = body["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["source_table"], "FQBJCR2023");

    let response = app
        .oneshot(get("/api/search?journal_name=Trend&format=json"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["records"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_search_not_found_and_empty_name() {
    let (app, _dir) = setup_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/search?journal_name=Nonexistent"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = extract_text(response.into_body()).await;
    assert_eq!(text, "未找到期刊 'Nonexistent' 的相关信息");

    let response = app
        .oneshot(get("/api/search?journal_name=&format=json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "INSUFFICIENT_INPUT");
}

// =============================================================================
// Trends
// =============================================================================

#[tokio::test]
async fn test_trends_verdict_from_last_partition() {
    let (app, _dir) = setup_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/trends?journal_name=Trend%20J&format=json"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["points"][0]["year"], "2021");
    assert_eq!(body["points"][0]["partition"], "2区");
    assert_eq!(body["points"][1]["year"], "2023");
    assert_eq!(body["points"][1]["partition"], "1区");
    assert_eq!(body["verdict"], "top_tier_stable");

    let response = app
        .oneshot(get("/api/trends?journal_name=Trend%20J"))
        .await
        .unwrap();
    let text = extract_text(response.into_body()).await;
    assert!(text.contains("2021年: 2区\n2023年: 1区"));
    assert!(text.contains("✅ 该期刊保持在顶级分区"));
}

// =============================================================================
// Compare / batch
// =============================================================================

#[tokio::test]
async fn test_compare_requires_two_names() {
    let (app, _dir) = setup_app().await;

    let response = app
        .oneshot(get("/api/compare?journal_list=Nature"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let text = extract_text(response.into_body()).await;
    assert_eq!(text, "请至少提供2个期刊名称进行比较");
}

#[tokio::test]
async fn test_compare_one_row_per_name() {
    let (app, _dir) = setup_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/compare?journal_list=Nature,Weak%20J,Ghost&format=json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0]["journal"], "Nature");
    assert_eq!(rows[0]["latest_partition"], "1区");
    assert_eq!(rows[0]["recommendation"], "strongly_recommend");

    assert_eq!(rows[1]["warning"], true);
    assert_eq!(rows[1]["recommendation"], "avoid");

    assert_eq!(rows[2]["has_data"], false);
    assert!(rows[2]["recommendation"].is_null());

    let response = app
        .oneshot(get("/api/compare?journal_list=Nature,Ghost"))
        .await
        .unwrap();
    let text = extract_text(response.into_body()).await;
    let ghost = text.lines().find(|l| l.starts_with("Ghost")).unwrap();
    assert_eq!(ghost.matches("无数据").count(), 3);
    assert!(text.contains("⭐ Nature: 顶级期刊，强烈推荐"));
}

#[tokio::test]
async fn test_batch_json() {
    let (app, _dir) = setup_app().await;

    let response = app
        .oneshot(get("/api/batch?journal_names=Test%20J,Weak%20J,Ghost&format=json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["found"], 2);

    let journals = body["journals"].as_array().unwrap();
    assert_eq!(journals[0]["impact_factor"], 3.5);
    assert_eq!(journals[0]["partition"], "Q2");
    assert_eq!(journals[0]["warning"], false);
    assert_eq!(journals[1]["warning"], true);
    assert_eq!(journals[2]["found"], false);
    assert!(journals[2]["years"].as_array().unwrap().is_empty());
}

// =============================================================================
// Filter
// =============================================================================

#[tokio::test]
async fn test_filter_impact_factor_bounds() {
    let (app, _dir) = setup_app().await;

    let response = app
        .oneshot(get("/api/filter?min_if=5&max_if=10&format=json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["table"], "FQBJCR2025");
    assert_eq!(body["impact_factor_column"], "影响因子");

    let names: Vec<&str> = body["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["Journal"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Mid J", "Edge J"]);
}

#[tokio::test]
async fn test_filter_partition_and_flags() {
    let (app, _dir) = setup_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/filter?partition=1%E5%8C%BA&format=json"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["rows"][0]["Journal"], "Nature");

    let response = app
        .clone()
        .oneshot(get("/api/filter?is_top=false&category=%E5%8C%BB%E5%AD%A6&format=json"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 4);

    let response = app
        .clone()
        .oneshot(get("/api/filter?is_oa=true&format=json"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["rows"][0]["Journal"], "Mid J");

    let response = app
        .oneshot(get("/api/filter?limit=2&format=json"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn test_filter_falls_back_to_jcr_table() {
    let (app, _dir) = setup_app().await;

    let response = app
        .oneshot(get("/api/filter?year=2022&format=json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["table"], "JCR2022");
    assert_eq!(body["kind"], "jcr");
    assert_eq!(body["impact_factor_column"], "IF(2022)");
}

#[tokio::test]
async fn test_filter_no_data_for_year() {
    let (app, _dir) = setup_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/filter?year=1999&format=json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NO_DATA_FOR_YEAR");

    let response = app.oneshot(get("/api/filter?year=1999")).await.unwrap();
    let text = extract_text(response.into_body()).await;
    assert_eq!(text, "未找到 1999 年的分区表或JCR数据");
}

#[tokio::test]
async fn test_filter_matches_integer_partition_tiers() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("jcr.db");
    let store = TableStore::new(db::init_database(&db_path).await.expect("init database"));

    let columns = vec![
        ColumnDef::text("Journal"),
        ColumnDef::new("大类分区", ColumnAffinity::Integer),
        ColumnDef::new("影响因子", ColumnAffinity::Real),
    ];
    let rows = vec![
        vec![Scalar::from("Nature"), Scalar::Integer(1), Scalar::Real(64.8)],
        vec![Scalar::from("Mid J"), Scalar::Integer(2), Scalar::Real(7.2)],
    ];
    store
        .bulk_load("FQBJCR2025", &columns, &rows, "test")
        .await
        .expect("fixture load");
    let app = build_router(AppState::new(store, db_path));

    let response = app
        .clone()
        .oneshot(get("/api/search?journal_name=Nature&format=json"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["records"][0]["partition"], "1区");

    let response = app
        .clone()
        .oneshot(get("/api/filter?partition=1%E5%8C%BA&format=json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["rows"][0]["Journal"], "Nature");

    let response = app
        .oneshot(get("/api/filter?partition=2%E5%8C%BA"))
        .await
        .unwrap();
    let text = extract_text(response.into_body()).await;
    assert!(text.contains("Mid J"));
    assert!(text.contains("分区: 2区"));
    assert!(!text.contains("Nature"));
}

#[tokio::test]
async fn test_filter_parameter_parsing() {
    let (app, _dir) = setup_app().await;

    // Blank numeric fields are treated as absent
    let response = app
        .clone()
        .oneshot(get("/api/filter?min_if=&max_if=&limit=&format=json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 5);

    let response = app
        .clone()
        .oneshot(get("/api/filter?is_top=1&format=json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["rows"][0]["Journal"], "Nature");

    let response = app
        .clone()
        .oneshot(get("/api/filter?min_if=abc&format=json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "INSUFFICIENT_INPUT");
    assert!(body["error"]["message"].as_str().unwrap().contains("min_if"));

    let response = app
        .oneshot(get("/api/filter?is_oa=maybe"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let text = extract_text(response.into_body()).await;
    assert!(text.contains("is_oa"));
}

#[tokio::test]
async fn test_unknown_format_falls_back_to_text() {
    let (app, _dir) = setup_app().await;

    let response = app
        .oneshot(get("/api/search?journal_name=Test%20J&format=xml"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = extract_text(response.into_body()).await;
    assert!(text.contains("Test J"));
}

// =============================================================================
// Warning list
// =============================================================================

#[tokio::test]
async fn test_warning_list_scenario() {
    let (app, _dir) = setup_app().await;

    let response = app.clone().oneshot(get("/api/warnings")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = extract_text(response.into_body()).await;
    assert!(text.contains("📅 2024年预警名单:\n  • Weak J: 严重"));

    let response = app
        .clone()
        .oneshot(get("/api/warnings?keywords=Strong"))
        .await
        .unwrap();
    let text = extract_text(response.into_body()).await;
    assert!(text.contains("无匹配 'Strong' 的预警期刊"));
    assert!(!text.contains("Weak J"));

    let response = app
        .oneshot(get("/api/warnings?keywords=weak&format=json"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["sections"][0]["year"], "2024");
    assert_eq!(body["sections"][0]["entries"][0]["journal"], "Weak J");
    assert_eq!(body["sections"][0]["entries"][0]["reason"], "严重");
}

// =============================================================================
// Info / prompt
// =============================================================================

#[tokio::test]
async fn test_database_info() {
    let (app, _dir) = setup_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/info?format=json"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let names: Vec<&str> = body["tables"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "CCF2022",
            "FQBJCR2021",
            "FQBJCR2023",
            "FQBJCR2025",
            "GJQKYJMD2024",
            "JCR2022",
            "sync_metadata"
        ]
    );
    assert_eq!(body["table_count"], 7);

    let response = app.oneshot(get("/api/info")).await.unwrap();
    let text = extract_text(response.into_body()).await;
    assert!(text.contains("  • FQBJCR2025: 5 条记录"));
}

#[tokio::test]
async fn test_journal_analysis_prompt() {
    let (app, _dir) = setup_app().await;

    let response = app
        .oneshot(get("/api/prompt/journal-analysis?journal_name=Nature"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = extract_text(response.into_body()).await;
    assert!(text.contains("对期刊 Nature 进行全面分析"));
}
