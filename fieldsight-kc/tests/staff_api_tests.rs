//! Integration tests for staff, team and staff project endpoints

mod helpers;

use axum::http::StatusCode;
use helpers::{extract_json, json_request, test_request, TestApp};
use serde_json::json;
use tower::util::ServiceExt; // for `oneshot` method

async fn create_user(app: &TestApp, username: &str) -> i64 {
    fieldsight_kc::db::users::create_user(&app.db, username)
        .await
        .unwrap()
        .id
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new().await;

    let response = app.router.oneshot(test_request("GET", "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "fieldsight-kc");
    assert!(body["version"].is_string());
}

// =============================================================================
// Teams
// =============================================================================

#[tokio::test]
async fn test_team_crud_with_soft_delete() {
    let app = TestApp::new().await;
    let leader = create_user(&app, "leader").await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/staff/teams",
            json!({"name": "North", "leader_id": leader}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let team = extract_json(response.into_body()).await;
    let team_id = team["id"].as_i64().unwrap();
    assert_eq!(team["name"], "North");
    assert_eq!(team["is_deleted"], false);

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/staff/teams/{}", team_id),
            json!({"name": "North-East", "leader_id": leader}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_json(response.into_body()).await["name"], "North-East");

    let response = app
        .router
        .clone()
        .oneshot(test_request("DELETE", &format!("/staff/teams/{}", team_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Hidden from the list
    let response = app
        .router
        .clone()
        .oneshot(test_request("GET", "/staff/teams"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_json(response.into_body()).await, json!([]));

    // Detail still resolves
    let response = app
        .router
        .oneshot(test_request("GET", &format!("/staff/teams/{}", team_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let detail = extract_json(response.into_body()).await;
    assert_eq!(detail["is_deleted"], true);
    assert_eq!(detail["staff_list"], json!([]));
}

#[tokio::test]
async fn test_team_detail_lists_staff() {
    let app = TestApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/staff/teams", json!({"name": "West"})))
        .await
        .unwrap();
    let team_id = extract_json(response.into_body()).await["id"].as_i64().unwrap();

    for first_name in ["Anita", "Ram"] {
        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                "/staff/staff",
                json!({
                    "first_name": first_name,
                    "last_name": "Gurung",
                    "team_id": team_id,
                    "designation": "Enumerator",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .router
        .oneshot(test_request("GET", &format!("/staff/teams/{}", team_id)))
        .await
        .unwrap();
    let detail = extract_json(response.into_body()).await;
    let staff_list = detail["staff_list"].as_array().unwrap();
    assert_eq!(staff_list.len(), 2);
    assert_eq!(staff_list[0]["first_name"], "Anita");
    assert_eq!(staff_list[1]["team_id"], team_id);
}

#[tokio::test]
async fn test_team_validation() {
    let app = TestApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/staff/teams", json!({"name": "  "})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/staff/teams",
            json!({"name": "South", "staff_project_id": 99}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_rows_return_404() {
    let app = TestApp::new().await;

    for (method, uri) in [
        ("GET", "/staff/teams/42"),
        ("DELETE", "/staff/teams/42"),
        ("GET", "/staff/staff/42"),
        ("DELETE", "/staff/staff/42"),
        ("GET", "/staff/projects/42"),
        ("DELETE", "/staff/projects/42"),
    ] {
        let response = app
            .router
            .clone()
            .oneshot(test_request(method, uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{} {}", method, uri);
    }

    let response = app
        .router
        .oneshot(json_request(
            "PUT",
            "/staff/staff/42",
            json!({"first_name": "A", "last_name": "B"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Staff
// =============================================================================

#[tokio::test]
async fn test_staff_soft_delete() {
    let app = TestApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/staff/staff",
            json!({"first_name": "Sita", "last_name": "Rai", "gender": "Female"}),
        ))
        .await
        .unwrap();
    let staff_id = extract_json(response.into_body()).await["id"].as_i64().unwrap();

    let response = app
        .router
        .clone()
        .oneshot(test_request("DELETE", &format!("/staff/staff/{}", staff_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .router
        .clone()
        .oneshot(test_request("GET", "/staff/staff"))
        .await
        .unwrap();
    assert_eq!(extract_json(response.into_body()).await, json!([]));

    let response = app
        .router
        .oneshot(test_request("GET", &format!("/staff/staff/{}", staff_id)))
        .await
        .unwrap();
    let detail = extract_json(response.into_body()).await;
    assert_eq!(detail["gender"], "Female");
    assert_eq!(detail["is_deleted"], true);
}

#[tokio::test]
async fn test_staff_requires_names() {
    let app = TestApp::new().await;

    let response = app
        .router
        .oneshot(json_request("POST", "/staff/staff", json!({"first_name": "Sita"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("last_name"));
}

// =============================================================================
// Staff projects
// =============================================================================

#[tokio::test]
async fn test_staff_project_detail_lists_teams() {
    let app = TestApp::new().await;
    let creator = create_user(&app, "admin").await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/staff/projects",
            json!({"name": "Census", "created_by": creator}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let project_id = extract_json(response.into_body()).await["id"].as_i64().unwrap();

    for name in ["A", "B"] {
        app.router
            .clone()
            .oneshot(json_request(
                "POST",
                "/staff/teams",
                json!({"name": name, "staff_project_id": project_id}),
            ))
            .await
            .unwrap();
    }

    let response = app
        .router
        .clone()
        .oneshot(test_request("DELETE", &format!("/staff/projects/{}", project_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .router
        .clone()
        .oneshot(test_request("GET", "/staff/projects"))
        .await
        .unwrap();
    assert_eq!(extract_json(response.into_body()).await, json!([]));

    let response = app
        .router
        .oneshot(test_request("GET", &format!("/staff/projects/{}", project_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let detail = extract_json(response.into_body()).await;
    assert_eq!(detail["name"], "Census");
    assert_eq!(detail["created_by"], creator);
    assert_eq!(detail["team_list"].as_array().unwrap().len(), 2);
}
