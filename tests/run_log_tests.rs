mod common;

use axum::http::StatusCode;
use common::TestClient;
use runnerbee::{
    config::{RunAccessPolicy, ServerConfig},
    models::run::{FIELD_REQUIRED, TOO_LARGE},
    services::MockEmailService,
    test_utils::test_helpers,
};
use std::sync::Arc;

#[tokio::test]
async fn test_run_lifecycle() {
    let mut client = TestClient::new().await;
    client.sign_up_and_login("alice").await;

    // Empty list first
    let page = client.get("/").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("No runs yet"));

    // Create
    let created = client.add_run("5", "30", "300").await;
    assert_eq!(created.status, StatusCode::SEE_OTHER);
    assert_eq!(created.location.as_deref(), Some("/"));

    let page = client.get("/").await;
    assert!(page.body.contains("<td>5</td>"));
    assert!(page.body.contains("<td>30</td>"));
    assert!(page.body.contains("<td>300</td>"));

    let run_id = client.latest_run_id().await;

    // Edit form is pre-filled
    let edit_page = client.get(&format!("/edit/{}", run_id)).await;
    assert_eq!(edit_page.status, StatusCode::OK);
    assert!(edit_page.body.contains(r#"value="5""#));

    let token = common::extract_csrf_token(&edit_page.body);
    let updated = client
        .post_form(
            &format!("/edit/{}", run_id),
            &[
                ("distance", "6.2"),
                ("run_time", "30"),
                ("calories_burned", "300"),
                ("csrf_token", token.as_str()),
            ],
        )
        .await;
    assert_eq!(updated.status, StatusCode::SEE_OTHER);

    let distance: f64 = sqlx::query_scalar("SELECT distance FROM runs WHERE id = ?")
        .bind(run_id)
        .fetch_one(&client.pool)
        .await
        .unwrap();
    assert!((distance - 6.2).abs() < f64::EPSILON);

    let page = client.get("/").await;
    assert!(page.body.contains("<td>6.2</td>"));

    // Delete
    let token = client.csrf_token("/").await;
    let deleted = client
        .post_form(
            &format!("/delete/{}", run_id),
            &[("csrf_token", token.as_str())],
        )
        .await;
    assert_eq!(deleted.status, StatusCode::SEE_OTHER);
    assert_eq!(deleted.location.as_deref(), Some("/"));
    assert_eq!(test_helpers::count_runs(&client.pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let mut client = TestClient::new().await;
    client.sign_up_and_login("alice").await;

    client.add_run("3", "20", "200").await;
    client.add_run("10", "55", "700").await;

    let page = client.get("/").await;
    let newer = page.body.find("<td>10</td>").unwrap();
    let older = page.body.find("<td>3</td>").unwrap();
    assert!(newer < older);
}

#[tokio::test]
async fn test_empty_field_is_rejected_inline() {
    let mut client = TestClient::new().await;
    client.sign_up_and_login("alice").await;

    let response = client.add_run("", "30", "300").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(FIELD_REQUIRED));
    // Submitted values are kept
    assert!(response.body.contains(r#"value="30""#));
    assert_eq!(test_helpers::count_runs(&client.pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_malformed_numbers_are_rejected() {
    let mut client = TestClient::new().await;
    client.sign_up_and_login("alice").await;

    let response = client.add_run("five", "30.5", "-1").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Not a valid number."));
    assert!(response.body.contains("Not a valid integer."));
    assert!(response.body.contains("Must not be negative."));
    assert_eq!(test_helpers::count_runs(&client.pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_add_without_csrf_token_is_refused() {
    let mut client = TestClient::new().await;
    client.sign_up_and_login("alice").await;

    let response = client
        .post_form(
            "/add",
            &[
                ("distance", "5"),
                ("run_time", "30"),
                ("calories_burned", "300"),
                ("csrf_token", "forged"),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Invalid security token"));
    assert_eq!(test_helpers::count_runs(&client.pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_run_ids() {
    let mut client = TestClient::new().await;
    client.sign_up_and_login("alice").await;
    client.add_run("5", "30", "300").await;
    client.add_run("8", "48", "480").await;

    let edit = client.get("/edit/9999").await;
    assert_eq!(edit.status, StatusCode::NOT_FOUND);

    let delete = client.get("/delete/9999").await;
    assert_eq!(delete.status, StatusCode::SEE_OTHER);
    assert_eq!(delete.location.as_deref(), Some("/"));

    let token = client.csrf_token("/").await;
    let delete = client
        .post_form("/delete/9999", &[("csrf_token", token.as_str())])
        .await;
    assert_eq!(delete.status, StatusCode::SEE_OTHER);

    // Both runs are still listed
    assert_eq!(test_helpers::count_runs(&client.pool).await.unwrap(), 2);
    let page = client.get("/").await;
    assert!(page.body.contains("<td>300</td>"));
    assert!(page.body.contains("<td>480</td>"));
}

#[tokio::test]
async fn test_non_numeric_run_ids_are_not_found() {
    let mut client = TestClient::new().await;
    client.sign_up_and_login("alice").await;

    let edit = client.get("/edit/abc").await;
    assert_eq!(edit.status, StatusCode::NOT_FOUND);
    assert!(edit.body.contains("Run not found"));

    let delete = client.get("/delete/abc").await;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_edit_with_empty_field_keeps_stored_run() {
    let mut client = TestClient::new().await;
    client.sign_up_and_login("alice").await;
    client.add_run("5", "30", "300").await;
    let run_id = client.latest_run_id().await;

    let token = client.csrf_token(&format!("/edit/{}", run_id)).await;
    let response = client
        .post_form(
            &format!("/edit/{}", run_id),
            &[
                ("distance", "6.2"),
                ("run_time", ""),
                ("calories_burned", "300"),
                ("csrf_token", token.as_str()),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(FIELD_REQUIRED));
    assert!(response.body.contains(r#"value="6.2""#));

    let (distance, run_time): (f64, i64) =
        sqlx::query_as("SELECT distance, run_time FROM runs WHERE id = ?")
            .bind(run_id)
            .fetch_one(&client.pool)
            .await
            .unwrap();
    assert_eq!(distance, 5.0);
    assert_eq!(run_time, 30);
}

#[tokio::test]
async fn test_oversized_values_do_not_break_totals() {
    let mut client = TestClient::new().await;
    client.sign_up_and_login("alice").await;

    let rejected = client.add_run("5", "9223372036854775807", "300").await;
    assert_eq!(rejected.status, StatusCode::OK);
    assert!(rejected.body.contains(TOO_LARGE));
    assert_eq!(test_helpers::count_runs(&client.pool).await.unwrap(), 0);

    // Largest accepted values still aggregate
    client.add_run("5", "2147483647", "2147483647").await;
    client.add_run("5", "2147483647", "10").await;
    assert_eq!(test_helpers::count_runs(&client.pool).await.unwrap(), 2);

    let dashboard = client.get("/dashboard").await;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert!(dashboard.body.contains(">4294967294<"));

    let report = client.get("/report").await;
    assert_eq!(report.status, StatusCode::SEE_OTHER);
    assert_eq!(report.location.as_deref(), Some("/dashboard"));
}

#[tokio::test]
async fn test_link_delete_removes_run() {
    let mut client = TestClient::new().await;
    client.sign_up_and_login("alice").await;
    client.add_run("5", "30", "300").await;
    let run_id = client.latest_run_id().await;

    let response = client.get(&format!("/delete/{}", run_id)).await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(test_helpers::count_runs(&client.pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_users_only_list_their_own_runs() {
    let mut alice = TestClient::new().await;
    alice.sign_up_and_login("alice").await;
    alice.add_run("5", "30", "300").await;

    let mut bob = alice.fresh_browser();
    bob.sign_up_and_login("bob").await;

    let page = bob.get("/").await;
    assert!(page.body.contains("No runs yet"));
    assert!(!page.body.contains("<td>300</td>"));
}

#[tokio::test]
async fn test_owner_only_policy_hides_other_users_runs() {
    let config = ServerConfig {
        run_access: RunAccessPolicy::OwnerOnly,
        ..ServerConfig::default()
    };
    let mut alice = TestClient::with(config, Arc::new(MockEmailService::new())).await;
    alice.sign_up_and_login("alice").await;
    alice.add_run("5", "30", "300").await;
    let run_id = alice.latest_run_id().await;

    let mut bob = alice.fresh_browser();
    bob.sign_up_and_login("bob").await;

    let edit = bob.get(&format!("/edit/{}", run_id)).await;
    assert_eq!(edit.status, StatusCode::NOT_FOUND);

    let delete = bob.get(&format!("/delete/{}", run_id)).await;
    assert_eq!(delete.status, StatusCode::SEE_OTHER);
    assert_eq!(test_helpers::count_runs(&bob.pool).await.unwrap(), 1);
}

#[tokio::test]
async fn test_shared_policy_allows_editing_by_id() {
    let mut alice = TestClient::new().await;
    alice.sign_up_and_login("alice").await;
    alice.add_run("5", "30", "300").await;
    let run_id = alice.latest_run_id().await;

    let mut bob = alice.fresh_browser();
    bob.sign_up_and_login("bob").await;

    let edit = bob.get(&format!("/edit/{}", run_id)).await;
    assert_eq!(edit.status, StatusCode::OK);
}

#[tokio::test]
async fn test_dashboard_shows_totals() {
    let mut client = TestClient::new().await;
    client.sign_up_and_login("alice").await;
    client.add_run("5", "30", "300").await;
    client.add_run("7.5", "45", "450").await;

    let page = client.get("/dashboard").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("12.5"));
    assert!(page.body.contains(">75<"));
    assert!(page.body.contains(">750<"));
}

#[tokio::test]
async fn test_index_redirects_to_list() {
    let mut client = TestClient::new().await;
    client.sign_up_and_login("alice").await;

    let response = client.get("/index").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/"));
}
